//! # mlpipe
//!
//! Command-line front end of the mlpipe toolkit. Parses the command line
//! into an [`OperationRequest`](mlpipe_core::OperationRequest), dispatches it
//! through the core router, and maps the outcome to a process exit status.

pub mod cli;
pub mod logging;
pub mod process;

use std::ffi::OsString;
use std::process::ExitCode;

use mlpipe_core::OperationRouter;

pub use cli::Invocation;
pub use process::ProcessToolkit;

/// Runs one invocation and returns the exit status: 0 on success, 1 on an
/// argument error or a failed operation.
pub fn run<I, T>(args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let invocation = match cli::parse(args) {
        Ok(invocation) => invocation,
        Err(e) if cli::is_informational(&e) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let _ = e.print();
            println!("{}", cli::usage_hint());
            return ExitCode::from(1);
        }
    };

    logging::init(invocation.verbose);

    let mut router = OperationRouter::new(ProcessToolkit::new(&invocation.toolkit));
    match router.dispatch(&invocation.request) {
        Ok(completion) => {
            println!("{completion}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            if e.kind() == mlpipe_core::ErrorKind::Argument {
                println!("{}", cli::usage_hint());
            }
            ExitCode::from(u8::try_from(e.exit_code()).unwrap_or(1))
        }
    }
}
