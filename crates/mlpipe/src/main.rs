use std::process::ExitCode;

fn main() -> ExitCode {
    mlpipe::run(std::env::args_os())
}
