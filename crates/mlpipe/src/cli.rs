//! # Command Surface
//!
//! Builds the `clap` command tree from the operation table and turns parsed
//! matches into an [`OperationRequest`].

use std::ffi::OsString;

use clap::builder::PossibleValuesParser;
use clap::error::ErrorKind;
use clap::{Arg, ArgAction, ArgMatches, Command};
use mlpipe_core::{Operation, OperationRequest, OperationSchema, OPERATIONS};

/// Environment variable naming the external toolkit command.
pub const TOOLKIT_ENV: &str = "MLPIPE_TOOLKIT";
/// Toolkit command used when none is configured.
pub const DEFAULT_TOOLKIT: &str = "mlpipe-toolkit";

/// A parsed command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub request: OperationRequest,
    /// Toolkit command line, program first.
    pub toolkit: String,
    pub verbose: bool,
}

/// The full command tree.
pub fn command() -> Command {
    let mut cmd = Command::new("mlpipe")
        .version(env!("CARGO_PKG_VERSION"))
        .about(
            "mlpipe is a Machine Learning component to train and evaluate models \
             for sequence labeling, constituent parsing and document classification.",
        )
        .subcommand_required(true)
        .arg(
            Arg::new("toolkit")
                .long("toolkit")
                .env(TOOLKIT_ENV)
                .default_value(DEFAULT_TOOLKIT)
                .global(true)
                .help("Command that runs the training and evaluation toolkit"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::SetTrue)
                .global(true)
                .help("Enable debug logging"),
        );

    for schema in OPERATIONS {
        cmd = cmd.subcommand(subcommand(schema));
    }
    cmd
}

fn subcommand(schema: &OperationSchema) -> Command {
    let mut sub = Command::new(schema.operation.name()).about(schema.help);

    for spec in schema.params {
        let mut arg = Arg::new(spec.name)
            .long(spec.name)
            .help(spec.help)
            .required(spec.required)
            .action(ArgAction::Set);

        if let Some(short) = spec.short {
            arg = arg.short(short);
        }
        if let Some(choices) = spec.choices {
            arg = arg
                .value_parser(PossibleValuesParser::new(choices.iter().copied()))
                .ignore_case(true);
        }
        if let Some(default) = spec.default {
            arg = arg.default_value(default);
        }
        sub = sub.arg(arg);
    }
    sub
}

/// Parses a command line, program name first.
pub fn parse<I, T>(args: I) -> Result<Invocation, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = command().try_get_matches_from(args)?;
    Ok(invocation(&matches))
}

fn invocation(matches: &ArgMatches) -> Invocation {
    let toolkit = matches
        .get_one::<String>("toolkit")
        .cloned()
        .unwrap_or_else(|| DEFAULT_TOOLKIT.to_string());
    let verbose = matches.get_flag("verbose");

    let request = match matches.subcommand() {
        Some((name, sub)) => {
            let mut request = OperationRequest::new(name);
            if let Ok(operation) = name.parse::<Operation>() {
                for spec in operation.schema().params {
                    if let Some(value) = sub.get_one::<String>(spec.name) {
                        request = request.with_param(spec.name, value.clone());
                    }
                }
            }
            request
        }
        None => OperationRequest::default(),
    };

    Invocation {
        request,
        toolkit,
        verbose,
    }
}

/// Hint printed after an argument error.
pub fn usage_hint() -> String {
    format!(
        "Run mlpipe ({}) --help for details",
        Operation::usage_list()
    )
}

/// True when clap stopped to print help or version text rather than
/// because the arguments were invalid.
pub fn is_informational(err: &clap::Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::DisplayHelp
            | ErrorKind::DisplayVersion
            | ErrorKind::DisplayHelpOnMissingArgumentOrSubcommand
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_is_well_formed() {
        command().debug_assert();
    }

    #[test]
    fn test_every_operation_is_a_subcommand() {
        let cmd = command();
        for op in Operation::ALL {
            assert!(cmd.find_subcommand(op.name()).is_some(), "{op}");
        }
    }

    #[test]
    fn test_usage_hint_lists_operations() {
        let hint = usage_hint();
        assert!(hint.contains("sequenceTrainer|parserTrainer|docTrainer"));
        assert!(hint.contains("crossdoc"));
    }
}
