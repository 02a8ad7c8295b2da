use std::path::PathBuf;

use thiserror::Error;

/// Invalid or missing command-line parameters.
///
/// These are caught at the command surface and never reach a collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArgumentError {
    /// The operation name is not one of the recognized operations.
    #[error("unknown operation {name:?}; expected one of {expected}")]
    UnknownOperation {
        /// The name that was requested.
        name: String,
        /// `|`-separated list of valid operation names.
        expected: String,
    },

    /// A required parameter was not supplied.
    #[error("{operation}: missing required parameter --{param}")]
    MissingParameter { operation: String, param: String },

    /// A parameter is not declared for this operation.
    #[error("{operation}: unexpected parameter --{param}")]
    UnexpectedParameter { operation: String, param: String },

    /// A parameter value is outside its declared choice set.
    #[error("{operation}: invalid value {value:?} for --{param}; choose from {choices}")]
    InvalidChoice {
        operation: String,
        param: String,
        value: String,
        choices: String,
    },

    /// A parameter was supplied with an empty value.
    #[error("{operation}: parameter --{param} must not be empty")]
    EmptyValue { operation: String, param: String },
}

/// Errors that can occur while resolving and dispatching an operation.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The request did not pass validation.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// A referenced settings or model file does not exist.
    #[error("file not found: {}", path.display())]
    MissingFile { path: PathBuf },

    /// A settings file contains a line that is not a `key=value` pair.
    #[error("malformed settings in {} at line {line}: {content:?}", path.display())]
    MalformedSettings {
        path: PathBuf,
        line: usize,
        content: String,
    },

    /// The tagger component could not be opened as a serialized model.
    #[error("cannot open tagger model {}: {source}", path.display())]
    TaggerModel {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration resolved to an unusable output path.
    #[error("invalid output model path: {0:?}")]
    InvalidOutputModel(String),

    /// The training, evaluation or cross-validation collaborator failed.
    #[error("{operation} failed: {message}")]
    Collaborator { operation: String, message: String },

    /// Underlying I/O error not covered above.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of [`PipelineError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Argument,
    Configuration,
    Collaborator,
}

impl PipelineError {
    /// Creates a collaborator error for the named operation.
    pub fn collaborator(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Collaborator {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Returns the error class this error belongs to.
    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Argument(_) => ErrorKind::Argument,
            Self::MissingFile { .. }
            | Self::MalformedSettings { .. }
            | Self::TaggerModel { .. }
            | Self::InvalidOutputModel(_)
            | Self::Io(_) => ErrorKind::Configuration,
            Self::Collaborator { .. } => ErrorKind::Collaborator,
        }
    }

    /// Process exit status for this error. Every failure maps to 1.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        1
    }
}

/// Result type alias for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
