//! # mlpipe Core
//!
//! Command dispatch and parameter resolution for the mlpipe toolkit: train,
//! evaluate and cross-validate sequence labelers, constituency parsers and
//! document classifiers. The statistical work itself is delegated to a
//! [`Toolkit`] implementation.
//!
//! ## Quick Start
//!
//! ```rust
//! use mlpipe_core::{select_report, EvalReport, Metric, ReportMode};
//!
//! assert_eq!(select_report(Metric::Accuracy, Some(EvalReport::Brief)), ReportMode::Accuracy);
//! assert_eq!(select_report(Metric::FMeasure, None), ReportMode::Detailed);
//! ```
pub mod acquisition;
pub mod artifact;
pub mod command;
pub mod error;
pub mod params;
pub mod report;
pub mod request;
pub mod resolver;
pub mod router;
pub mod schema;
pub mod toolkit;
pub mod types;

// Re-export primary API
pub use acquisition::{acquire_tagger, classify_tagger, PretrainedTagger, TaggerKind, TaggerSource};
pub use artifact::{ModelArtifact, ModelKind, ModelWriter, FORMAT_TAG};
pub use command::{
    properties_map, Command, DocEvalProperties, ParserTrainArgs, ParsevalProperties,
    SequenceEvalArgs, SequenceEvalProperties, TokEvalProperties,
};
pub use error::{ArgumentError, ErrorKind, PipelineError, Result};
pub use params::{LoadedParameters, TrainingParameters, OUTPUT_MODEL_KEY};
pub use report::{select_report, ReportMode};
pub use request::{OperationRequest, ValidatedRequest};
pub use resolver::{resolve_output_model, OutputModel, OutputSource, MODEL_EXTENSION};
pub use router::{Completion, OperationRouter, RouterState};
pub use schema::{Operation, OperationSchema, ParamSpec, OPERATIONS};
pub use toolkit::{run_procedure, EvaluationReport, SequenceEvaluator, Toolkit};
pub use types::{ClearFeatures, CorpusFormat, EvalReport, Language, Metric, SequenceTypes};
