//! # Operation Router
//!
//! Validates a request, resolves its configuration, picks the tagger and
//! report strategies, and calls the matching [`Toolkit`] collaborator. Each
//! operation is an independent branch; nothing is shared between them beyond
//! the resolver and strategy functions.

use std::fmt;
use std::path::{Path, PathBuf};

use crate::acquisition::acquire_tagger;
use crate::artifact::{ModelArtifact, ModelWriter};
use crate::command::{Command, ParserTrainArgs, SequenceEvalArgs};
use crate::error::Result;
use crate::params::{LoadedParameters, TrainingParameters};
use crate::report::select_report;
use crate::request::OperationRequest;
use crate::resolver::{resolve_output_model, OutputSource};
use crate::schema::Operation;
use crate::toolkit::{run_procedure, EvaluationReport, Toolkit};

/// Lifecycle of a single invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    Idle,
    Dispatching(Operation),
    Succeeded,
    Failed,
}

impl RouterState {
    /// Exit status for terminal states.
    pub fn exit_code(self) -> Option<i32> {
        match self {
            Self::Succeeded => Some(0),
            Self::Failed => Some(1),
            Self::Idle | Self::Dispatching(_) => None,
        }
    }
}

/// What a successful operation produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    /// A model was trained and written.
    Model { path: PathBuf, source: OutputSource },
    /// An evaluation or cross-validation report.
    Report(EvaluationReport),
}

impl fmt::Display for Completion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Model { path, .. } => write!(f, "Model saved to {}", path.display()),
            Self::Report(report) => write!(f, "{report}"),
        }
    }
}

/// Dispatches one operation against a toolkit.
///
/// A router serves a single invocation; dispatching again starts over from
/// [`RouterState::Idle`].
pub struct OperationRouter<T> {
    toolkit: T,
    writer: ModelWriter,
    output_root: Option<PathBuf>,
    state: RouterState,
}

impl<T: Toolkit> OperationRouter<T> {
    pub fn new(toolkit: T) -> Self {
        Self {
            toolkit,
            writer: ModelWriter::default(),
            output_root: None,
            state: RouterState::Idle,
        }
    }

    /// Resolves relative output model paths against `root` instead of the
    /// current directory.
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = Some(root.into());
        self
    }

    pub fn state(&self) -> RouterState {
        self.state
    }

    /// Validates and runs `request`.
    pub fn dispatch(&mut self, request: &OperationRequest) -> Result<Completion> {
        self.state = RouterState::Idle;
        tracing::info!("CLI options: {request}");

        let command = match request
            .validate()
            .and_then(|validated| Command::from_request(&validated))
        {
            Ok(command) => command,
            Err(e) => {
                self.state = RouterState::Failed;
                return Err(e.into());
            }
        };

        self.execute(command)
    }

    /// Runs an already typed command.
    pub fn execute(&mut self, command: Command) -> Result<Completion> {
        let operation = command.operation();
        self.state = RouterState::Dispatching(operation);
        tracing::debug!("Dispatching {operation}");

        let result = self.run(command);
        self.state = match &result {
            Ok(_) => RouterState::Succeeded,
            Err(e) => {
                tracing::error!("{operation} failed: {e}");
                RouterState::Failed
            }
        };
        result
    }

    fn run(&self, command: Command) -> Result<Completion> {
        match command {
            Command::SequenceTrain { params } => {
                self.train(&params, |p| self.toolkit.train_sequence_labeler(p))
            }
            Command::ParserTrain(args) => self.train_parser(args),
            Command::DocTrain { params } => {
                self.train(&params, |p| self.toolkit.train_document_classifier(p))
            }
            Command::SequenceEval(args) => self.sequence_eval(args),
            Command::Parseval(props) => self.toolkit.evaluate_parser(&props).map(Completion::Report),
            Command::DocEval(props) => self
                .toolkit
                .evaluate_document_classifier(&props)
                .map(Completion::Report),
            Command::TokEval(props) => self
                .toolkit
                .evaluate_tokenizer(&props)
                .map(Completion::Report),
            Command::CrossSequence { params } => {
                let loaded = LoadedParameters::load(&params)?;
                self.toolkit
                    .cross_validate_sequence_labeler(&loaded.params)
                    .map(Completion::Report)
            }
            Command::CrossDoc { params } => {
                let loaded = LoadedParameters::load(&params)?;
                self.toolkit
                    .cross_validate_document_classifier(&loaded.params)
                    .map(Completion::Report)
            }
        }
    }

    /// Shared shape of the single-model training branches.
    fn train<F>(&self, params_file: &Path, trainer: F) -> Result<Completion>
    where
        F: FnOnce(&TrainingParameters) -> Result<ModelArtifact>,
    {
        let LoadedParameters { source, mut params } = LoadedParameters::load(params_file)?;
        let output = resolve_output_model(&mut params, &source)?;

        let artifact = trainer(&params)?;
        self.persist(output.path, output.source, &artifact)
    }

    fn train_parser(&self, args: ParserTrainArgs) -> Result<Completion> {
        let LoadedParameters { source, mut params } = LoadedParameters::load(&args.params)?;
        let chunker = LoadedParameters::load(&args.chunker)?.params;
        let output = resolve_output_model(&mut params, &source)?;

        let tagger = acquire_tagger(&args.tagger)?;
        let artifact = self.toolkit.train_parser(&params, tagger, &chunker)?;
        self.persist(output.path, output.source, &artifact)
    }

    fn sequence_eval(&self, args: SequenceEvalArgs) -> Result<Completion> {
        let mode = select_report(args.metric, args.eval_report);
        tracing::debug!("Selected {mode} report");

        let mut evaluator = self.toolkit.sequence_evaluator(&args.properties)?;
        run_procedure(evaluator.as_mut(), mode).map(Completion::Report)
    }

    fn persist(
        &self,
        path: PathBuf,
        source: OutputSource,
        artifact: &ModelArtifact,
    ) -> Result<Completion> {
        let path = match &self.output_root {
            Some(root) if path.is_relative() => root.join(path),
            _ => path,
        };
        self.writer.write(&path, artifact)?;
        Ok(Completion::Model { path, source })
    }
}
