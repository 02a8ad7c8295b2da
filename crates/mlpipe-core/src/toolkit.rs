//! # Toolkit Collaborators
//!
//! The statistical trainers, evaluators and cross validators live outside
//! this crate. The router only talks to them through [`Toolkit`].

use std::fmt;

use crate::acquisition::TaggerSource;
use crate::artifact::ModelArtifact;
use crate::command::{DocEvalProperties, ParsevalProperties, SequenceEvalProperties, TokEvalProperties};
use crate::error::Result;
use crate::params::TrainingParameters;
use crate::report::ReportMode;

/// Output of an evaluation or cross-validation procedure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationReport {
    /// Name of the procedure that produced the report.
    pub procedure: String,
    pub text: String,
}

impl EvaluationReport {
    pub fn new(procedure: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            procedure: procedure.into(),
            text: text.into(),
        }
    }
}

impl fmt::Display for EvaluationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

/// A sequence labeler evaluator bound to one set of properties.
pub trait SequenceEvaluator {
    /// Token accuracy only.
    fn evaluate_accuracy(&mut self) -> Result<EvaluationReport>;
    /// Overall precision, recall and F1.
    fn evaluate(&mut self) -> Result<EvaluationReport>;
    /// Per-type precision, recall and F1.
    fn detail_evaluate(&mut self) -> Result<EvaluationReport>;
    /// Listing of the misclassified sequences.
    fn eval_error(&mut self) -> Result<EvaluationReport>;
}

/// Runs the procedure named by `mode`. Exactly one procedure is invoked.
pub fn run_procedure(
    evaluator: &mut dyn SequenceEvaluator,
    mode: ReportMode,
) -> Result<EvaluationReport> {
    match mode {
        ReportMode::Accuracy => evaluator.evaluate_accuracy(),
        ReportMode::Brief => evaluator.evaluate(),
        ReportMode::Detailed => evaluator.detail_evaluate(),
        ReportMode::Error => evaluator.eval_error(),
    }
}

/// The downstream training and evaluation toolkit.
pub trait Toolkit {
    fn train_sequence_labeler(&self, params: &TrainingParameters) -> Result<ModelArtifact>;

    /// Trains a parser; `tagger` is either reused or trained as a nested step.
    fn train_parser(
        &self,
        params: &TrainingParameters,
        tagger: TaggerSource,
        chunker: &TrainingParameters,
    ) -> Result<ModelArtifact>;

    fn train_document_classifier(&self, params: &TrainingParameters) -> Result<ModelArtifact>;

    fn sequence_evaluator(
        &self,
        properties: &SequenceEvalProperties,
    ) -> Result<Box<dyn SequenceEvaluator + '_>>;

    fn evaluate_parser(&self, properties: &ParsevalProperties) -> Result<EvaluationReport>;

    fn evaluate_document_classifier(
        &self,
        properties: &DocEvalProperties,
    ) -> Result<EvaluationReport>;

    /// Tokenizer accuracy against the reference corpus.
    fn evaluate_tokenizer(&self, properties: &TokEvalProperties) -> Result<EvaluationReport>;

    fn cross_validate_sequence_labeler(
        &self,
        params: &TrainingParameters,
    ) -> Result<EvaluationReport>;

    fn cross_validate_document_classifier(
        &self,
        params: &TrainingParameters,
    ) -> Result<EvaluationReport>;
}

impl<T: Toolkit + ?Sized> Toolkit for &T {
    fn train_sequence_labeler(&self, params: &TrainingParameters) -> Result<ModelArtifact> {
        (**self).train_sequence_labeler(params)
    }

    fn train_parser(
        &self,
        params: &TrainingParameters,
        tagger: TaggerSource,
        chunker: &TrainingParameters,
    ) -> Result<ModelArtifact> {
        (**self).train_parser(params, tagger, chunker)
    }

    fn train_document_classifier(&self, params: &TrainingParameters) -> Result<ModelArtifact> {
        (**self).train_document_classifier(params)
    }

    fn sequence_evaluator(
        &self,
        properties: &SequenceEvalProperties,
    ) -> Result<Box<dyn SequenceEvaluator + '_>> {
        (**self).sequence_evaluator(properties)
    }

    fn evaluate_parser(&self, properties: &ParsevalProperties) -> Result<EvaluationReport> {
        (**self).evaluate_parser(properties)
    }

    fn evaluate_document_classifier(
        &self,
        properties: &DocEvalProperties,
    ) -> Result<EvaluationReport> {
        (**self).evaluate_document_classifier(properties)
    }

    fn evaluate_tokenizer(&self, properties: &TokEvalProperties) -> Result<EvaluationReport> {
        (**self).evaluate_tokenizer(properties)
    }

    fn cross_validate_sequence_labeler(
        &self,
        params: &TrainingParameters,
    ) -> Result<EvaluationReport> {
        (**self).cross_validate_sequence_labeler(params)
    }

    fn cross_validate_document_classifier(
        &self,
        params: &TrainingParameters,
    ) -> Result<EvaluationReport> {
        (**self).cross_validate_document_classifier(params)
    }
}
