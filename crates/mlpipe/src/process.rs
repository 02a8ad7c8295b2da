//! # Process Toolkit
//!
//! Runs the statistical toolkit as a child process. Each call spawns
//! `<toolkit...> <operation> [<procedure>]`, writes a JSON request to the
//! child's stdin and reads the result from its stdout: the model payload for
//! training calls, the report text otherwise.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;
use std::process::{Command, Output, Stdio};

use anyhow::{bail, Context};
use serde::Serialize;

use mlpipe_core::{
    properties_map, DocEvalProperties, EvaluationReport, ModelArtifact, ModelKind, Operation,
    ParsevalProperties, PipelineError, ReportMode, Result, SequenceEvalProperties,
    SequenceEvaluator, TaggerSource, TokEvalProperties, Toolkit, TrainingParameters,
};

#[derive(Debug, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum TaggerRequest<'a> {
    Model { path: &'a Path },
    Parameters { settings: &'a TrainingParameters },
}

#[derive(Debug, Default, Serialize)]
struct ToolkitRequest<'a> {
    operation: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    procedure: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    settings: Option<&'a TrainingParameters>,
    #[serde(skip_serializing_if = "Option::is_none")]
    properties: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tagger: Option<TaggerRequest<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    chunker: Option<&'a TrainingParameters>,
}

/// A [`Toolkit`] backed by an external executable.
#[derive(Debug, Clone)]
pub struct ProcessToolkit {
    program: String,
    args: Vec<String>,
}

impl ProcessToolkit {
    /// `command` is split on whitespace; the first word is the program.
    pub fn new(command: &str) -> Self {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words.next().unwrap_or_default();
        Self {
            program,
            args: words.collect(),
        }
    }

    fn call(&self, request: &ToolkitRequest<'_>) -> Result<Vec<u8>> {
        self.spawn(request)
            .map_err(|e| PipelineError::collaborator(request.operation, format!("{e:#}")))
    }

    fn spawn(&self, request: &ToolkitRequest<'_>) -> anyhow::Result<Vec<u8>> {
        if self.program.is_empty() {
            bail!("no toolkit command configured");
        }
        let body = serde_json::to_vec(request).context("failed to encode toolkit request")?;

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).arg(request.operation);
        if let Some(procedure) = request.procedure {
            cmd.arg(procedure);
        }
        tracing::debug!("Spawning toolkit: {cmd:?}");

        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("failed to start toolkit {:?}", self.program))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin
                .write_all(&body)
                .context("failed to send request to toolkit")?;
        }

        let Output {
            status,
            stdout,
            stderr,
        } = child
            .wait_with_output()
            .context("failed to wait for toolkit")?;

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr);
            bail!("toolkit exited with {status}: {}", stderr.trim());
        }
        Ok(stdout)
    }

    fn train(
        &self,
        operation: Operation,
        kind: ModelKind,
        params: &TrainingParameters,
    ) -> Result<ModelArtifact> {
        self.train_with(
            kind,
            ToolkitRequest {
                operation: operation.name(),
                settings: Some(params),
                ..Default::default()
            },
        )
    }

    /// Runs a training request; an empty payload is never a model.
    fn train_with(&self, kind: ModelKind, request: ToolkitRequest<'_>) -> Result<ModelArtifact> {
        let payload = self.call(&request)?;
        if payload.is_empty() {
            return Err(PipelineError::collaborator(
                request.operation,
                "toolkit returned an empty model",
            ));
        }
        Ok(ModelArtifact::new(kind, payload))
    }

    fn report(
        &self,
        operation: Operation,
        procedure: &str,
        request: ToolkitRequest<'_>,
    ) -> Result<EvaluationReport> {
        let request = ToolkitRequest {
            operation: operation.name(),
            procedure: Some(procedure),
            ..request
        };
        let stdout = self.call(&request)?;
        Ok(EvaluationReport::new(
            procedure,
            String::from_utf8_lossy(&stdout).trim_end(),
        ))
    }

    fn evaluate<T: Serialize>(
        &self,
        operation: Operation,
        procedure: &str,
        properties: &T,
    ) -> Result<EvaluationReport> {
        self.report(
            operation,
            procedure,
            ToolkitRequest {
                properties: Some(properties_map(properties)),
                ..Default::default()
            },
        )
    }
}

struct ProcessSequenceEvaluator<'a> {
    toolkit: &'a ProcessToolkit,
    properties: BTreeMap<String, String>,
}

impl ProcessSequenceEvaluator<'_> {
    fn run(&self, mode: ReportMode) -> Result<EvaluationReport> {
        self.toolkit.report(
            Operation::SequenceEval,
            mode.as_str(),
            ToolkitRequest {
                properties: Some(self.properties.clone()),
                ..Default::default()
            },
        )
    }
}

impl SequenceEvaluator for ProcessSequenceEvaluator<'_> {
    fn evaluate_accuracy(&mut self) -> Result<EvaluationReport> {
        self.run(ReportMode::Accuracy)
    }

    fn evaluate(&mut self) -> Result<EvaluationReport> {
        self.run(ReportMode::Brief)
    }

    fn detail_evaluate(&mut self) -> Result<EvaluationReport> {
        self.run(ReportMode::Detailed)
    }

    fn eval_error(&mut self) -> Result<EvaluationReport> {
        self.run(ReportMode::Error)
    }
}

impl Toolkit for ProcessToolkit {
    fn train_sequence_labeler(&self, params: &TrainingParameters) -> Result<ModelArtifact> {
        self.train(Operation::SequenceTrainer, ModelKind::SequenceLabeler, params)
    }

    fn train_parser(
        &self,
        params: &TrainingParameters,
        tagger: TaggerSource,
        chunker: &TrainingParameters,
    ) -> Result<ModelArtifact> {
        let tagger = match &tagger {
            TaggerSource::Pretrained(model) => TaggerRequest::Model { path: &model.path },
            TaggerSource::Train(settings) => TaggerRequest::Parameters { settings },
        };
        self.train_with(
            ModelKind::Parser,
            ToolkitRequest {
                operation: Operation::ParserTrainer.name(),
                settings: Some(params),
                tagger: Some(tagger),
                chunker: Some(chunker),
                ..Default::default()
            },
        )
    }

    fn train_document_classifier(&self, params: &TrainingParameters) -> Result<ModelArtifact> {
        self.train(Operation::DocTrainer, ModelKind::DocumentClassifier, params)
    }

    fn sequence_evaluator(
        &self,
        properties: &SequenceEvalProperties,
    ) -> Result<Box<dyn SequenceEvaluator + '_>> {
        Ok(Box::new(ProcessSequenceEvaluator {
            toolkit: self,
            properties: properties_map(properties),
        }))
    }

    fn evaluate_parser(&self, properties: &ParsevalProperties) -> Result<EvaluationReport> {
        self.evaluate(Operation::Parseval, "evaluate", properties)
    }

    fn evaluate_document_classifier(
        &self,
        properties: &DocEvalProperties,
    ) -> Result<EvaluationReport> {
        self.evaluate(Operation::DocEval, "evaluate", properties)
    }

    fn evaluate_tokenizer(&self, properties: &TokEvalProperties) -> Result<EvaluationReport> {
        self.evaluate(Operation::TokEval, ReportMode::Accuracy.as_str(), properties)
    }

    fn cross_validate_sequence_labeler(
        &self,
        params: &TrainingParameters,
    ) -> Result<EvaluationReport> {
        self.report(
            Operation::CrossSequence,
            "crossValidate",
            ToolkitRequest {
                settings: Some(params),
                ..Default::default()
            },
        )
    }

    fn cross_validate_document_classifier(
        &self,
        params: &TrainingParameters,
    ) -> Result<EvaluationReport> {
        self.report(
            Operation::CrossDoc,
            "crossValidate",
            ToolkitRequest {
                settings: Some(params),
                ..Default::default()
            },
        )
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use mlpipe_core::{ClearFeatures, ErrorKind, Language};

    /// A toolkit command that runs `script` through `sh`.
    fn script(dir: &Path, body: &str) -> ProcessToolkit {
        let path = dir.join("toolkit.sh");
        std::fs::write(&path, body).unwrap();
        ProcessToolkit::new(&format!("sh {}", path.display()))
    }

    fn tokeval_props() -> TokEvalProperties {
        TokEvalProperties {
            language: Language::Basque,
            testset: PathBuf::from("eu-test.txt"),
        }
    }

    #[test]
    fn test_new_splits_command() {
        let toolkit = ProcessToolkit::new("java -jar toolkit.jar");
        assert_eq!(toolkit.program, "java");
        assert_eq!(toolkit.args, vec!["-jar", "toolkit.jar"]);
    }

    #[test]
    fn test_evaluation_reads_stdout() {
        let dir = tempfile::tempdir().unwrap();
        let toolkit = script(
            dir.path(),
            "cat > \"$(dirname \"$0\")/request.json\"\necho \"$1 $2\"\n",
        );

        let report = toolkit.evaluate_tokenizer(&tokeval_props()).unwrap();
        assert_eq!(report.procedure, "accuracy");
        assert_eq!(report.text, "tokeval accuracy");

        let request = std::fs::read_to_string(dir.path().join("request.json")).unwrap();
        let request: serde_json::Value = serde_json::from_str(&request).unwrap();
        assert_eq!(request["operation"], "tokeval");
        assert_eq!(request["properties"]["language"], "eu");
        assert_eq!(request["properties"]["testset"], "eu-test.txt");
    }

    #[test]
    fn test_sequence_evaluator_names_procedure() {
        let dir = tempfile::tempdir().unwrap();
        let toolkit = script(dir.path(), "cat > /dev/null\necho \"$2\"\n");
        let props = SequenceEvalProperties {
            language: Language::English,
            model: None,
            testset: PathBuf::from("test.conll"),
            corpus_format: mlpipe_core::CorpusFormat::Conll03,
            types: mlpipe_core::SequenceTypes::All,
            clear_features: ClearFeatures::No,
            unknown_accuracy: None,
        };

        let mut evaluator = toolkit.sequence_evaluator(&props).unwrap();
        assert_eq!(evaluator.eval_error().unwrap().text, "error");
        assert_eq!(evaluator.detail_evaluate().unwrap().text, "detailed");
    }

    #[test]
    fn test_training_returns_payload() {
        let dir = tempfile::tempdir().unwrap();
        let toolkit = script(dir.path(), "cat > /dev/null\nprintf 'MODEL'\n");
        let mut params = TrainingParameters::new();
        params.put("OutputModel", "en.bin");

        let artifact = toolkit.train_document_classifier(&params).unwrap();
        assert_eq!(artifact.kind(), ModelKind::DocumentClassifier);
        assert_eq!(artifact.payload(), b"MODEL");
    }

    #[test]
    fn test_empty_model_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let toolkit = script(dir.path(), "cat > /dev/null\n");

        let err = toolkit
            .train_sequence_labeler(&TrainingParameters::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Collaborator);
    }

    #[test]
    fn test_empty_parser_model_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let toolkit = script(dir.path(), "cat > /dev/null\n");
        let tagger = TaggerSource::Train(TrainingParameters::new());

        let err = toolkit
            .train_parser(&TrainingParameters::new(), tagger, &TrainingParameters::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Collaborator);
        assert!(err.to_string().starts_with("parserTrainer failed"), "{err}");
    }

    #[test]
    fn test_parser_request_names_tagger_model() {
        let dir = tempfile::tempdir().unwrap();
        let tagger_path = dir.path().join("pos.bin");
        std::fs::write(&tagger_path, b"POS").unwrap();
        let toolkit = script(
            dir.path(),
            "cat > \"$(dirname \"$0\")/request.json\"\nprintf 'TREE'\n",
        );

        let tagger = mlpipe_core::acquire_tagger(&tagger_path).unwrap();
        let artifact = toolkit
            .train_parser(&TrainingParameters::new(), tagger, &TrainingParameters::new())
            .unwrap();
        assert_eq!(artifact.payload(), b"TREE");

        let request = std::fs::read_to_string(dir.path().join("request.json")).unwrap();
        let request: serde_json::Value = serde_json::from_str(&request).unwrap();
        assert_eq!(request["tagger"]["kind"], "model");
        assert_eq!(request["tagger"]["path"], tagger_path.to_str().unwrap());
    }

    #[test]
    fn test_failure_carries_stderr() {
        let dir = tempfile::tempdir().unwrap();
        let toolkit = script(dir.path(), "cat > /dev/null\necho 'corpus missing' >&2\nexit 3\n");

        let err = toolkit
            .cross_validate_sequence_labeler(&TrainingParameters::new())
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Collaborator);
        assert!(err.to_string().contains("corpus missing"), "{err}");
        assert!(err.to_string().starts_with("crosseq failed"), "{err}");
    }

    #[test]
    fn test_missing_program() {
        let toolkit = ProcessToolkit::new("/nonexistent/mlpipe-toolkit");
        let err = toolkit.evaluate_tokenizer(&tokeval_props()).unwrap_err();
        assert!(err.to_string().contains("failed to start toolkit"), "{err}");
    }

    #[test]
    fn test_empty_command() {
        let err = ProcessToolkit::new("  ")
            .evaluate_tokenizer(&tokeval_props())
            .unwrap_err();
        assert!(err.to_string().contains("no toolkit command configured"));
    }
}
