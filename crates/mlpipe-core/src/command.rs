//! Typed commands, one per operation, built from a validated request.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Serialize, Serializer};

use crate::error::ArgumentError;
use crate::request::ValidatedRequest;
use crate::schema::Operation;
use crate::types::{
    ClearFeatures, CorpusFormat, EvalReport, Language, Metric, SequenceTypes, OFF,
};

/// Arguments of `parserTrainer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserTrainArgs {
    pub params: PathBuf,
    /// Tagger training parameters, or an already trained tagger model.
    pub tagger: PathBuf,
    pub chunker: PathBuf,
}

/// Properties handed to the sequence labeler evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SequenceEvalProperties {
    pub language: Language,
    #[serde(serialize_with = "off_or_path")]
    pub model: Option<PathBuf>,
    pub testset: PathBuf,
    pub corpus_format: CorpusFormat,
    pub types: SequenceTypes,
    pub clear_features: ClearFeatures,
    /// Training set used to split known and unknown word accuracy.
    #[serde(serialize_with = "no_or_path")]
    pub unknown_accuracy: Option<PathBuf>,
}

/// Arguments of `sequenceval`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceEvalArgs {
    pub metric: Metric,
    pub eval_report: Option<EvalReport>,
    pub properties: SequenceEvalProperties,
}

/// Properties handed to the parser evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsevalProperties {
    pub language: Language,
    #[serde(serialize_with = "off_or_path")]
    pub model: Option<PathBuf>,
    pub testset: PathBuf,
    pub clear_features: ClearFeatures,
}

/// Properties handed to the document classifier evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DocEvalProperties {
    #[serde(serialize_with = "off_or_path")]
    pub model: Option<PathBuf>,
    pub testset: PathBuf,
    pub clear_features: ClearFeatures,
}

/// Properties handed to the tokenizer evaluator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokEvalProperties {
    pub language: Language,
    pub testset: PathBuf,
}

/// A fully typed operation ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    SequenceTrain { params: PathBuf },
    ParserTrain(ParserTrainArgs),
    DocTrain { params: PathBuf },
    SequenceEval(SequenceEvalArgs),
    Parseval(ParsevalProperties),
    DocEval(DocEvalProperties),
    TokEval(TokEvalProperties),
    CrossSequence { params: PathBuf },
    CrossDoc { params: PathBuf },
}

impl Command {
    /// Builds the typed command for a validated request.
    pub fn from_request(request: &ValidatedRequest) -> Result<Self, ArgumentError> {
        let r = Fields(request);
        let command = match request.operation() {
            Operation::SequenceTrainer => Self::SequenceTrain {
                params: r.path("params")?,
            },
            Operation::ParserTrainer => Self::ParserTrain(ParserTrainArgs {
                params: r.path("params")?,
                tagger: r.path("taggerParams")?,
                chunker: r.path("chunkerParams")?,
            }),
            Operation::DocTrainer => Self::DocTrain {
                params: r.path("params")?,
            },
            Operation::SequenceEval => Self::SequenceEval(SequenceEvalArgs {
                metric: r.choice("metric")?,
                eval_report: r.optional_choice("evalReport")?,
                properties: SequenceEvalProperties {
                    language: r.choice("language")?,
                    model: r.off_path("model", OFF)?,
                    testset: r.path("testset")?,
                    corpus_format: r.choice("corpusFormat")?,
                    types: SequenceTypes::parse(request.require("types")?),
                    clear_features: r.choice("clearFeatures")?,
                    unknown_accuracy: r.off_path("unknownAccuracy", "no")?,
                },
            }),
            Operation::Parseval => Self::Parseval(ParsevalProperties {
                language: r.choice("language")?,
                model: r.off_path("model", OFF)?,
                testset: r.path("testset")?,
                clear_features: r.choice("clearFeatures")?,
            }),
            Operation::DocEval => Self::DocEval(DocEvalProperties {
                model: r.off_path("model", OFF)?,
                testset: r.path("testset")?,
                clear_features: r.choice("clearFeatures")?,
            }),
            Operation::TokEval => Self::TokEval(TokEvalProperties {
                language: r.choice("language")?,
                testset: r.path("testset")?,
            }),
            Operation::CrossSequence => Self::CrossSequence {
                params: r.path("params")?,
            },
            Operation::CrossDoc => Self::CrossDoc {
                params: r.path("params")?,
            },
        };
        Ok(command)
    }

    /// The operation this command runs.
    pub fn operation(&self) -> Operation {
        match self {
            Self::SequenceTrain { .. } => Operation::SequenceTrainer,
            Self::ParserTrain(_) => Operation::ParserTrainer,
            Self::DocTrain { .. } => Operation::DocTrainer,
            Self::SequenceEval(_) => Operation::SequenceEval,
            Self::Parseval(_) => Operation::Parseval,
            Self::DocEval(_) => Operation::DocEval,
            Self::TokEval(_) => Operation::TokEval,
            Self::CrossSequence { .. } => Operation::CrossSequence,
            Self::CrossDoc { .. } => Operation::CrossDoc,
        }
    }
}

/// Converts any of the properties structs into the flat string map the
/// evaluators consume.
pub fn properties_map<T: Serialize>(properties: &T) -> BTreeMap<String, String> {
    match serde_json::to_value(properties) {
        Ok(serde_json::Value::Object(fields)) => fields
            .into_iter()
            .map(|(key, value)| {
                let value = match value {
                    serde_json::Value::String(s) => s,
                    other => other.to_string(),
                };
                (key, value)
            })
            .collect(),
        _ => BTreeMap::new(),
    }
}

struct Fields<'a>(&'a ValidatedRequest);

impl Fields<'_> {
    fn invalid(&self, name: &str, value: &str) -> ArgumentError {
        let spec = self.0.schema().param(name);
        ArgumentError::InvalidChoice {
            operation: self.0.operation().name().to_string(),
            param: name.to_string(),
            value: value.to_string(),
            choices: spec
                .and_then(|s| s.choices)
                .unwrap_or_default()
                .join("|"),
        }
    }

    fn path(&self, name: &str) -> Result<PathBuf, ArgumentError> {
        self.0.require(name).map(PathBuf::from)
    }

    fn choice<T: std::str::FromStr>(&self, name: &str) -> Result<T, ArgumentError> {
        let value = self.0.require(name)?;
        value.parse().map_err(|_| self.invalid(name, value))
    }

    fn optional_choice<T: std::str::FromStr>(&self, name: &str) -> Result<Option<T>, ArgumentError> {
        self.0
            .get(name)
            .map(|value| value.parse().map_err(|_| self.invalid(name, value)))
            .transpose()
    }

    /// A path flag where `unset` (matched case-insensitively) means absent.
    fn off_path(&self, name: &str, unset: &str) -> Result<Option<PathBuf>, ArgumentError> {
        let value = self.0.require(name)?;
        if value.eq_ignore_ascii_case(unset) {
            Ok(None)
        } else {
            Ok(Some(PathBuf::from(value)))
        }
    }
}

fn off_or_path<S: Serializer>(value: &Option<PathBuf>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(path) => serializer.collect_str(&path.display()),
        None => serializer.serialize_str(OFF),
    }
}

fn no_or_path<S: Serializer>(value: &Option<PathBuf>, serializer: S) -> Result<S::Ok, S::Error> {
    match value {
        Some(path) => serializer.collect_str(&path.display()),
        None => serializer.serialize_str("no"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::OperationRequest;

    fn command(request: OperationRequest) -> Command {
        Command::from_request(&request.validate().unwrap()).unwrap()
    }

    #[test]
    fn test_sequence_eval_defaults() {
        let cmd = command(
            OperationRequest::new("sequenceval")
                .with_param("language", "es")
                .with_param("testset", "es-test.conll"),
        );
        let Command::SequenceEval(args) = cmd else {
            panic!("expected sequenceval");
        };
        assert_eq!(args.metric, Metric::FMeasure);
        assert_eq!(args.eval_report, None);
        assert_eq!(args.properties.language, Language::Spanish);
        assert_eq!(args.properties.model, None);
        assert_eq!(args.properties.corpus_format, CorpusFormat::Conll02);
        assert_eq!(args.properties.types, SequenceTypes::All);
        assert_eq!(args.properties.unknown_accuracy, None);
    }

    #[test]
    fn test_sequence_eval_properties_map() {
        let cmd = command(
            OperationRequest::new("sequenceval")
                .with_param("language", "en")
                .with_param("testset", "test.conll")
                .with_param("model", "en-ner.bin")
                .with_param("types", "person,location")
                .with_param("unknownAccuracy", "train.conll")
                .with_param("evalReport", "error"),
        );
        let Command::SequenceEval(args) = cmd else {
            panic!("expected sequenceval");
        };
        assert_eq!(args.eval_report, Some(EvalReport::Error));

        let props = properties_map(&args.properties);
        assert_eq!(props["language"], "en");
        assert_eq!(props["model"], "en-ner.bin");
        assert_eq!(props["testset"], "test.conll");
        assert_eq!(props["corpusFormat"], "conll02");
        assert_eq!(props["types"], "person,location");
        assert_eq!(props["clearFeatures"], "no");
        assert_eq!(props["unknownAccuracy"], "train.conll");
        assert_eq!(props.len(), 7);
    }

    #[test]
    fn test_unset_model_serializes_as_off() {
        let cmd = command(OperationRequest::new("doceval").with_param("testset", "docs.tsv"));
        let Command::DocEval(props) = cmd else {
            panic!("expected doceval");
        };
        let map = properties_map(&props);
        assert_eq!(map["model"], "off");
        assert_eq!(map["clearFeatures"], "no");
    }

    #[test]
    fn test_parser_train_paths() {
        let cmd = command(
            OperationRequest::new("parserTrainer")
                .with_param("params", "parse.properties")
                .with_param("taggerParams", "pos.bin")
                .with_param("chunkerParams", "chunk.properties"),
        );
        assert_eq!(cmd.operation(), Operation::ParserTrainer);
        let Command::ParserTrain(args) = cmd else {
            panic!("expected parserTrainer");
        };
        assert_eq!(args.tagger, PathBuf::from("pos.bin"));
        assert_eq!(args.chunker, PathBuf::from("chunk.properties"));
    }

    #[test]
    fn test_command_operation_matches_request() {
        for (name, params) in [
            ("sequenceTrainer", vec![("params", "a.properties")]),
            ("docTrainer", vec![("params", "a.properties")]),
            ("crosseq", vec![("params", "a.properties")]),
            ("crossdoc", vec![("params", "a.properties")]),
            ("tokeval", vec![("language", "eu"), ("testset", "t.txt")]),
            ("parseval", vec![("language", "fr"), ("testset", "t.txt")]),
        ] {
            let mut request = OperationRequest::new(name);
            for (k, v) in params {
                request = request.with_param(k, v);
            }
            assert_eq!(command(request).operation().name(), name);
        }
    }
}
