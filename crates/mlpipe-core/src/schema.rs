//! # Operation Schema
//!
//! The fixed table of recognized operations and the parameters each one
//! accepts. Both request validation and the command-line surface are derived
//! from [`OPERATIONS`], so there is a single place that declares what an
//! operation needs.

use std::fmt;
use std::str::FromStr;

use crate::error::ArgumentError;

/// Default for `--model`: evaluate with the model named in the properties.
pub const DEFAULT_EVALUATE_MODEL: &str = "off";
/// Default for `--clearFeatures` and `--unknownAccuracy`.
pub const DEFAULT_FEATURE_FLAG: &str = "no";
/// Default reference corpus format for sequence evaluation.
pub const DEFAULT_EVAL_FORMAT: &str = "conll02";
/// Default for `--types`: evaluate every sequence type.
pub const DEFAULT_SEQUENCE_TYPES: &str = "off";
/// Default evaluation metric for sequence labelers.
pub const DEFAULT_METRIC: &str = "fmeasure";

const SEQUENCE_LANGUAGES: &[&str] = &["de", "en", "es", "eu", "gl", "it", "nl"];
const PARSER_LANGUAGES: &[&str] = &["ca", "de", "en", "es", "eu", "fr", "it"];
const CLEAR_FEATURES: &[&str] = &["yes", "no", "docstart"];
const CORPUS_FORMATS: &[&str] = &["conll02", "conll03", "lemmatizer", "tabulated"];
const METRICS: &[&str] = &["accuracy", "fmeasure"];
const EVAL_REPORTS: &[&str] = &["brief", "detailed", "error"];

/// The recognized operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    SequenceTrainer,
    ParserTrainer,
    DocTrainer,
    SequenceEval,
    Parseval,
    DocEval,
    TokEval,
    CrossSequence,
    CrossDoc,
}

impl Operation {
    /// All operations in command-surface order.
    pub const ALL: [Operation; 9] = [
        Operation::SequenceTrainer,
        Operation::ParserTrainer,
        Operation::DocTrainer,
        Operation::SequenceEval,
        Operation::Parseval,
        Operation::DocEval,
        Operation::TokEval,
        Operation::CrossSequence,
        Operation::CrossDoc,
    ];

    /// The name used on the command line.
    pub fn name(self) -> &'static str {
        match self {
            Self::SequenceTrainer => "sequenceTrainer",
            Self::ParserTrainer => "parserTrainer",
            Self::DocTrainer => "docTrainer",
            Self::SequenceEval => "sequenceval",
            Self::Parseval => "parseval",
            Self::DocEval => "doceval",
            Self::TokEval => "tokeval",
            Self::CrossSequence => "crosseq",
            Self::CrossDoc => "crossdoc",
        }
    }

    /// The declared parameter schema for this operation.
    pub fn schema(self) -> &'static OperationSchema {
        OPERATIONS
            .iter()
            .find(|s| s.operation == self)
            .unwrap_or_else(|| unreachable!("every operation has a schema entry"))
    }

    /// `a|b|c` listing of every operation name, used in usage messages.
    pub fn usage_list() -> String {
        Self::ALL
            .iter()
            .map(|op| op.name())
            .collect::<Vec<_>>()
            .join("|")
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = ArgumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| ArgumentError::UnknownOperation {
                name: s.to_string(),
                expected: Self::usage_list(),
            })
    }
}

/// Declaration of a single operation parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamSpec {
    /// Long flag name, also the key in an `OperationRequest`.
    pub name: &'static str,
    pub short: Option<char>,
    pub required: bool,
    /// Closed set of accepted values, matched case-insensitively.
    pub choices: Option<&'static [&'static str]>,
    pub default: Option<&'static str>,
    pub help: &'static str,
}

impl ParamSpec {
    const fn required(name: &'static str, short: Option<char>, help: &'static str) -> Self {
        Self {
            name,
            short,
            required: true,
            choices: None,
            default: None,
            help,
        }
    }

    const fn optional(name: &'static str, short: Option<char>, help: &'static str) -> Self {
        Self {
            name,
            short,
            required: false,
            choices: None,
            default: None,
            help,
        }
    }

    const fn with_choices(mut self, choices: &'static [&'static str]) -> Self {
        self.choices = Some(choices);
        self
    }

    const fn with_default(mut self, value: &'static str) -> Self {
        self.default = Some(value);
        self
    }

    /// Returns the canonical spelling of `value` if it is an accepted choice.
    /// Parameters without a choice set accept any value unchanged.
    pub fn accept<'a>(&self, value: &'a str) -> Option<&'a str> {
        match self.choices {
            None => Some(value),
            Some(choices) => choices
                .iter()
                .copied()
                .find(|c| c.eq_ignore_ascii_case(value)),
        }
    }
}

/// An operation together with its help text and parameters.
#[derive(Debug, Clone, Copy)]
pub struct OperationSchema {
    pub operation: Operation,
    pub help: &'static str,
    pub params: &'static [ParamSpec],
}

impl OperationSchema {
    /// Looks up a parameter by its long name.
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }
}

const TESTSET: ParamSpec =
    ParamSpec::required("testset", Some('t'), "The test or reference corpus.");
const MODEL: ParamSpec = ParamSpec::optional(
    "model",
    Some('m'),
    "Pass the model to evaluate as a parameter.",
)
.with_default(DEFAULT_EVALUATE_MODEL);
const CLEAR_FEATURES_PARAM: ParamSpec = ParamSpec::optional(
    "clearFeatures",
    None,
    "Reset the adaptive features; defaults to 'no'.",
)
.with_choices(CLEAR_FEATURES)
.with_default(DEFAULT_FEATURE_FLAG);
const PARSER_LANGUAGE: ParamSpec =
    ParamSpec::required("language", Some('l'), "Choose language.").with_choices(PARSER_LANGUAGES);

/// The operation table.
pub static OPERATIONS: &[OperationSchema] = &[
    OperationSchema {
        operation: Operation::SequenceTrainer,
        help: "Sequence Labeler training CLI",
        params: &[ParamSpec::required(
            "params",
            Some('p'),
            "Load the training parameters file",
        )],
    },
    OperationSchema {
        operation: Operation::ParserTrainer,
        help: "Constituent Parser training CLI",
        params: &[
            ParamSpec::required(
                "params",
                Some('p'),
                "Load the parsing training parameters file.",
            ),
            ParamSpec::required(
                "taggerParams",
                Some('t'),
                "Load the tagger training parameters file or an already trained POS tagger model.",
            ),
            ParamSpec::required(
                "chunkerParams",
                Some('c'),
                "Load the chunker training parameters file.",
            ),
        ],
    },
    OperationSchema {
        operation: Operation::DocTrainer,
        help: "Document Classification training CLI",
        params: &[ParamSpec::required(
            "params",
            Some('p'),
            "Load the training parameters file",
        )],
    },
    OperationSchema {
        operation: Operation::SequenceEval,
        help: "Sequence Labeler Evaluation CLI",
        params: &[
            ParamSpec::optional(
                "metric",
                None,
                "Choose evaluation metric for Sequence Labeler; it defaults to fmeasure.",
            )
            .with_choices(METRICS)
            .with_default(DEFAULT_METRIC),
            ParamSpec::required("language", Some('l'), "Choose language.")
                .with_choices(SEQUENCE_LANGUAGES),
            MODEL,
            TESTSET,
            CLEAR_FEATURES_PARAM,
            ParamSpec::optional(
                "corpusFormat",
                Some('f'),
                "Choose format of reference corpus; it defaults to conll02 format.",
            )
            .with_choices(CORPUS_FORMATS)
            .with_default(DEFAULT_EVAL_FORMAT),
            ParamSpec::optional(
                "evalReport",
                None,
                "Choose level of detail of evaluation report; it defaults to detailed evaluation.",
            )
            .with_choices(EVAL_REPORTS),
            ParamSpec::optional(
                "types",
                None,
                "Choose which Sequence types used for evaluation; the argument must be a comma \
                 separated string; e.g., 'person,organization'.",
            )
            .with_default(DEFAULT_SEQUENCE_TYPES),
            ParamSpec::optional(
                "unknownAccuracy",
                Some('u'),
                "Pass the model training set to evaluate unknown and known word accuracy.",
            )
            .with_default(DEFAULT_FEATURE_FLAG),
        ],
    },
    OperationSchema {
        operation: Operation::Parseval,
        help: "Parseval CLI",
        params: &[PARSER_LANGUAGE, MODEL, TESTSET, CLEAR_FEATURES_PARAM],
    },
    OperationSchema {
        operation: Operation::DocEval,
        help: "Document Classification Evaluation CLI",
        params: &[MODEL, TESTSET, CLEAR_FEATURES_PARAM],
    },
    OperationSchema {
        operation: Operation::TokEval,
        help: "Tokenizer Evaluation CLI",
        params: &[PARSER_LANGUAGE, TESTSET],
    },
    OperationSchema {
        operation: Operation::CrossSequence,
        help: "Cross validation CLI for the Sequence Labeler",
        params: &[ParamSpec::required(
            "params",
            Some('p'),
            "Load the Cross validation parameters file",
        )],
    },
    OperationSchema {
        operation: Operation::CrossDoc,
        help: "Cross Validation CLI for the Document Classifier",
        params: &[ParamSpec::required(
            "params",
            Some('p'),
            "Load the Cross Validation parameters file for the Document Classifier",
        )],
    },
];
