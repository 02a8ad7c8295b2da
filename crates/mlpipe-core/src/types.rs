//! Typed values for the enumerated command parameters.

use std::fmt;
use std::str::FromStr;

use serde::{Serialize, Serializer};

/// Generates a closed, case-insensitively parsed enum over fixed spellings.
macro_rules! choice_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($variant:ident => $text:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// The canonical spelling.
            pub fn as_str(self) -> &'static str {
                match self {
                    $(Self::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                $(
                    if s.eq_ignore_ascii_case($text) {
                        return Ok(Self::$variant);
                    }
                )+
                Err(format!("unrecognized {}: {s:?}", stringify!($name)))
            }
        }

        impl Serialize for $name {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_str())
            }
        }
    };
}

choice_enum! {
    /// Language of the evaluated model and reference corpus.
    pub enum Language {
        Catalan => "ca",
        German => "de",
        English => "en",
        Spanish => "es",
        Basque => "eu",
        French => "fr",
        Galician => "gl",
        Italian => "it",
        Dutch => "nl",
    }
}

choice_enum! {
    /// Sequence labeler evaluation metric.
    pub enum Metric {
        Accuracy => "accuracy",
        FMeasure => "fmeasure",
    }
}

choice_enum! {
    /// Requested level of detail for a sequence labeler report.
    pub enum EvalReport {
        Brief => "brief",
        Detailed => "detailed",
        Error => "error",
    }
}

choice_enum! {
    /// Whether adaptive features are reset during evaluation.
    pub enum ClearFeatures {
        Yes => "yes",
        No => "no",
        DocStart => "docstart",
    }
}

choice_enum! {
    /// Format of the reference corpus.
    pub enum CorpusFormat {
        Conll02 => "conll02",
        Conll03 => "conll03",
        Lemmatizer => "lemmatizer",
        Tabulated => "tabulated",
    }
}

/// Sentinel meaning "not set" for path-like evaluation flags.
pub const OFF: &str = "off";

/// Sequence types considered during evaluation.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SequenceTypes {
    /// Every type present in the reference corpus.
    #[default]
    All,
    /// Only the listed types, e.g. `person,organization`.
    Only(Vec<String>),
}

impl SequenceTypes {
    /// Parses the comma separated `--types` value; `off` selects all types.
    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case(OFF) {
            return Self::All;
        }
        let types: Vec<String> = value
            .split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        if types.is_empty() {
            Self::All
        } else {
            Self::Only(types)
        }
    }
}

impl fmt::Display for SequenceTypes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(OFF),
            Self::Only(types) => f.write_str(&types.join(",")),
        }
    }
}

impl Serialize for SequenceTypes {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}
