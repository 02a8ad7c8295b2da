//! # Operation Requests
//!
//! Raw requests arrive as an operation name plus string parameters. They are
//! checked against the [`schema`](crate::schema) once, at the boundary, and
//! turned into a typed [`Command`](crate::command::Command).

use std::collections::BTreeMap;
use std::fmt;

use crate::error::ArgumentError;
use crate::schema::{Operation, OperationSchema};

/// An operation name and the named parameters supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OperationRequest {
    pub operation: String,
    pub params: BTreeMap<String, String>,
}

impl OperationRequest {
    /// Creates a request without parameters.
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            params: BTreeMap::new(),
        }
    }

    /// Adds a parameter, replacing any previous value.
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Checks the request against its operation schema.
    ///
    /// On success every declared parameter that has a value or a default is
    /// present, choice values are in their canonical spelling, and no
    /// undeclared parameter remains.
    pub fn validate(&self) -> Result<ValidatedRequest, ArgumentError> {
        let operation: Operation = self.operation.parse()?;
        let schema = operation.schema();

        if let Some(unknown) = self.params.keys().find(|k| schema.param(k).is_none()) {
            return Err(ArgumentError::UnexpectedParameter {
                operation: operation.name().to_string(),
                param: unknown.clone(),
            });
        }

        let mut values = BTreeMap::new();
        for spec in schema.params {
            let supplied = self.params.get(spec.name).map(String::as_str);
            let value = match (supplied, spec.default) {
                (Some(v), _) => v,
                (None, Some(default)) => default,
                (None, None) if spec.required => {
                    return Err(ArgumentError::MissingParameter {
                        operation: operation.name().to_string(),
                        param: spec.name.to_string(),
                    });
                }
                (None, None) => continue,
            };

            if value.trim().is_empty() {
                return Err(ArgumentError::EmptyValue {
                    operation: operation.name().to_string(),
                    param: spec.name.to_string(),
                });
            }

            let canonical = spec
                .accept(value)
                .ok_or_else(|| ArgumentError::InvalidChoice {
                    operation: operation.name().to_string(),
                    param: spec.name.to_string(),
                    value: value.to_string(),
                    choices: spec.choices.unwrap_or_default().join("|"),
                })?;

            values.insert(spec.name, canonical.to_string());
        }

        Ok(ValidatedRequest { operation, values })
    }
}

impl fmt::Display for OperationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation)?;
        for (name, value) in &self.params {
            write!(f, " --{name}={value}")?;
        }
        Ok(())
    }
}

/// A request that passed schema validation, with defaults applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedRequest {
    operation: Operation,
    values: BTreeMap<&'static str, String>,
}

impl ValidatedRequest {
    pub fn operation(&self) -> Operation {
        self.operation
    }

    pub fn schema(&self) -> &'static OperationSchema {
        self.operation.schema()
    }

    /// Value of an optional parameter that has no default.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.values.get(name).map(String::as_str)
    }

    /// Value of a required or defaulted parameter.
    pub fn require(&self, name: &str) -> Result<&str, ArgumentError> {
        self.get(name).ok_or_else(|| ArgumentError::MissingParameter {
            operation: self.operation.name().to_string(),
            param: name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_filled() {
        let validated = OperationRequest::new("sequenceval")
            .with_param("language", "en")
            .with_param("testset", "test.conll")
            .validate()
            .unwrap();

        assert_eq!(validated.operation(), Operation::SequenceEval);
        assert_eq!(validated.get("metric"), Some("fmeasure"));
        assert_eq!(validated.get("model"), Some("off"));
        assert_eq!(validated.get("clearFeatures"), Some("no"));
        assert_eq!(validated.get("corpusFormat"), Some("conll02"));
        assert_eq!(validated.get("types"), Some("off"));
        assert_eq!(validated.get("unknownAccuracy"), Some("no"));
        assert_eq!(validated.get("evalReport"), None);
    }

    #[test]
    fn test_unknown_operation() {
        let err = OperationRequest::new("trainAll").validate().unwrap_err();
        assert!(matches!(err, ArgumentError::UnknownOperation { .. }));
    }

    #[test]
    fn test_missing_required() {
        let err = OperationRequest::new("parserTrainer")
            .with_param("params", "parse.properties")
            .with_param("taggerParams", "pos.bin")
            .validate()
            .unwrap_err();
        assert_eq!(
            err,
            ArgumentError::MissingParameter {
                operation: "parserTrainer".into(),
                param: "chunkerParams".into(),
            }
        );
    }

    #[test]
    fn test_invalid_choice() {
        let err = OperationRequest::new("sequenceval")
            .with_param("language", "en")
            .with_param("testset", "test.conll")
            .with_param("evalReport", "verbose")
            .validate()
            .unwrap_err();
        match err {
            ArgumentError::InvalidChoice { param, choices, .. } => {
                assert_eq!(param, "evalReport");
                assert_eq!(choices, "brief|detailed|error");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_choice_is_canonicalized() {
        let validated = OperationRequest::new("sequenceval")
            .with_param("language", "EN")
            .with_param("testset", "test.conll")
            .with_param("metric", "Accuracy")
            .validate()
            .unwrap();
        assert_eq!(validated.get("language"), Some("en"));
        assert_eq!(validated.get("metric"), Some("accuracy"));
    }

    #[test]
    fn test_unexpected_parameter() {
        let err = OperationRequest::new("doceval")
            .with_param("testset", "test.tsv")
            .with_param("language", "en")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ArgumentError::UnexpectedParameter { .. }));
    }

    #[test]
    fn test_empty_value() {
        let err = OperationRequest::new("docTrainer")
            .with_param("params", "  ")
            .validate()
            .unwrap_err();
        assert!(matches!(err, ArgumentError::EmptyValue { .. }));
    }

    #[test]
    fn test_display() {
        let request = OperationRequest::new("crosseq").with_param("params", "cv.properties");
        assert_eq!(request.to_string(), "crosseq --params=cv.properties");
    }
}
