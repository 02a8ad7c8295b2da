//! # Configuration Resolver
//!
//! Fills in the output model path of a training configuration. A declared,
//! non-empty `OutputModel` wins; otherwise the path is derived from the name
//! of the parameters file and written back into the settings before training.

use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::params::{TrainingParameters, OUTPUT_MODEL_KEY};

/// Extension appended to derived model file names.
pub const MODEL_EXTENSION: &str = "bin";

/// Where the resolved output model path came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputSource {
    /// `OutputModel` was declared in the settings.
    Declared,
    /// Derived from the parameters file name.
    Derived,
}

/// The resolved output model path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputModel {
    pub path: PathBuf,
    pub source: OutputSource,
}

/// Resolves `OutputModel` for the settings loaded from `params_file`.
///
/// Mutates `params` only when the path has to be derived.
pub fn resolve_output_model(
    params: &mut TrainingParameters,
    params_file: &Path,
) -> Result<OutputModel> {
    match params.get(OUTPUT_MODEL_KEY) {
        Some(declared) if !declared.is_empty() => {
            let path = declared_model(params)?;
            tracing::debug!("Using declared output model {}", path.display());
            Ok(OutputModel {
                path,
                source: OutputSource::Declared,
            })
        }
        _ => {
            let path = derived_model_path(params_file)?;
            params.put(OUTPUT_MODEL_KEY, path.to_string_lossy());
            tracing::debug!(
                "No OutputModel in {}, derived {}",
                params_file.display(),
                path.display()
            );
            Ok(OutputModel {
                path,
                source: OutputSource::Derived,
            })
        }
    }
}

/// Reads a declared `OutputModel`, trimming surrounding whitespace.
pub fn declared_model(params: &TrainingParameters) -> Result<PathBuf> {
    let raw = params.get(OUTPUT_MODEL_KEY).unwrap_or_default();
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(PipelineError::InvalidOutputModel(raw.to_string()));
    }
    if trimmed.len() != raw.len() {
        tracing::warn!("Trimmed whitespace around OutputModel {raw:?}");
    }
    Ok(PathBuf::from(trimmed))
}

/// `<file stem>.bin` for a parameters file, relative to the working
/// directory. `en-ner.properties` becomes `en-ner.bin`.
pub fn derived_model_path(params_file: &Path) -> Result<PathBuf> {
    let stem = params_file
        .file_stem()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PipelineError::InvalidOutputModel(params_file.display().to_string()))?;

    let mut name = stem.to_os_string();
    name.push(".");
    name.push(MODEL_EXTENSION);
    Ok(PathBuf::from(name))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(text: &str) -> TrainingParameters {
        TrainingParameters::parse(text, Path::new("test.properties")).unwrap()
    }

    #[test]
    fn test_derives_from_file_stem() {
        let mut p = params("TrainSet=train.conll");
        let resolved = resolve_output_model(&mut p, Path::new("conf/en-ner.properties")).unwrap();

        assert_eq!(resolved.path, PathBuf::from("en-ner.bin"));
        assert_eq!(resolved.source, OutputSource::Derived);
        assert_eq!(p.get(OUTPUT_MODEL_KEY), Some("en-ner.bin"));
    }

    #[test]
    fn test_empty_output_model_is_derived() {
        let mut p = params("OutputModel=");
        let resolved = resolve_output_model(&mut p, Path::new("doc.params")).unwrap();
        assert_eq!(resolved.path, PathBuf::from("doc.bin"));
        assert_eq!(p.get(OUTPUT_MODEL_KEY), Some("doc.bin"));
    }

    #[test]
    fn test_only_last_extension_is_stripped() {
        let path = derived_model_path(Path::new("eu.pos.properties")).unwrap();
        assert_eq!(path, PathBuf::from("eu.pos.bin"));

        let path = derived_model_path(Path::new("noext")).unwrap();
        assert_eq!(path, PathBuf::from("noext.bin"));
    }

    #[test]
    fn test_declared_is_used_verbatim() {
        let mut p = params("OutputModel=models/es-nerc.bin");
        let before = p.clone();
        let resolved = resolve_output_model(&mut p, Path::new("es.properties")).unwrap();

        assert_eq!(resolved.path, PathBuf::from("models/es-nerc.bin"));
        assert_eq!(resolved.source, OutputSource::Declared);
        assert_eq!(p, before);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut p = params("Language=en");
        let first = resolve_output_model(&mut p, Path::new("en.properties")).unwrap();
        let second = resolve_output_model(&mut p, Path::new("en.properties")).unwrap();
        assert_eq!(first.path, second.path);
        assert_eq!(second.source, OutputSource::Declared);
    }

    #[test]
    fn test_whitespace_only_declared_model() {
        let mut p = TrainingParameters::new();
        p.put(OUTPUT_MODEL_KEY, "   ");
        let err = resolve_output_model(&mut p, Path::new("x.properties")).unwrap_err();
        assert!(matches!(err, PipelineError::InvalidOutputModel(_)));
    }

    #[test]
    fn test_no_file_name() {
        assert!(derived_model_path(Path::new("/")).is_err());
    }
}
