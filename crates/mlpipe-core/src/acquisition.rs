//! # Tagger Acquisition
//!
//! Parser training needs a POS tagger. The tagger path either names an
//! already serialized model (reused as-is) or a training parameters file
//! (the tagger is then trained inside the parser training call). The choice
//! is made once, from the file name suffix alone.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::params::{LoadedParameters, TrainingParameters};
use crate::resolver::MODEL_EXTENSION;

/// How the tagger path should be interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaggerKind {
    /// A serialized model, recognized by its `.bin` suffix.
    Pretrained,
    /// A training parameters file.
    Parameters,
}

/// Classifies a tagger path by suffix. Never touches the file system.
pub fn classify_tagger(path: &Path) -> TaggerKind {
    let is_model = path
        .to_str()
        .map(|s| s.ends_with(&format!(".{MODEL_EXTENSION}")))
        .unwrap_or(false);

    if is_model {
        TaggerKind::Pretrained
    } else {
        TaggerKind::Parameters
    }
}

/// An opened tagger model stream.
///
/// `reader` is positioned at the start of the model for in-process trainers.
/// Toolkits that run out of process receive `path` and reopen the model
/// themselves, so for them the open stream only proves the model is readable.
pub struct PretrainedTagger {
    pub path: PathBuf,
    pub reader: BufReader<File>,
}

impl fmt::Debug for PretrainedTagger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PretrainedTagger")
            .field("path", &self.path)
            .finish_non_exhaustive()
    }
}

/// The tagger handed to the parser trainer.
#[derive(Debug)]
pub enum TaggerSource {
    /// Reuse a serialized model, no tagger training happens.
    Pretrained(PretrainedTagger),
    /// Train the tagger from these settings as a nested step.
    Train(TrainingParameters),
}

impl TaggerSource {
    pub fn kind(&self) -> TaggerKind {
        match self {
            Self::Pretrained(_) => TaggerKind::Pretrained,
            Self::Train(_) => TaggerKind::Parameters,
        }
    }
}

/// Opens or loads the tagger named by `path`.
///
/// Exactly one of the two branches runs. A `.bin` path that cannot be opened
/// or is not a regular file is a [`PipelineError::TaggerModel`]; a parameters path that cannot be
/// loaded fails with the settings loader's configuration error.
pub fn acquire_tagger(path: &Path) -> Result<TaggerSource> {
    match classify_tagger(path) {
        TaggerKind::Pretrained => {
            let tagger_error = |source| PipelineError::TaggerModel {
                path: path.to_path_buf(),
                source,
            };
            let file = File::open(path).map_err(tagger_error)?;
            if !file.metadata().map_err(tagger_error)?.is_file() {
                return Err(tagger_error(io::Error::other("not a regular file")));
            }
            tracing::info!("Using pretrained tagger model {}", path.display());
            Ok(TaggerSource::Pretrained(PretrainedTagger {
                path: path.to_path_buf(),
                reader: BufReader::new(file),
            }))
        }
        TaggerKind::Parameters => {
            let loaded = LoadedParameters::load(path)?;
            tracing::info!(
                "Tagger will be trained from parameters {}",
                path.display()
            );
            Ok(TaggerSource::Train(loaded.params))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_classify_by_suffix() {
        assert_eq!(classify_tagger(Path::new("models/pos.bin")), TaggerKind::Pretrained);
        assert_eq!(classify_tagger(Path::new("pos.properties")), TaggerKind::Parameters);
        assert_eq!(classify_tagger(Path::new("pos.bin.properties")), TaggerKind::Parameters);
        assert_eq!(classify_tagger(Path::new("posbin")), TaggerKind::Parameters);
    }

    #[test]
    fn test_pretrained_is_not_parsed_as_parameters() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagger.bin");
        // "=" alone would be a malformed settings line if it were loaded.
        std::fs::write(&path, b"=\x00\x01binary").unwrap();

        let source = acquire_tagger(&path).unwrap();
        assert_eq!(source.kind(), TaggerKind::Pretrained);
    }

    #[test]
    fn test_parameters_are_loaded() {
        let mut file = tempfile::Builder::new().suffix(".properties").tempfile().unwrap();
        writeln!(file, "Algorithm=PERCEPTRON").unwrap();

        match acquire_tagger(file.path()).unwrap() {
            TaggerSource::Train(params) => assert_eq!(params.get("Algorithm"), Some("PERCEPTRON")),
            other => panic!("expected parameters, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_pretrained_model() {
        let err = acquire_tagger(Path::new("missing/tagger.bin")).unwrap_err();
        assert!(matches!(err, PipelineError::TaggerModel { .. }));
    }

    #[test]
    fn test_directory_is_not_a_tagger_model() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tagger.bin");
        std::fs::create_dir(&path).unwrap();

        let err = acquire_tagger(&path).unwrap_err();
        assert!(matches!(err, PipelineError::TaggerModel { .. }));
        assert_eq!(err.kind(), crate::error::ErrorKind::Configuration);
    }

    #[test]
    fn test_missing_parameters_file() {
        let err = acquire_tagger(Path::new("missing/tagger.properties")).unwrap_err();
        assert!(matches!(err, PipelineError::MissingFile { .. }));
    }
}
