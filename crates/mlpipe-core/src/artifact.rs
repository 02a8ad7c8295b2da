//! # Model Artifacts
//!
//! A trained model is opaque to the orchestrator: a byte payload produced by
//! a trainer and written once to the resolved output path.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Format tag written ahead of every model payload.
pub const FORMAT_TAG: &str = "mlpipe";

/// The family of model a trainer produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelKind {
    SequenceLabeler,
    Parser,
    DocumentClassifier,
}

/// The serialized result of a training call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelArtifact {
    kind: ModelKind,
    payload: Vec<u8>,
}

impl ModelArtifact {
    pub fn new(kind: ModelKind, payload: Vec<u8>) -> Self {
        Self { kind, payload }
    }

    pub fn kind(&self) -> ModelKind {
        self.kind
    }

    pub fn payload(&self) -> &[u8] {
        &self.payload
    }
}

/// Serializes artifacts under a fixed format tag.
#[derive(Debug, Clone)]
pub struct ModelWriter {
    tag: String,
}

impl Default for ModelWriter {
    fn default() -> Self {
        Self::new(FORMAT_TAG)
    }
}

impl ModelWriter {
    pub fn new(tag: impl Into<String>) -> Self {
        Self { tag: tag.into() }
    }

    /// Writes `artifact` to `path` as `tag NUL payload`.
    ///
    /// The bytes go to a sibling temporary file first and are renamed into
    /// place, so `path` never holds a partial model.
    pub fn write(&self, path: &Path, artifact: &ModelArtifact) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let staging = staging_path(path);
        let written = (|| -> std::io::Result<()> {
            let mut file = fs::File::create(&staging)?;
            file.write_all(self.tag.as_bytes())?;
            file.write_all(&[0])?;
            file.write_all(artifact.payload())?;
            file.sync_all()?;
            fs::rename(&staging, path)
        })();

        if let Err(e) = written {
            let _ = fs::remove_file(&staging);
            return Err(e.into());
        }

        tracing::info!(
            "Wrote {:?} model ({} bytes) to {}",
            artifact.kind(),
            artifact.payload().len(),
            path.display()
        );
        Ok(())
    }
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".partial");
    path.with_file_name(name)
}
