//! # Training Parameters
//!
//! Loads the `key=value` settings files that drive training and cross
//! validation. The format is the classic properties layout: one entry per
//! line, `#` or `!` comments, and `=`, `:` or whitespace as the separator.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{PipelineError, Result};

/// Settings key naming the file the trained model is written to.
pub const OUTPUT_MODEL_KEY: &str = "OutputModel";

/// A mutable, ordered settings map loaded from a parameters file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TrainingParameters {
    settings: BTreeMap<String, String>,
}

impl TrainingParameters {
    /// Creates an empty settings map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the settings file at `path`.
    ///
    /// A missing file is reported as [`PipelineError::MissingFile`]; any other
    /// read failure propagates as an I/O error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::MissingFile {
                path: path.to_path_buf(),
            },
            _ => PipelineError::Io(e),
        })?;

        let params = Self::parse(&content, path)?;
        tracing::debug!(
            "Loaded {} settings from {}",
            params.settings.len(),
            path.display()
        );
        Ok(params)
    }

    /// Parses settings text. `origin` is only used in error messages.
    ///
    /// A line ending in an unescaped `\` continues on the next line, and
    /// `\=`, `\:`, `\ ` and `\uXXXX` escapes are decoded in keys and values.
    pub fn parse(content: &str, origin: &Path) -> Result<Self> {
        let mut settings = BTreeMap::new();
        let mut lines = content.lines().enumerate();

        while let Some((idx, raw)) = lines.next() {
            let mut line = raw.trim_start().to_string();
            if line.is_empty() || line.starts_with('#') || line.starts_with('!') {
                continue;
            }
            while continues(&line) {
                line.pop();
                match lines.next() {
                    Some((_, next)) => line.push_str(next.trim_start()),
                    None => break,
                }
            }

            let malformed = || PipelineError::MalformedSettings {
                path: origin.to_path_buf(),
                line: idx + 1,
                content: raw.to_string(),
            };

            let (key, rest) = split_entry(&line);
            if key.is_empty() {
                return Err(malformed());
            }

            // Separator may be padded with whitespace on either side.
            let rest = rest.trim_start();
            let value = rest.strip_prefix(['=', ':']).unwrap_or(rest).trim();

            let key = unescape(key).ok_or_else(malformed)?;
            let value = unescape(value).ok_or_else(malformed)?;
            settings.insert(key, value);
        }

        Ok(Self { settings })
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.settings.get(key).map(String::as_str)
    }

    /// Stores `value` under `key`, replacing any previous value.
    pub fn put(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.settings.insert(key.into(), value.into());
    }

    /// Number of settings.
    pub fn len(&self) -> usize {
        self.settings.len()
    }

    /// True when no settings are stored.
    pub fn is_empty(&self) -> bool {
        self.settings.is_empty()
    }
}

/// True when `line` ends in an odd number of backslashes.
fn continues(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

/// Splits at the first unescaped `=`, `:` or whitespace.
fn split_entry(line: &str) -> (&str, &str) {
    let mut escaped = false;
    for (pos, c) in line.char_indices() {
        if escaped {
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == '=' || c == ':' || c.is_whitespace() {
            return (&line[..pos], &line[pos..]);
        }
    }
    (line, "")
}

/// Decodes backslash escapes. Returns `None` on a malformed `\u` escape.
fn unescape(raw: &str) -> Option<String> {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('t') => out.push('\t'),
            Some('n') => out.push('\n'),
            Some('r') => out.push('\r'),
            Some('f') => out.push('\u{c}'),
            Some('u') => {
                let hex: String = chars.by_ref().take(4).collect();
                if hex.len() != 4 {
                    return None;
                }
                let code = u32::from_str_radix(&hex, 16).ok()?;
                out.push(char::from_u32(code)?);
            }
            Some(other) => out.push(other),
            None => {}
        }
    }
    Some(out)
}

/// A parameters file together with the path it was loaded from.
///
/// The path is needed later to derive a default output model name.
#[derive(Debug, Clone)]
pub struct LoadedParameters {
    pub source: PathBuf,
    pub params: TrainingParameters,
}

impl LoadedParameters {
    /// Loads `path` and remembers where it came from.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let source = path.as_ref().to_path_buf();
        let params = TrainingParameters::load(&source)?;
        Ok(Self { source, params })
    }
}
