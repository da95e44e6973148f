//! Scoring Metadata - provenance written next to the signal file

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::write_pretty_json;
use crate::Result;

/// Which features voted and where their artifacts came from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringMetadata {
    features_used: Vec<String>,
    models_dir: String,
}

impl ScoringMetadata {
    /// Create metadata for a scoring run.
    #[must_use]
    pub fn new(features_used: Vec<String>, models_dir: impl Into<String>) -> Self {
        Self {
            features_used,
            models_dir: models_dir.into(),
        }
    }

    /// Features that contributed a consensus vector, in column order.
    #[must_use]
    pub fn features_used(&self) -> &[String] {
        &self.features_used
    }

    /// Model directory the artifacts were read from.
    #[must_use]
    pub fn models_dir(&self) -> &str {
        &self.models_dir
    }

    /// Write the metadata as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written
    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        write_pretty_json(path.as_ref(), self)
    }

    /// Read metadata previously written by [`ScoringMetadata::write_json`].
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        Ok(serde_json::from_str(&raw)?)
    }
}
