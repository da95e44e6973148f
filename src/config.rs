//! Pipeline configuration
//!
//! Defaults are the production hyperparameters. Every value the trainer
//! depends on, including the forest seed, is carried here explicitly.
//!
//! ```rust
//! use ensemble_signal::config::PipelineConfig;
//!
//! let config = PipelineConfig::default();
//! assert_eq!(config.training.holdout_percent, 20);
//! assert_eq!(config.training.forest.seed, 7);
//! config.validate()?;
//! # Ok::<(), ensemble_signal::Error>(())
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// File name of the training summary inside the output directory.
pub const SUMMARY_FILE_NAME: &str = "summary.json";

/// Ridge classifier parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RidgeParams {
    /// L2 penalty strength
    pub alpha: f64,
}

impl Default for RidgeParams {
    fn default() -> Self {
        Self { alpha: 1.0 }
    }
}

/// Logistic regression parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogitParams {
    /// Inverse regularization strength
    pub c: f64,
    /// Newton iteration bound
    pub max_iter: usize,
    /// Stop once the relative objective decrease falls below this
    pub tol: f64,
}

impl Default for LogitParams {
    fn default() -> Self {
        Self {
            c: 1.0,
            max_iter: 200,
            tol: 1e-8,
        }
    }
}

/// Bagged decision-tree parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestParams {
    /// Number of trees
    pub n_trees: usize,
    /// Maximum depth of each tree (root is depth 0)
    pub max_depth: usize,
    /// Minimum samples required to split a node
    pub min_samples_split: usize,
    /// Minimum samples in each leaf
    pub min_samples_leaf: usize,
    /// Draw a bootstrap sample per tree
    pub bootstrap: bool,
    /// Base seed; tree `i` uses `seed.wrapping_add(i)`
    pub seed: u64,
}

impl Default for ForestParams {
    fn default() -> Self {
        Self {
            n_trees: 200,
            max_depth: 6,
            min_samples_split: 2,
            min_samples_leaf: 1,
            bootstrap: true,
            seed: 7,
        }
    }
}

/// Training phase configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Share of trailing rows held out for testing, in percent
    pub holdout_percent: usize,
    /// Ridge family
    pub ridge: RidgeParams,
    /// Logit family
    pub logit: LogitParams,
    /// Forest family
    pub forest: ForestParams,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            holdout_percent: 20,
            ridge: RidgeParams::default(),
            logit: LogitParams::default(),
            forest: ForestParams::default(),
        }
    }
}

/// Compression applied to artifact bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactCompression {
    /// Plain JSON on disk
    #[default]
    None,
    /// LZ4 (requires the `compression` feature)
    Lz4,
    /// ZSTD (requires the `compression` feature)
    Zstd,
}

impl ArtifactCompression {
    /// Artifact file extension used when none is configured.
    #[must_use]
    pub const fn default_extension(self) -> &'static str {
        match self {
            Self::None => "model.json",
            Self::Lz4 => "model.json.lz4",
            Self::Zstd => "model.json.zst",
        }
    }
}

/// Artifact store configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ArtifactConfig {
    /// File extension appended to `<feature>_<family>`; derived from
    /// `compression` when unset
    pub extension: Option<String>,
    /// Byte-level compression
    pub compression: ArtifactCompression,
}

impl ArtifactConfig {
    /// Extension actually used for artifact files.
    ///
    /// ```rust
    /// use ensemble_signal::config::{ArtifactCompression, ArtifactConfig};
    ///
    /// let zstd = ArtifactConfig {
    ///     compression: ArtifactCompression::Zstd,
    ///     ..ArtifactConfig::default()
    /// };
    /// assert_eq!(ArtifactConfig::default().file_extension(), "model.json");
    /// assert_eq!(zstd.file_extension(), "model.json.zst");
    /// ```
    #[must_use]
    pub fn file_extension(&self) -> &str {
        self.extension
            .as_deref()
            .unwrap_or_else(|| self.compression.default_extension())
    }
}

/// Top-level configuration shared by both commands
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Training parameters
    pub training: TrainingConfig,
    /// Artifact storage
    pub artifacts: ArtifactConfig,
}

impl PipelineConfig {
    /// Load a configuration from a JSON file. Missing fields take defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read, parsed, or fails validation
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Override the forest seed.
    #[must_use]
    pub const fn with_seed(mut self, seed: u64) -> Self {
        self.training.forest.seed = seed;
        self
    }

    /// Override the number of trees.
    #[must_use]
    pub const fn with_trees(mut self, n_trees: usize) -> Self {
        self.training.forest.n_trees = n_trees;
        self
    }

    /// Check parameter ranges.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` naming the first offending field
    pub fn validate(&self) -> Result<()> {
        let t = &self.training;
        if !(1..=99).contains(&t.holdout_percent) {
            return Err(Error::InvalidInput(format!(
                "holdout_percent must be within 1..=99, got {}",
                t.holdout_percent
            )));
        }
        if !(t.ridge.alpha > 0.0) {
            return Err(Error::InvalidInput(format!(
                "ridge.alpha must be positive, got {}",
                t.ridge.alpha
            )));
        }
        if !(t.logit.c > 0.0) {
            return Err(Error::InvalidInput(format!(
                "logit.c must be positive, got {}",
                t.logit.c
            )));
        }
        if t.logit.max_iter == 0 {
            return Err(Error::InvalidInput("logit.max_iter must be at least 1".to_string()));
        }
        if t.forest.n_trees == 0 {
            return Err(Error::InvalidInput("forest.n_trees must be at least 1".to_string()));
        }
        if t.forest.max_depth == 0 {
            return Err(Error::InvalidInput("forest.max_depth must be at least 1".to_string()));
        }
        if t.forest.min_samples_leaf == 0 || t.forest.min_samples_split < 2 {
            return Err(Error::InvalidInput(
                "forest.min_samples_leaf must be >= 1 and min_samples_split >= 2".to_string(),
            ));
        }
        if self.artifacts.extension.as_deref() == Some("") {
            return Err(Error::InvalidInput("artifacts.extension must not be empty".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_hyperparameters() {
        let config = PipelineConfig::default();
        assert_eq!(config.training.holdout_percent, 20);
        assert!((config.training.ridge.alpha - 1.0).abs() < f64::EPSILON);
        assert_eq!(config.training.logit.max_iter, 200);
        assert_eq!(config.training.forest.n_trees, 200);
        assert_eq!(config.training.forest.max_depth, 6);
        assert_eq!(config.training.forest.seed, 7);
        assert_eq!(config.artifacts.file_extension(), "model.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: PipelineConfig =
            serde_json::from_str(r#"{"training": {"forest": {"seed": 99}}}"#).unwrap();
        assert_eq!(config.training.forest.seed, 99);
        assert_eq!(config.training.forest.n_trees, 200);
        assert_eq!(config.training.holdout_percent, 20);
    }

    #[test]
    fn test_validate_rejects_bad_holdout() {
        let mut config = PipelineConfig::default();
        config.training.holdout_percent = 0;
        assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));
        config.training.holdout_percent = 100;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_empty_forest() {
        let config = PipelineConfig::default().with_trees(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_extension_follows_compression_unless_set() {
        let mut artifacts = ArtifactConfig {
            compression: ArtifactCompression::Lz4,
            ..ArtifactConfig::default()
        };
        assert_eq!(artifacts.file_extension(), "model.json.lz4");
        assert_ne!(
            artifacts.file_extension(),
            ArtifactConfig::default().file_extension()
        );

        artifacts.extension = Some("bin".to_string());
        assert_eq!(artifacts.file_extension(), "bin");

        let mut config = PipelineConfig::default();
        config.artifacts.extension = Some(String::new());
        assert!(matches!(config.validate(), Err(Error::InvalidInput(_))));
    }

    #[test]
    fn test_compression_serializes_lowercase() {
        let json = serde_json::to_string(&ArtifactCompression::Zstd).unwrap();
        assert_eq!(json, "\"zstd\"");
    }
}
