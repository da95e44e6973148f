//! Per-feature training
//!
//! Every feature column is trained on its own: the `(feature, label)` pairs are
//! cut positionally into a leading training slice and a trailing test slice,
//! each family is fitted on the training slice, scored on the test slice, and
//! persisted. Rows are never shuffled; the tail of the series is always the
//! test set.
//!
//! ```rust
//! use ensemble_signal::artifact::ArtifactStore;
//! use ensemble_signal::config::TrainingConfig;
//! use ensemble_signal::kv::MemoryKvStore;
//! use ensemble_signal::table::{FeatureColumn, FeatureTable};
//! use ensemble_signal::train::Trainer;
//!
//! let table = FeatureTable::from_columns(
//!     (0..10).map(|i| format!("t{i}")).collect(),
//!     Some((0..10).map(|i| f64::from(i >= 5)).collect()),
//!     vec![FeatureColumn::new("f1", (0..10).map(f64::from).collect())],
//! )?;
//! let store = ArtifactStore::new(MemoryKvStore::new());
//! let mut config = TrainingConfig::default();
//! config.forest.n_trees = 10;
//!
//! let summary = Trainer::new(config).train_table(&table, &store)?;
//! assert_eq!(summary.len(), 3);
//! # Ok::<(), ensemble_signal::Error>(())
//! ```

use tracing::{debug, info, warn};

use crate::artifact::{ArtifactKey, ArtifactStore};
use crate::config::TrainingConfig;
use crate::kv::KvStore;
use crate::model::{Classifier, Family, Model};
use crate::summary::{MetricsRecord, TrainingSummary};
use crate::table::FeatureTable;
use crate::{Error, Result};

/// Length of the leading training slice for `rows` rows when
/// `holdout_percent` of them are held out: `rows * (100 - holdout) / 100`,
/// rounded down.
///
/// ```rust
/// use ensemble_signal::train::temporal_split;
///
/// assert_eq!(temporal_split(10, 20), 8);
/// assert_eq!(temporal_split(4, 20), 3);
/// assert_eq!(temporal_split(0, 20), 0);
/// ```
#[must_use]
pub const fn temporal_split(rows: usize, holdout_percent: usize) -> usize {
    let keep = 100usize.saturating_sub(holdout_percent);
    rows.saturating_mul(keep) / 100
}

/// A family fitted on one feature together with its held-out metrics.
#[derive(Debug, Clone, PartialEq)]
pub struct TrainedModel {
    /// Fitted model
    pub model: Model,
    /// Test-slice metrics
    pub metrics: MetricsRecord,
}

/// Fits every family on every feature column.
#[derive(Debug, Clone, Default)]
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    /// Create a trainer with explicit parameters.
    #[must_use]
    pub const fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Training parameters.
    #[must_use]
    pub const fn config(&self) -> &TrainingConfig {
        &self.config
    }

    /// Fit all families on a single feature.
    ///
    /// Families whose fitting preconditions are not met on the training slice
    /// are skipped with a warning and left out of the result.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if `values` and `labels` differ in length
    pub fn train_feature(
        &self,
        feature: &str,
        values: &[f64],
        labels: &[f64],
    ) -> Result<Vec<(Family, TrainedModel)>> {
        if values.len() != labels.len() {
            return Err(Error::InvalidInput(format!(
                "feature '{feature}' has {} rows but label has {}",
                values.len(),
                labels.len()
            )));
        }

        let cut = temporal_split(values.len(), self.config.holdout_percent);
        let (x_train, x_test) = values.split_at(cut);
        let (y_train, y_test) = labels.split_at(cut);
        debug!(feature, train = cut, test = x_test.len(), "split feature");

        let mut trained = Vec::with_capacity(Family::ALL.len());
        for family in Family::ALL {
            let model = match family.fit(&self.config, x_train, y_train) {
                Ok(model) => model,
                Err(Error::FitFailed { reason, .. }) => {
                    warn!(feature, %family, %reason, "skipping family");
                    continue;
                }
                Err(e) => return Err(e),
            };
            let metrics = MetricsRecord::evaluate(y_test, &model.predict(x_test));
            debug!(
                feature,
                %family,
                accuracy = metrics.accuracy(),
                f1 = metrics.f1(),
                "fitted"
            );
            trained.push((family, TrainedModel { model, metrics }));
        }
        Ok(trained)
    }

    /// Train every feature of `table`, persist the models and return the
    /// metrics summary.
    ///
    /// # Errors
    ///
    /// Returns `MissingColumn("label")` before any fitting if the table has no
    /// labels, `InvalidInput` before any fitting if a feature name cannot be
    /// stored as an artifact, or any storage error raised while persisting
    pub fn train_table<S: KvStore>(
        &self,
        table: &FeatureTable,
        store: &ArtifactStore<S>,
    ) -> Result<TrainingSummary> {
        let labels = table.require_labels()?;
        for column in table.features() {
            for family in Family::ALL {
                store.check_key(&ArtifactKey::new(column.name(), family))?;
            }
        }
        info!(
            rows = table.len(),
            features = table.features().len(),
            train_rows = temporal_split(table.len(), self.config.holdout_percent),
            "training per-feature models"
        );

        let mut summary = TrainingSummary::new();
        for column in table.features() {
            let trained = self.train_feature(column.name(), column.values(), labels)?;
            for (family, TrainedModel { model, metrics }) in trained {
                store.put(&ArtifactKey::new(column.name(), family), &model)?;
                summary.record(column.name(), family, metrics);
            }
        }

        info!(artifacts = summary.len(), "training complete");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kv::{FsKvStore, MemoryKvStore};
    use crate::table::FeatureColumn;

    fn quick_config() -> TrainingConfig {
        let mut config = TrainingConfig::default();
        config.forest.n_trees = 10;
        config
    }

    fn table(labels: Option<Vec<f64>>, features: Vec<FeatureColumn>) -> FeatureTable {
        let rows = features.first().map_or(0, |c| c.values().len());
        FeatureTable::from_columns((0..rows).map(|i| i.to_string()).collect(), labels, features)
            .unwrap()
    }

    #[test]
    fn test_temporal_split_floor() {
        assert_eq!(temporal_split(5, 20), 4);
        assert_eq!(temporal_split(7, 20), 5);
        assert_eq!(temporal_split(1, 20), 0);
        assert_eq!(temporal_split(100, 30), 70);
    }

    #[test]
    fn test_train_feature_all_families() {
        let x: Vec<f64> = (0..20).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|&v| f64::from(u8::from(v >= 8.0))).collect();
        let trained = Trainer::new(quick_config()).train_feature("f1", &x, &y).unwrap();

        let families: Vec<Family> = trained.iter().map(|(f, _)| *f).collect();
        assert_eq!(families, Family::ALL);
        for (_, t) in &trained {
            assert!((0.0..=1.0).contains(&t.metrics.accuracy()));
            assert!((0.0..=1.0).contains(&t.metrics.f1()));
        }
    }

    #[test]
    fn test_single_class_training_slice_keeps_forest_only() {
        // Training slice (first 8 rows) has one class; the tail has another.
        let x: Vec<f64> = (0..10).map(f64::from).collect();
        let y = [0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 1.0, 1.0];
        let trained = Trainer::new(quick_config()).train_feature("f1", &x, &y).unwrap();
        assert_eq!(trained.len(), 1);
        assert_eq!(trained[0].0, Family::Forest);
    }

    #[test]
    fn test_train_table_requires_labels() {
        let t = table(None, vec![FeatureColumn::new("f1", vec![1.0, 2.0])]);
        let store = ArtifactStore::new(MemoryKvStore::new());
        let err = Trainer::new(quick_config()).train_table(&t, &store).unwrap_err();
        assert!(matches!(err, Error::MissingColumn(c) if c == "label"));
        assert!(store.inner().is_empty());
    }

    #[test]
    fn test_train_table_rejects_unstorable_feature_before_fitting() {
        let dir = tempfile::tempdir().unwrap();
        let t = table(
            Some(vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0]),
            vec![
                FeatureColumn::new("ok", (0..6).map(f64::from).collect()),
                FeatureColumn::new("ret/vol", (0..6).map(f64::from).collect()),
            ],
        );
        let store = ArtifactStore::new(FsKvStore::new(dir.path().join("models"), "model.json"));

        let err = Trainer::new(quick_config()).train_table(&t, &store).unwrap_err();
        assert!(matches!(err, Error::InvalidInput(_)));
        assert!(!dir.path().join("models").exists());
    }

    #[test]
    fn test_train_table_persists_every_trained_pair() {
        let t = table(
            Some(vec![0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 1.0]),
            vec![
                FeatureColumn::new("a", (0..10).map(f64::from).collect()),
                FeatureColumn::new("b", (0..10).map(|i| f64::from(i % 2)).collect()),
            ],
        );
        let store = ArtifactStore::new(MemoryKvStore::new());
        let summary = Trainer::new(quick_config()).train_table(&t, &store).unwrap();

        assert_eq!(summary.len(), 6);
        assert_eq!(store.inner().len(), 6);
        assert!(store.exists(&ArtifactKey::new("b", Family::Logit)).unwrap());
        assert_eq!(summary.feature_names().collect::<Vec<_>>(), ["a", "b"]);
    }
}
