//! Ensemble scoring with two nested sign votes
//!
//! For each feature the available family models predict the full column; the
//! per-family predictions are averaged and reduced to their sign, giving one
//! consensus vector per feature. The consensus vectors then vote the same way
//! across features to form the final signal.
//!
//! ```text
//! f1: ridge ─┐                    f1 consensus ─┐
//!     logit ─┼─ mean → sign ──▶                 ├─ mean → sign ──▶ signal
//!     forest ┘                    f2 consensus ─┘
//! ```
//!
//! Missing artifacts are skipped. If no feature has any artifact the signal is
//! zero everywhere.

mod series;

pub use series::{SignalSeries, SIGNAL_COLUMN};

use tracing::{debug, info};

use crate::artifact::{ArtifactKey, ArtifactStore};
use crate::kv::KvStore;
use crate::model::{Classifier, Family};
use crate::summary::ScoringMetadata;
use crate::table::FeatureTable;
use crate::Result;

/// `1` for positive values, `-1` for negative values, `0` otherwise
/// (including `-0.0` and NaN).
///
/// ```rust
/// use ensemble_signal::score::sign;
///
/// assert_eq!(sign(0.4), 1);
/// assert_eq!(sign(-2.0), -1);
/// assert_eq!(sign(0.0), 0);
/// ```
#[must_use]
pub fn sign(value: f64) -> i8 {
    if value > 0.0 {
        1
    } else if value < 0.0 {
        -1
    } else {
        0
    }
}

/// Element-wise mean of `votes` reduced to its sign; `None` when there are no
/// votes.
///
/// All vote vectors are expected to have the same length; the result has the
/// length of the first one.
///
/// ```rust
/// use ensemble_signal::score::sign_vote;
///
/// let votes = [vec![1.0, 1.0, 0.0], vec![-1.0, 1.0, 0.0]];
/// assert_eq!(sign_vote(&votes), Some(vec![0, 1, 0]));
/// assert_eq!(sign_vote::<f64, Vec<f64>>(&[]), None);
/// ```
#[must_use]
pub fn sign_vote<T, V>(votes: &[V]) -> Option<Vec<i8>>
where
    T: Copy + Into<f64>,
    V: AsRef<[T]>,
{
    let len = votes.first()?.as_ref().len();
    #[allow(clippy::cast_precision_loss)]
    let count = votes.len() as f64;

    let mut column: Vec<f64> = Vec::with_capacity(votes.len());
    let signal = (0..len)
        .map(|row| {
            column.clear();
            column.extend(
                votes
                    .iter()
                    .filter_map(|v| v.as_ref().get(row).map(|&x| Into::<f64>::into(x))),
            );
            // Fixed summation order keeps the vote independent of input order.
            column.sort_by(f64::total_cmp);
            sign(column.iter().sum::<f64>() / count)
        })
        .collect();
    Some(signal)
}

/// Scores feature tables against an artifact store.
#[derive(Debug)]
pub struct Scorer<'a, S: KvStore> {
    store: &'a ArtifactStore<S>,
}

impl<'a, S: KvStore> Scorer<'a, S> {
    /// Create a scorer reading from `store`.
    #[must_use]
    pub const fn new(store: &'a ArtifactStore<S>) -> Self {
        Self { store }
    }

    /// Consensus vector of one feature, or `None` if no family artifact exists
    /// for it.
    ///
    /// # Errors
    ///
    /// Returns storage errors other than a missing artifact
    pub fn feature_consensus(&self, feature: &str, values: &[f64]) -> Result<Option<Vec<i8>>> {
        let mut predictions = Vec::with_capacity(Family::ALL.len());
        for family in Family::ALL {
            match self.store.try_get(&ArtifactKey::new(feature, family))? {
                Some(model) => predictions.push(model.predict(values)),
                None => debug!(feature, %family, "artifact absent, skipping"),
            }
        }
        Ok(sign_vote(&predictions))
    }

    /// Score every feature of `table` and vote across features.
    ///
    /// `models_dir` is recorded verbatim in the returned metadata.
    ///
    /// # Errors
    ///
    /// Returns storage errors other than a missing artifact
    pub fn score(
        &self,
        table: &FeatureTable,
        models_dir: impl Into<String>,
    ) -> Result<(SignalSeries, ScoringMetadata)> {
        let mut consensus = Vec::new();
        let mut features_used = Vec::new();
        for column in table.features() {
            if let Some(vector) = self.feature_consensus(column.name(), column.values())? {
                consensus.push(vector);
                features_used.push(column.name().to_string());
            }
        }

        let timestamps = table.timestamps().to_vec();
        let series = match sign_vote(&consensus) {
            Some(values) => SignalSeries::new(timestamps, values)?,
            None => SignalSeries::zeros(timestamps),
        };
        info!(
            rows = table.len(),
            features = table.features().len(),
            features_used = features_used.len(),
            "scored table"
        );

        Ok((series, ScoringMetadata::new(features_used, models_dir)))
    }
}
