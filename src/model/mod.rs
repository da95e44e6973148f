//! Classifier families
//!
//! Each family fits a one-dimensional predictor: a classifier sees exactly one
//! feature column and the label column. Labels are numeric class codes; a
//! fitted model predicts one of the class values it saw during training.
//!
//! ```rust
//! use ensemble_signal::config::TrainingConfig;
//! use ensemble_signal::model::{Classifier, Family};
//!
//! let x = [1.0, 2.0, 3.0, 10.0];
//! let y = [0.0, 0.0, 1.0, 1.0];
//! let model = Family::Ridge.fit(&TrainingConfig::default(), &x, &y)?;
//! assert_eq!(model.family(), Family::Ridge);
//! assert_eq!(model.predict(&x).len(), 4);
//! # Ok::<(), ensemble_signal::Error>(())
//! ```

mod forest;
mod logit;
mod ridge;

pub use forest::{DecisionTree, RandomForestClassifier};
pub use logit::LogisticClassifier;
pub use ridge::RidgeClassifier;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::TrainingConfig;
use crate::{Error, Result};

/// Closed set of classifier families trained per feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Family {
    /// Ridge-regression based classifier
    Ridge,
    /// L2 logistic regression
    Logit,
    /// Bagged decision trees
    Forest,
}

impl Family {
    /// Every family, in training and scoring order.
    pub const ALL: [Self; 3] = [Self::Ridge, Self::Logit, Self::Forest];

    /// Family name as used in artifact keys and summaries.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Ridge => "ridge",
            Self::Logit => "logit",
            Self::Forest => "forest",
        }
    }

    /// Fit this family on a single feature.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when `x` and `y` differ in length and
    /// `FitFailed` when the slice does not meet the family's preconditions
    pub fn fit(self, config: &TrainingConfig, x: &[f64], y: &[f64]) -> Result<Model> {
        if x.len() != y.len() {
            return Err(Error::InvalidInput(format!(
                "feature has {} rows but label has {}",
                x.len(),
                y.len()
            )));
        }
        match self {
            Self::Ridge => RidgeClassifier::fit(&config.ridge, x, y).map(Model::Ridge),
            Self::Logit => LogisticClassifier::fit(&config.logit, x, y).map(Model::Logit),
            Self::Forest => RandomForestClassifier::fit(&config.forest, x, y).map(Model::Forest),
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for Family {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ridge" => Ok(Self::Ridge),
            "logit" => Ok(Self::Logit),
            "forest" => Ok(Self::Forest),
            other => Err(Error::InvalidInput(format!("unknown model family '{other}'"))),
        }
    }
}

/// Uniform prediction interface over fitted families.
pub trait Classifier {
    /// Sorted class values seen during fitting.
    fn classes(&self) -> &[f64];

    /// Predict the class value for one observation.
    fn predict_one(&self, x: f64) -> f64;

    /// Predict the class value for every observation, in order.
    fn predict(&self, x: &[f64]) -> Vec<f64> {
        x.iter().map(|&v| self.predict_one(v)).collect()
    }
}

/// A fitted classifier tagged with its family.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "lowercase")]
pub enum Model {
    /// Fitted ridge classifier
    Ridge(RidgeClassifier),
    /// Fitted logistic regression
    Logit(LogisticClassifier),
    /// Fitted forest
    Forest(RandomForestClassifier),
}

impl Model {
    /// Family of the fitted model.
    #[must_use]
    pub const fn family(&self) -> Family {
        match self {
            Self::Ridge(_) => Family::Ridge,
            Self::Logit(_) => Family::Logit,
            Self::Forest(_) => Family::Forest,
        }
    }

    /// Serialize into artifact bytes.
    ///
    /// # Errors
    ///
    /// Returns error if JSON encoding fails
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Deserialize from artifact bytes.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the bytes are not a valid artifact
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let model: Self = serde_json::from_slice(bytes)
            .map_err(|e| Error::StorageError(format!("Corrupt model artifact: {e}")))?;
        model.validate()?;
        Ok(model)
    }

    /// Check that the model can predict without indexing out of bounds.
    ///
    /// Fitted models always pass; deserialized ones may not.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` describing the first inconsistency found
    pub fn validate(&self) -> Result<()> {
        let checked = match self {
            Self::Ridge(m) => m.validate(),
            Self::Logit(m) => m.validate(),
            Self::Forest(m) => m.validate(),
        };
        checked.map_err(|reason| {
            Error::StorageError(format!("Corrupt {} artifact: {reason}", self.family()))
        })
    }
}

impl Classifier for Model {
    fn classes(&self) -> &[f64] {
        match self {
            Self::Ridge(m) => m.classes(),
            Self::Logit(m) => m.classes(),
            Self::Forest(m) => m.classes(),
        }
    }

    fn predict_one(&self, x: f64) -> f64 {
        match self {
            Self::Ridge(m) => m.predict_one(x),
            Self::Logit(m) => m.predict_one(x),
            Self::Forest(m) => m.predict_one(x),
        }
    }
}

/// Sorted distinct class values.
pub(crate) fn distinct_classes(y: &[f64]) -> Vec<f64> {
    let mut classes = y.to_vec();
    classes.sort_by(f64::total_cmp);
    classes.dedup();
    classes
}

/// Index of `value` in the sorted class list.
pub(crate) fn class_index(classes: &[f64], value: f64) -> usize {
    classes
        .binary_search_by(|c| c.total_cmp(&value))
        .unwrap_or_else(|insert_at| insert_at.min(classes.len().saturating_sub(1)))
}

/// Index of the largest score; the first one wins ties.
pub(crate) fn argmax(scores: &[f64]) -> usize {
    let mut best = 0;
    for (i, &score) in scores.iter().enumerate().skip(1) {
        if score > scores[best] {
            best = i;
        }
    }
    best
}

/// Shape check shared by the linear families: a non-empty, strictly
/// increasing class list with one slope and one intercept per class.
pub(crate) fn check_linear_shape(
    classes: &[f64],
    coef: &[f64],
    intercept: &[f64],
) -> std::result::Result<(), String> {
    check_classes(classes)?;
    if coef.len() != classes.len() || intercept.len() != classes.len() {
        return Err(format!(
            "{} classes but {} coefficients and {} intercepts",
            classes.len(),
            coef.len(),
            intercept.len()
        ));
    }
    Ok(())
}

pub(crate) fn check_classes(classes: &[f64]) -> std::result::Result<(), String> {
    if classes.is_empty() {
        return Err("no classes".to_string());
    }
    if !classes.windows(2).all(|w| w[0] < w[1]) {
        return Err("classes are not strictly increasing".to_string());
    }
    Ok(())
}

pub(crate) fn require_classes(family: Family, classes: &[f64], minimum: usize) -> Result<()> {
    if classes.len() < minimum {
        return Err(Error::FitFailed {
            family: family.to_string(),
            reason: format!(
                "needs at least {minimum} distinct class(es), training slice has {}",
                classes.len()
            ),
        });
    }
    Ok(())
}
