//! Metrics Record - held-out scores for one (feature, family) pair

use serde::{Deserialize, Serialize};

use crate::metrics;

/// Accuracy and macro-F1 of one fitted model on its test slice.
///
/// Both values lie in `[0, 1]`. Records are written once and never mutated.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricsRecord {
    accuracy: f64,
    f1: f64,
}

impl MetricsRecord {
    /// Create a record from precomputed values.
    #[must_use]
    pub const fn new(accuracy: f64, f1: f64) -> Self {
        Self { accuracy, f1 }
    }

    /// Score predictions against the truth.
    #[must_use]
    pub fn evaluate(y_true: &[f64], y_pred: &[f64]) -> Self {
        Self {
            accuracy: metrics::accuracy(y_true, y_pred),
            f1: metrics::f1_macro(y_true, y_pred),
        }
    }

    /// Get the accuracy.
    #[must_use]
    pub const fn accuracy(&self) -> f64 {
        self.accuracy
    }

    /// Get the macro-averaged F1.
    #[must_use]
    pub const fn f1(&self) -> f64 {
        self.f1
    }
}
