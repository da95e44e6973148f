//! Ridge classifier
//!
//! Regresses one-vs-all `±1` targets per class on the feature with an L2
//! penalty on the slope and an unpenalized intercept, then predicts the class
//! with the largest decision value.

use serde::{Deserialize, Serialize};

use super::{
    argmax, check_linear_shape, distinct_classes, require_classes, Classifier, Family,
};
use crate::config::RidgeParams;
use crate::Result;

/// Fitted ridge classifier for a single feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RidgeClassifier {
    classes: Vec<f64>,
    coef: Vec<f64>,
    intercept: Vec<f64>,
}

impl RidgeClassifier {
    /// Fit on `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns `FitFailed` unless `y` holds at least two distinct classes
    pub fn fit(params: &RidgeParams, x: &[f64], y: &[f64]) -> Result<Self> {
        let classes = distinct_classes(y);
        require_classes(Family::Ridge, &classes, 2)?;

        #[allow(clippy::cast_precision_loss)]
        let n = x.len() as f64;
        let x_mean = x.iter().sum::<f64>() / n;
        let sxx: f64 = x.iter().map(|v| (v - x_mean).powi(2)).sum();

        let mut coef = Vec::with_capacity(classes.len());
        let mut intercept = Vec::with_capacity(classes.len());
        for &class in &classes {
            let target = |label: f64| if label == class { 1.0 } else { -1.0 };
            let t_mean = y.iter().map(|&label| target(label)).sum::<f64>() / n;
            let sxt: f64 = x
                .iter()
                .zip(y)
                .map(|(v, &label)| (v - x_mean) * (target(label) - t_mean))
                .sum();
            let w = sxt / (sxx + params.alpha);
            coef.push(w);
            intercept.push(t_mean - w * x_mean);
        }

        Ok(Self {
            classes,
            coef,
            intercept,
        })
    }

    /// Per-class decision values for one observation.
    #[must_use]
    pub fn decision_function(&self, x: f64) -> Vec<f64> {
        self.coef
            .iter()
            .zip(&self.intercept)
            .map(|(w, b)| w * x + b)
            .collect()
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        check_linear_shape(&self.classes, &self.coef, &self.intercept)
    }
}

impl Classifier for RidgeClassifier {
    fn classes(&self) -> &[f64] {
        &self.classes
    }

    fn predict_one(&self, x: f64) -> f64 {
        self.classes[argmax(&self.decision_function(x))]
    }
}
