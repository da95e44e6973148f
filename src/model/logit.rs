//! Multinomial logistic regression with an L2 penalty
//!
//! Minimizes `sum_i -log p(y_i | x_i) + ||w||^2 / (2C)` over one slope and one
//! intercept per class using damped Newton steps, each solved by Cholesky
//! decomposition of the Hessian. The iteration count is
//! bounded by `max_iter`; running out of iterations keeps the last iterate and
//! logs a warning.

use ndarray::{s, Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::{
    argmax, check_linear_shape, class_index, distinct_classes, require_classes, Classifier,
    Family,
};
use crate::config::LogitParams;
use crate::{Error, Result};

/// Keeps the Hessian invertible along the softmax shift direction of the intercepts.
const INTERCEPT_JITTER: f64 = 1e-10;

/// Diagonal loads tried in turn until the Newton system factors.
const DAMPING: [f64; 5] = [0.0, 1e-8, 1e-6, 1e-4, 1e-2];

/// Fitted logistic regression for a single feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticClassifier {
    classes: Vec<f64>,
    coef: Vec<f64>,
    intercept: Vec<f64>,
    n_iter: usize,
}

impl LogisticClassifier {
    /// Fit on `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns `FitFailed` unless `y` holds at least two distinct classes, or
    /// if the Newton system cannot be factored
    pub fn fit(params: &LogitParams, x: &[f64], y: &[f64]) -> Result<Self> {
        let classes = distinct_classes(y);
        require_classes(Family::Logit, &classes, 2)?;

        let k = classes.len();
        let targets: Vec<usize> = y.iter().map(|&label| class_index(&classes, label)).collect();
        let penalty = 1.0 / params.c;

        // theta = [w_0..w_{k-1}, b_0..b_{k-1}]
        let mut theta = Array1::<f64>::zeros(2 * k);
        let mut loss = objective(&theta, x, &targets, penalty);
        let mut n_iter = 0;
        let mut converged = false;

        while n_iter < params.max_iter {
            n_iter += 1;
            let (grad, hess) = gradient_and_hessian(&theta, x, &targets, penalty);
            let step = newton_step(&hess, &grad).ok_or_else(|| Error::FitFailed {
                family: Family::Logit.to_string(),
                reason: "Newton system is not positive definite".to_string(),
            })?;

            // Backtrack until the objective stops increasing.
            let mut scale = 1.0;
            let mut candidate = theta.clone();
            let mut candidate_loss = loss;
            for _ in 0..40 {
                candidate = &theta - &(&step * scale);
                candidate_loss = objective(&candidate, x, &targets, penalty);
                if candidate_loss <= loss {
                    break;
                }
                scale *= 0.5;
            }
            if candidate_loss.is_nan() || candidate_loss > loss {
                converged = true;
                break;
            }

            center_intercepts(&mut candidate);
            let decrease = loss - candidate_loss;
            theta = candidate;
            loss = candidate_loss;
            if decrease <= params.tol * loss.abs().max(1.0) {
                converged = true;
                break;
            }
        }

        if !converged {
            warn!(
                max_iter = params.max_iter,
                "logistic regression did not converge; keeping last iterate"
            );
        }

        Ok(Self {
            classes,
            coef: theta.slice(s![..k]).to_vec(),
            intercept: theta.slice(s![k..]).to_vec(),
            n_iter,
        })
    }

    /// Number of Newton iterations performed.
    #[must_use]
    pub const fn n_iter(&self) -> usize {
        self.n_iter
    }

    /// Class probabilities for one observation.
    #[must_use]
    pub fn predict_proba(&self, x: f64) -> Vec<f64> {
        softmax(&self.decision_function(x)).to_vec()
    }

    fn decision_function(&self, x: f64) -> Array1<f64> {
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

impl Classifier for LogisticClassifier {
    fn classes(&self) -> &[f64] {
        &self.classes
    }

    fn predict_one(&self, x: f64) -> f64 {
        self.classes[argmax(&self.decision_function(x).to_vec())]
    }
}

/// Softmax is invariant to a common intercept shift; pin the mean at zero.
fn center_intercepts(theta: &mut Array1<f64>) {
    let k = theta.len() / 2;
    let mut intercepts = theta.slice_mut(s![k..]);
    let mean = intercepts.mean().unwrap_or(0.0);
    intercepts -= mean;
}

fn logits(theta: &Array1<f64>, x: f64) -> Array1<f64> {
    let k = theta.len() / 2;
    &theta.slice(s![..k]) * x + &theta.slice(s![k..])
}

fn softmax(logits: &Array1<f64>) -> Array1<f64> {
    let max = logits.fold(f64::NEG_INFINITY, |m, &z| m.max(z));
    let exps = logits.mapv(|z| (z - max).exp());
    let sum = exps.sum();
    exps / sum
}

fn objective(theta: &Array1<f64>, x: &[f64], targets: &[usize], penalty: f64) -> f64 {
    let k = theta.len() / 2;
    let data: f64 = x
        .iter()
        .zip(targets)
        .map(|(&xi, &t)| {
            let z = logits(theta, xi);
            let max = z.fold(f64::NEG_INFINITY, |m, &v| m.max(v));
            let log_sum = z.mapv(|v| (v - max).exp()).sum().ln() + max;
            log_sum - z[t]
        })
        .sum();
    let w = theta.slice(s![..k]);
    data + w.dot(&w) * penalty / 2.0
}

fn gradient_and_hessian(
    theta: &Array1<f64>,
    x: &[f64],
    targets: &[usize],
    penalty: f64,
) -> (Array1<f64>, Array2<f64>) {
    let k = theta.len() / 2;
    let mut grad = Array1::<f64>::zeros(2 * k);
    let mut hess = Array2::<f64>::zeros((2 * k, 2 * k));

    for (&xi, &t) in x.iter().zip(targets) {
        let p = softmax(&logits(theta, xi));
        for a in 0..k {
            let residual = p[a] - if a == t { 1.0 } else { 0.0 };
            grad[a] += residual * xi;
            grad[k + a] += residual;
            for b in 0..k {
                let w = p[a] * (if a == b { 1.0 } else { 0.0 } - p[b]);
                hess[[a, b]] += w * xi * xi;
                hess[[a, k + b]] += w * xi;
                hess[[k + a, b]] += w * xi;
                hess[[k + a, k + b]] += w;
            }
        }
    }

    for a in 0..k {
        grad[a] += penalty * theta[a];
        hess[[a, a]] += penalty;
        hess[[k + a, k + a]] += INTERCEPT_JITTER;
    }
    (grad, hess)
}

/// Newton direction `H^-1 g`, loading the diagonal until `H` factors.
fn newton_step(hess: &Array2<f64>, grad: &Array1<f64>) -> Option<Array1<f64>> {
    DAMPING.iter().find_map(|&damping| {
        let mut damped = hess.clone();
        damped.diag_mut().mapv_inplace(|d| d + damping);
        cholesky_solve(&damped, grad)
    })
}

/// Solve `a x = b` for symmetric `a` by Cholesky decomposition `a = L L^T`.
///
/// Returns `None` when `a` is not positive definite.
fn cholesky_solve(a: &Array2<f64>, b: &Array1<f64>) -> Option<Array1<f64>> {
    let n = a.nrows();
    let mut l = Array2::<f64>::zeros((n, n));
    for i in 0..n {
        for j in 0..=i {
            let sum: f64 = (0..j).map(|m| l[[i, m]] * l[[j, m]]).sum();
            if i == j {
                let diag = a[[i, i]] - sum;
                if diag <= 0.0 || !diag.is_finite() {
                    return None;
                }
                l[[i, j]] = diag.sqrt();
            } else {
                l[[i, j]] = (a[[i, j]] - sum) / l[[j, j]];
            }
        }
    }

    // L z = b
    let mut z = Array1::<f64>::zeros(n);
    for i in 0..n {
        let sum: f64 = (0..i).map(|j| l[[i, j]] * z[j]).sum();
        z[i] = (b[i] - sum) / l[[i, i]];
    }

    // L^T x = z
    let mut x = Array1::<f64>::zeros(n);
    for i in (0..n).rev() {
        let sum: f64 = (i + 1..n).map(|j| l[[j, i]] * x[j]).sum();
        x[i] = (z[i] - sum) / l[[i, i]];
    }
    x.iter().all(|v| v.is_finite()).then_some(x)
}
