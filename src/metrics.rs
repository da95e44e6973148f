//! Classification metrics for held-out evaluation
//!
//! Labels are compared exactly: predictions are always one of the class
//! values seen in training, so no tolerance is involved.

/// Fraction of predictions equal to the truth; `0.0` for empty input.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn accuracy(y_true: &[f64], y_pred: &[f64]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| t.total_cmp(p).is_eq())
        .count();
    correct as f64 / y_true.len() as f64
}

/// Unweighted mean of per-class F1 over every class present in either the
/// truth or the predictions. A class with no true or predicted positives
/// scores `0.0`. Empty input scores `0.0`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn f1_macro(y_true: &[f64], y_pred: &[f64]) -> f64 {
    let mut labels: Vec<f64> = y_true.iter().chain(y_pred).copied().collect();
    labels.sort_by(f64::total_cmp);
    labels.dedup_by(|a, b| a.total_cmp(b).is_eq());
    if labels.is_empty() {
        return 0.0;
    }

    let total: f64 = labels
        .iter()
        .map(|&label| {
            let is = |v: &f64| v.total_cmp(&label).is_eq();
            let mut tp = 0usize;
            let mut fp = 0usize;
            let mut fn_ = 0usize;
            for (t, p) in y_true.iter().zip(y_pred) {
                match (is(t), is(p)) {
                    (true, true) => tp += 1,
                    (false, true) => fp += 1,
                    (true, false) => fn_ += 1,
                    (false, false) => {}
                }
            }
            let denom = 2 * tp + fp + fn_;
            if denom == 0 {
                0.0
            } else {
                (2 * tp) as f64 / denom as f64
            }
        })
        .sum();
    total / labels.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy_counts_matches() {
        assert!((accuracy(&[0.0, 1.0, 1.0, 0.0], &[0.0, 1.0, 0.0, 0.0]) - 0.75).abs() < 1e-12);
        assert!(accuracy(&[], &[]).abs() < f64::EPSILON);
    }

    #[test]
    fn test_f1_macro_perfect() {
        let y = [-1.0, 0.0, 1.0, 1.0];
        assert!((f1_macro(&y, &y) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_f1_macro_binary_example() {
        // class 0: tp=1 fp=1 fn=1 -> 0.5; class 1: tp=1 fp=1 fn=1 -> 0.5
        let y_true = [0.0, 0.0, 1.0, 1.0];
        let y_pred = [0.0, 1.0, 0.0, 1.0];
        assert!((f1_macro(&y_true, &y_pred) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_f1_macro_counts_predicted_only_class() {
        // class 1 never true -> f1 0; class 0: tp=1 fn=1 -> 2/3
        let y_true = [0.0, 0.0];
        let y_pred = [0.0, 1.0];
        assert!((f1_macro(&y_true, &y_pred) - (2.0 / 3.0) / 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_metrics_stay_in_unit_interval() {
        let y_true = [1.0, -1.0, 0.0, 1.0, -1.0];
        let y_pred = [-1.0, -1.0, 1.0, 0.0, 0.0];
        for value in [accuracy(&y_true, &y_pred), f1_macro(&y_true, &y_pred)] {
            assert!((0.0..=1.0).contains(&value));
        }
    }
}
