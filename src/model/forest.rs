//! Bagged decision trees on a single feature
//!
//! Trees split on thresholds of the one feature, choosing the midpoint that
//! minimizes weighted gini impurity. Each tree is grown on a bootstrap sample
//! drawn with `ChaCha8Rng::seed_from_u64(seed + i)`, so a forest is fully
//! determined by its parameters and training data. Trees are stored as flat
//! node arrays.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{
    argmax, check_classes, class_index, distinct_classes, require_classes, Classifier, Family,
};
use crate::config::ForestParams;
use crate::Result;

/// Tree node; children are indices into the owning tree's node array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum Node {
    Leaf {
        probs: Vec<f64>,
    },
    Split {
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// A fitted classification tree over one feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Grow a tree on `(value, class index)` samples.
    fn grow(samples: &mut [(f64, usize)], n_classes: usize, params: &ForestParams) -> Self {
        let mut tree = Self { nodes: Vec::new() };
        tree.build(samples, n_classes, 0, params);
        tree
    }

    fn build(
        &mut self,
        samples: &mut [(f64, usize)],
        n_classes: usize,
        depth: usize,
        params: &ForestParams,
    ) -> usize {
        let counts = class_counts(samples, n_classes);
        let impurity = gini(&counts, samples.len());
        let index = self.nodes.len();

        let splittable = depth < params.max_depth
            && samples.len() >= params.min_samples_split
            && impurity > 0.0;
        let split = if splittable {
            best_split(samples, n_classes, impurity, params.min_samples_leaf)
        } else {
            None
        };

        let Some((position, threshold)) = split else {
            self.nodes.push(Node::Leaf {
                probs: probabilities(&counts, samples.len()),
            });
            return index;
        };

        // Reserve the slot, then fill in children.
        self.nodes.push(Node::Leaf { probs: Vec::new() });
        let (left_samples, right_samples) = samples.split_at_mut(position);
        let left = self.build(left_samples, n_classes, depth + 1, params);
        let right = self.build(right_samples, n_classes, depth + 1, params);
        self.nodes[index] = Node::Split {
            threshold,
            left,
            right,
        };
        index
    }

    /// Number of nodes.
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Depth of the tree; a single leaf has depth 0.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.depth_from(0)
    }

    fn depth_from(&self, index: usize) -> usize {
        match &self.nodes[index] {
            Node::Leaf { .. } => 0,
            Node::Split { left, right, .. } => {
                1 + self.depth_from(*left).max(self.depth_from(*right))
            }
        }
    }

    /// Every child index must point past its parent and inside the array, so
    /// a walk from the root always ends at a leaf.
    fn validate(&self, n_classes: usize) -> std::result::Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (index, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { probs } if probs.len() != n_classes => {
                    return Err(format!(
                        "leaf {index} has {} probabilities for {n_classes} classes",
                        probs.len()
                    ));
                }
                Node::Split { left, right, .. } => {
                    for child in [*left, *right] {
                        if child <= index || child >= self.nodes.len() {
                            return Err(format!("node {index} points to node {child}"));
                        }
                    }
                }
                Node::Leaf { .. } => {}
            }
        }
        Ok(())
    }

    /// Class probabilities of the leaf reached by `x`.
    #[must_use]
    pub fn predict_proba(&self, x: f64) -> &[f64] {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { probs } => return probs,
                Node::Split {
                    threshold,
                    left,
                    right,
                } => index = if x <= *threshold { *left } else { *right },
            }
        }
    }
}

/// Fitted forest of bagged decision trees for a single feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForestClassifier {
    classes: Vec<f64>,
    trees: Vec<DecisionTree>,
}

impl RandomForestClassifier {
    /// Fit on `(x, y)`.
    ///
    /// # Errors
    ///
    /// Returns `FitFailed` if the training slice is empty
    pub fn fit(params: &ForestParams, x: &[f64], y: &[f64]) -> Result<Self> {
        let classes = distinct_classes(y);
        require_classes(Family::Forest, &classes, 1)?;

        let samples: Vec<(f64, usize)> = x
            .iter()
            .zip(y)
            .map(|(&v, &label)| (v, class_index(&classes, label)))
            .collect();

        let n = samples.len();
        let mut trees = Vec::with_capacity(params.n_trees);
        for i in 0..params.n_trees {
            let mut rng = ChaCha8Rng::seed_from_u64(params.seed.wrapping_add(i as u64));
            let mut bag: Vec<(f64, usize)> = if params.bootstrap {
                (0..n).map(|_| samples[rng.gen_range(0..n)]).collect()
            } else {
                samples.clone()
            };
            trees.push(DecisionTree::grow(&mut bag, classes.len(), params));
        }

        debug!(
            trees = trees.len(),
            classes = classes.len(),
            samples = n,
            "fitted forest"
        );
        Ok(Self { classes, trees })
    }

    /// Fitted trees.
    #[must_use]
    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }

    /// Mean class probabilities across trees.
    #[must_use]
    pub fn predict_proba(&self, x: f64) -> Vec<f64> {
        let mut mean = vec![0.0; self.classes.len()];
        for tree in &self.trees {
            for (m, p) in mean.iter_mut().zip(tree.predict_proba(x)) {
                *m += p;
            }
        }
        #[allow(clippy::cast_precision_loss)]
        let n = self.trees.len() as f64;
        for m in &mut mean {
            *m /= n;
        }
        mean
    }

    pub(crate) fn validate(&self) -> std::result::Result<(), String> {
        check_classes(&self.classes)?;
        if self.trees.is_empty() {
            return Err("forest has no trees".to_string());
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(self.classes.len())
                .map_err(|reason| format!("tree {i}: {reason}"))?;
        }
        Ok(())
    }
}

impl Classifier for RandomForestClassifier {
    fn classes(&self) -> &[f64] {
        &self.classes
    }

    fn predict_one(&self, x: f64) -> f64 {
        self.classes[argmax(&self.predict_proba(x))]
    }
}

fn class_counts(samples: &[(f64, usize)], n_classes: usize) -> Vec<usize> {
    let mut counts = vec![0; n_classes];
    for &(_, class) in samples {
        counts[class] += 1;
    }
    counts
}

#[allow(clippy::cast_precision_loss)]
fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| (c as f64 / total).powi(2))
        .sum::<f64>()
}

#[allow(clippy::cast_precision_loss)]
fn probabilities(counts: &[usize], total: usize) -> Vec<f64> {
    counts
        .iter()
        .map(|&c| c as f64 / total as f64)
        .collect()
}

/// Sorts `samples` by value and returns `(left_len, threshold)` of the split
/// with the lowest weighted child impurity, if it improves on `parent`.
#[allow(clippy::cast_precision_loss)]
fn best_split(
    samples: &mut [(f64, usize)],
    n_classes: usize,
    parent: f64,
    min_leaf: usize,
) -> Option<(usize, f64)> {
    samples.sort_by(|a, b| a.0.total_cmp(&b.0));
    let n = samples.len();
    let total = class_counts(samples, n_classes);
    let mut left = vec![0; n_classes];

    let mut best: Option<(usize, f64)> = None;
    let mut best_impurity = parent;
    for position in 1..n {
        left[samples[position - 1].1] += 1;
        let (lo, hi) = (samples[position - 1].0, samples[position].0);
        if lo == hi || position < min_leaf || n - position < min_leaf {
            continue;
        }

        let right: Vec<usize> = total.iter().zip(&left).map(|(t, l)| t - l).collect();
        let weighted = (position as f64 * gini(&left, position)
            + (n - position) as f64 * gini(&right, n - position))
            / n as f64;
        if weighted < best_impurity {
            best_impurity = weighted;
            let mid = lo + (hi - lo) / 2.0;
            // Keep the threshold strictly below the right-hand value.
            let threshold = if mid >= hi { lo } else { mid };
            best = Some((position, threshold));
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    fn small_params() -> ForestParams {
        ForestParams {
            n_trees: 25,
            ..ForestParams::default()
        }
    }

    #[test]
    fn test_tree_respects_max_depth() {
        let mut samples: Vec<(f64, usize)> = (0..64)
            .map(|i| (f64::from(i), (i % 2) as usize))
            .collect();
        let params = ForestParams {
            max_depth: 3,
            ..ForestParams::default()
        };
        let tree = DecisionTree::grow(&mut samples, 2, &params);
        assert!(tree.depth() <= 3);
    }

    #[test]
    fn test_tree_validation() {
        let mut samples: Vec<(f64, usize)> = (0..16)
            .map(|i| (f64::from(i), usize::from(i >= 8)))
            .collect();
        let grown = DecisionTree::grow(&mut samples, 2, &ForestParams::default());
        assert!(grown.validate(2).is_ok());
        assert!(grown.validate(3).is_err());

        let cycle = DecisionTree {
            nodes: vec![Node::Split {
                threshold: 0.0,
                left: 0,
                right: 0,
            }],
        };
        assert!(cycle.validate(2).is_err());
        assert!(DecisionTree { nodes: Vec::new() }.validate(2).is_err());
    }

    #[test]
    fn test_tree_pure_node_is_leaf() {
        let mut samples = vec![(1.0, 0), (2.0, 0), (3.0, 0)];
        let tree = DecisionTree::grow(&mut samples, 2, &ForestParams::default());
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_proba(2.0), &[1.0, 0.0]);
    }

    #[test]
    fn test_best_split_threshold_between_classes() {
        let mut samples = vec![(3.0, 1), (1.0, 0), (4.0, 1), (2.0, 0)];
        let (position, threshold) = best_split(&mut samples, 2, 0.5, 1).unwrap();
        assert_eq!(position, 2);
        assert!((threshold - 2.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_forest_learns_threshold() {
        let x: Vec<f64> = (0..40).map(f64::from).collect();
        let y: Vec<f64> = x.iter().map(|&v| if v < 20.0 { -1.0 } else { 1.0 }).collect();
        let model = RandomForestClassifier::fit(&small_params(), &x, &y).unwrap();

        assert_eq!(model.trees().len(), 25);
        assert!((model.predict_one(2.0) - -1.0).abs() < f64::EPSILON);
        assert!((model.predict_one(38.0) - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_forest_is_deterministic_for_seed() {
        let x: Vec<f64> = (0..30).map(|i| f64::from(i * 7 % 11)).collect();
        let y: Vec<f64> = (0..30).map(|i| f64::from(i % 3) - 1.0).collect();

        let a = RandomForestClassifier::fit(&small_params(), &x, &y).unwrap();
        let b = RandomForestClassifier::fit(&small_params(), &x, &y).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_forest_single_class_is_allowed() {
        let model = RandomForestClassifier::fit(&small_params(), &[1.0, 2.0], &[1.0, 1.0]).unwrap();
        assert_eq!(model.predict(&[0.0, 5.0]), vec![1.0, 1.0]);
    }

    #[test]
    fn test_forest_requires_samples() {
        let err = RandomForestClassifier::fit(&small_params(), &[], &[]).unwrap_err();
        assert!(matches!(err, Error::FitFailed { family, .. } if family == "forest"));
    }
}
