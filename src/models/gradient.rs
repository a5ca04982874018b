//! Gradient-boosted tree ensemble scorer.
//!
//! Each tree is a flat node vector (root at index 0) routed by
//! `x[feature] < threshold`. The raw score is the sum of every tree's leaf
//! value plus `base_score`, a log-odds-like margin. Summation is
//! commutative, but trees are evaluated in the fixed order they were loaded
//! so golden-output tests stay reproducible.
//!
//! Tree structure (child indices in range, feature indices inside the fitted
//! schema, walk length bounded by node count) is validated once at load time,
//! so the per-call hot path only checks the record against the schema.

use serde::{Deserialize, Serialize};

use crate::domain::{CustomerHistory, ModelId};
use crate::error::{RequestError, ScoreError};
use crate::models::{Scorer, latest_features};

/// One node of a decision tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Node {
    Split {
        /// Index into the customer's feature vector.
        feature: usize,
        threshold: f64,
        /// Child taken when `x[feature] < threshold`.
        left: usize,
        /// Child taken otherwise.
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// A single fitted decision tree. Node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Route a feature vector from the root to a leaf value.
    ///
    /// The walk is bounded by the node count; structure validation at load
    /// time guarantees it terminates within that bound.
    fn evaluate(&self, features: &[f64]) -> f64 {
        let mut idx = 0usize;
        for _ in 0..self.nodes.len() {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if features[*feature] < *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
        // Unreachable for validated trees; a cycle would have been rejected
        // at load.
        0.0
    }
}

/// Fitted parameters for the gradient-ensemble family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientParams {
    /// Trees in training order; evaluation preserves this order.
    pub trees: Vec<Tree>,
    /// Margin offset added to the summed leaf values.
    pub base_score: f64,
    /// Feature vector length the ensemble was fitted against.
    pub n_features: usize,
}

/// A loaded gradient-ensemble scorer.
#[derive(Debug)]
pub struct GradientScorer {
    params: GradientParams,
}

impl GradientScorer {
    pub fn new(params: GradientParams) -> Result<Self, RequestError> {
        if params.n_features == 0 {
            return Err(RequestError::Config(
                "Gradient parameters declare zero features.".to_string(),
            ));
        }
        if params.trees.is_empty() {
            return Err(RequestError::Config(
                "Gradient parameters contain no trees.".to_string(),
            ));
        }
        if !params.base_score.is_finite() {
            return Err(RequestError::Config(
                "Gradient base_score is non-finite.".to_string(),
            ));
        }
        for (t, tree) in params.trees.iter().enumerate() {
            validate_tree(tree, params.n_features)
                .map_err(|msg| RequestError::Config(format!("Tree {t}: {msg}")))?;
        }
        Ok(Self { params })
    }

    /// Score a single feature record (Σ leaf values + base_score).
    pub fn score_record(&self, features: &[f64]) -> Result<f64, ScoreError> {
        if features.len() != self.params.n_features {
            return Err(ScoreError::SchemaMismatch {
                expected: self.params.n_features,
                got: features.len(),
            });
        }
        let mut margin = self.params.base_score;
        for tree in &self.params.trees {
            margin += tree.evaluate(features);
        }
        Ok(margin)
    }
}

impl Scorer for GradientScorer {
    fn model_id(&self) -> ModelId {
        ModelId::GradientEnsemble
    }

    fn feature_len(&self) -> usize {
        self.params.n_features
    }

    fn score(
        &self,
        history: &CustomerHistory,
        _horizon_days: Option<f64>,
    ) -> Result<f64, ScoreError> {
        let features = latest_features(history, self.params.n_features)?;
        self.score_record(features)
    }
}

/// Check one tree's structural invariants.
///
/// - at least one node, root at index 0
/// - split children in range and strictly forward (acyclic by construction)
/// - split feature indices resolve against the declared schema
/// - leaf values and thresholds finite
fn validate_tree(tree: &Tree, n_features: usize) -> Result<(), String> {
    if tree.nodes.is_empty() {
        return Err("empty node list".to_string());
    }
    for (i, node) in tree.nodes.iter().enumerate() {
        match node {
            Node::Leaf { value } => {
                if !value.is_finite() {
                    return Err(format!("node {i}: non-finite leaf value"));
                }
            }
            Node::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if *feature >= n_features {
                    return Err(format!(
                        "node {i}: split feature {feature} outside schema of {n_features}"
                    ));
                }
                if !threshold.is_finite() {
                    return Err(format!("node {i}: non-finite threshold"));
                }
                if *left >= tree.nodes.len() || *right >= tree.nodes.len() {
                    return Err(format!("node {i}: child index out of range"));
                }
                if *left <= i || *right <= i {
                    return Err(format!("node {i}: child index not strictly forward"));
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::FeatureRecord;

    fn history(id: &str, features: Vec<f64>) -> CustomerHistory {
        CustomerHistory::from_record(FeatureRecord {
            customer_id: id.to_string(),
            features,
            snapshot_date: None,
        })
    }

    /// A stump: one split on `feature`, leaves `(lo, hi)`.
    fn stump(feature: usize, threshold: f64, lo: f64, hi: f64) -> Tree {
        Tree {
            nodes: vec![
                Node::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                Node::Leaf { value: lo },
                Node::Leaf { value: hi },
            ],
        }
    }

    #[test]
    fn sums_leaf_values_plus_base_score() {
        let scorer = GradientScorer::new(GradientParams {
            trees: vec![stump(0, 0.5, -1.0, 1.0), stump(1, 10.0, 0.25, 0.75)],
            base_score: 0.1,
            n_features: 2,
        })
        .unwrap();

        // x0=0.9 -> right (1.0); x1=3.0 -> left (0.25); + base 0.1
        let raw = scorer.score(&history("C", vec![0.9, 3.0]), None).unwrap();
        assert!((raw - 1.35).abs() < 1e-12);

        // x0=0.1 -> left (-1.0); x1=12.0 -> right (0.75); + base 0.1
        let raw = scorer.score(&history("C", vec![0.1, 12.0]), None).unwrap();
        assert!((raw - (-0.15)).abs() < 1e-12);
    }

    #[test]
    fn deeper_tree_routes_to_correct_leaf() {
        let tree = Tree {
            nodes: vec![
                Node::Split { feature: 0, threshold: 0.0, left: 1, right: 2 },
                Node::Leaf { value: -2.0 },
                Node::Split { feature: 1, threshold: 5.0, left: 3, right: 4 },
                Node::Leaf { value: 3.0 },
                Node::Leaf { value: 7.0 },
            ],
        };
        let scorer = GradientScorer::new(GradientParams {
            trees: vec![tree],
            base_score: 0.0,
            n_features: 2,
        })
        .unwrap();

        assert_eq!(scorer.score(&history("C", vec![-1.0, 0.0]), None).unwrap(), -2.0);
        assert_eq!(scorer.score(&history("C", vec![1.0, 4.0]), None).unwrap(), 3.0);
        assert_eq!(scorer.score(&history("C", vec![1.0, 6.0]), None).unwrap(), 7.0);
    }

    #[test]
    fn wrong_vector_length_is_schema_mismatch() {
        let scorer = GradientScorer::new(GradientParams {
            trees: vec![stump(0, 0.0, 0.0, 1.0)],
            base_score: 0.0,
            n_features: 3,
        })
        .unwrap();

        let err = scorer.score(&history("C", vec![1.0]), None).unwrap_err();
        assert_eq!(err, ScoreError::SchemaMismatch { expected: 3, got: 1 });
    }

    #[test]
    fn split_feature_outside_schema_rejected_at_load() {
        let err = GradientScorer::new(GradientParams {
            trees: vec![stump(5, 0.0, 0.0, 1.0)],
            base_score: 0.0,
            n_features: 2,
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn backward_child_index_rejected_at_load() {
        let tree = Tree {
            nodes: vec![
                Node::Split { feature: 0, threshold: 0.0, left: 1, right: 0 },
                Node::Leaf { value: 1.0 },
            ],
        };
        let err = GradientScorer::new(GradientParams {
            trees: vec![tree],
            base_score: 0.0,
            n_features: 1,
        })
        .unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }
}
