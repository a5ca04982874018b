//! Linear classifier scorer.
//!
//! Raw score = `weights · features + intercept`, a log-odds value. The
//! logistic link lives in `rank::normalize`, not here, so the scorer stays a
//! pure margin producer like the other families.

use nalgebra::DVector;
use serde::{Deserialize, Serialize};

use crate::domain::{CustomerHistory, ModelId};
use crate::error::{RequestError, ScoreError};
use crate::models::{Scorer, latest_features};

/// Fitted parameters for the linear family, as supplied by the training
/// pipeline. Immutable after load.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearParams {
    pub weights: Vec<f64>,
    pub intercept: f64,
}

/// A loaded linear scorer.
#[derive(Debug)]
pub struct LinearScorer {
    weights: DVector<f64>,
    intercept: f64,
}

impl LinearScorer {
    pub fn new(params: LinearParams) -> Result<Self, RequestError> {
        if params.weights.is_empty() {
            return Err(RequestError::Config(
                "Linear parameters have an empty weight vector.".to_string(),
            ));
        }
        if params.weights.iter().any(|w| !w.is_finite()) || !params.intercept.is_finite() {
            return Err(RequestError::Config(
                "Linear parameters contain non-finite values.".to_string(),
            ));
        }
        Ok(Self {
            weights: DVector::from_vec(params.weights),
            intercept: params.intercept,
        })
    }

    /// Score a single feature record (dot product + intercept).
    pub fn score_record(&self, features: &[f64]) -> Result<f64, ScoreError> {
        if features.len() != self.weights.len() {
            return Err(ScoreError::SchemaMismatch {
                expected: self.weights.len(),
                got: features.len(),
            });
        }
        let x = DVector::from_column_slice(features);
        Ok(self.weights.dot(&x) + self.intercept)
    }
}

impl Scorer for LinearScorer {
    fn model_id(&self) -> ModelId {
        ModelId::Linear
    }

    fn feature_len(&self) -> usize {
        self.weights.len()
    }

    fn score(
        &self,
        history: &CustomerHistory,
        _horizon_days: Option<f64>,
    ) -> Result<f64, ScoreError> {
        let features = latest_features(history, self.weights.len())?;
        self.score_record(features)
    }
}
