//! Weibull time-to-event survival scorer.
//!
//! Unlike the other families, this scorer consumes a customer's **whole
//! ordered snapshot sequence**, not just the latest record: a single-layer
//! tanh recurrence accumulates state over the snapshots (oldest first), and a
//! Weibull head maps the final hidden state to a per-customer distribution:
//!
//! ```text
//! h_t = tanh(W·x_t + U·h_{t-1} + b)
//! λ   = exp(w_λ·h_T + b_λ)        (scale, > 0)
//! k   = softplus(w_k·h_T + b_k)   (shape, > 0)
//! ```
//!
//! The raw score is the Weibull CDF at the caller's horizon (in days), which
//! is already a probability; the normalizer passes it through unchanged.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::domain::{CustomerHistory, ModelId};
use crate::error::{RequestError, ScoreError};
use crate::math::{softplus, weibull_cdf};
use crate::models::Scorer;

/// Shape floor: keeps the CDF well-defined when the softplus output underflows.
const MIN_SHAPE: f64 = 1e-6;

/// Fitted parameters for the survival family: network weights + Weibull head.
///
/// Weight matrices are row-major nested vectors so the JSON schema stays
/// obvious to the external training pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurvivalParams {
    pub n_features: usize,
    pub hidden: usize,
    /// `hidden × n_features` input weights.
    pub input_weights: Vec<Vec<f64>>,
    /// `hidden × hidden` recurrent weights.
    pub recurrent_weights: Vec<Vec<f64>>,
    /// `hidden` bias.
    pub bias: Vec<f64>,
    /// Linear head producing the (pre-exp) scale.
    pub scale_head: Vec<f64>,
    pub scale_bias: f64,
    /// Linear head producing the (pre-softplus) shape.
    pub shape_head: Vec<f64>,
    pub shape_bias: f64,
}

/// A loaded survival scorer.
#[derive(Debug)]
pub struct SurvivalScorer {
    n_features: usize,
    w_input: DMatrix<f64>,
    w_recurrent: DMatrix<f64>,
    bias: DVector<f64>,
    scale_head: DVector<f64>,
    scale_bias: f64,
    shape_head: DVector<f64>,
    shape_bias: f64,
}

impl SurvivalScorer {
    pub fn new(params: SurvivalParams) -> Result<Self, RequestError> {
        if params.n_features == 0 || params.hidden == 0 {
            return Err(RequestError::Config(
                "Survival parameters declare zero features or zero hidden units.".to_string(),
            ));
        }

        let w_input = matrix_from_rows(&params.input_weights, params.hidden, params.n_features)
            .map_err(|msg| RequestError::Config(format!("Survival input_weights: {msg}")))?;
        let w_recurrent = matrix_from_rows(&params.recurrent_weights, params.hidden, params.hidden)
            .map_err(|msg| RequestError::Config(format!("Survival recurrent_weights: {msg}")))?;
        let bias = vector_of_len(&params.bias, params.hidden)
            .map_err(|msg| RequestError::Config(format!("Survival bias: {msg}")))?;
        let scale_head = vector_of_len(&params.scale_head, params.hidden)
            .map_err(|msg| RequestError::Config(format!("Survival scale_head: {msg}")))?;
        let shape_head = vector_of_len(&params.shape_head, params.hidden)
            .map_err(|msg| RequestError::Config(format!("Survival shape_head: {msg}")))?;
        if !params.scale_bias.is_finite() || !params.shape_bias.is_finite() {
            return Err(RequestError::Config(
                "Survival head biases must be finite.".to_string(),
            ));
        }

        Ok(Self {
            n_features: params.n_features,
            w_input,
            w_recurrent,
            bias,
            scale_head,
            scale_bias: params.scale_bias,
            shape_head,
            shape_bias: params.shape_bias,
        })
    }

    /// Run the recurrence over the snapshot sequence and return the
    /// customer-specific Weibull `(shape k, scale λ)`.
    pub fn distribution(&self, history: &CustomerHistory) -> Result<(f64, f64), ScoreError> {
        if history.snapshots.is_empty() {
            return Err(ScoreError::InsufficientHistory);
        }

        let mut h = DVector::<f64>::zeros(self.bias.len());
        for record in &history.snapshots {
            if record.features.len() != self.n_features {
                return Err(ScoreError::SchemaMismatch {
                    expected: self.n_features,
                    got: record.features.len(),
                });
            }
            let x = DVector::from_column_slice(&record.features);
            h = (&self.w_input * x + &self.w_recurrent * h + &self.bias).map(f64::tanh);
        }

        let lambda = (self.scale_head.dot(&h) + self.scale_bias).exp();
        let k = softplus(self.shape_head.dot(&h) + self.shape_bias).max(MIN_SHAPE);
        Ok((k, lambda))
    }
}

impl Scorer for SurvivalScorer {
    fn model_id(&self) -> ModelId {
        ModelId::Survival
    }

    fn feature_len(&self) -> usize {
        self.n_features
    }

    fn score(
        &self,
        history: &CustomerHistory,
        horizon_days: Option<f64>,
    ) -> Result<f64, ScoreError> {
        let horizon = horizon_days.unwrap_or(f64::NAN);
        if !horizon.is_finite() || horizon <= 0.0 {
            return Err(ScoreError::InvalidHorizon(horizon));
        }
        let (k, lambda) = self.distribution(history)?;
        Ok(weibull_cdf(horizon, k, lambda))
    }
}

fn matrix_from_rows(rows: &[Vec<f64>], n_rows: usize, n_cols: usize) -> Result<DMatrix<f64>, String> {
    if rows.len() != n_rows {
        return Err(format!("expected {n_rows} rows, got {}", rows.len()));
    }
    let mut out = DMatrix::<f64>::zeros(n_rows, n_cols);
    for (i, row) in rows.iter().enumerate() {
        if row.len() != n_cols {
            return Err(format!("row {i}: expected {n_cols} columns, got {}", row.len()));
        }
        for (j, &v) in row.iter().enumerate() {
            if !v.is_finite() {
                return Err(format!("row {i}, column {j}: non-finite value"));
            }
            out[(i, j)] = v;
        }
    }
    Ok(out)
}

fn vector_of_len(values: &[f64], n: usize) -> Result<DVector<f64>, String> {
    if values.len() != n {
        return Err(format!("expected length {n}, got {}", values.len()));
    }
    if values.iter().any(|v| !v.is_finite()) {
        return Err("non-finite value".to_string());
    }
    Ok(DVector::from_column_slice(values))
}
