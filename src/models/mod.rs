//! The `Scorer` capability and its three concrete model families.
//!
//! The original system dispatched on model choice with loosely-typed
//! branching; here every family implements one explicit trait and is selected
//! through the registry, so call sites never branch on family themselves.
//!
//! Input contracts differ by family and are part of the trait docs:
//!
//! - linear / gradient-ensemble: score the customer's **latest** snapshot
//! - survival: accumulate state over the **whole ordered snapshot sequence**
//!   and require a horizon

pub mod gradient;
pub mod linear;
pub mod survival;

pub use gradient::{GradientParams, GradientScorer, Node, Tree};
pub use linear::{LinearParams, LinearScorer};
pub use survival::{SurvivalParams, SurvivalScorer};

use serde::{Deserialize, Serialize};

use crate::domain::{CustomerHistory, ModelId};
use crate::error::{RequestError, ScoreError};

/// A loaded predictive model that turns one customer's history into a raw,
/// family-specific score.
///
/// Raw output scales are incomparable across families (log-odds, margin,
/// probability at horizon); `rank::normalize` maps them onto a common [0, 1]
/// propensity scale.
///
/// Scoring is a pure function of the history and the immutable fitted
/// parameters, so one scorer may serve many customers concurrently with no
/// coordination beyond read-only sharing.
pub trait Scorer: std::fmt::Debug + Send + Sync {
    /// Which family this scorer belongs to.
    fn model_id(&self) -> ModelId;

    /// Feature vector length this scorer was fitted against.
    fn feature_len(&self) -> usize;

    /// Score one customer.
    ///
    /// `horizon_days` is required by the survival family and ignored by the
    /// others. The linear and gradient families read only
    /// `history.latest()`; the survival family consumes every snapshot in
    /// order.
    fn score(
        &self,
        history: &CustomerHistory,
        horizon_days: Option<f64>,
    ) -> Result<f64, ScoreError>;
}

/// On-disk fitted-parameter document, tagged by model family.
///
/// One JSON file per family, produced by the external training pipeline
/// (or `ipr gen` for synthetic runs) and loaded once at registry init.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ParamsFile {
    Linear(LinearParams),
    GradientEnsemble(GradientParams),
    Survival(SurvivalParams),
}

impl ParamsFile {
    pub fn model_id(&self) -> ModelId {
        match self {
            ParamsFile::Linear(_) => ModelId::Linear,
            ParamsFile::GradientEnsemble(_) => ModelId::GradientEnsemble,
            ParamsFile::Survival(_) => ModelId::Survival,
        }
    }

    /// Validate and turn the document into a ready-to-serve scorer.
    pub fn into_scorer(self) -> Result<Box<dyn Scorer>, RequestError> {
        match self {
            ParamsFile::Linear(p) => Ok(Box::new(LinearScorer::new(p)?)),
            ParamsFile::GradientEnsemble(p) => Ok(Box::new(GradientScorer::new(p)?)),
            ParamsFile::Survival(p) => Ok(Box::new(SurvivalScorer::new(p)?)),
        }
    }
}

/// Latest-snapshot accessor shared by the single-record families.
pub(crate) fn latest_features<'a>(
    history: &'a CustomerHistory,
    expected: usize,
) -> Result<&'a [f64], ScoreError> {
    let record = history
        .latest()
        .ok_or(ScoreError::InsufficientHistory)?;
    if record.features.len() != expected {
        return Err(ScoreError::SchemaMismatch {
            expected,
            got: record.features.len(),
        });
    }
    Ok(&record.features)
}
