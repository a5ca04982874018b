//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory during scoring and ranking
//! - exported to JSON/CSV
//! - reloaded later for comparisons across model families

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};

/// Scores closer than this are treated as a tie and ordered by ascending
/// customer id instead of by score.
///
/// This is an explicit configuration constant, overridable per run via the
/// `--tie-epsilon` flag.
pub const TIE_EPSILON: f64 = 1e-9;

/// Identifier of a fitted model family in the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum ModelId {
    /// Linear classifier (weights + intercept → log-odds).
    Linear,
    /// Gradient-boosted tree ensemble (summed leaf values → margin).
    #[value(name = "gradient_ensemble")]
    GradientEnsemble,
    /// Weibull time-to-event sequence model (probability at horizon).
    Survival,
}

impl ModelId {
    pub const ALL: [ModelId; 3] = [
        ModelId::Linear,
        ModelId::GradientEnsemble,
        ModelId::Survival,
    ];

    /// Human-readable label for terminal output.
    pub fn display_name(self) -> &'static str {
        match self {
            ModelId::Linear => "linear",
            ModelId::GradientEnsemble => "gradient_ensemble",
            ModelId::Survival => "survival",
        }
    }

    /// File stem used by `ModelRegistry::from_dir` (`<stem>.json`).
    pub fn file_stem(self) -> &'static str {
        self.display_name()
    }
}

impl std::fmt::Display for ModelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

/// One customer's engineered feature vector at a snapshot time.
///
/// Invariant: `features` length and order must match the schema the chosen
/// scorer was fitted against. Mismatches are a hard `SchemaMismatch`, never
/// silently padded or truncated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub customer_id: String,
    /// Fixed-length, ordered numeric features (post-encoding).
    pub features: Vec<f64>,
    /// When the features were snapshotted (optional for single-snapshot use).
    pub snapshot_date: Option<NaiveDate>,
}

/// A customer's ordered snapshot history (oldest first).
///
/// The linear and gradient-ensemble scorers consume only the latest snapshot;
/// the survival scorer consumes the whole sequence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerHistory {
    pub customer_id: String,
    pub snapshots: Vec<FeatureRecord>,
}

impl CustomerHistory {
    /// Wrap a single record as a one-snapshot history.
    pub fn from_record(record: FeatureRecord) -> Self {
        Self {
            customer_id: record.customer_id.clone(),
            snapshots: vec![record],
        }
    }

    /// The most recent snapshot, if any.
    pub fn latest(&self) -> Option<&FeatureRecord> {
        self.snapshots.last()
    }
}

/// One row of the ranked output. Rank positions are 1-based.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    pub customer_id: String,
    /// Normalized propensity score in [0, 1].
    pub score: f64,
    pub rank: usize,
}

/// The caller's ranking request, validated before any scoring work begins.
#[derive(Debug, Clone)]
pub struct RankRequest {
    pub model: ModelId,
    /// Number of top customers to return. Must be > 0.
    pub top_k: usize,
    /// Horizon in **days**. Required by the survival model, ignored by the
    /// other families.
    pub horizon_days: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_returns_newest_snapshot() {
        let history = CustomerHistory {
            customer_id: "C1".to_string(),
            snapshots: vec![
                FeatureRecord {
                    customer_id: "C1".to_string(),
                    features: vec![1.0],
                    snapshot_date: NaiveDate::from_ymd_opt(2025, 1, 1),
                },
                FeatureRecord {
                    customer_id: "C1".to_string(),
                    features: vec![2.0],
                    snapshot_date: NaiveDate::from_ymd_opt(2025, 2, 1),
                },
            ],
        };
        assert_eq!(history.latest().unwrap().features, vec![2.0]);
    }

    #[test]
    fn model_id_display_matches_request_contract() {
        assert_eq!(ModelId::Linear.to_string(), "linear");
        assert_eq!(ModelId::GradientEnsemble.to_string(), "gradient_ensemble");
        assert_eq!(ModelId::Survival.to_string(), "survival");
    }
}
