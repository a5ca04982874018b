//! Seeded synthetic customers and fitted parameters.
//!
//! The real system receives feature vectors from an external feature pipeline
//! and fitted parameters from an external training pipeline. For local runs,
//! demos, and end-to-end tests we generate both deterministically from a
//! seed: same seed, same population, same parameters, same ranking.

use chrono::{Duration, NaiveDate};
use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::{CustomerHistory, FeatureRecord};
use crate::error::RequestError;
use crate::models::{
    GradientParams, LinearParams, Node, ParamsFile, SurvivalParams, Tree,
};

/// Snapshot spacing for synthetic histories.
const SNAPSHOT_INTERVAL_DAYS: i64 = 30;

/// Fixed as-of date so synthetic outputs are stable across wall-clock time.
fn synthetic_asof() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 30).expect("valid literal date")
}

/// Settings for synthetic generation.
#[derive(Debug, Clone)]
pub struct SyntheticSpec {
    pub seed: u64,
    pub customers: usize,
    pub n_features: usize,
    /// Snapshots per customer (the survival scorer needs ≥ 1).
    pub snapshots: usize,
}

impl SyntheticSpec {
    fn validate(&self) -> Result<(), RequestError> {
        if self.customers == 0 {
            return Err(RequestError::Config("Customer count must be > 0.".to_string()));
        }
        if self.n_features == 0 {
            return Err(RequestError::Config("Feature count must be > 0.".to_string()));
        }
        if self.snapshots == 0 {
            return Err(RequestError::Config("Snapshot count must be > 0.".to_string()));
        }
        Ok(())
    }
}

/// Generate a synthetic population of customer histories.
///
/// Ids are zero-padded (`CUST-0001`, ...) so the ascending-id tie-break is
/// also the generation order. Snapshots run oldest → newest, 30 days apart,
/// ending at the fixed as-of date.
pub fn generate_population(spec: &SyntheticSpec) -> Result<Vec<CustomerHistory>, RequestError> {
    spec.validate()?;

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let noise = Normal::new(0.0, 1.0)
        .map_err(|e| RequestError::Config(format!("Noise distribution error: {e}")))?;
    let asof = synthetic_asof();

    let mut population = Vec::with_capacity(spec.customers);
    for c in 0..spec.customers {
        let customer_id = format!("CUST-{:04}", c + 1);

        // Per-customer base level plus a random walk across snapshots, so
        // histories look like slowly drifting engineered features.
        let base: Vec<f64> = (0..spec.n_features).map(|_| noise.sample(&mut rng)).collect();

        let mut snapshots = Vec::with_capacity(spec.snapshots);
        let mut drift = vec![0.0f64; spec.n_features];
        for s in 0..spec.snapshots {
            for d in drift.iter_mut() {
                *d += 0.15 * noise.sample(&mut rng);
            }
            let features: Vec<f64> = base.iter().zip(&drift).map(|(b, d)| b + d).collect();
            let age = (spec.snapshots - 1 - s) as i64 * SNAPSHOT_INTERVAL_DAYS;
            snapshots.push(FeatureRecord {
                customer_id: customer_id.clone(),
                features,
                snapshot_date: Some(asof - Duration::days(age)),
            });
        }

        population.push(CustomerHistory {
            customer_id,
            snapshots,
        });
    }
    Ok(population)
}

/// Generate one synthetic fitted-parameter document per model family,
/// mutually consistent on `n_features`.
pub fn generate_params(spec: &SyntheticSpec) -> Result<Vec<ParamsFile>, RequestError> {
    spec.validate()?;

    // Independent stream from the population so regenerating one does not
    // shift the other.
    let mut rng = StdRng::seed_from_u64(spec.seed ^ 0x9e37_79b9_7f4a_7c15);
    let coef = Normal::new(0.0, 0.5)
        .map_err(|e| RequestError::Config(format!("Coefficient distribution error: {e}")))?;

    let linear = LinearParams {
        weights: (0..spec.n_features).map(|_| coef.sample(&mut rng)).collect(),
        intercept: coef.sample(&mut rng),
    };

    // One stump per feature plus a second pass with shifted thresholds.
    let mut trees = Vec::with_capacity(spec.n_features * 2);
    for pass in 0..2 {
        for feature in 0..spec.n_features {
            let threshold = coef.sample(&mut rng) + if pass == 0 { 0.0 } else { 0.5 };
            let lo = coef.sample(&mut rng) * 0.4;
            let hi = coef.sample(&mut rng) * 0.4;
            trees.push(Tree {
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
            });
        }
    }
    let gradient = GradientParams {
        trees,
        base_score: coef.sample(&mut rng) * 0.2,
        n_features: spec.n_features,
    };

    let hidden = 4usize;
    let mut matrix = |rows: usize, cols: usize| -> Vec<Vec<f64>> {
        (0..rows)
            .map(|_| (0..cols).map(|_| 0.3 * coef.sample(&mut rng)).collect())
            .collect()
    };
    let input_weights = matrix(hidden, spec.n_features);
    let recurrent_weights = matrix(hidden, hidden);
    let survival = SurvivalParams {
        n_features: spec.n_features,
        hidden,
        input_weights,
        recurrent_weights,
        bias: (0..hidden).map(|_| 0.1 * coef.sample(&mut rng)).collect(),
        scale_head: (0..hidden).map(|_| coef.sample(&mut rng)).collect(),
        // exp(5.2) ≈ 180 days: event times land on a realistic scale for
        // day-denominated horizons.
        scale_bias: 5.2,
        shape_head: (0..hidden).map(|_| 0.3 * coef.sample(&mut rng)).collect(),
        shape_bias: 0.6,
    };

    Ok(vec![
        ParamsFile::Linear(linear),
        ParamsFile::GradientEnsemble(gradient),
        ParamsFile::Survival(survival),
    ])
}
