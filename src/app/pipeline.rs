//! Shared ranking pipeline used by the CLI front-ends.
//!
//! Keeping this in one place avoids duplicating the core workflow:
//! request validation -> scorer lookup -> parallel scoring -> normalize -> rank
//!
//! Request-level errors (bad k, unknown model, missing horizon) surface here,
//! before any scoring work begins. Per-customer errors come back inside the
//! outcome as exclusions.

use crate::domain::{CustomerHistory, ModelId, RankRequest};
use crate::error::RequestError;
use crate::rank::{RankOutcome, rank, score_population};
use crate::registry::ModelRegistry;

/// Execute one ranking request end to end.
pub fn run_rank(
    registry: &ModelRegistry,
    population: &[CustomerHistory],
    request: &RankRequest,
    tie_epsilon: f64,
) -> Result<RankOutcome, RequestError> {
    // Fail fast: every request-level check happens before a single customer
    // is scored.
    if request.top_k == 0 {
        return Err(RequestError::InvalidK(request.top_k));
    }
    let scorer = registry.get(request.model)?;
    if request.model == ModelId::Survival && request.horizon_days.is_none() {
        return Err(RequestError::MissingHorizon);
    }

    let (scored, excluded) = score_population(scorer.as_ref(), population, request.horizon_days);
    let entries = rank(&scored, request.top_k, tie_epsilon)?;

    Ok(RankOutcome {
        entries,
        scored,
        excluded,
    })
}

/// Run the ranker once per loaded model over the same population.
///
/// The production form of comparing model outputs: no extra core logic, just
/// one ranking per family, diffed downstream. A loaded survival model is
/// skipped (not fatal) when no horizon is supplied, so the other families
/// still compare; it is an error only when nothing at all can run.
pub fn run_compare(
    registry: &ModelRegistry,
    population: &[CustomerHistory],
    top_k: usize,
    horizon_days: Option<f64>,
    tie_epsilon: f64,
) -> Result<Vec<(ModelId, RankOutcome)>, RequestError> {
    let loaded = registry.loaded();
    if loaded.is_empty() {
        return Err(RequestError::Config(
            "No models loaded; nothing to compare.".to_string(),
        ));
    }

    let mut out = Vec::with_capacity(loaded.len());
    for model in loaded {
        if model == ModelId::Survival && horizon_days.is_none() {
            continue;
        }
        let request = RankRequest {
            model,
            top_k,
            horizon_days,
        };
        let outcome = run_rank(registry, population, &request, tie_epsilon)?;
        out.push((model, outcome));
    }
    if out.is_empty() {
        return Err(RequestError::MissingHorizon);
    }
    Ok(out)
}
