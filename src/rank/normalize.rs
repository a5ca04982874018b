//! Map family-specific raw scores onto a common [0, 1] propensity scale.
//!
//! The three families produce incomparable native outputs:
//!
//! - linear: log-odds
//! - gradient-ensemble: margin
//! - survival: probability of the event by the horizon
//!
//! Rankings (and any downstream thresholding) only make sense on one scale,
//! so log-odds/margins go through the stable logistic link and survival
//! probabilities pass through unchanged.

use crate::domain::ModelId;
use crate::math::sigmoid;

/// Normalize a raw score for the given model family into [0, 1].
///
/// Monotone within each family and overflow-safe at extreme magnitudes.
pub fn normalize(raw: f64, model: ModelId) -> f64 {
    match model {
        ModelId::Linear | ModelId::GradientEnsemble => sigmoid(raw),
        ModelId::Survival => raw,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logistic_families_map_into_unit_interval() {
        for model in [ModelId::Linear, ModelId::GradientEnsemble] {
            for raw in [-1000.0, -5.0, 0.0, 5.0, 1000.0] {
                let n = normalize(raw, model);
                assert!((0.0..=1.0).contains(&n), "raw={raw} gave {n}");
                assert!(!n.is_nan());
            }
        }
    }

    #[test]
    fn normalization_is_monotone_within_a_family() {
        let raws = [-1000.0, -2.0, 0.0, 0.5, 3.0, 1000.0];
        for model in ModelId::ALL {
            for pair in raws.windows(2) {
                assert!(normalize(pair[0], model) <= normalize(pair[1], model));
            }
        }
    }

    #[test]
    fn survival_passes_through_unchanged() {
        assert_eq!(normalize(0.37, ModelId::Survival), 0.37);
        assert_eq!(normalize(0.0, ModelId::Survival), 0.0);
    }

    #[test]
    fn zero_log_odds_normalizes_to_half() {
        assert!((normalize(0.0, ModelId::Linear) - 0.5).abs() < 1e-15);
    }

    #[test]
    fn known_log_odds_value() {
        assert!((normalize(2.0, ModelId::Linear) - 0.8807970779778823).abs() < 1e-12);
    }
}
