//! Weibull cumulative distribution function.
//!
//! The survival scorer converts a per-customer Weibull distribution
//! `(shape k, scale λ)` into an event-by-horizon probability:
//!
//! ```text
//! P(T ≤ t) = 1 − exp(−(t/λ)^k)
//! ```
//!
//! The CDF is non-decreasing in `t` and strictly below 1 for finite `t`,
//! which gives the survival family its [0, 1) propensity scale for free.

/// Evaluate the Weibull CDF at `t` for shape `k > 0` and scale `lambda > 0`.
///
/// `t <= 0` returns 0 (no event mass before the origin). Callers are
/// responsible for validating `k` and `lambda`; the fitted-parameter loaders
/// reject non-positive values at load time.
pub fn weibull_cdf(t: f64, k: f64, lambda: f64) -> f64 {
    if t <= 0.0 {
        return 0.0;
    }
    let z = (t / lambda).powf(k);
    -(-z).exp_m1()
}
