//! Logistic and softplus link functions.
//!
//! Raw scores from the linear and gradient families are unbounded log-odds /
//! margins, so the naive `1 / (1 + exp(-x))` overflows for large `|x|`.
//! Both functions here branch on the sign of the argument and only ever
//! exponentiate a non-positive value.

/// Numerically stable logistic function.
///
/// Maps any finite `x` into (0, 1); `sigmoid(0) == 0.5`. Large-magnitude
/// inputs saturate to 0/1 without overflow or NaN.
pub fn sigmoid(x: f64) -> f64 {
    if x >= 0.0 {
        let e = (-x).exp();
        1.0 / (1.0 + e)
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// Numerically stable softplus: `ln(1 + exp(x))`.
///
/// Used by the survival head to map an unconstrained network output onto a
/// strictly positive Weibull shape parameter.
pub fn softplus(x: f64) -> f64 {
    if x > 0.0 {
        x + (-x).exp().ln_1p()
    } else {
        x.exp().ln_1p()
    }
}
