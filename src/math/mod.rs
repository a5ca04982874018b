//! Mathematical utilities: stable link functions and the Weibull CDF.

pub mod logistic;
pub mod weibull;

pub use logistic::*;
pub use weibull::*;
