//! Score normalization and deterministic top-K ranking.

pub mod normalize;
pub mod ranker;

pub use normalize::normalize;
pub use ranker::{Exclusion, RankOutcome, ScoredCustomer, rank, score_population};
