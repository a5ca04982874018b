//! Error types for the scoring/ranking core.
//!
//! Two tiers, matching how failures propagate:
//!
//! - [`RequestError`]: fatal to the whole ranking request (bad `k`, unknown
//!   model, missing horizon, config/IO problems). Surfaced before any scoring
//!   work begins.
//! - [`ScoreError`]: per-customer failures (schema mismatch, missing history,
//!   bad horizon). Collected into an exclusion list alongside the successful
//!   ranking; one malformed record never blocks the rest of the population.

/// A request-level failure. Aborts the request it belongs to.
#[derive(Clone, PartialEq)]
pub enum RequestError {
    /// `top_k` must be a positive integer.
    InvalidK(usize),
    /// The requested model id was never loaded into the registry.
    UnknownModel(String),
    /// The survival model requires a horizon; none was supplied.
    MissingHorizon,
    /// Bad configuration (flags, env, parameter files).
    Config(String),
    /// Filesystem / serialization failure.
    Io(String),
    /// No usable data remained (e.g. empty population after ingest).
    EmptyPopulation,
}

impl RequestError {
    /// Process exit code: 2 usage/config/IO, 3 data, 4 model.
    pub fn exit_code(&self) -> u8 {
        match self {
            RequestError::InvalidK(_)
            | RequestError::MissingHorizon
            | RequestError::Config(_)
            | RequestError::Io(_) => 2,
            RequestError::EmptyPopulation => 3,
            RequestError::UnknownModel(_) => 4,
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::InvalidK(k) => {
                write!(f, "Invalid top_k={k}: must be a positive integer.")
            }
            RequestError::UnknownModel(id) => {
                write!(f, "Unknown model '{id}': not loaded in the registry.")
            }
            RequestError::MissingHorizon => {
                write!(f, "The survival model requires --horizon-days.")
            }
            RequestError::Config(msg) => write!(f, "{msg}"),
            RequestError::Io(msg) => write!(f, "{msg}"),
            RequestError::EmptyPopulation => {
                write!(f, "No usable customer records remain after ingest.")
            }
        }
    }
}

impl std::fmt::Debug for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RequestError({self})")
    }
}

impl std::error::Error for RequestError {}

/// A per-customer scoring failure.
///
/// Never fatal to a batch: the offending customer is excluded and reported.
#[derive(Debug, Clone, PartialEq)]
pub enum ScoreError {
    /// Feature vector shape does not match the fitted parameters.
    SchemaMismatch { expected: usize, got: usize },
    /// The survival scorer needs at least one historical snapshot.
    InsufficientHistory,
    /// Horizon must be finite and > 0.
    InvalidHorizon(f64),
}

impl std::fmt::Display for ScoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ScoreError::SchemaMismatch { expected, got } => {
                write!(f, "Schema mismatch: expected {expected} features, got {got}.")
            }
            ScoreError::InsufficientHistory => {
                write!(f, "No historical snapshots supplied.")
            }
            ScoreError::InvalidHorizon(h) => {
                write!(f, "Invalid horizon {h}: must be finite and > 0.")
            }
        }
    }
}

impl std::error::Error for ScoreError {}
