//! File IO: population CSV ingest, fitted-parameter JSON, ranking exports.

pub mod export;
pub mod ingest;
pub mod params;
