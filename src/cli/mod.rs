//! Command-line parsing for the propensity ranker.
//!
//! The goal of this module is to keep **argument parsing** and **command
//! dispatch** separate from the scoring/ranking code.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use crate::domain::{ModelId, TIE_EPSILON};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "ipr", version, about = "First-time investor propensity ranker")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Score a population under one model and print the top-K ranking.
    Rank(RankArgs),
    /// Rank under every loaded model and print the results side by side.
    Compare(CompareArgs),
    /// Write synthetic fitted-parameter files and a synthetic population CSV.
    Gen(GenArgs),
}

/// Input sources shared by `rank` and `compare`.
#[derive(Debug, Parser, Clone)]
pub struct InputArgs {
    /// Directory of `<family>.json` fitted-parameter files.
    /// Defaults to $PROPENSITY_MODEL_DIR (.env supported).
    #[arg(long)]
    pub models: Option<PathBuf>,

    /// Population CSV from the feature pipeline
    /// (`customer_id`, optional `snapshot_date`, feature columns).
    #[arg(long, conflicts_with = "synthetic")]
    pub population: Option<PathBuf>,

    /// Generate the models and population synthetically instead of loading
    /// files (deterministic for a given --seed).
    #[arg(long)]
    pub synthetic: bool,

    /// Seed for synthetic generation.
    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    /// Synthetic population size.
    #[arg(long, default_value_t = 100)]
    pub customers: usize,

    /// Synthetic feature vector length.
    #[arg(long, default_value_t = 8)]
    pub features: usize,

    /// Synthetic snapshots per customer.
    #[arg(long, default_value_t = 6)]
    pub snapshots: usize,
}

/// Options for `ipr rank`.
#[derive(Debug, Parser, Clone)]
pub struct RankArgs {
    /// Model family to score with.
    #[arg(short, long, value_enum)]
    pub model: ModelId,

    /// Number of top customers to return.
    #[arg(short = 'k', long = "top", default_value_t = 10)]
    pub top_k: usize,

    /// Horizon in days (required for the survival model).
    #[arg(long)]
    pub horizon_days: Option<f64>,

    /// Scores closer than this are tied and ordered by customer id.
    #[arg(long, default_value_t = TIE_EPSILON)]
    pub tie_epsilon: f64,

    #[command(flatten)]
    pub input: InputArgs,

    /// Export the ranking as CSV.
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Export the ranking (with the exclusion report) as JSON.
    #[arg(long)]
    pub export_json: Option<PathBuf>,
}

/// Options for `ipr compare`.
#[derive(Debug, Parser, Clone)]
pub struct CompareArgs {
    /// Number of top customers per model.
    #[arg(short = 'k', long = "top", default_value_t = 10)]
    pub top_k: usize,

    /// Horizon in days; without it a loaded survival model is skipped.
    #[arg(long)]
    pub horizon_days: Option<f64>,

    /// Scores closer than this are tied and ordered by customer id.
    #[arg(long, default_value_t = TIE_EPSILON)]
    pub tie_epsilon: f64,

    #[command(flatten)]
    pub input: InputArgs,
}

/// Options for `ipr gen`.
#[derive(Debug, Parser, Clone)]
pub struct GenArgs {
    /// Output directory for the parameter files and population CSV.
    #[arg(short, long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,

    #[arg(long, default_value_t = 100)]
    pub customers: usize,

    #[arg(long, default_value_t = 8)]
    pub features: usize,

    #[arg(long, default_value_t = 6)]
    pub snapshots: usize,
}
