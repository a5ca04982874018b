//! Terminal reporting: run summaries, ranking tables, exclusion reports.

pub mod format;

pub use format::*;
