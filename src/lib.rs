//! `investor-propensity` library crate.
//!
//! Ranks existing customers by likelihood of becoming first-time investors
//! within a horizon. The binary (`ipr`) is a thin wrapper around this library
//! so that:
//!
//! - core logic is testable without spawning processes
//! - modules are reusable (e.g., a future service layer or batch jobs)
//! - code stays easy to navigate as the project grows

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod io;
pub mod math;
pub mod models;
pub mod rank;
pub mod registry;
pub mod report;
