//! Synthetic population and fitted-parameter generation.

pub mod sample;

pub use sample::*;
