//! Transformation module.
//!
//! - Normalizer: source rows to shelter types and shelters
//! - Pipeline: fetch, normalize, compare, version, publish

pub mod normalizer;
pub mod pipeline;

pub use normalizer::{normalize, NormalizeReport, SkippedRow};
pub use pipeline::*;
