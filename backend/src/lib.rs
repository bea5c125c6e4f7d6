//! # Shelters - Chiba City evacuation shelters as a versioned JSON API
//!
//! Converts the city's published shelter CSV into a static JSON artifact,
//! bumping the minor version whenever the shelter list changes.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  CSV (SJIS) │────▶│   Parser    │────▶│ Normalizer  │────▶│   Version   │
//! └─────────────┘     └─────────────┘     └─────────────┘     │  Resolver   │
//! ┌─────────────┐     ┌─────────────┐            │            └──────┬──────┘
//! │ v1/shelters │────▶│  Snapshot   │────────────┘                   ▼
//! │   (prior)   │     │ (compare)   │                         ┌─────────────┐
//! └─────────────┘     └─────────────┘                         │  Publisher  │
//!                                                             └─────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use shelters::{run, Config};
//!
//! #[tokio::main]
//! async fn main() {
//!     let outcome = run(&Config::from_env()).await.unwrap();
//!     println!("Published version {}", outcome.artifact.version);
//! }
//! ```
//!
//! ## Modules
//!
//! - [`error`] - Error types per stage
//! - [`config`] - Endpoints and output root
//! - [`logs`] - Run log
//! - [`models`] - Published data model
//! - [`parser`] - Source CSV decoding
//! - [`transform`] - Normalization and pipeline
//! - [`snapshot`] - Prior artifact and change detection
//! - [`fetch`] - HTTP collaborators
//! - [`version`] - Version resolution
//! - [`validation`] - Artifact schema check
//! - [`publish`] - Writing the artifact

// Core modules
pub mod config;
pub mod error;
pub mod logs;
pub mod models;

// Decoding
pub mod parser;

// Transformation
pub mod transform;

// Versioning
pub mod snapshot;
pub mod version;

// I/O
pub mod fetch;
pub mod publish;

// Validation
pub mod validation;

// =============================================================================
// Re-exports - Configuration & errors
// =============================================================================

pub use config::Config;

pub use error::{
    CsvError,
    FetchError,
    PipelineError,
    PublishError,
    ValidationError,
    VersionError,
};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{
    Coordinate,
    Dataset,
    PublishedArtifact,
    Shelter,
    ShelterType,
};

// =============================================================================
// Re-exports - Parsing & normalization
// =============================================================================

pub use parser::{
    decode_content,
    parse_bytes,
    parse_csv,
    parse_csv_file,
    ParseResult,
    SourceRow,
};

pub use transform::{normalize, NormalizeReport, SkippedRow};

// =============================================================================
// Re-exports - Versioning
// =============================================================================

pub use snapshot::{has_changed, same_shelters, ArtifactSource, PriorArtifact};
pub use version::{resolve, Release, Version};

// =============================================================================
// Re-exports - I/O
// =============================================================================

pub use fetch::{HttpFetcher, SourceFetcher};
pub use publish::{PublishReport, Publisher};
pub use validation::{validate_artifact, validate_artifact_value};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use transform::pipeline::{
    build_candidate,
    prepare_artifact,
    run,
    run_with,
    Candidate,
    CsvInfo,
    PublishOutcome,
};
