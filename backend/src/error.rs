//! Error types for the shelter publishing pipeline.
//!
//! One error type per stage, all convertible into [`PipelineError`]:
//!
//! - [`CsvError`] - source decoding errors
//! - [`FetchError`] - HTTP collaborator errors
//! - [`VersionError`] - malformed stored version strings
//! - [`ValidationError`] - artifact schema violations
//! - [`PublishError`] - output file errors
//! - [`PipelineError`] - top-level run errors
//!
//! Error conversion is automatic via `From` implementations,
//! allowing `?` to work across error boundaries.

use std::path::PathBuf;

use thiserror::Error;

// =============================================================================
// CSV Decoding Errors
// =============================================================================

/// Errors while turning source bytes into rows.
#[derive(Debug, Error)]
pub enum CsvError {
    /// The configured encoding label is not known to the decoder.
    #[error("Unknown source encoding: {0}")]
    UnknownEncoding(String),

    /// The CSV reader failed on a record.
    #[error("Invalid CSV record: {0}")]
    Reader(#[from] csv::Error),

    /// Failed to read a local CSV file.
    #[error("Failed to read file: {0}")]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Fetch Errors
// =============================================================================

/// Errors from the HTTP collaborators.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be sent or the body could not be read.
    #[error("HTTP request to {url} failed: {message}")]
    Transport { url: String, message: String },

    /// Server answered with a non-success status.
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Body was not the expected JSON document.
    #[error("Invalid JSON from {url}: {message}")]
    InvalidJson { url: String, message: String },
}

// =============================================================================
// Version Errors
// =============================================================================

/// Errors while reading the previously published version.
#[derive(Debug, Error)]
pub enum VersionError {
    /// Stored version is not `<major>.<minor>`.
    #[error("Previous version \"{0}\" is malformed, refusing to publish")]
    Malformed(String),

    /// A component does not fit in an unsigned 64-bit integer.
    #[error("Previous version \"{0}\" has an out-of-range component, refusing to publish")]
    OutOfRange(String),
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors when an artifact does not match the published schema.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// Schema validation failed.
    #[error("Artifact failed schema validation: {errors:?}")]
    SchemaError { errors: Vec<String> },

    /// The embedded schema itself could not be loaded.
    #[error("Invalid artifact schema: {0}")]
    InvalidSchema(String),

    /// Artifact could not be converted to JSON for validation.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

// =============================================================================
// Publish Errors
// =============================================================================

/// Errors while writing the artifact to disk.
#[derive(Debug, Error)]
pub enum PublishError {
    /// Serialization failed.
    #[error("Failed to serialize artifact: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Directory creation failed.
    #[error("Failed to create directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Writing the temporary file failed.
    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Renaming the temporary file into place failed.
    #[error("Failed to move artifact into {path}: {source}")]
    Persist {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

// =============================================================================
// Pipeline Errors (top-level)
// =============================================================================

/// Top-level run errors.
///
/// This is the error type returned by [`crate::transform::pipeline::run`].
/// A failed prior-artifact fetch never shows up here: it degrades to
/// [`crate::snapshot::PriorArtifact::NotFound`].
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Source CSV could not be fetched.
    #[error("Source fetch failed: {0}")]
    Source(#[from] FetchError),

    /// Source CSV could not be decoded.
    #[error("CSV error: {0}")]
    Csv(#[from] CsvError),

    /// Stored version could not be bumped.
    #[error("Version error: {0}")]
    Version(#[from] VersionError),

    /// Artifact failed validation.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Artifact could not be written.
    #[error("Publish error: {0}")]
    Publish(#[from] PublishError),
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Result type for CSV operations.
pub type CsvResult<T> = Result<T, CsvError>;

/// Result type for fetch operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Result type for version operations.
pub type VersionResult<T> = Result<T, VersionError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for publish operations.
pub type PublishResult<T> = Result<T, PublishError>;

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_conversion_chain() {
        // VersionError -> PipelineError
        let version_err = VersionError::Malformed("abc".into());
        let pipeline_err: PipelineError = version_err.into();
        assert!(pipeline_err.to_string().contains("\"abc\""));

        // FetchError -> PipelineError
        let fetch_err = FetchError::Status {
            url: "https://example.invalid/data.csv".into(),
            status: 404,
        };
        let pipeline_err: PipelineError = fetch_err.into();
        assert!(matches!(pipeline_err, PipelineError::Source(_)));
        assert!(pipeline_err.to_string().contains("404"));
    }

    #[test]
    fn test_publish_error_names_path() {
        let err = PublishError::Persist {
            path: PathBuf::from("public/v1.2/shelters.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let msg = err.to_string();
        assert!(msg.contains("public/v1.2/shelters.json"));
        assert!(msg.contains("denied"));
    }
}
