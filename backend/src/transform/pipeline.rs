//! High-level pipeline: source CSV to published artifact.
//!
//! One run does, in order:
//! 1. Fetch the source CSV and the prior artifact (concurrently)
//! 2. Decode and normalize the CSV
//! 3. Compare the shelter list with the prior artifact
//! 4. Resolve version and timestamp
//! 5. Validate and write the artifact
//!
//! # Example
//!
//! ```rust,ignore
//! use shelters::{run, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let outcome = run(&Config::from_env()).await?;
//!     println!("Published {}", outcome.artifact.version);
//!     Ok(())
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::normalizer::{normalize, NormalizeReport};
use crate::config::Config;
use crate::error::PipelineResult;
use crate::fetch::{HttpFetcher, SourceFetcher};
use crate::logs::{log_error, log_info, log_info_indent, log_success, log_warning, log_warning_indent};
use crate::models::{Dataset, PublishedArtifact};
use crate::parser::{parse_bytes, resolve_encoding, ParseResult};
use crate::publish::{PublishReport, Publisher};
use crate::snapshot::{has_changed, ArtifactSource, PriorArtifact};
use crate::validation::validate_artifact;
use crate::version::resolve;

/// Source CSV information
#[derive(Debug, Clone, Serialize)]
pub struct CsvInfo {
    pub encoding: String,
    pub headers: Vec<String>,
    pub row_count: usize,
    pub mismatched_lines: Vec<u64>,
}

impl From<&ParseResult> for CsvInfo {
    fn from(result: &ParseResult) -> Self {
        Self {
            encoding: result.encoding.clone(),
            headers: result.headers.clone(),
            row_count: result.rows.len(),
            mismatched_lines: result.mismatched.clone(),
        }
    }
}

/// Candidate dataset built from one source fetch
#[derive(Debug, Clone)]
pub struct Candidate {
    pub dataset: Dataset,
    pub csv_info: CsvInfo,
    pub report: NormalizeReport,
}

/// Result of a complete run
#[derive(Debug, Clone)]
pub struct PublishOutcome {
    /// The artifact that was written
    pub artifact: PublishedArtifact,
    /// Whether a prior artifact was found
    pub prior_found: bool,
    /// Whether the shelter list differs from the prior artifact
    pub changed: bool,
    /// Where the artifact was written
    pub report: PublishReport,
    pub csv_info: CsvInfo,
    pub normalize_report: NormalizeReport,
}

/// Run the pipeline against the configured endpoints.
pub async fn run(config: &Config) -> PipelineResult<PublishOutcome> {
    let fetcher = HttpFetcher::from_config(config);
    let publisher = Publisher::from_config(config);

    run_with(&fetcher, &fetcher, &publisher, &config.source_encoding, Utc::now()).await
}

/// Run the pipeline with injected collaborators and clock.
pub async fn run_with<S, A>(
    source: &S,
    prior: &A,
    publisher: &Publisher,
    encoding: &str,
    now: DateTime<Utc>,
) -> PipelineResult<PublishOutcome>
where
    S: SourceFetcher,
    A: ArtifactSource,
{
    resolve_encoding(encoding)?;

    log_info("📡 Fetching source CSV and published artifact...");
    let (bytes, prior) = tokio::join!(source.fetch_source(), prior.fetch_artifact());
    let bytes = bytes.map_err(|e| {
        log_error(format!("Source fetch failed: {}", e));
        e
    })?;
    log_success(format!("Source: {} bytes", bytes.len()));

    let candidate = build_candidate(&bytes, encoding)?;

    let (artifact, changed) = prepare_artifact(candidate.dataset, &prior, now)?;

    log_info("✔️  Validating artifact...");
    validate_artifact(&artifact)?;

    log_info("💾 Writing artifact...");
    let report = publisher.publish(&artifact)?;

    log_success(format!("Published version {} ({} bytes)", artifact.version, report.bytes));

    Ok(PublishOutcome {
        artifact,
        prior_found: prior.is_found(),
        changed,
        report,
        csv_info: candidate.csv_info,
        normalize_report: candidate.report,
    })
}

/// Decode and normalize source bytes.
pub fn build_candidate(bytes: &[u8], encoding: &str) -> PipelineResult<Candidate> {
    log_info("📖 Decoding source CSV...");
    let parsed = parse_bytes(bytes, encoding)?;
    let csv_info = CsvInfo::from(&parsed);

    log_success(format!("Encoding: {}", csv_info.encoding));
    log_success(format!("Read {} rows, {} columns", csv_info.row_count, csv_info.headers.len()));
    if parsed.had_replacements {
        log_warning("Source contained bytes invalid in the declared encoding");
    }
    if !parsed.mismatched.is_empty() {
        log_warning(format!(
            "{} rows don't match the header column count",
            parsed.mismatched.len()
        ));
        let sample: Vec<String> = parsed.mismatched.iter().take(5).map(|l| l.to_string()).collect();
        log_warning_indent(format!("lines: {}", sample.join(", ")), 1);
    }

    log_info("⚙️  Normalizing rows...");
    let (dataset, report) = normalize(&parsed.rows);
    log_success(format!(
        "{} shelter types, {} shelters",
        dataset.shelter_types.len(),
        dataset.shelters.len()
    ));
    if !report.skipped.is_empty() || !report.non_finite.is_empty() {
        log_warning(report.summary());
    }

    Ok(Candidate {
        dataset,
        csv_info,
        report,
    })
}

/// Combine the candidate with the prior artifact into the next artifact.
///
/// Returns the artifact and whether its shelters changed.
pub fn prepare_artifact(
    dataset: Dataset,
    prior: &PriorArtifact,
    now: DateTime<Utc>,
) -> PipelineResult<(PublishedArtifact, bool)> {
    let changed = has_changed(&dataset.shelters, prior);

    match prior {
        PriorArtifact::Found(previous) => {
            log_info(format!("Previous version: {}", previous.version));
            if changed {
                log_info_indent("shelters changed", 1);
            } else {
                log_info_indent("shelters unchanged", 1);
            }
        }
        PriorArtifact::NotFound(reason) => {
            log_warning(format!("Starting a new version line ({})", reason));
        }
    }

    let release = resolve(prior.found(), changed, now)?;
    log_success(format!("Version {} (updated {})", release.version, release.updated_at));

    Ok((
        PublishedArtifact::new(release.version, release.updated_at, dataset),
        changed,
    ))
}
