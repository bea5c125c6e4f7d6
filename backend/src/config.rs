//! Run configuration.
//!
//! Endpoints and the output root are injected into the pipeline through
//! [`Config`]. Defaults are the production deployment values; each can be
//! overridden from the environment (a `.env` file is loaded if present).

use std::env;
use std::path::PathBuf;

/// Municipal shelter dataset (Shift_JIS CSV).
pub const DEFAULT_SOURCE_URL: &str =
    "https://www.city.chiba.jp/somu/bosai/documents/hinanbasyotou300701.csv";

/// Currently published artifact.
pub const DEFAULT_ARTIFACT_URL: &str = "https://api.chiba-shelters.lollipop-onl/v1/shelters.json";

/// Output root for the static API.
pub const DEFAULT_OUTPUT_DIR: &str = "public";

/// Encoding label of the source CSV.
pub const DEFAULT_SOURCE_ENCODING: &str = "shift_jis";

/// Floating directory that always holds the latest artifact.
pub const ALIAS_DIR: &str = "v1";

/// Artifact file name inside each version directory.
pub const ARTIFACT_FILE_NAME: &str = "shelters.json";

const ENV_SOURCE_URL: &str = "SHELTERS_SOURCE_URL";
const ENV_ARTIFACT_URL: &str = "SHELTERS_ARTIFACT_URL";
const ENV_OUTPUT_DIR: &str = "SHELTERS_OUTPUT_DIR";
const ENV_SOURCE_ENCODING: &str = "SHELTERS_SOURCE_ENCODING";

/// Pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Where the source CSV is fetched from
    pub source_url: String,
    /// Where the previously published artifact is fetched from
    pub artifact_url: String,
    /// Root directory the artifact files are written under
    pub output_root: PathBuf,
    /// Encoding label of the source CSV (WHATWG label)
    pub source_encoding: String,
    /// Directory name of the floating "latest" copy
    pub alias_dir: String,
    /// File name of the artifact inside each directory
    pub file_name: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            source_url: DEFAULT_SOURCE_URL.to_string(),
            artifact_url: DEFAULT_ARTIFACT_URL.to_string(),
            output_root: PathBuf::from(DEFAULT_OUTPUT_DIR),
            source_encoding: DEFAULT_SOURCE_ENCODING.to_string(),
            alias_dir: ALIAS_DIR.to_string(),
            file_name: ARTIFACT_FILE_NAME.to_string(),
        }
    }
}

impl Config {
    /// Build a configuration from the environment
    pub fn from_env() -> Self {
        // Try loading .env file
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a configuration from an arbitrary key lookup, falling back to defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Self {
            source_url: get(ENV_SOURCE_URL).unwrap_or(defaults.source_url),
            artifact_url: get(ENV_ARTIFACT_URL).unwrap_or(defaults.artifact_url),
            output_root: get(ENV_OUTPUT_DIR)
                .map(PathBuf::from)
                .unwrap_or(defaults.output_root),
            source_encoding: get(ENV_SOURCE_ENCODING).unwrap_or(defaults.source_encoding),
            alias_dir: defaults.alias_dir,
            file_name: defaults.file_name,
        }
    }

    /// Set the output root
    pub fn with_output_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.output_root = root.into();
        self
    }
}
