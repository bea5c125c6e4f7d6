//! Writing the artifact to the static API tree.
//!
//! ```text
//! <root>/
//! ├── v1/shelters.json       ← always the latest artifact
//! ├── v1.0/shelters.json     ← one directory per published version
//! └── v1.1/shelters.json
//! ```
//!
//! Both files get the same bytes. Each write goes through a temporary file
//! in the target directory that is renamed into place, so a crash never
//! leaves a truncated JSON file behind. The two writes are not linked: if
//! the pinned write fails, the alias has already been replaced.

use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::config::Config;
use crate::error::{PublishError, PublishResult};
use crate::logs::log_success;
use crate::models::PublishedArtifact;

/// Where an artifact was written
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
    pub alias_path: PathBuf,
    pub pinned_path: PathBuf,
    pub bytes: usize,
}

/// Writes artifacts under an output root
#[derive(Debug, Clone)]
pub struct Publisher {
    root: PathBuf,
    alias_dir: String,
    file_name: String,
}

impl Publisher {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let defaults = Config::default();
        Self {
            root: root.into(),
            alias_dir: defaults.alias_dir,
            file_name: defaults.file_name,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self {
            root: config.output_root.clone(),
            alias_dir: config.alias_dir.clone(),
            file_name: config.file_name.clone(),
        }
    }

    /// `<root>/v1/shelters.json`
    pub fn alias_path(&self) -> PathBuf {
        self.root.join(&self.alias_dir).join(&self.file_name)
    }

    /// `<root>/v<version>/shelters.json`
    pub fn pinned_path(&self, version: &str) -> PathBuf {
        self.root.join(format!("v{}", version)).join(&self.file_name)
    }

    /// Serialize once and write to the alias path, then the pinned path.
    pub fn publish(&self, artifact: &PublishedArtifact) -> PublishResult<PublishReport> {
        let bytes = serde_json::to_vec(artifact)?;

        let alias_path = self.alias_path();
        let pinned_path = self.pinned_path(&artifact.version);

        write_atomic(&alias_path, &bytes)?;
        log_success(format!("Wrote {}", alias_path.display()));

        if pinned_path != alias_path {
            write_atomic(&pinned_path, &bytes)?;
            log_success(format!("Wrote {}", pinned_path.display()));
        }

        Ok(PublishReport {
            alias_path,
            pinned_path,
            bytes: bytes.len(),
        })
    }
}

/// Replace `path` with `bytes` via a temp file in the same directory.
///
/// Parent directories are created as needed. The temp file is removed if
/// anything fails before the rename.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> PublishResult<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    fs::create_dir_all(dir).map_err(|source| PublishError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })?;

    let write_err = |source: std::io::Error| PublishError::Write {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = NamedTempFile::new_in(dir).map_err(write_err)?;
    tmp.write_all(bytes).map_err(write_err)?;
    tmp.as_file().sync_all().map_err(write_err)?;

    tmp.persist(path).map_err(|e| PublishError::Persist {
        path: path.to_path_buf(),
        source: e.error,
    })?;

    Ok(())
}
