//! Local filesystem layout of the mirror.
//!
//! ## Storage Layout
//!
//! ```text
//! {download_dir}/
//! ├── a.ke0              # Current version of every mirrored file
//! ├── b.ke1
//! └── b.ke1.part         # Staging file while a download is in flight
//! {archive_dir}/
//! └── YYYYMMDD/          # One folder per local calendar day
//!     └── a.ke0          # Superseded version, moved here before replacement
//! ```

use std::path::{Path, PathBuf};

use crate::error::Result;
use crate::models::PathsConfig;

/// Suffix of in-flight downloads.
const STAGING_SUFFIX: &str = ".part";

/// Working and archive directories of the mirror.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    download_dir: PathBuf,
    archive_dir: PathBuf,
}

impl LocalStorage {
    /// Create a LocalStorage over the given directories.
    pub fn new(download_dir: impl Into<PathBuf>, archive_dir: impl Into<PathBuf>) -> Self {
        Self {
            download_dir: download_dir.into(),
            archive_dir: archive_dir.into(),
        }
    }

    pub fn from_config(paths: &PathsConfig) -> Self {
        Self::new(&paths.download_dir, &paths.archive_dir)
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Path of the current version of `name`.
    pub fn target_path(&self, name: &str) -> PathBuf {
        self.download_dir.join(name)
    }

    /// Path a new version of `name` is streamed into before it replaces the target.
    pub fn staging_path(&self, name: &str) -> PathBuf {
        self.download_dir.join(format!("{name}{STAGING_SUFFIX}"))
    }

    /// Create the working directory if it does not exist yet.
    pub async fn ensure_dirs(&self) -> Result<()> {
        tokio::fs::create_dir_all(&self.download_dir).await?;
        Ok(())
    }

    /// Whether a current version of `name` exists.
    pub async fn has_file(&self, name: &str) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.target_path(name)).await?)
    }

    /// Move a completed staging file over the target.
    pub async fn promote(&self, name: &str) -> Result<PathBuf> {
        let target = self.target_path(name);
        tokio::fs::rename(self.staging_path(name), &target).await?;
        Ok(target)
    }

    /// Remove the staging file of `name`, ignoring a missing file.
    pub async fn discard_staging(&self, name: &str) {
        let staging = self.staging_path(name);
        match tokio::fs::remove_file(&staging).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove {}: {}", staging.display(), e),
        }
    }
}
