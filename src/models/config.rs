//! Application configuration structures.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Page to mirror and which links to follow
    #[serde(default)]
    pub source: SourceConfig,

    /// Working and archive directories
    #[serde(default)]
    pub paths: PathsConfig,

    /// HTTP and scheduling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Log output settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Serialize the configuration and write it to `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        let base = self.source.base_url()?;
        if base.cannot_be_a_base() {
            return Err(AppError::validation("source.base_url cannot be a base URL"));
        }
        self.source.page_url()?;
        if self.source.extensions.is_empty() {
            return Err(AppError::validation("source.extensions is empty"));
        }
        if let Some(ext) = self.source.extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(AppError::validation(format!(
                "source.extensions entry '{ext}' must start with '.'"
            )));
        }
        if self.paths.download_dir.as_os_str().is_empty() {
            return Err(AppError::validation("paths.download_dir is empty"));
        }
        if self.paths.archive_dir.as_os_str().is_empty() {
            return Err(AppError::validation("paths.archive_dir is empty"));
        }
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.interval_secs == 0 {
            return Err(AppError::validation("crawler.interval_secs must be > 0"));
        }
        Ok(())
    }
}

/// The page to mirror.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL that relative download links are resolved against
    #[serde(default = "defaults::base_url")]
    pub base_url: String,

    /// Listing page, relative to `base_url`
    #[serde(default = "defaults::page")]
    pub page: String,

    /// Recognised file extensions, including the leading dot
    #[serde(default = "defaults::extensions")]
    pub extensions: Vec<String>,
}

impl SourceConfig {
    /// Parsed base URL.
    pub fn base_url(&self) -> Result<Url> {
        Ok(Url::parse(&self.base_url)?)
    }

    /// Absolute URL of the listing page.
    pub fn page_url(&self) -> Result<Url> {
        Ok(self.base_url()?.join(&self.page)?)
    }
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::base_url(),
            page: defaults::page(),
            extensions: defaults::extensions(),
        }
    }
}

/// Filesystem layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Flat directory holding the current version of every mirrored file
    #[serde(default = "defaults::download_dir")]
    pub download_dir: PathBuf,

    /// Root of the dated archive folders
    #[serde(default = "defaults::archive_dir")]
    pub archive_dir: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            download_dir: defaults::download_dir(),
            archive_dir: defaults::archive_dir(),
        }
    }
}

/// HTTP client and scheduling settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Pause between the end of one cycle and the start of the next
    #[serde(default = "defaults::interval")]
    pub interval_secs: u64,
}

impl CrawlerConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            interval_secs: defaults::interval(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset
    #[serde(default = "defaults::log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: defaults::log_level(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Source defaults
    pub fn base_url() -> String {
        "https://gkv-datenaustausch.de/leistungserbringer/sonstige_leistungserbringer/kostentraegerdateien_sle/".into()
    }
    pub fn page() -> String {
        "kostentraegerdateien.jsp".into()
    }
    pub fn extensions() -> Vec<String> {
        (0..10).map(|i| format!(".ke{i}")).collect()
    }

    // Path defaults
    pub fn download_dir() -> PathBuf {
        PathBuf::from("DownloadedFiles")
    }
    pub fn archive_dir() -> PathBuf {
        PathBuf::from("archives")
    }

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (compatible; ktd-crawler/0.1)".into()
    }
    pub fn timeout() -> u64 {
        60
    }
    pub fn interval() -> u64 {
        3600
    }

    pub fn log_level() -> String {
        "info".into()
    }
}
