// src/error.rs

//! Unified error handling for the crawler application.

use std::fmt;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Result type alias for crawler operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("HTTP status {status} for {url}")]
    Status {
        url: String,
        status: reqwest::StatusCode,
    },

    /// URL parsing failed
    #[error("URL parse error: {0}")]
    Url(#[from] url::ParseError),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// TOML serialization failed
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// JSON serialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSS selector parsing failed
    #[error("Invalid selector '{selector}': {message}")]
    Selector { selector: String, message: String },

    /// A file could not be read while computing its digest
    #[error("Cannot digest {}: {source}", path.display())]
    Digest {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Moving a file into the archive failed
    #[error("Cannot archive {}: {source}", path.display())]
    Archive {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Data validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Shutdown was requested while waiting
    #[error("Cancelled")]
    Cancelled,
}

impl AppError {
    /// Create a selector parsing error.
    pub fn selector(selector: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Selector {
            selector: selector.into(),
            message: message.to_string(),
        }
    }

    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a non-success status error.
    pub fn status(url: impl fmt::Display, status: reqwest::StatusCode) -> Self {
        Self::Status {
            url: url.to_string(),
            status,
        }
    }

    /// Create a digest error for the given file.
    pub fn digest(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Digest {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an archive error for the given file.
    pub fn archive(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Archive {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Whether the error was caused by a shutdown request.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled)
    }
}
