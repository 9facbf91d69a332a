// src/models/mod.rs

//! Domain models for the crawler application.

mod config;
mod fingerprint;
mod link;

// Re-export all public types
pub use config::{Config, CrawlerConfig, LoggingConfig, PathsConfig, SourceConfig};
pub use fingerprint::{ContentDigest, FileFingerprint, HttpValidators};
pub use link::Link;
