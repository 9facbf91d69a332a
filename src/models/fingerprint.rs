//! Fingerprint of a downloaded file.

use std::fmt;

use chrono::{DateTime, Local};

/// SHA-256 digest of a file's full content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentDigest([u8; 32]);

impl ContentDigest {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Lowercase hex rendering.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }
}

impl fmt::Display for ContentDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Cache validators returned with a download, replayed as a conditional GET.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpValidators {
    /// `ETag` response header
    pub etag: Option<String>,

    /// `Last-Modified` response header
    pub last_modified: Option<String>,
}

impl HttpValidators {
    pub fn is_empty(&self) -> bool {
        self.etag.is_none() && self.last_modified.is_none()
    }
}

/// What was recorded about the last successful download of a file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFingerprint {
    /// File name, the key in the store
    pub name: String,

    /// Byte length
    pub size: u64,

    /// When the download completed
    pub last_seen: DateTime<Local>,

    /// Digest of the downloaded bytes
    pub digest: ContentDigest,

    /// Validators of the response that produced this file
    pub validators: HttpValidators,
}

impl FileFingerprint {
    /// Fingerprint stamped with the current time.
    pub fn new(name: impl Into<String>, size: u64, digest: ContentDigest) -> Self {
        Self {
            name: name.into(),
            size,
            last_seen: Local::now(),
            digest,
            validators: HttpValidators::default(),
        }
    }

    pub fn with_validators(mut self, validators: HttpValidators) -> Self {
        self.validators = validators;
        self
    }
}
