// src/pipeline/detect.rs

//! Content-based change detection.
//!
//! A file is considered changed when the SHA-256 digest of its full content
//! differs from the digest recorded at its last download. Sizes and
//! timestamps are never used to decide equality.

use std::path::Path;

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;

use crate::error::{AppError, Result};
use crate::models::{ContentDigest, FileFingerprint};

const READ_CHUNK: usize = 64 * 1024;

/// Stream a file through SHA-256, returning its digest and byte length.
pub async fn digest_file(path: &Path) -> Result<(ContentDigest, u64)> {
    let mut file = tokio::fs::File::open(path)
        .await
        .map_err(|e| AppError::digest(path, e))?;

    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; READ_CHUNK];
    let mut size = 0u64;
    loop {
        let n = file
            .read(&mut buf)
            .await
            .map_err(|e| AppError::digest(path, e))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }

    Ok((ContentDigest::from_bytes(hasher.finalize().into()), size))
}

/// Digest of an in-memory buffer.
pub fn digest_bytes(bytes: &[u8]) -> ContentDigest {
    ContentDigest::from_bytes(Sha256::digest(bytes).into())
}

/// Whether the file at `local_path` differs from the stored fingerprint.
///
/// An unreadable file is an error, not a change.
pub async fn is_changed(local_path: &Path, stored: &FileFingerprint) -> Result<bool> {
    let (digest, _) = digest_file(local_path).await?;
    Ok(digest != stored.digest)
}
