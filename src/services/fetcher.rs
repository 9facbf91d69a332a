// src/services/fetcher.rs

//! Network boundary: listing page fetch and file download.

use std::path::Path;

use async_trait::async_trait;
use reqwest::header::{ETAG, IF_MODIFIED_SINCE, IF_NONE_MATCH, LAST_MODIFIED};
use reqwest::{Client, StatusCode};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{CrawlerConfig, HttpValidators};
use crate::utils::http;

/// Result of a (possibly conditional) download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Download {
    /// The server confirmed the validators still match; nothing was written.
    NotModified,
    /// The body was written to the destination file.
    Fetched {
        size: u64,
        validators: HttpValidators,
    },
}

/// Fetches the listing page and downloads files.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// Fetch the listing page as text.
    async fn fetch_page(&self, url: &Url) -> Result<String>;

    /// Stream `url` into `dest`, truncating it.
    ///
    /// With `validators`, the request is conditional and may answer
    /// [`Download::NotModified`] without touching `dest`.
    async fn download(
        &self,
        url: &Url,
        dest: &Path,
        validators: Option<&HttpValidators>,
    ) -> Result<Download>;
}

/// [`Fetcher`] backed by a reqwest client.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Create a fetcher with a client built from the crawler settings.
    pub fn new(config: &CrawlerConfig) -> Result<Self> {
        Ok(Self::with_client(http::create_async_client(config)?))
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn fetch_page(&self, url: &Url) -> Result<String> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::status(url, status));
        }
        Ok(response.text().await?)
    }

    async fn download(
        &self,
        url: &Url,
        dest: &Path,
        validators: Option<&HttpValidators>,
    ) -> Result<Download> {
        let mut request = self.client.get(url.clone());
        if let Some(v) = validators {
            if let Some(etag) = &v.etag {
                request = request.header(IF_NONE_MATCH, etag);
            }
            if let Some(last_modified) = &v.last_modified {
                request = request.header(IF_MODIFIED_SINCE, last_modified);
            }
        }

        let mut response = request.send().await?;
        let status = response.status();
        if status == StatusCode::NOT_MODIFIED && validators.is_some() {
            return Ok(Download::NotModified);
        }
        if !status.is_success() {
            return Err(AppError::status(url, status));
        }

        let validators = HttpValidators {
            etag: http::header_string(response.headers(), ETAG),
            last_modified: http::header_string(response.headers(), LAST_MODIFIED),
        };

        let mut file = tokio::fs::File::create(dest).await?;
        let mut size = 0u64;
        while let Some(chunk) = response.chunk().await? {
            file.write_all(&chunk).await?;
            size += chunk.len() as u64;
        }
        file.flush().await?;
        file.sync_all().await?;

        log::debug!("Downloaded {} bytes from {}", size, url);
        Ok(Download::Fetched { size, validators })
    }
}
