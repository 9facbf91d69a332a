// src/utils/http.rs

//! HTTP client utilities.

use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::error::Result;
use crate::models::CrawlerConfig;

/// Create a configured asynchronous HTTP client.
pub fn create_async_client(config: &CrawlerConfig) -> Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .user_agent(&config.user_agent)
        .timeout(Duration::from_secs(config.timeout_secs))
        .build()?;
    Ok(client)
}

/// Read a header as an owned string, skipping values that are not visible ASCII.
pub fn header_string(headers: &HeaderMap, name: reqwest::header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::{ETAG, HeaderValue, LAST_MODIFIED};

    #[test]
    fn test_create_client_from_defaults() {
        assert!(create_async_client(&CrawlerConfig::default()).is_ok());
    }

    #[test]
    fn test_header_string() {
        let mut headers = HeaderMap::new();
        headers.insert(ETAG, HeaderValue::from_static("\"abc\""));
        headers.insert(LAST_MODIFIED, HeaderValue::from_static(" "));

        assert_eq!(header_string(&headers, ETAG), Some("\"abc\"".to_string()));
        assert_eq!(header_string(&headers, LAST_MODIFIED), None);
    }
}
