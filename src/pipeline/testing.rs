//! In-memory remote site for pipeline tests.

use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use reqwest::StatusCode;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::HttpValidators;
use crate::services::{Download, Fetcher};

pub const BASE_URL: &str = "https://example.com/ktd/";
pub const PAGE: &str = "kostentraegerdateien.jsp";

#[derive(Clone)]
struct RemoteFile {
    content: Vec<u8>,
    etag: Option<String>,
}

#[derive(Default)]
struct RemoteState {
    order: Vec<String>,
    files: HashMap<String, RemoteFile>,
    failing: HashSet<String>,
    hanging: HashSet<String>,
    page_down: bool,
    requests: Vec<String>,
    transfers: Vec<String>,
}

/// Listing page plus files, served from memory.
#[derive(Default)]
pub struct MockRemote {
    state: Mutex<RemoteState>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Publish `name` without cache validators.
    pub fn put(&self, name: &str, content: &[u8]) {
        self.insert(name, content, None);
    }

    /// Publish `name` with an ETag.
    pub fn put_with_etag(&self, name: &str, content: &[u8], etag: &str) {
        self.insert(name, content, Some(etag.to_string()));
    }

    fn insert(&self, name: &str, content: &[u8], etag: Option<String>) {
        let mut state = self.state.lock().unwrap();
        if !state.files.contains_key(name) {
            state.order.push(name.to_string());
        }
        state.files.insert(
            name.to_string(),
            RemoteFile {
                content: content.to_vec(),
                etag,
            },
        );
    }

    /// Make downloads of `name` fail with a 503.
    pub fn fail(&self, name: &str) {
        self.state.lock().unwrap().failing.insert(name.to_string());
    }

    pub fn heal(&self, name: &str) {
        self.state.lock().unwrap().failing.remove(name);
    }

    /// Make downloads of `name` never complete.
    pub fn hang(&self, name: &str) {
        self.state.lock().unwrap().hanging.insert(name.to_string());
    }

    pub fn page_down(&self, down: bool) {
        self.state.lock().unwrap().page_down = down;
    }

    /// Every download request, conditional or not, in order.
    pub fn requests(&self) -> Vec<String> {
        self.state.lock().unwrap().requests.clone()
    }

    /// Requests that transferred a body.
    pub fn transfers(&self) -> Vec<String> {
        self.state.lock().unwrap().transfers.clone()
    }

    pub fn clear_log(&self) {
        let mut state = self.state.lock().unwrap();
        state.requests.clear();
        state.transfers.clear();
    }

    fn render_page(state: &RemoteState) -> String {
        let mut html = String::from("<html><body><a href=\"impressum.html\">Impressum</a>");
        for name in &state.order {
            html.push_str(&format!("<a href=\"dateien/{name}\">{name}</a>"));
        }
        html.push_str("</body></html>");
        html
    }
}

#[async_trait]
impl Fetcher for MockRemote {
    async fn fetch_page(&self, url: &Url) -> Result<String> {
        let state = self.state.lock().unwrap();
        if state.page_down {
            return Err(AppError::status(url, StatusCode::BAD_GATEWAY));
        }
        Ok(Self::render_page(&state))
    }

    async fn download(
        &self,
        url: &Url,
        dest: &Path,
        validators: Option<&HttpValidators>,
    ) -> Result<Download> {
        let name = url
            .path_segments()
            .and_then(|mut s| s.next_back())
            .unwrap_or_default()
            .to_string();

        let (file, hang) = {
            let mut state = self.state.lock().unwrap();
            state.requests.push(name.clone());
            if state.failing.contains(&name) {
                return Err(AppError::status(url, StatusCode::SERVICE_UNAVAILABLE));
            }
            let file = state
                .files
                .get(&name)
                .cloned()
                .ok_or_else(|| AppError::status(url, StatusCode::NOT_FOUND))?;
            (file, state.hanging.contains(&name))
        };

        if hang {
            std::future::pending::<()>().await;
        }

        if let (Some(sent), Some(current)) = (validators.and_then(|v| v.etag.as_ref()), &file.etag)
        {
            if sent == current {
                return Ok(Download::NotModified);
            }
        }

        tokio::fs::write(dest, &file.content).await?;
        self.state.lock().unwrap().transfers.push(name);
        Ok(Download::Fetched {
            size: file.content.len() as u64,
            validators: HttpValidators {
                etag: file.etag,
                last_modified: None,
            },
        })
    }
}
