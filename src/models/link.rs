//! Download link extracted from the listing page.

use serde::Serialize;
use url::Url;

/// A candidate file on the listing page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    /// The `href` attribute as found in the page
    pub href: String,

    /// Absolute URL, resolved against the configured base URL
    pub url: Url,

    /// Final path segment of `url`, used as the local file name
    pub file_name: String,
}

impl Link {
    /// Resolve `href` against `base`.
    ///
    /// Returns `None` when the href does not parse or has no usable file name.
    pub fn resolve(base: &Url, href: &str) -> Option<Self> {
        let href = href.trim();
        let url = base.join(href).ok()?;
        let file_name = file_name_of(&url)?;
        Some(Self {
            href: href.to_string(),
            url,
            file_name,
        })
    }

    /// Whether the URL path ends in one of `extensions` (ASCII case-insensitive).
    pub fn has_extension(&self, extensions: &[String]) -> bool {
        let path = self.url.path().to_ascii_lowercase();
        extensions
            .iter()
            .any(|ext| path.ends_with(&ext.to_ascii_lowercase()))
    }
}

fn file_name_of(url: &Url) -> Option<String> {
    let name = url.path_segments()?.next_back()?;
    if name.is_empty() || name == "." || name == ".." || name.contains('\\') {
        return None;
    }
    Some(name.to_string())
}
