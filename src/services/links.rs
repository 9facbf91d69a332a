// src/services/links.rs

//! Download link extraction from the listing page.

use std::collections::HashSet;

use scraper::{Html, Selector};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{Link, SourceConfig};

const ANCHOR_SELECTOR: &str = "a[href]";

/// Pulls candidate download links out of the listing page.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    base: Url,
    extensions: Vec<String>,
    anchors: Selector,
}

impl LinkExtractor {
    /// Create an extractor resolving hrefs against `base`.
    pub fn new(base: Url, extensions: Vec<String>) -> Result<Self> {
        Ok(Self {
            base,
            extensions,
            anchors: Self::parse_selector(ANCHOR_SELECTOR)?,
        })
    }

    pub fn from_config(source: &SourceConfig) -> Result<Self> {
        Self::new(source.base_url()?, source.extensions.clone())
    }

    /// Links with a recognised extension, in page order.
    ///
    /// A file name appearing more than once is kept at its first occurrence.
    pub fn extract(&self, html: &str) -> Vec<Link> {
        let document = Html::parse_document(html);
        let mut seen = HashSet::new();
        let mut links = Vec::new();

        for href in document
            .select(&self.anchors)
            .filter_map(|a| a.value().attr("href"))
        {
            let Some(link) = Link::resolve(&self.base, href) else {
                continue;
            };
            if !link.has_extension(&self.extensions) {
                continue;
            }
            if !seen.insert(link.file_name.clone()) {
                log::debug!("Skipping duplicate link {} for {}", link.url, link.file_name);
                continue;
            }
            links.push(link);
        }
        links
    }

    fn parse_selector(s: &str) -> Result<Selector> {
        Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <a href="dateien/AOK.ke0">AOK</a>
          <a href="dateien/BKK.ke2">BKK</a>
          <a href="dateien/readme.pdf">Readme</a>
          <a href="/absolut/IKK.KE1">IKK</a>
          <a>no href</a>
          <a href="dateien/AOK.ke0">AOK again</a>
          <a href="https://mirror.example.org/x/VDEK.ke9">VDEK</a>
        </body></html>
    "#;

    fn extractor() -> LinkExtractor {
        let base = Url::parse("https://example.com/ktd/").unwrap();
        let extensions = (0..10).map(|i| format!(".ke{i}")).collect();
        LinkExtractor::new(base, extensions).unwrap()
    }

    #[test]
    fn test_parse_selector_invalid() {
        assert!(LinkExtractor::parse_selector("[[invalid").is_err());
    }

    #[test]
    fn test_extract_filters_and_resolves() {
        let links = extractor().extract(PAGE);
        let names: Vec<_> = links.iter().map(|l| l.file_name.as_str()).collect();
        assert_eq!(names, vec!["AOK.ke0", "BKK.ke2", "IKK.KE1", "VDEK.ke9"]);

        assert_eq!(
            links[0].url.as_str(),
            "https://example.com/ktd/dateien/AOK.ke0"
        );
        assert_eq!(links[2].url.as_str(), "https://example.com/absolut/IKK.KE1");
        assert_eq!(links[3].url.host_str(), Some("mirror.example.org"));
    }

    #[test]
    fn test_extract_empty_page() {
        assert!(extractor().extract("<html></html>").is_empty());
    }

    #[test]
    fn test_restricted_extensions() {
        let base = Url::parse("https://example.com/ktd/").unwrap();
        let extractor = LinkExtractor::new(base, vec![".ke0".into(), ".ke2".into()]).unwrap();
        let names: Vec<_> = extractor
            .extract(PAGE)
            .into_iter()
            .map(|l| l.file_name)
            .collect();
        assert_eq!(names, vec!["AOK.ke0", "BKK.ke2"]);
    }
}
