//! Service layer for the crawler application.
//!
//! - Network access to the listing page and the files (`Fetcher`, `HttpFetcher`)
//! - Download link extraction (`LinkExtractor`)

mod fetcher;
mod links;

pub use fetcher::{Download, Fetcher, HttpFetcher};
pub use links::LinkExtractor;
