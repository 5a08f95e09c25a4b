// src/fetch/mod.rs
// =============================================================================
// Fetching pages.
//
// The crawl core only knows the Fetcher trait: give it a URL, get back the
// HTML (plus the URL it was finally served from) or a FetchError. The real
// implementation is HttpFetcher; tests plug in scripted fakes.
// =============================================================================

mod http;

use async_trait::async_trait;
use url::Url;

use crate::error::FetchError;

pub use http::HttpFetcher;

/// A successfully downloaded page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedPage {
    /// Where the body actually came from, after redirects
    pub final_url: Url,
    pub html: String,
}

#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError>;
}
