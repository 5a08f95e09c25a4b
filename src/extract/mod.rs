// src/extract/mod.rs
// =============================================================================
// Turning raw HTML into (title, main text, outbound links).
//
// The crawl core only depends on the Extractor trait. HtmlExtractor is a
// best-effort heuristic tuned for Oracle's documentation layout; any other
// implementation can be swapped in without touching the crawler.
// =============================================================================

mod html;

use url::Url;

use crate::error::ExtractError;

pub use html::HtmlExtractor;

/// What an extractor found on one page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedPage {
    pub title: String,
    /// Main content as lightweight markdown (headings, paragraphs, lists, code)
    pub body: String,
    /// Raw href values in page order; relative links are resolved by the caller
    pub links: Vec<String>,
    /// URL relative links resolve against (the page URL unless <base> says otherwise)
    pub base_url: Url,
}

pub trait Extractor: Send + Sync {
    fn extract(&self, html: &str, page_url: &Url) -> Result<ExtractedPage, ExtractError>;
}
