// src/crawl/types.rs
// =============================================================================
// The data that flows through a crawl.
//
// CrawlTask: one URL waiting to be fetched (queue -> worker).
// PageRecord: what a worker produced for that URL (worker -> aggregator).
// Both are immutable once built and are moved, not shared.
// =============================================================================

use serde::Serialize;
use url::Url;

/// A URL scheduled for one fetch-extract cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlTask {
    pub url: Url,
    /// Link hops from the seed (the seed is depth 0)
    pub depth: usize,
    /// Assigned when the task entered the frontier; the output sort key
    pub discovery_order: u64,
}

/// Outcome of one fetch-extract cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PageStatus {
    Success,
    FetchFailed,
    ExtractFailed,
    /// The page redirected somewhere outside the crawl scope
    OutOfScope,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PageRecord {
    pub url: Url,
    pub title: String,
    pub body: String,
    pub depth: usize,
    pub discovery_order: u64,
    /// Normalized links found on the page, in page order, without duplicates
    pub links: Vec<Url>,
    pub status: PageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl PageRecord {
    pub fn success(task: &CrawlTask, title: String, body: String, links: Vec<Url>) -> Self {
        Self {
            url: task.url.clone(),
            title,
            body,
            depth: task.depth,
            discovery_order: task.discovery_order,
            links,
            status: PageStatus::Success,
            error: None,
        }
    }

    // Failed records carry no title, body or links
    pub fn failed(task: &CrawlTask, status: PageStatus, error: impl ToString) -> Self {
        Self {
            url: task.url.clone(),
            title: String::new(),
            body: String::new(),
            depth: task.depth,
            discovery_order: task.discovery_order,
            links: Vec::new(),
            status,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == PageStatus::Success
    }
}
