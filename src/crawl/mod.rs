// src/crawl/mod.rs
// =============================================================================
// This module handles the crawl itself.
//
// Features:
// - Breadth-first crawling from a seed URL, level by level
// - Same-host, same-path-prefix restriction (never wanders off the docs)
// - Depth limit, de-duplication, cancellation with a grace period
// - Several pages in flight at once, with a polite delay between requests
// - Deterministic output order no matter which request finishes first
//
// Submodules, leaves first:
// - normalize: URL canonicalization and scope
// - visited: the claim set
// - frontier: the work queue
// - throttle: request spacing
// - worker: one fetch-extract loop
// - aggregator: collects and orders results
// - progress: the terminal progress bar
// - controller: ties it all together
// =============================================================================

mod aggregator;
mod controller;
mod frontier;
mod normalize;
mod progress;
mod throttle;
mod types;
mod visited;
mod worker;

#[cfg(test)]
pub(crate) mod testing;

pub use aggregator::CrawlSummary;
pub use controller::{CrawlController, CrawlState};
pub use normalize::normalize_seed;
pub use progress::CrawlProgress;
pub use throttle::ThrottleScope;
pub use types::PageRecord;

#[cfg(test)]
pub use types::{CrawlTask, PageStatus};
