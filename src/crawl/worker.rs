// src/crawl/worker.rs
// =============================================================================
// One fetch-extract worker.
//
// Each worker loops:
// 1. pop a task from the frontier (waits while other pages are in flight)
// 2. wait for the throttle (a cancelled crawl sends no new requests)
// 3. fetch the page (bounded by the request timeout)
// 4. extract title, text and links
// 5. hand the PageRecord to the aggregator
// 6. finish the lease with the page's in-scope links
//
// Anything that goes wrong with a page becomes a failed PageRecord; a worker
// never stops because of one bad page.
// =============================================================================

use std::collections::HashSet;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use url::Url;

use super::aggregator::Aggregator;
use super::frontier::Frontier;
use super::normalize::{normalize, Scope};
use super::progress::CrawlProgress;
use super::throttle::{Throttle, WorkerPace};
use super::types::{CrawlTask, PageRecord, PageStatus};
use crate::error::FetchError;
use crate::extract::Extractor;
use crate::fetch::{FetchedPage, Fetcher};

// Everything a worker borrows from the controller for the run
pub(super) struct WorkerContext<'a> {
    pub frontier: &'a Frontier,
    pub aggregator: &'a Aggregator,
    pub fetcher: &'a dyn Fetcher,
    pub extractor: &'a dyn Extractor,
    pub throttle: &'a Throttle,
    pub scope: &'a Scope,
    pub max_depth: usize,
    pub request_timeout: Duration,
    pub grace_period: Duration,
    pub cancel: &'a CancellationToken,
    pub progress: &'a CrawlProgress,
}

pub(super) async fn run_worker(id: usize, ctx: &WorkerContext<'_>) {
    let mut pace = WorkerPace::default();
    let mut processed = 0usize;

    while let Some(lease) = ctx.frontier.pop().await {
        let (record, children) = process(id, lease.task(), &mut pace, ctx).await;

        // Record before finishing: once the lease ends the frontier may
        // report itself drained, and every record must already be in
        ctx.progress.page_done(&record, ctx.frontier.visited().len());
        ctx.aggregator.record(record);
        lease.finish(children);
        processed += 1;

        if ctx.cancel.is_cancelled() {
            break;
        }
    }

    debug!(worker = id, processed, "worker stopped");
}

// One fetch-extract cycle. Returns the record and the links to crawl next.
async fn process(
    id: usize,
    task: &CrawlTask,
    pace: &mut WorkerPace,
    ctx: &WorkerContext<'_>,
) -> (PageRecord, Vec<Url>) {
    let fetched = tokio::select! {
        result = throttled_fetch(id, task, pace, ctx) => result,
        _ = cancelled_after_grace(ctx) => Err(FetchError::Cancelled),
    };

    let page = match fetched {
        Ok(page) => page,
        Err(e) => {
            warn!(url = %task.url, error = %e, "fetch failed");
            return (PageRecord::failed(task, PageStatus::FetchFailed, e), Vec::new());
        }
    };

    // A redirect may have taken us off the documentation tree
    if page.final_url != task.url && !ctx.scope.contains(&page.final_url) {
        warn!(url = %task.url, redirected_to = %page.final_url, "redirected out of scope");
        return (
            PageRecord::failed(
                task,
                PageStatus::OutOfScope,
                format!("redirected to {}", page.final_url),
            ),
            Vec::new(),
        );
    }

    let extracted = match ctx.extractor.extract(&page.html, &page.final_url) {
        Ok(extracted) => extracted,
        Err(e) => {
            warn!(url = %task.url, error = %e, "extraction failed");
            return (PageRecord::failed(task, PageStatus::ExtractFailed, e), Vec::new());
        }
    };

    let links = normalize_links(&extracted.links, &extracted.base_url);

    let children: Vec<Url> = if task.depth < ctx.max_depth {
        links.iter().filter(|url| ctx.scope.contains(url)).cloned().collect()
    } else {
        Vec::new()
    };

    debug!(
        worker = id,
        url = %task.url,
        depth = task.depth,
        links = links.len(),
        children = children.len(),
        "page extracted"
    );

    (
        PageRecord::success(task, extracted.title, extracted.body, links),
        children,
    )
}

async fn throttled_fetch(
    id: usize,
    task: &CrawlTask,
    pace: &mut WorkerPace,
    ctx: &WorkerContext<'_>,
) -> Result<FetchedPage, FetchError> {
    // A page still waiting for its slot is not in flight yet; after
    // cancellation it is given up without sending a request
    tokio::select! {
        _ = ctx.throttle.wait(pace) => {}
        _ = ctx.cancel.cancelled() => return Err(FetchError::Cancelled),
    }
    if ctx.cancel.is_cancelled() {
        return Err(FetchError::Cancelled);
    }
    debug!(worker = id, url = %task.url, depth = task.depth, "fetching");

    match tokio::time::timeout(ctx.request_timeout, ctx.fetcher.fetch(&task.url)).await {
        Ok(result) => result,
        Err(_) => Err(FetchError::Timeout),
    }
}

// Resolves grace_period after cancellation; never resolves otherwise
async fn cancelled_after_grace(ctx: &WorkerContext<'_>) {
    ctx.cancel.cancelled().await;
    tokio::time::sleep(ctx.grace_period).await;
}

// Resolves every href, dropping rejects and repeats but keeping page order
fn normalize_links(raw: &[String], base: &Url) -> Vec<Url> {
    let mut seen = HashSet::new();
    raw.iter()
        .filter_map(|href| normalize(href, base).ok())
        .filter(|url| seen.insert(url.as_str().to_owned()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_links_dedupes_in_page_order() {
        let base = Url::parse("https://docs.example.com/a/index.htm").unwrap();
        let raw = vec![
            "b.htm".to_string(),
            "mailto:x@example.com".to_string(),
            "b.htm#section".to_string(),
            "https://other.example.com/".to_string(),
            "c.htm?x=1".to_string(),
        ];

        let links: Vec<String> = normalize_links(&raw, &base)
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(
            links,
            vec![
                "https://docs.example.com/a/b.htm",
                "https://other.example.com/",
                "https://docs.example.com/a/c.htm",
            ]
        );
    }
}
