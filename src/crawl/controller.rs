// src/crawl/controller.rs
// =============================================================================
// The crawl controller: runs one crawl from seed to finished page list.
//
// State machine:
//
//   Idle ──> Running ──> Draining ──> Done
//               │
//               └──────> Cancelled
//
// - Idle -> Running: the seed is claimed and queued, workers start
// - Running -> Draining: the frontier reports drained, workers wind down
// - Draining -> Done: all workers returned; records are finalized
// - Running -> Cancelled: the CancellationToken fired. The frontier stops
//   handing out work, in-flight fetches get the grace period, and the records
//   collected so far are still returned
//
// All crawl state (visited set, frontier, records) belongs to the controller
// instance, so several crawls can run side by side in one process.
// =============================================================================

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::aggregator::{Aggregator, CrawlSummary};
use super::frontier::Frontier;
use super::normalize::Scope;
use super::progress::CrawlProgress;
use super::throttle::Throttle;
use super::types::{PageRecord, PageStatus};
use super::worker::{run_worker, WorkerContext};
use crate::config::CrawlConfig;
use crate::error::{CrawlError, FetchError};
use crate::extract::Extractor;
use crate::fetch::Fetcher;

// Extra time past the grace period before stuck workers are abandoned
const BACKSTOP_MARGIN: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CrawlState {
    Idle,
    Running,
    Draining,
    Done,
    Cancelled,
}

/// The result of one crawl run
#[derive(Debug)]
pub struct CrawlOutcome {
    /// One record per dequeued task, sorted by discovery order
    pub records: Vec<PageRecord>,
    /// Done or Cancelled
    pub state: CrawlState,
    pub elapsed: Duration,
}

impl CrawlOutcome {
    pub fn summary(&self) -> CrawlSummary {
        CrawlSummary::from_records(&self.records)
    }

    pub fn was_cancelled(&self) -> bool {
        self.state == CrawlState::Cancelled
    }
}

pub struct CrawlController {
    config: CrawlConfig,
    scope: Scope,
    frontier: Frontier,
    aggregator: Aggregator,
    throttle: Throttle,
    fetcher: Arc<dyn Fetcher>,
    extractor: Arc<dyn Extractor>,
    progress: CrawlProgress,
    state: Mutex<CrawlState>,
}

impl CrawlController {
    pub fn new(
        config: CrawlConfig,
        fetcher: Arc<dyn Fetcher>,
        extractor: Arc<dyn Extractor>,
    ) -> Self {
        let scope = Scope::from_seed(&config.seed_url, &config.allow_prefixes);
        let frontier = Frontier::new(config.max_depth);
        let throttle = Throttle::new(config.request_delay, config.throttle_scope);

        Self {
            config,
            scope,
            frontier,
            aggregator: Aggregator::new(),
            throttle,
            fetcher,
            extractor,
            progress: CrawlProgress::hidden(),
            state: Mutex::new(CrawlState::Idle),
        }
    }

    /// Reports each finished page to `progress` (hidden by default)
    pub fn with_progress(mut self, progress: CrawlProgress) -> Self {
        self.progress = progress;
        self
    }

    #[cfg(test)]
    pub fn state(&self) -> CrawlState {
        *self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn transition(&self, to: CrawlState) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state != to {
            info!(from = ?*state, to = ?to, "crawl state changed");
            *state = to;
        }
    }

    /// Runs the crawl to completion or until `cancel` fires.
    ///
    /// A controller runs once; a second call returns CrawlError::AlreadyStarted.
    pub async fn run(&self, cancel: CancellationToken) -> Result<CrawlOutcome, CrawlError> {
        {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            if *state != CrawlState::Idle {
                return Err(CrawlError::AlreadyStarted);
            }
            *state = CrawlState::Running;
        }

        let started = Instant::now();
        info!(
            seed = %self.config.seed_url,
            host = self.scope.host(),
            prefixes = ?self.scope.prefixes(),
            max_depth = self.config.max_depth,
            workers = self.config.max_concurrency,
            delay_ms = self.throttle.delay().as_millis() as u64,
            "starting crawl"
        );

        self.frontier.seed(self.config.seed_url.clone());

        let ctx = WorkerContext {
            frontier: &self.frontier,
            aggregator: &self.aggregator,
            fetcher: self.fetcher.as_ref(),
            extractor: self.extractor.as_ref(),
            throttle: &self.throttle,
            scope: &self.scope,
            max_depth: self.config.max_depth,
            request_timeout: self.config.request_timeout,
            grace_period: self.config.grace_period,
            cancel: &cancel,
            progress: &self.progress,
        };
        let ctx = &ctx;

        let mut pool: FuturesUnordered<_> = (0..self.config.max_concurrency.max(1))
            .map(move |id| run_worker(id, ctx))
            .collect();

        let drained = self.frontier.wait_drained();
        tokio::pin!(drained);
        let mut drained_seen = false;
        let mut deadline: Option<Instant> = None;

        loop {
            tokio::select! {
                _ = cancel.cancelled(), if deadline.is_none() => {
                    self.transition(CrawlState::Cancelled);
                    warn!(
                        in_flight = self.frontier.in_flight().len(),
                        queued = self.frontier.queued(),
                        recorded = self.aggregator.len(),
                        grace_ms = self.config.grace_period.as_millis() as u64,
                        "crawl cancelled, waiting for in-flight pages"
                    );
                    self.frontier.close();
                    deadline = Some(Instant::now() + self.config.grace_period + BACKSTOP_MARGIN);
                }
                _ = &mut drained, if !drained_seen => {
                    drained_seen = true;
                    if deadline.is_none() {
                        self.transition(CrawlState::Draining);
                    }
                }
                finished = pool.next() => {
                    if finished.is_none() {
                        break;
                    }
                }
                _ = tokio::time::sleep_until(deadline.unwrap_or_else(Instant::now)), if deadline.is_some() => {
                    warn!(workers = pool.len(), "grace period over, abandoning in-flight pages");
                    break;
                }
            }
        }

        // Anything still leased here was cut off by the backstop. It was
        // dequeued, so it still gets a record.
        let abandoned = self.frontier.in_flight();
        drop(pool);
        for task in abandoned {
            if !self.aggregator.contains_order(task.discovery_order) {
                self.aggregator.record(PageRecord::failed(
                    &task,
                    PageStatus::FetchFailed,
                    FetchError::Cancelled,
                ));
            }
        }

        let state = if deadline.is_some() {
            CrawlState::Cancelled
        } else {
            // Workers can all return before the drained branch is polled
            self.transition(CrawlState::Draining);
            self.transition(CrawlState::Done);
            CrawlState::Done
        };

        self.progress.finish();
        let records = self.aggregator.finalize();
        let elapsed = started.elapsed();
        let summary = CrawlSummary::from_records(&records);
        info!(
            state = ?state,
            pages = summary.total,
            succeeded = summary.succeeded,
            failed = summary.failed(),
            claimed = self.frontier.visited().len(),
            drained = self.frontier.is_drained(),
            elapsed_ms = elapsed.as_millis() as u64,
            "crawl finished"
        );

        Ok(CrawlOutcome {
            records,
            state,
            elapsed,
        })
    }
}
