// src/crawl/aggregator.rs
// =============================================================================
// Collects PageRecords as workers finish them and hands them back sorted by
// discovery order, so the final document does not depend on which fetch
// happened to return first.
// =============================================================================

use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use tracing::warn;

use super::types::{PageRecord, PageStatus};

#[derive(Debug, Default)]
pub struct Aggregator {
    records: Mutex<Vec<PageRecord>>,
}

/// Per-status page counts for the end-of-run report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrawlSummary {
    pub total: usize,
    pub succeeded: usize,
    pub fetch_failed: usize,
    pub extract_failed: usize,
    pub out_of_scope: usize,
    pub max_depth_reached: usize,
}

impl CrawlSummary {
    pub fn from_records(records: &[PageRecord]) -> Self {
        let mut summary = CrawlSummary {
            total: records.len(),
            ..Default::default()
        };

        for record in records {
            match record.status {
                PageStatus::Success => summary.succeeded += 1,
                PageStatus::FetchFailed => summary.fetch_failed += 1,
                PageStatus::ExtractFailed => summary.extract_failed += 1,
                PageStatus::OutOfScope => summary.out_of_scope += 1,
            }
            summary.max_depth_reached = summary.max_depth_reached.max(record.depth);
        }

        summary
    }

    pub fn failed(&self) -> usize {
        self.fetch_failed + self.extract_failed + self.out_of_scope
    }
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, page: PageRecord) {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(page);
    }

    /// Records collected so far, in completion order
    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn contains_order(&self, discovery_order: u64) -> bool {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .any(|r| r.discovery_order == discovery_order)
    }

    /// Takes every record collected so far, sorted by discovery order.
    ///
    /// Each task is recorded once; if a second record for the same discovery
    /// order shows up anyway, the first one is kept.
    pub fn finalize(&self) -> Vec<PageRecord> {
        let mut records =
            std::mem::take(&mut *self.records.lock().unwrap_or_else(PoisonError::into_inner));

        // Stable sort keeps the first-recorded duplicate ahead of later ones
        records.sort_by_key(|r| r.discovery_order);

        let before = records.len();
        records.dedup_by_key(|r| r.discovery_order);
        if records.len() != before {
            warn!(dropped = before - records.len(), "duplicate page records dropped");
        }

        records
    }
}
