// src/crawl/throttle.rs
// =============================================================================
// Polite crawling: a minimum gap between the *starts* of outbound fetches.
//
// Two scopes:
// - Global: one schedule shared by every worker. With a 1s delay the whole
//   crawler starts at most one fetch per second, however many workers run.
// - PerWorker: each worker keeps its own schedule, so N workers may start
//   up to N fetches per delay window.
//
// Slots are reserved under a lock and slept on outside it, so workers queue
// up in reservation order instead of all waking at once.
// =============================================================================

use clap::ValueEnum;
use serde::Serialize;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ThrottleScope {
    /// One fetch start per delay across all workers
    Global,
    /// One fetch start per delay for each worker
    PerWorker,
}

#[derive(Debug)]
pub struct Throttle {
    delay: Duration,
    scope: ThrottleScope,
    next_global: Mutex<Option<Instant>>,
}

/// A worker's own schedule, used when the scope is PerWorker
#[derive(Debug, Default)]
pub struct WorkerPace {
    next: Option<Instant>,
}

impl Throttle {
    pub fn new(delay: Duration, scope: ThrottleScope) -> Self {
        Self {
            delay,
            scope,
            next_global: Mutex::new(None),
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Waits until this worker may start its next fetch
    pub async fn wait(&self, pace: &mut WorkerPace) {
        if self.delay.is_zero() {
            return;
        }

        let start = match self.scope {
            ThrottleScope::Global => {
                let mut next = self
                    .next_global
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner);
                reserve(&mut next, self.delay)
            }
            ThrottleScope::PerWorker => reserve(&mut pace.next, self.delay),
        };

        sleep_until(start).await;
    }
}

// Takes the earliest free slot and pushes the schedule one delay further
fn reserve(next: &mut Option<Instant>, delay: Duration) -> Instant {
    let now = Instant::now();
    let start = match *next {
        Some(slot) if slot > now => slot,
        _ => now,
    };
    *next = Some(start + delay);
    start
}
