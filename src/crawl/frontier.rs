// src/crawl/frontier.rs
// =============================================================================
// The frontier: the queue of pages waiting to be crawled.
//
// How it works:
// 1. The seed is claimed and queued at depth 0 with discovery order 0
// 2. Workers pop() tasks; a popped task is "in flight" until its Lease is
//    finished (or dropped)
// 3. Finishing a lease stages the page's in-scope links under the page's
//    discovery order
// 4. When a level has nothing queued and nothing in flight, the staged links
//    are claimed in parent order (then link order) and queued as the next
//    level, each with a fresh discovery order
// 5. When nothing is queued, staged or in flight, the frontier is drained
//
// Staging by parent order is what makes discovery order independent of which
// fetch finished first: two runs over the same site number pages the same way.
//
// Concurrency:
// - all state lives behind one std Mutex that is never held across .await
// - waiting workers park on a tokio Notify and re-check state on wake-up
// =============================================================================

use std::collections::{BTreeMap, VecDeque};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::Notify;
use tracing::{debug, info};
use url::Url;

use super::types::CrawlTask;
use super::visited::VisitedSet;

// Links reported by one finished page, waiting for their level to open
#[derive(Debug)]
struct Staged {
    depth: usize,
    links: Vec<Url>,
}

#[derive(Debug, Default)]
struct FrontierState {
    queue: VecDeque<CrawlTask>,
    // parent discovery order -> children
    staged: BTreeMap<u64, Staged>,
    // discovery order -> task currently held by a worker
    in_flight: BTreeMap<u64, CrawlTask>,
    next_order: u64,
    closed: bool,
    drained: bool,
}

/// Depth-bounded, breadth-first work queue shared by all workers
#[derive(Debug)]
pub struct Frontier {
    max_depth: usize,
    visited: VisitedSet,
    state: Mutex<FrontierState>,
    changed: Notify,
}

impl Frontier {
    pub fn new(max_depth: usize) -> Self {
        Self {
            max_depth,
            visited: VisitedSet::new(),
            state: Mutex::new(FrontierState::default()),
            changed: Notify::new(),
        }
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    fn lock(&self) -> MutexGuard<'_, FrontierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Claims the seed URL and queues it at depth 0.
    /// Returns None if the URL was already claimed.
    pub fn seed(&self, url: Url) -> Option<CrawlTask> {
        let task = {
            let mut state = self.lock();
            self.admit(&mut state, url, 0)
        };
        self.changed.notify_waiters();
        task
    }

    // Claim, number and queue one URL. This is the only place discovery
    // orders are handed out, always under the state lock.
    fn admit(&self, state: &mut FrontierState, url: Url, depth: usize) -> Option<CrawlTask> {
        if depth > self.max_depth {
            return None;
        }
        if !self.visited.try_claim(&url) {
            return None;
        }

        let task = CrawlTask {
            url,
            depth,
            discovery_order: state.next_order,
        };
        state.next_order += 1;

        if self.push(state, task.clone()) {
            Some(task)
        } else {
            None
        }
    }

    // Tasks deeper than max_depth are silently dropped.
    fn push(&self, state: &mut FrontierState, task: CrawlTask) -> bool {
        if task.depth > self.max_depth || state.closed {
            debug!(url = %task.url, depth = task.depth, "dropping task");
            return false;
        }
        state.queue.push_back(task);
        true
    }

    /// Waits for the next task.
    ///
    /// Returns None once the frontier is drained or closed. An empty queue
    /// while other workers still hold tasks is not "drained": those workers
    /// may be about to report children, so this keeps waiting.
    pub async fn pop(&self) -> Option<Lease<'_>> {
        loop {
            // Register interest before looking at the state so a wake-up
            // between the check and the await is not lost
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            {
                let mut state = self.lock();
                if state.closed {
                    return None;
                }

                if let Some(task) = state.queue.pop_front() {
                    state.in_flight.insert(task.discovery_order, task.clone());
                    return Some(Lease {
                        frontier: self,
                        task,
                        children: Vec::new(),
                    });
                }

                if state.in_flight.is_empty() {
                    if state.staged.is_empty() {
                        state.closed = true;
                        state.drained = true;
                        info!(claimed = self.visited.len(), "frontier drained");
                        drop(state);
                        self.changed.notify_waiters();
                        return None;
                    }

                    self.promote(&mut state);
                    drop(state);
                    self.changed.notify_waiters();
                    continue;
                }
            }

            notified.await;
        }
    }

    // Opens the next level: claims every staged link in parent order.
    fn promote(&self, state: &mut FrontierState) {
        let staged = std::mem::take(&mut state.staged);
        let mut offered = 0usize;
        let mut admitted = 0usize;

        for (_, Staged { depth, links }) in staged {
            for url in links {
                offered += 1;
                if self.admit(state, url, depth).is_some() {
                    admitted += 1;
                }
            }
        }

        debug!(offered, admitted, "opened next crawl level");
    }

    // Called when a lease ends. Children are only kept while the frontier
    // is open and the parent is above the depth limit.
    fn release(&self, task: &CrawlTask, children: Vec<Url>) {
        {
            let mut state = self.lock();
            state.in_flight.remove(&task.discovery_order);

            if !state.closed && !children.is_empty() && task.depth < self.max_depth {
                state.staged.insert(
                    task.discovery_order,
                    Staged {
                        depth: task.depth + 1,
                        links: children,
                    },
                );
            }
        }
        self.changed.notify_waiters();
    }

    /// Resolves once the frontier has reported itself drained
    pub async fn wait_drained(&self) {
        loop {
            let notified = self.changed.notified();
            tokio::pin!(notified);
            notified.as_mut().enable();

            if self.lock().drained {
                return;
            }
            notified.await;
        }
    }

    /// Stops handing out work. Queued and staged tasks are abandoned.
    pub fn close(&self) {
        self.lock().closed = true;
        self.changed.notify_waiters();
    }

    pub fn is_drained(&self) -> bool {
        self.lock().drained
    }

    pub fn queued(&self) -> usize {
        self.lock().queue.len()
    }

    /// Tasks popped by workers that have not finished yet
    pub fn in_flight(&self) -> Vec<CrawlTask> {
        self.lock().in_flight.values().cloned().collect()
    }
}

/// A task popped from the frontier.
///
/// The task counts as in flight until the lease is finished or dropped.
/// Dropping without finish() reports no children.
#[derive(Debug)]
pub struct Lease<'a> {
    frontier: &'a Frontier,
    task: CrawlTask,
    children: Vec<Url>,
}

impl Lease<'_> {
    pub fn task(&self) -> &CrawlTask {
        &self.task
    }

    /// Ends the lease, reporting the page's in-scope links
    pub fn finish(mut self, children: Vec<Url>) {
        self.children = children;
    }
}

impl Drop for Lease<'_> {
    fn drop(&mut self) {
        let children = std::mem::take(&mut self.children);
        self.frontier.release(&self.task, children);
    }
}
