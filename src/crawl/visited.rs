// src/crawl/visited.rs
// =============================================================================
// The set of URLs that have been claimed for this run.
//
// try_claim() is the only way in. It checks and inserts under one lock, so
// two workers can never both decide a URL is "new". There is no removal:
// once claimed, a URL stays claimed until the run ends.
// =============================================================================

use std::collections::HashSet;
use std::sync::{Mutex, PoisonError};
use url::Url;

#[derive(Debug, Default)]
pub struct VisitedSet {
    urls: Mutex<HashSet<String>>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true only for the first claim of a URL
    pub fn try_claim(&self, url: &Url) -> bool {
        // HashSet::insert already is the atomic check-and-insert we need
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.as_str().to_owned())
    }

    #[cfg(test)]
    pub fn contains(&self, url: &Url) -> bool {
        self.urls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(url.as_str())
    }

    pub fn len(&self) -> usize {
        self.urls.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
