// src/crawl/progress.rs
// =============================================================================
// Live crawl progress on the terminal.
//
// Shows pages done out of pages discovered so far, plus the last page seen:
//
//   ⠙ [00:00:42] [########>-------] 37/112 Crawled: Creating an Instance
//
// The total grows while the crawl runs because every finished level adds
// the links it found. A hidden bar keeps counting but draws nothing (used
// for --json and in tests).
// =============================================================================

use indicatif::{ProgressBar, ProgressStyle};

use super::types::PageRecord;

#[derive(Clone)]
pub struct CrawlProgress {
    bar: ProgressBar,
}

impl CrawlProgress {
    pub fn bar() -> Self {
        let bar = ProgressBar::new(1);
        bar.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:30.cyan/blue}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        Self { bar }
    }

    pub fn hidden() -> Self {
        Self {
            bar: ProgressBar::hidden(),
        }
    }

    // One more page finished; `discovered` is every URL claimed so far
    pub(super) fn page_done(&self, record: &PageRecord, discovered: usize) {
        self.bar.set_length(discovered.max(1) as u64);
        self.bar.inc(1);

        if record.is_success() {
            self.bar.set_message(format!("Crawled: {}", record.title));
        } else {
            self.bar.set_message(format!("Failed: {}", record.url));
        }
    }

    pub(super) fn finish(&self) {
        self.bar.finish_and_clear();
    }

    #[cfg(test)]
    pub fn done(&self) -> u64 {
        self.bar.position()
    }

    #[cfg(test)]
    pub fn discovered(&self) -> Option<u64> {
        self.bar.length()
    }

    #[cfg(test)]
    pub fn message(&self) -> String {
        self.bar.message()
    }
}
