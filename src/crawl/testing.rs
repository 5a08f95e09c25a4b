// src/crawl/testing.rs
// =============================================================================
// An in-memory documentation site for crawl tests.
//
// FakeSite implements Fetcher. Each page has a title, some text, nav links
// and a scripted behavior (serve HTML after a delay, fail, hang forever,
// redirect, or serve garbage). It counts fetches per URL and the peak number
// of concurrent fetches so tests can check de-duplication and pool bounds.
// =============================================================================

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use url::Url;

use crate::config::CrawlConfig;
use crate::error::FetchError;
use crate::extract::HtmlExtractor;
use crate::fetch::{FetchedPage, Fetcher};

use super::controller::CrawlController;

pub const ROOT: &str = "https://docs.example.com/a/";

pub fn url(path: &str) -> Url {
    Url::parse(ROOT).unwrap().join(path).unwrap()
}

#[derive(Debug, Clone)]
pub enum Behavior {
    Serve,
    Fail(FetchError),
    Hang,
    RedirectTo(Url),
    Garbage,
}

#[derive(Debug, Clone)]
pub struct FakePage {
    pub title: String,
    pub body: String,
    pub links: Vec<String>,
    pub delay: Duration,
    pub behavior: Behavior,
}

#[derive(Debug, Default)]
pub struct FakeSite {
    pages: HashMap<String, FakePage>,
    fetches: Mutex<HashMap<String, usize>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeSite {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a page served at ROOT-relative `path`, linking to `links`
    pub fn page(mut self, path: &str, title: &str, links: &[&str]) -> Self {
        self.pages.insert(
            url(path).to_string(),
            FakePage {
                title: title.to_string(),
                body: format!("Text of {title}."),
                links: links.iter().map(|l| l.to_string()).collect(),
                delay: Duration::ZERO,
                behavior: Behavior::Serve,
            },
        );
        self
    }

    pub fn delay(mut self, path: &str, delay: Duration) -> Self {
        if let Some(page) = self.pages.get_mut(url(path).as_str()) {
            page.delay = delay;
        }
        self
    }

    pub fn behave(mut self, path: &str, behavior: Behavior) -> Self {
        if let Some(page) = self.pages.get_mut(url(path).as_str()) {
            page.behavior = behavior;
        }
        self
    }

    pub fn fetch_count(&self, url: &Url) -> usize {
        self.fetches.lock().unwrap().get(url.as_str()).copied().unwrap_or(0)
    }

    pub fn fetch_counts(&self) -> HashMap<String, usize> {
        self.fetches.lock().unwrap().clone()
    }

    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn html(page: &FakePage) -> String {
        let nav: String = page
            .links
            .iter()
            .map(|href| format!("<a href=\"{href}\">{href}</a>"))
            .collect();
        format!(
            "<html><head><title>{t}</title></head><body><nav>{nav}</nav>\
             <main><h1>{t}</h1><p>{b}</p></main></body></html>",
            t = page.title,
            b = page.body,
        )
    }
}

// Decrements the active-fetch counter even when a fetch future is dropped
struct ActiveGuard<'a>(&'a AtomicUsize);

impl Drop for ActiveGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl Fetcher for FakeSite {
    async fn fetch(&self, url: &Url) -> Result<FetchedPage, FetchError> {
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default() += 1;

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        let _active = ActiveGuard(&self.active);

        let Some(page) = self.pages.get(url.as_str()) else {
            return Err(FetchError::Status(404));
        };

        if !page.delay.is_zero() {
            tokio::time::sleep(page.delay).await;
        }

        match &page.behavior {
            Behavior::Serve => Ok(FetchedPage {
                final_url: url.clone(),
                html: Self::html(page),
            }),
            Behavior::Fail(e) => Err(e.clone()),
            Behavior::Hang => futures::future::pending().await,
            Behavior::RedirectTo(target) => Ok(FetchedPage {
                final_url: target.clone(),
                html: Self::html(page),
            }),
            Behavior::Garbage => Ok(FetchedPage {
                final_url: url.clone(),
                html: "<script>only()</script>".to_string(),
            }),
        }
    }
}

/// A test config: no politeness delay, generous timeouts
pub fn config(max_depth: usize, workers: usize) -> CrawlConfig {
    let mut config = CrawlConfig::new(url(""));
    config.max_depth = max_depth;
    config.max_concurrency = workers;
    config.request_delay = Duration::ZERO;
    config.request_timeout = Duration::from_secs(30);
    config.grace_period = Duration::from_millis(100);
    config
}

pub fn controller(config: CrawlConfig, site: &Arc<FakeSite>) -> CrawlController {
    CrawlController::new(config, site.clone(), Arc::new(HtmlExtractor::new()))
}
