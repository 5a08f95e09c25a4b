// src/error.rs
// =============================================================================
// Error types for the crawl core.
//
// Only ConfigError (and CrawlError) stop a run. Everything that goes wrong
// with a single page (FetchError, ExtractError) is recorded on that page's
// PageRecord and the crawl keeps going.
//
// main.rs still uses anyhow::Result at the top level; these typed enums
// convert into anyhow::Error automatically through the ? operator.
// =============================================================================

use std::path::PathBuf;
use thiserror::Error;

/// Fatal problems detected before crawling starts
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid seed URL '{url}': {reason}")]
    InvalidSeedUrl { url: String, reason: String },

    #[error("--delay must be a finite, non-negative number of seconds (got {0})")]
    InvalidDelay(f64),

    #[error("--timeout must be a positive number of seconds (got {0})")]
    InvalidTimeout(f64),

    #[error("--grace-period must be a finite, non-negative number of seconds (got {0})")]
    InvalidGracePeriod(f64),

    #[error("--max-concurrent must be at least 1")]
    InvalidConcurrency,

    #[error("--allow-prefix must be an absolute path starting with '/' (got '{0}')")]
    InvalidPrefix(String),

    #[error("--output must be a file name, not a path (got '{0}')")]
    InvalidOutputName(String),

    #[error("cannot create output directory {path}: {source}")]
    OutputDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Why a single page could not be fetched
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,

    #[error("HTTP {0}")]
    Status(u16),

    #[error("too many redirects")]
    TooManyRedirects,

    #[error("could not resolve hostname")]
    Dns,

    #[error("connection failed")]
    Connect,

    #[error("SSL certificate error")]
    Tls,

    #[error("fetch cancelled")]
    Cancelled,

    #[error("{0}")]
    Other(String),
}

/// Why a fetched document could not be turned into title/body/links
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("document is empty")]
    EmptyDocument,

    #[error("no title or text content found")]
    NoContent,
}

/// Errors raised by the crawl controller itself
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("a crawl controller can only be run once")]
    AlreadyStarted,
}
