// src/cli.rs
// =============================================================================
// This file defines our command-line interface using the `clap` crate.
//
// We use the "derive" API: the Cli struct below *is* the argument list.
// Every option can also come from an environment variable (OCI_SCRAPER_*),
// which is handy in CI where flags are awkward to pass through.
//
// The values here are raw; config.rs validates them into a CrawlConfig.
// =============================================================================

use clap::Parser;
use std::path::PathBuf;

use crate::config::DEFAULT_TITLE;
use crate::crawl::ThrottleScope;

#[derive(Parser, Debug)]
#[command(
    name = "oci-docs-scraper",
    version,
    about = "Crawl Oracle Cloud Infrastructure documentation into a single markdown file",
    long_about = "oci-docs-scraper starts at a documentation page, follows the navigation links \
                  under the same path up to --max-depth levels, and writes every page's main text \
                  into one markdown document ready for NotebookLM or similar tools."
)]
pub struct Cli {
    /// Page to start crawling from
    ///
    /// Example: https://docs.oracle.com/en-us/iaas/Content/services.htm
    pub url: String,

    /// Maximum crawl depth (the start page is depth 0)
    #[arg(long, env = "OCI_SCRAPER_MAX_DEPTH", default_value_t = 3)]
    pub max_depth: usize,

    /// Minimum seconds between the start of two requests
    ///
    /// Be respectful: the default of 1 second keeps the load on the
    /// documentation servers low.
    #[arg(long, env = "OCI_SCRAPER_DELAY", default_value_t = 1.0)]
    pub delay: f64,

    /// Number of pages fetched concurrently
    #[arg(long, env = "OCI_SCRAPER_MAX_CONCURRENT", default_value_t = 4)]
    pub max_concurrent: usize,

    /// Whether --delay applies to all workers together or to each one
    #[arg(long, env = "OCI_SCRAPER_THROTTLE", value_enum, default_value_t = ThrottleScope::Global)]
    pub throttle: ThrottleScope,

    /// Output markdown file name (written inside --output-dir)
    #[arg(long, env = "OCI_SCRAPER_OUTPUT", default_value = "oracle_docs_scraped.md")]
    pub output: String,

    /// Directory for the markdown file and the URL list
    #[arg(long, env = "OCI_SCRAPER_OUTPUT_DIR", default_value = "scraped_docs")]
    pub output_dir: PathBuf,

    /// Per-request timeout in seconds
    #[arg(long, env = "OCI_SCRAPER_TIMEOUT", default_value_t = 10.0)]
    pub timeout: f64,

    /// Seconds in-flight requests may finish after Ctrl-C
    #[arg(long, env = "OCI_SCRAPER_GRACE_PERIOD", default_value_t = 5.0)]
    pub grace_period: f64,

    /// Additional path prefix to crawl on the same host (repeatable)
    ///
    /// By default only pages under the start page's directory are crawled.
    /// Example: --allow-prefix /en-us/iaas/
    #[arg(long, value_name = "PATH")]
    pub allow_prefix: Vec<String>,

    /// Also list pages that failed to download or parse in the document
    #[arg(long, env = "OCI_SCRAPER_INCLUDE_FAILED")]
    pub include_failed: bool,

    /// Title at the top of the generated document
    #[arg(long, env = "OCI_SCRAPER_TITLE", default_value = DEFAULT_TITLE)]
    pub title: String,

    /// Print the run summary as JSON on stdout
    #[arg(long)]
    pub json: bool,

    /// Show per-page debug logging (RUST_LOG overrides this)
    #[arg(short, long)]
    pub verbose: bool,
}
