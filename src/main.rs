// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap and validate them
// 2. Set up logging and the output directory
// 3. Run the crawl (Ctrl-C cancels it gracefully)
// 4. Write the markdown document and the URL list, print a summary
// 5. Exit with proper code (0 = done, 2 = error, 130 = interrupted)
//
// Rust concepts used:
// - async/await: many pages are fetched concurrently
// - Arc<dyn Trait>: the controller only sees the Fetcher/Extractor seams
// - Result<T, E> with anyhow: errors bubble up to one place and become exit 2
// =============================================================================

// Module declarations - tells Rust about our other source files
mod cli; // src/cli.rs - command-line parsing
mod config; // src/config.rs - validated crawl settings
mod crawl; // src/crawl/ - frontier, workers and the controller
mod error; // src/error.rs - typed errors
mod extract; // src/extract/ - title/text/link extraction
mod fetch; // src/fetch/ - HTTP fetching
mod logging; // src/logging.rs - tracing setup
mod render; // src/render/ - markdown output

use anyhow::{Context, Result};
use chrono::Utc;
use clap::Parser;
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{error, warn};

use cli::Cli;
use config::CrawlConfig;
use crawl::{CrawlController, CrawlProgress, CrawlState, CrawlSummary};
use extract::HtmlExtractor;
use fetch::HttpFetcher;

const EXIT_DONE: i32 = 0;
const EXIT_ERROR: i32 = 2;
// 128 + SIGINT, what shells report for Ctrl-C
const EXIT_INTERRUPTED: i32 = 130;

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // {:#} prints the whole context chain on one line
            error!("{e:#}");
            eprintln!("Error: {e:#}");
            EXIT_ERROR
        }
    };

    std::process::exit(exit_code);
}

// What --json prints on stdout
#[derive(Serialize)]
struct RunReport<'a> {
    seed_url: &'a str,
    state: CrawlState,
    elapsed_secs: f64,
    summary: CrawlSummary,
    markdown: PathBuf,
    url_list: PathBuf,
}

async fn run() -> Result<i32> {
    let cli = Cli::parse();

    logging::init_logging(cli.verbose).context("failed to initialise logging")?;

    let config = CrawlConfig::from_cli(&cli)?;
    config.prepare_output_dir()?;

    if !cli.json {
        println!("🔍 Crawling: {}", config.seed_url);
        println!(
            "📊 Max depth: {}, workers: {}, delay: {:.1}s",
            config.max_depth,
            config.max_concurrency,
            config.request_delay.as_secs_f64()
        );
    }

    let fetcher = Arc::new(HttpFetcher::new(config.request_timeout)?);
    let extractor = Arc::new(HtmlExtractor::new());
    // --json runs draw nothing on the terminal
    let progress = if cli.json {
        CrawlProgress::hidden()
    } else {
        CrawlProgress::bar()
    };
    let controller =
        CrawlController::new(config.clone(), fetcher, extractor).with_progress(progress);

    // First Ctrl-C cancels the crawl; in-flight pages get the grace period
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("interrupt received, stopping after in-flight pages");
            on_signal.cancel();
        }
    });

    let outcome = controller.run(cancel).await?;
    let files = render::write_outputs(&config, &outcome.records, Utc::now())?;
    let summary = outcome.summary();

    if cli.json {
        let report = RunReport {
            seed_url: config.seed_url.as_str(),
            state: outcome.state,
            elapsed_secs: outcome.elapsed.as_secs_f64(),
            summary,
            markdown: files.markdown,
            url_list: files.url_list,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print_summary(&summary, outcome.elapsed.as_secs_f64(), outcome.was_cancelled());
        println!("📄 Markdown: {}", files.markdown.display());
        println!("📋 URL list: {}", files.url_list.display());
    }

    if outcome.was_cancelled() {
        Ok(EXIT_INTERRUPTED)
    } else {
        Ok(EXIT_DONE)
    }
}

fn print_summary(summary: &CrawlSummary, elapsed_secs: f64, cancelled: bool) {
    println!();
    if cancelled {
        println!("⚠️  Crawl interrupted, writing the pages scraped so far");
    }
    println!("📊 Summary:");
    println!("   ✅ Scraped: {}", summary.succeeded);
    if summary.failed() > 0 {
        println!("   ❌ Fetch failed: {}", summary.fetch_failed);
        println!("   🧩 Extraction failed: {}", summary.extract_failed);
        println!("   🔀 Redirected out of scope: {}", summary.out_of_scope);
    }
    println!("   📏 Max depth reached: {}", summary.max_depth_reached);
    println!("   📋 Total: {} page(s) in {:.1}s", summary.total, elapsed_secs);
}
