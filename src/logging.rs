// src/logging.rs
// =============================================================================
// Sets up `tracing` output for the crawler.
//
// - Logs go to stderr; stdout is reserved for the summary (and --json)
// - RUST_LOG wins when it is set, e.g. RUST_LOG=oci_docs_scraper=trace
// - Otherwise: info for this crate, debug with -v, warn for dependencies
// =============================================================================

use anyhow::Result;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,oci_docs_scraper=debug"
    } else {
        "warn,oci_docs_scraper=info"
    }
}

pub fn init_logging(verbose: bool) -> Result<()> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(verbose))?,
    };

    let fmt_layer = fmt::layer()
        .with_target(verbose)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt_layer)
        .try_init()?;

    Ok(())
}
