// src/config.rs
// =============================================================================
// CrawlConfig: everything a crawl run needs, validated once up front.
//
// The CLI hands us raw numbers and strings; this module turns them into
// Durations, a parsed seed Url and a ready output directory, or fails with a
// ConfigError before any network traffic happens.
// =============================================================================

use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

use crate::cli::Cli;
use crate::crawl::{normalize_seed, ThrottleScope};
use crate::error::ConfigError;

pub const DEFAULT_TITLE: &str = "Oracle Cloud Infrastructure Documentation";

#[derive(Debug, Clone)]
pub struct CrawlConfig {
    pub seed_url: Url,
    /// Seed is depth 0; pages at max_depth are fetched but not expanded
    pub max_depth: usize,
    /// Minimum gap between the starts of two fetches
    pub request_delay: Duration,
    pub max_concurrency: usize,
    pub output_dir: PathBuf,
    pub output_file: String,
    pub request_timeout: Duration,
    /// How long in-flight fetches may keep running after cancellation
    pub grace_period: Duration,
    pub throttle_scope: ThrottleScope,
    /// Extra path prefixes on the seed's host that count as in scope
    pub allow_prefixes: Vec<String>,
    /// Render failed pages in the document instead of leaving them out
    pub include_failed: bool,
    pub title: String,
}

impl CrawlConfig {
    /// A config with the CLI defaults
    #[cfg(test)]
    pub fn new(seed_url: Url) -> Self {
        Self {
            seed_url,
            max_depth: 3,
            request_delay: Duration::from_secs(1),
            max_concurrency: 4,
            output_dir: PathBuf::from("scraped_docs"),
            output_file: "oracle_docs_scraped.md".to_string(),
            request_timeout: Duration::from_secs(10),
            grace_period: Duration::from_secs(5),
            throttle_scope: ThrottleScope::Global,
            allow_prefixes: Vec::new(),
            include_failed: false,
            title: DEFAULT_TITLE.to_string(),
        }
    }

    // Validates CLI input. Does not touch the filesystem.
    pub fn from_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let seed_url = normalize_seed(&cli.url).map_err(|reason| ConfigError::InvalidSeedUrl {
            url: cli.url.clone(),
            reason,
        })?;

        let request_delay = seconds(cli.delay).ok_or(ConfigError::InvalidDelay(cli.delay))?;
        let request_timeout = seconds(cli.timeout)
            .filter(|d| !d.is_zero())
            .ok_or(ConfigError::InvalidTimeout(cli.timeout))?;
        let grace_period =
            seconds(cli.grace_period).ok_or(ConfigError::InvalidGracePeriod(cli.grace_period))?;

        if cli.max_concurrent == 0 {
            return Err(ConfigError::InvalidConcurrency);
        }

        if let Some(bad) = cli.allow_prefix.iter().find(|p| !p.starts_with('/')) {
            return Err(ConfigError::InvalidPrefix(bad.clone()));
        }

        // Output goes into output_dir; a path here would escape it
        let is_plain_name = Path::new(&cli.output)
            .file_name()
            .map(|name| name == cli.output.as_str())
            .unwrap_or(false);
        if !is_plain_name {
            return Err(ConfigError::InvalidOutputName(cli.output.clone()));
        }

        Ok(Self {
            seed_url,
            max_depth: cli.max_depth,
            request_delay,
            max_concurrency: cli.max_concurrent,
            output_dir: cli.output_dir.clone(),
            output_file: cli.output.clone(),
            request_timeout,
            grace_period,
            throttle_scope: cli.throttle,
            allow_prefixes: cli.allow_prefix.clone(),
            include_failed: cli.include_failed,
            title: cli.title.clone(),
        })
    }

    /// Creates the output directory so an unwritable location fails before crawling
    pub fn prepare_output_dir(&self) -> Result<(), ConfigError> {
        std::fs::create_dir_all(&self.output_dir).map_err(|source| ConfigError::OutputDir {
            path: self.output_dir.clone(),
            source,
        })
    }

    pub fn output_path(&self) -> PathBuf {
        self.output_dir.join(&self.output_file)
    }

    // "docs.md" -> "<dir>/docs_urls.txt"
    pub fn url_list_path(&self) -> PathBuf {
        let stem = Path::new(&self.output_file)
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("oracle_docs_scraped");
        self.output_dir.join(format!("{stem}_urls.txt"))
    }
}

fn seconds(value: f64) -> Option<Duration> {
    if value.is_finite() && value >= 0.0 {
        Duration::try_from_secs_f64(value).ok()
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn cli(args: &[&str]) -> Cli {
        let mut argv = vec!["oci-docs-scraper"];
        argv.extend_from_slice(args);
        Cli::parse_from(argv)
    }

    #[test]
    fn test_defaults_from_cli() {
        let config =
            CrawlConfig::from_cli(&cli(&["https://docs.oracle.com/en-us/iaas/Content/services.htm"]))
                .unwrap();

        assert_eq!(config.max_depth, 3);
        assert_eq!(config.request_delay, Duration::from_secs(1));
        assert_eq!(config.output_path(), PathBuf::from("scraped_docs/oracle_docs_scraped.md"));
        assert_eq!(
            config.url_list_path(),
            PathBuf::from("scraped_docs/oracle_docs_scraped_urls.txt")
        );
        assert_eq!(config.throttle_scope, ThrottleScope::Global);
    }

    #[test]
    fn test_rejects_bad_seed() {
        let err = CrawlConfig::from_cli(&cli(&["docs.oracle.com"])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidSeedUrl { .. }));
    }

    #[test]
    fn test_rejects_negative_delay_and_zero_workers() {
        let err = CrawlConfig::from_cli(&cli(&["https://docs.example.com/", "--delay=-1"]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidDelay(_)));

        let err = CrawlConfig::from_cli(&cli(&["https://docs.example.com/", "--max-concurrent", "0"]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidConcurrency));

        let err = CrawlConfig::from_cli(&cli(&["https://docs.example.com/", "--timeout", "0"]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTimeout(_)));
    }

    #[test]
    fn test_rejects_output_paths() {
        let err = CrawlConfig::from_cli(&cli(&["https://docs.example.com/", "--output", "../x.md"]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidOutputName(_)));
    }

    #[test]
    fn test_unwritable_output_dir_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("not-a-dir");
        std::fs::write(&file, "x").unwrap();

        let mut config = CrawlConfig::new(Url::parse("https://docs.example.com/").unwrap());
        config.output_dir = file.join("nested");
        assert!(matches!(
            config.prepare_output_dir(),
            Err(ConfigError::OutputDir { .. })
        ));
    }
}
