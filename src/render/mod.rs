// src/render/mod.rs
// =============================================================================
// This module writes the crawl results to disk.
//
// Two files land in the output directory:
// - <output>.md: the combined markdown document (see markdown.rs)
// - <stem>_urls.txt: the list of scraped URLs
//
// Both are written even for an interrupted crawl, so a Ctrl-C never throws
// away the pages already downloaded.
// =============================================================================

mod markdown;

pub use markdown::{render_markdown, render_url_list};

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::info;
use url::Url;

use crate::config::CrawlConfig;
use crate::crawl::PageRecord;

/// Everything the renderer needs besides the records themselves
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    /// Passed in rather than read from the clock so output is reproducible
    pub scraped_at: DateTime<Utc>,
    pub include_failed: bool,
    pub seed_url: Option<Url>,
}

impl RenderOptions {
    pub fn from_config(config: &CrawlConfig, scraped_at: DateTime<Utc>) -> Self {
        Self {
            title: config.title.clone(),
            scraped_at,
            include_failed: config.include_failed,
            seed_url: Some(config.seed_url.clone()),
        }
    }
}

/// Where write_outputs put things
#[derive(Debug, Clone)]
pub struct OutputFiles {
    pub markdown: PathBuf,
    pub url_list: PathBuf,
}

pub fn write_outputs(
    config: &CrawlConfig,
    records: &[PageRecord],
    scraped_at: DateTime<Utc>,
) -> Result<OutputFiles> {
    let options = RenderOptions::from_config(config, scraped_at);
    let files = OutputFiles {
        markdown: config.output_path(),
        url_list: config.url_list_path(),
    };

    std::fs::write(&files.markdown, render_markdown(records, &options))
        .with_context(|| format!("failed to write {}", files.markdown.display()))?;
    std::fs::write(&files.url_list, render_url_list(records, &options))
        .with_context(|| format!("failed to write {}", files.url_list.display()))?;

    info!(
        markdown = %files.markdown.display(),
        url_list = %files.url_list.display(),
        pages = records.len(),
        "output written"
    );

    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crawl::testing::{self, FakeSite};
    use chrono::TimeZone;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn site() -> Arc<FakeSite> {
        Arc::new(
            FakeSite::new()
                .page("", "Overview", &["compute.htm", "storage.htm"])
                .page("compute.htm", "Compute", &["shapes.htm", "storage.htm"])
                .page("storage.htm", "Storage", &["compute.htm"])
                .page("shapes.htm", "Shapes", &[]),
        )
    }

    #[tokio::test]
    async fn test_two_runs_render_identical_markdown() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 8, 30, 0).unwrap();
        let mut rendered = Vec::new();

        for workers in [4, 2] {
            let outcome = testing::controller(testing::config(3, workers), &site())
                .run(CancellationToken::new())
                .await
                .unwrap();
            let options = RenderOptions::from_config(&testing::config(3, workers), at);
            rendered.push(render_markdown(&outcome.records, &options));
        }

        assert_eq!(rendered[0], rendered[1]);
        assert!(rendered[0].contains("## Overview"));
        assert!(rendered[0].contains("#### Shapes"));
    }

    #[tokio::test]
    async fn test_write_outputs_creates_both_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = testing::config(3, 2);
        config.output_dir = dir.path().join("out");
        config.output_file = "oci.md".to_string();
        config.prepare_output_dir().unwrap();

        let outcome = testing::controller(config.clone(), &site())
            .run(CancellationToken::new())
            .await
            .unwrap();
        let files = write_outputs(&config, &outcome.records, Utc::now()).unwrap();

        assert_eq!(files.markdown, dir.path().join("out/oci.md"));
        assert_eq!(files.url_list, dir.path().join("out/oci_urls.txt"));

        let markdown = std::fs::read_to_string(&files.markdown).unwrap();
        assert!(markdown.starts_with("# Oracle Cloud Infrastructure Documentation\n"));

        let urls = std::fs::read_to_string(&files.url_list).unwrap();
        assert_eq!(urls.lines().filter(|l| l.starts_with("https://")).count(), 4);
    }

    #[test]
    fn test_write_outputs_reports_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = testing::config(1, 1);
        config.output_dir = dir.path().join("never-created");

        let err = write_outputs(&config, &[], Utc::now()).unwrap_err();
        assert!(err.to_string().contains("failed to write"));
    }
}
