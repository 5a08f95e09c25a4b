// src/render/markdown.rs
// =============================================================================
// Turns the ordered page records into one markdown document.
//
// Layout:
//
//   # <title>
//
//   *Scraped on 2026-01-31 12:00:00 UTC*
//
//   **Pages:** 12 scraped, 1 failed, max depth 2
//
//   ## Contents
//
//   ### Root (1 URL)
//
//   - [<page title>](<url>)
//
//   ### Level 1 (11 URLs)
//   ...
//
//   ---
//
//   ## <page title>          <- heading level is min(depth + 2, 6)
//
//   **Source URL:** <url>
//
//   <page text>
//
//   ---
//
// The output is a pure function of the records and options: the same crawl
// always renders the same bytes.
// =============================================================================

use std::collections::BTreeMap;
use std::fmt::Write;

use super::RenderOptions;
use crate::crawl::{CrawlSummary, PageRecord};

const MAX_HEADING_LEVEL: usize = 6;

// The seed (depth 0) gets "##" so the document title stays the only "#"
pub fn heading_level(depth: usize) -> usize {
    (depth + 2).min(MAX_HEADING_LEVEL)
}

pub fn render_markdown(records: &[PageRecord], options: &RenderOptions) -> String {
    let summary = CrawlSummary::from_records(records);
    let mut out = String::new();

    // Writing into a String cannot fail, so the fmt::Results are ignored
    let _ = writeln!(out, "# {}\n", options.title.trim());
    let _ = writeln!(
        out,
        "*Scraped on {}*\n",
        options.scraped_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    if let Some(seed) = &options.seed_url {
        let _ = writeln!(out, "**Start page:** {seed}\n");
    }
    let _ = writeln!(
        out,
        "**Pages:** {} scraped, {} failed, max depth {}\n",
        summary.succeeded,
        summary.failed(),
        summary.max_depth_reached
    );
    contents(&mut out, records);
    out.push_str("---\n\n");

    for record in records {
        if record.is_success() {
            section(&mut out, record);
        } else if options.include_failed {
            failed_section(&mut out, record);
        }
    }

    out
}

// Index of the scraped pages grouped by crawl depth, linking title to URL
fn contents(out: &mut String, records: &[PageRecord]) {
    let mut levels: BTreeMap<usize, Vec<&PageRecord>> = BTreeMap::new();
    for record in records.iter().filter(|r| r.is_success()) {
        levels.entry(record.depth).or_default().push(record);
    }
    if levels.is_empty() {
        return;
    }

    out.push_str("## Contents\n\n");
    for (depth, pages) in levels {
        let name = if depth == 0 {
            "Root".to_string()
        } else {
            format!("Level {depth}")
        };
        let noun = if pages.len() == 1 { "URL" } else { "URLs" };
        let _ = writeln!(out, "### {name} ({} {noun})\n", pages.len());

        for page in pages {
            let _ = writeln!(
                out,
                "- [{}](<{}>)",
                escape_link_text(&heading_text(page)),
                page.url
            );
        }
        out.push('\n');
    }
}

fn escape_link_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '[' | ']' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn section(out: &mut String, record: &PageRecord) {
    let level = heading_level(record.depth);
    let title = heading_text(record);

    let _ = writeln!(out, "{} {}\n", "#".repeat(level), title);
    let _ = writeln!(out, "**Source URL:** {}\n", record.url);

    let body = demote_headings(&record.body, level, &title);
    if !body.is_empty() {
        let _ = writeln!(out, "{body}\n");
    }
    out.push_str("---\n\n");
}

fn failed_section(out: &mut String, record: &PageRecord) {
    let level = heading_level(record.depth);
    let _ = writeln!(out, "{} {}\n", "#".repeat(level), heading_text(record));
    let _ = writeln!(out, "**Source URL:** {}\n", record.url);

    let status = serde_json::to_value(record.status)
        .ok()
        .and_then(|v| v.as_str().map(str::to_owned))
        .unwrap_or_default();
    match &record.error {
        Some(error) => {
            let _ = writeln!(out, "**Status:** {status} ({error})\n");
        }
        None => {
            let _ = writeln!(out, "**Status:** {status}\n");
        }
    }
    out.push_str("---\n\n");
}

// Titles become single-line headings; pages without one use their URL
fn heading_text(record: &PageRecord) -> String {
    let title = record.title.split_whitespace().collect::<Vec<_>>().join(" ");
    if title.is_empty() {
        record.url.to_string()
    } else {
        title
    }
}

// Pushes the page's own "#" headings below the section heading so the
// document outline stays nested. A leading heading that repeats the section
// title is dropped. Lines inside ``` fences are left alone.
fn demote_headings(body: &str, section_level: usize, title: &str) -> String {
    let mut lines = Vec::new();
    let mut in_fence = false;
    let mut seen_content = false;

    for line in body.lines() {
        if line.trim_start().starts_with("```") {
            in_fence = !in_fence;
            seen_content = true;
            lines.push(line.to_string());
            continue;
        }

        match (!in_fence).then(|| parse_heading(line)).flatten() {
            Some((level, text)) => {
                if !seen_content && text == title {
                    seen_content = true;
                    continue;
                }
                let level = (level + section_level).min(MAX_HEADING_LEVEL);
                lines.push(format!("{} {}", "#".repeat(level), text));
            }
            None => lines.push(line.to_string()),
        }

        if !line.trim().is_empty() {
            seen_content = true;
        }
    }

    lines.join("\n").trim().to_string()
}

// "### Text" -> (3, "Text")
fn parse_heading(line: &str) -> Option<(usize, &str)> {
    let level = line.chars().take_while(|&c| c == '#').count();
    if level == 0 || level > MAX_HEADING_LEVEL {
        return None;
    }
    let rest = &line[level..];
    if !rest.starts_with(' ') {
        return None;
    }
    Some((level, rest.trim()))
}

/// The plain-text URL list: a commented header and one scraped URL per line
pub fn render_url_list(records: &[PageRecord], options: &RenderOptions) -> String {
    let scraped: Vec<&PageRecord> = records.iter().filter(|r| r.is_success()).collect();

    let mut out = String::new();
    let _ = writeln!(out, "# {} URLs", options.title.trim());
    let _ = writeln!(
        out,
        "# Scraped on {}",
        options.scraped_at.format("%Y-%m-%d %H:%M:%S UTC")
    );
    let _ = writeln!(out, "# Total URLs: {}\n", scraped.len());
    for record in scraped {
        let _ = writeln!(out, "{}", record.url);
    }
    out
}
