// src/extract/html.rs
// =============================================================================
// Extracts the title, main text and navigation links from documentation HTML.
//
// We use the `scraper` crate which:
// - Parses HTML into a DOM (Document Object Model)
// - Supports CSS selectors for finding elements
// - Is built on html5ever (Mozilla's HTML parser)
//
// Heuristics:
// - Title: first non-empty h1, .page-title, .title or <title>
// - Content: first of main, .content, article, #content, ... falling back to
//   <body>, with navigation chrome, scripts and ads skipped
// - Links: sidebar / table-of-contents links first; if a page has none of
//   those, every <a href> on the page
// =============================================================================

use scraper::{ElementRef, Html, Node, Selector};
use std::collections::HashSet;
use url::Url;

use super::{ExtractedPage, Extractor};
use crate::error::ExtractError;

const UNTITLED: &str = "Untitled";

const TITLE_SELECTORS: &[&str] = &["h1", ".page-title", ".title", "title"];

const CONTENT_SELECTORS: &[&str] = &[
    "main",
    ".content",
    ".main-content",
    ".page-content",
    ".documentation-content",
    "article",
    ".article-content",
    "#content",
    "body",
];

// Never part of the page's own text
const SKIPPED_SELECTORS: &[&str] = &[
    "nav",
    "header",
    "footer",
    "script",
    "style",
    "noscript",
    "template",
    ".navigation",
    ".breadcrumb",
    ".toc",
    ".sidebar",
    ".left-nav",
    ".right-nav",
    ".advertisement",
    ".ads",
    ".social-share",
];

// Where Oracle's help center keeps its navigation tree
const NAV_LINK_SELECTORS: &[&str] = &[
    "nav a[href]",
    ".toc a[href]",
    ".ohc-toc a[href]",
    ".navigation a[href]",
    "aside a[href]",
    ".sidebar a[href]",
    ".left-nav a[href]",
    ".menu a[href]",
    "a[href*=\"/Content/\"]",
    "a[href*=\"/iaas/\"]",
];

// Block elements that start a new paragraph but carry no markup of their own
const BLOCK_ELEMENTS: &[&str] = &[
    "div", "section", "article", "main", "aside", "ul", "ol", "dl", "table", "thead", "tbody",
    "blockquote", "figure", "figcaption", "dd", "dt", "body", "form", "fieldset",
];

#[derive(Debug)]
pub struct HtmlExtractor {
    title: Vec<Selector>,
    content: Vec<Selector>,
    skipped: Vec<Selector>,
    nav_links: Vec<Selector>,
    any_link: Vec<Selector>,
    base: Vec<Selector>,
}

impl Default for HtmlExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HtmlExtractor {
    pub fn new() -> Self {
        Self {
            title: selectors(TITLE_SELECTORS),
            content: selectors(CONTENT_SELECTORS),
            skipped: selectors(SKIPPED_SELECTORS),
            nav_links: selectors(NAV_LINK_SELECTORS),
            any_link: selectors(&["a[href]"]),
            base: selectors(&["base[href]"]),
        }
    }

    fn title(&self, document: &Html) -> String {
        self.title
            .iter()
            .flat_map(|selector| document.select(selector))
            .map(collapsed_text)
            .find(|text| !text.is_empty())
            .unwrap_or_else(|| UNTITLED.to_string())
    }

    fn body(&self, document: &Html) -> String {
        let root = self
            .content
            .iter()
            .find_map(|selector| document.select(selector).next());

        let mut text = TextBuilder::default();
        if let Some(root) = root {
            self.walk(root, &mut text);
        }
        text.finish()
    }

    // Renders an element's children into the builder, skipping chrome
    fn walk(&self, element: ElementRef<'_>, text: &mut TextBuilder) {
        for child in element.children() {
            match child.value() {
                Node::Text(t) => text.inline(t),
                Node::Element(_) => {
                    if let Some(child) = ElementRef::wrap(child) {
                        if !self.skipped.iter().any(|s| s.matches(&child)) {
                            self.element(child, text);
                        }
                    }
                }
                _ => {}
            }
        }
    }

    fn element(&self, element: ElementRef<'_>, text: &mut TextBuilder) {
        let name = element.value().name();
        match name {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
                let heading = collapsed_text(element);
                if !heading.is_empty() {
                    let level = name[1..].parse::<usize>().unwrap_or(1);
                    text.block(&format!("{} {}", "#".repeat(level), heading));
                }
            }
            "p" => {
                let paragraph = self.flattened(element);
                if !paragraph.is_empty() {
                    text.block(&paragraph);
                }
            }
            "li" => {
                let item = self.flattened(element);
                if !item.is_empty() {
                    text.line(&format!("- {item}"));
                }
            }
            "tr" => {
                let row = self.flattened(element);
                if !row.is_empty() {
                    text.line(&row);
                }
            }
            "pre" => {
                let code: String = element.text().collect();
                let code = code.trim_matches('\n');
                if !code.trim().is_empty() {
                    text.block(&format!("```\n{code}\n```"));
                }
            }
            "br" => text.line(""),
            _ if BLOCK_ELEMENTS.contains(&name) => {
                text.paragraph_break();
                self.walk(element, text);
                text.paragraph_break();
            }
            _ => self.walk(element, text),
        }
    }

    // An element's rendered text squeezed onto one line
    fn flattened(&self, element: ElementRef<'_>) -> String {
        let mut nested = TextBuilder::default();
        self.walk(element, &mut nested);
        nested
            .finish()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn links(&self, document: &Html) -> Vec<String> {
        let nav = collect_hrefs(document, &self.nav_links);
        if nav.is_empty() {
            collect_hrefs(document, &self.any_link)
        } else {
            nav
        }
    }

    fn base_url(&self, document: &Html, page_url: &Url) -> Url {
        self.base
            .iter()
            .flat_map(|selector| document.select(selector))
            .filter_map(|base| base.value().attr("href"))
            .find_map(|href| page_url.join(href.trim()).ok())
            .unwrap_or_else(|| page_url.clone())
    }
}

impl Extractor for HtmlExtractor {
    fn extract(&self, html: &str, page_url: &Url) -> Result<ExtractedPage, ExtractError> {
        if html.trim().is_empty() {
            return Err(ExtractError::EmptyDocument);
        }

        let document = Html::parse_document(html);
        let title = self.title(&document);
        let body = self.body(&document);

        if title == UNTITLED && body.is_empty() {
            return Err(ExtractError::NoContent);
        }

        Ok(ExtractedPage {
            title,
            body,
            links: self.links(&document),
            base_url: self.base_url(&document, page_url),
        })
    }
}

// Selectors here are constants; one that fails to parse is simply unused
fn selectors(list: &[&str]) -> Vec<Selector> {
    list.iter().filter_map(|s| Selector::parse(s).ok()).collect()
}

fn collapsed_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

// href values matched by any of the selectors, in order, first occurrence only
fn collect_hrefs(document: &Html, selectors: &[Selector]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut hrefs = Vec::new();

    for selector in selectors {
        for element in document.select(selector) {
            if let Some(href) = element.value().attr("href") {
                let href = href.trim();
                if !href.is_empty() && seen.insert(href.to_string()) {
                    hrefs.push(href.to_string());
                }
            }
        }
    }

    hrefs
}

// Accumulates text with markdown-ish block structure and collapsed whitespace
#[derive(Debug, Default)]
struct TextBuilder {
    out: String,
    pending_space: bool,
}

impl TextBuilder {
    fn inline(&mut self, text: &str) {
        if text.trim().is_empty() {
            if !text.is_empty() {
                self.pending_space = true;
            }
            return;
        }

        if text.starts_with(char::is_whitespace) {
            self.pending_space = true;
        }
        for (i, word) in text.split_whitespace().enumerate() {
            if i > 0 || self.pending_space {
                self.space();
            }
            self.out.push_str(word);
            self.pending_space = false;
        }
        if text.ends_with(char::is_whitespace) {
            self.pending_space = true;
        }
    }

    fn space(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with(char::is_whitespace) {
            self.out.push(' ');
        }
    }

    fn paragraph_break(&mut self) {
        self.trim_trailing_spaces();
        if !self.out.is_empty() {
            while !self.out.ends_with("\n\n") {
                self.out.push('\n');
            }
        }
        self.pending_space = false;
    }

    fn block(&mut self, text: &str) {
        self.paragraph_break();
        self.out.push_str(text);
        self.paragraph_break();
    }

    fn line(&mut self, text: &str) {
        self.trim_trailing_spaces();
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
        self.out.push_str(text);
        self.out.push('\n');
        self.pending_space = false;
    }

    fn trim_trailing_spaces(&mut self) {
        let trimmed = self.out.trim_end_matches([' ', '\t']).len();
        self.out.truncate(trimmed);
    }

    fn finish(self) -> String {
        self.out.trim().to_string()
    }
}
