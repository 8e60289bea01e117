// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Web search across HTML result pages.
//!
//! Providers never fail the caller: every lookup ends in a [`SearchOutcome`].
//! The [`orchestrator::SearchOrchestrator`] walks providers in priority order
//! and falls back to canned demo results when none of them produce anything.

pub mod bing;
pub mod duckduckgo;
pub mod orchestrator;

use async_trait::async_trait;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};

/// User agent sent to search engines.
pub const SEARCH_USER_AGENT: &str = "Educational Web Scraper 1.0";

/// Per-request timeout for result-page fetches.
pub const SEARCH_TIMEOUT_MS: u64 = 10_000;

/// Accept header sent with result-page fetches.
pub(crate) const SEARCH_ACCEPT: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";

/// Default number of results for search endpoints and commands.
pub const DEFAULT_MAX_RESULTS: usize = 5;

/// A single search hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    pub snippet: String,
    /// Provider name, or `"demo"` for fallback results.
    pub source: String,
    /// 1-based position of the hit on the provider's result page.
    pub rank: usize,
}

/// What a provider lookup produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    Found(Vec<SearchResult>),
    Empty,
    Failed(String),
}

impl SearchOutcome {
    pub(crate) fn from_results(results: Vec<SearchResult>) -> Self {
        if results.is_empty() {
            SearchOutcome::Empty
        } else {
            SearchOutcome::Found(results)
        }
    }
}

/// A search backend.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str, max_results: usize) -> SearchOutcome;
}

/// CSS selectors locating hits on one engine's result page.
pub(crate) struct ResultLayout {
    /// One result block.
    pub block: &'static str,
    /// The title anchor inside a block.
    pub title: &'static str,
    /// The snippet inside a block; the first match wins.
    pub snippet: &'static str,
}

/// Walk the result blocks of `body`, keeping at most `max_results` hits.
/// Rank is the block's position on the page, so skipped blocks leave gaps.
pub(crate) fn parse_result_page(
    body: &str,
    max_results: usize,
    layout: &ResultLayout,
    source: &str,
) -> Result<Vec<SearchResult>, String> {
    let block_sel = Selector::parse(layout.block).map_err(|e| e.to_string())?;
    let title_sel = Selector::parse(layout.title).map_err(|e| e.to_string())?;
    let snippet_sel = Selector::parse(layout.snippet).map_err(|e| e.to_string())?;

    let document = Html::parse_document(body);
    let mut results = Vec::new();

    for (index, hit) in document.select(&block_sel).enumerate() {
        if results.len() >= max_results {
            break;
        }
        let Some(anchor) = hit.select(&title_sel).next() else {
            continue;
        };
        let title = element_text(&anchor);
        let Some(url) = accept_hit(&title, anchor.value().attr("href")) else {
            continue;
        };
        let snippet = hit
            .select(&snippet_sel)
            .next()
            .map(|el| element_text(&el))
            .unwrap_or_default();

        results.push(SearchResult {
            title,
            url,
            snippet,
            source: source.to_string(),
            rank: index + 1,
        });
    }

    Ok(results)
}

/// Keep an anchor only when it looks like a real result link.
pub(crate) fn accept_hit(title: &str, href: Option<&str>) -> Option<String> {
    let href = href?;
    if title.is_empty() || !href.starts_with("http") {
        return None;
    }
    Some(href.to_string())
}

/// Trimmed text content of an element.
pub(crate) fn element_text(element: &scraper::ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accept_hit_requires_title_and_http_link() {
        assert_eq!(
            accept_hit("Rust", Some("https://rust-lang.org")).as_deref(),
            Some("https://rust-lang.org")
        );
        assert!(accept_hit("", Some("https://rust-lang.org")).is_none());
        assert!(accept_hit("Rust", Some("/l/?uddg=x")).is_none());
        assert!(accept_hit("Rust", None).is_none());
    }

    #[test]
    fn test_parse_result_page_with_custom_layout() {
        let layout = ResultLayout {
            block: "li.hit",
            title: "a",
            snippet: "span",
        };
        let body = r#"<ul>
            <li class="hit"><a href="https://one.example">One</a><span>first</span></li>
            <li class="hit"><a href="/relative">Skipped</a></li>
            <li class="hit"><a href="https://three.example">Three</a></li>
            <li class="hit"><a href="https://four.example">Four</a></li>
        </ul>"#;

        let results = parse_result_page(body, 2, &layout, "test").unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].snippet, "first");
        assert_eq!(results[1].title, "Three");
        assert_eq!(results[1].rank, 3);
        assert_eq!(results[1].snippet, "");
        assert!(results.iter().all(|r| r.source == "test"));

        let bad = ResultLayout {
            block: "li[",
            title: "a",
            snippet: "span",
        };
        assert!(parse_result_page(body, 2, &bad, "test").is_err());
    }

    #[test]
    fn test_outcome_from_results() {
        assert_eq!(SearchOutcome::from_results(vec![]), SearchOutcome::Empty);
        let hit = SearchResult {
            title: "t".into(),
            url: "https://a.example".into(),
            snippet: String::new(),
            source: "bing".into(),
            rank: 1,
        };
        assert!(matches!(
            SearchOutcome::from_results(vec![hit]),
            SearchOutcome::Found(v) if v.len() == 1
        ));
    }
}
