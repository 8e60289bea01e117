// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Tiered search: each provider in priority order, then demo results.

use super::bing::BingProvider;
use super::duckduckgo::DuckDuckGoProvider;
use super::{SearchOutcome, SearchProvider, SearchResult};
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

/// Hosts filtered out by [`SearchOrchestrator::validate_results`].
pub const UNWANTED_DOMAINS: [&str; 5] = [
    "facebook.com",
    "twitter.com",
    "instagram.com",
    "linkedin.com",
    "youtube.com",
];

pub struct SearchOrchestrator {
    providers: Vec<Arc<dyn SearchProvider>>,
}

impl SearchOrchestrator {
    /// Providers are consulted in the order given.
    pub fn new(providers: Vec<Arc<dyn SearchProvider>>) -> Self {
        Self { providers }
    }

    /// DuckDuckGo first, Bing second.
    pub fn with_default_providers() -> Self {
        Self::new(vec![
            Arc::new(DuckDuckGoProvider::new()),
            Arc::new(BingProvider::new()),
        ])
    }

    /// Search for `query`. Always returns something: when no provider
    /// finds results the demo set is returned instead.
    pub async fn search_websites(&self, query: &str, max_results: usize) -> Vec<SearchResult> {
        for provider in &self.providers {
            match provider.search(query, max_results).await {
                SearchOutcome::Found(results) => {
                    info!(
                        provider = provider.name(),
                        query,
                        count = results.len(),
                        "search succeeded"
                    );
                    return results;
                }
                SearchOutcome::Empty => {
                    info!(provider = provider.name(), query, "no results, trying next provider");
                }
                SearchOutcome::Failed(message) => {
                    warn!(provider = provider.name(), query, "provider failed: {message}");
                }
            }
        }

        warn!(query, "all search providers came up empty, serving demo results");
        demo_results(query, max_results)
    }

    /// Restrict the search to one site (`site:<domain> <query>`).
    pub async fn search_specific_site(
        &self,
        query: &str,
        site: &str,
        max_results: usize,
    ) -> Vec<SearchResult> {
        self.search_websites(&format!("site:{site} {query}"), max_results)
            .await
    }

    /// Restrict the search to a file type (`<query> filetype:<type>`).
    pub async fn search_file_type(
        &self,
        query: &str,
        file_type: &str,
        max_results: usize,
    ) -> Vec<SearchResult> {
        self.search_websites(&format!("{query} filetype:{file_type}"), max_results)
            .await
    }

    /// Append a free-form date range to the query.
    pub async fn search_with_date_range(
        &self,
        query: &str,
        date_range: &str,
        max_results: usize,
    ) -> Vec<SearchResult> {
        self.search_websites(&format!("{query} {date_range}"), max_results)
            .await
    }
}

/// Canned results fabricated from the query, used when every provider fails.
pub fn demo_results(query: &str, max_results: usize) -> Vec<SearchResult> {
    let sites = [
        (
            format!("Example.com - Information about {query}"),
            "https://example.com",
            format!("Find comprehensive information about {query} on this example website."),
        ),
        (
            format!("HTTPBin.org - Testing {query}"),
            "https://httpbin.org/html",
            format!("A simple HTML page for testing web scraping with {query} related content."),
        ),
        (
            format!("JsonPlaceholder - {query} API"),
            "https://jsonplaceholder.typicode.com",
            format!(
                "Free to use fake online REST API for testing and prototyping related to {query}."
            ),
        ),
    ];

    sites
        .into_iter()
        .take(max_results)
        .enumerate()
        .map(|(i, (title, url, snippet))| SearchResult {
            title,
            url: url.to_string(),
            snippet: format!("[DEMO MODE] {snippet}"),
            source: "demo".to_string(),
            rank: i + 1,
        })
        .collect()
}

/// Drop results with unparseable URLs or hosts on the unwanted list.
pub fn validate_results(results: Vec<SearchResult>) -> Vec<SearchResult> {
    results
        .into_iter()
        .filter(|result| {
            let Ok(url) = Url::parse(&result.url) else {
                return false;
            };
            let host = url.host_str().unwrap_or("");
            !UNWANTED_DOMAINS.iter().any(|domain| host.contains(domain))
        })
        .collect()
}

/// Query refinements offered alongside a search.
pub fn get_search_suggestions(query: &str) -> Vec<String> {
    ["tutorial", "examples", "guide", "documentation", "best practices"]
        .iter()
        .map(|suffix| format!("{query} {suffix}"))
        .collect()
}
