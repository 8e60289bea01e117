// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! DuckDuckGo's HTML-only result page.

use super::{
    parse_result_page, ResultLayout, SearchOutcome, SearchProvider, SearchResult, SEARCH_ACCEPT,
    SEARCH_TIMEOUT_MS, SEARCH_USER_AGENT,
};
use crate::acquisition::http_client::HttpClient;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://html.duckduckgo.com/html/";

pub struct DuckDuckGoProvider {
    endpoint: String,
    http: HttpClient,
}

impl DuckDuckGoProvider {
    pub fn new() -> Self {
        Self::with_endpoint(DEFAULT_ENDPOINT)
    }

    pub fn with_endpoint(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            http: HttpClient::new(SEARCH_USER_AGENT, SEARCH_TIMEOUT_MS)
                .with_default_header("Accept", SEARCH_ACCEPT),
        }
    }
}

impl Default for DuckDuckGoProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoProvider {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, max_results: usize) -> SearchOutcome {
        let url = match Url::parse_with_params(&self.endpoint, &[("q", query)]) {
            Ok(url) => url,
            Err(e) => return SearchOutcome::Failed(format!("bad endpoint: {e}")),
        };

        let body = match self
            .http
            .get(url.as_str(), &BTreeMap::new(), SEARCH_TIMEOUT_MS)
            .await
        {
            Ok(resp) => resp.body,
            Err(e) => {
                warn!(provider = "duckduckgo", "search failed: {e}");
                return SearchOutcome::Failed(e.to_string());
            }
        };

        match parse_results(&body, max_results) {
            Ok(results) => {
                debug!(provider = "duckduckgo", count = results.len(), "results parsed");
                SearchOutcome::from_results(results)
            }
            Err(e) => SearchOutcome::Failed(e),
        }
    }
}

const LAYOUT: ResultLayout = ResultLayout {
    block: ".result",
    title: ".result__title a",
    snippet: ".result__snippet",
};

/// Parse a DuckDuckGo HTML result page.
pub fn parse_results(body: &str, max_results: usize) -> Result<Vec<SearchResult>, String> {
    parse_result_page(body, max_results, &LAYOUT, "duckduckgo")
}
