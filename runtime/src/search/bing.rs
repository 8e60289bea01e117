// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Bing web results, used when DuckDuckGo has nothing.

use super::{
    parse_result_page, ResultLayout, SearchOutcome, SearchProvider, SearchResult, SEARCH_ACCEPT,
    SEARCH_TIMEOUT_MS, SEARCH_USER_AGENT,
};
use crate::acquisition::http_client::HttpClient;
use async_trait::async_trait;
use std::collections::BTreeMap;
use tracing::{debug, warn};
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "https://www.bing.com/search";

pub struct BingProvider {
    endpoint: String,
    http: HttpClient,
}

impl BingProvider {
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

impl Default for BingProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SearchProvider for BingProvider {
    fn name(&self) -> &str {
        "bing"
    }

    async fn search(&self, query: &str, max_results: usize) -> SearchOutcome {
        let count = max_results.to_string();
        let params = [("q", query), ("count", count.as_str())];
        let url = match Url::parse_with_params(&self.endpoint, &params) {
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
                warn!(provider = "bing", "search failed: {e}");
                return SearchOutcome::Failed(e.to_string());
            }
        };

        match parse_results(&body, max_results) {
            Ok(results) => {
                debug!(provider = "bing", count = results.len(), "results parsed");
                SearchOutcome::from_results(results)
            }
            Err(e) => SearchOutcome::Failed(e),
        }
    }
}

const LAYOUT: ResultLayout = ResultLayout {
    block: ".b_algo",
    title: "h2 a",
    snippet: ".b_caption p, .b_caption div",
};

/// Parse a Bing result page. The snippet is the first caption paragraph
/// or block.
pub fn parse_results(body: &str, max_results: usize) -> Result<Vec<SearchResult>, String> {
    parse_result_page(body, max_results, &LAYOUT, "bing")
}
