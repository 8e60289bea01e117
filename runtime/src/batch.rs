// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Concurrent scraping of a search result set.

use crate::extraction::orchestrator::ExtractionOrchestrator;
use crate::extraction::{ExtractionOptions, ExtractionRequest, ExtractionResult};
use crate::search::SearchResult;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Timeout applied to every batch item, regardless of the caller's choice.
pub const BATCH_ITEM_TIMEOUT_MS: u64 = 15_000;

/// A search hit together with what scraping it produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchItem {
    #[serde(flatten)]
    pub result: SearchResult,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scraped: Option<ExtractionResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub success: bool,
}

impl BatchItem {
    pub fn succeeded(result: SearchResult, scraped: ExtractionResult) -> Self {
        Self {
            result,
            scraped: Some(scraped),
            error: None,
            success: true,
        }
    }

    pub fn failed(result: SearchResult, error: impl Into<String>) -> Self {
        Self {
            result,
            scraped: None,
            error: Some(error.into()),
            success: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchSummary {
    pub total_found: usize,
    pub successful_scrapes: usize,
    pub failed_scrapes: usize,
}

impl BatchSummary {
    pub fn from_items(items: &[BatchItem]) -> Self {
        let successful_scrapes = items.iter().filter(|item| item.success).count();
        Self {
            total_found: items.len(),
            successful_scrapes,
            failed_scrapes: items.len() - successful_scrapes,
        }
    }
}

/// Fans a result set out over the extraction orchestrator.
pub struct BatchScrapeCoordinator {
    orchestrator: Arc<ExtractionOrchestrator>,
}

impl BatchScrapeCoordinator {
    pub fn new(orchestrator: Arc<ExtractionOrchestrator>) -> Self {
        Self { orchestrator }
    }

    /// Scrape every result concurrently. Output order matches `results`;
    /// a failed item never affects the others.
    ///
    /// Only `render_javascript` is taken from `options`. Items always use
    /// [`BATCH_ITEM_TIMEOUT_MS`] and no extra headers or selector wait.
    pub async fn scrape_all(
        &self,
        results: &[SearchResult],
        selector: &str,
        options: &ExtractionOptions,
    ) -> Vec<BatchItem> {
        let started = Instant::now();
        let item_options = ExtractionOptions {
            render_javascript: options.render_javascript,
            timeout_ms: BATCH_ITEM_TIMEOUT_MS,
            ..Default::default()
        };

        let items = join_all(
            results
                .iter()
                .map(|result| self.scrape_one(result, selector, &item_options)),
        )
        .await;

        let summary = BatchSummary::from_items(&items);
        info!(
            total = summary.total_found,
            ok = summary.successful_scrapes,
            failed = summary.failed_scrapes,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "batch scrape finished"
        );
        items
    }

    async fn scrape_one(
        &self,
        result: &SearchResult,
        selector: &str,
        options: &ExtractionOptions,
    ) -> BatchItem {
        let request = match ExtractionRequest::new(&result.url, selector, options.clone()) {
            Ok(request) => request,
            Err(e) => {
                debug!(url = %result.url, "skipping candidate: {e}");
                return BatchItem::failed(result.clone(), e.to_string());
            }
        };

        match self.orchestrator.scrape_website(&request).await {
            Ok(scraped) => BatchItem::succeeded(result.clone(), scraped),
            Err(e) => BatchItem::failed(result.clone(), e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::static_extractor::StaticExtractor;
    use crate::renderer::extractor::RenderedExtractor;
    use crate::renderer::{BrowserEngine, NoopLauncher};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn coordinator() -> BatchScrapeCoordinator {
        let engine = Arc::new(BrowserEngine::new(Arc::new(NoopLauncher)));
        let orchestrator = ExtractionOrchestrator::new(
            Arc::new(StaticExtractor::new()),
            Arc::new(RenderedExtractor::new(engine)),
        );
        BatchScrapeCoordinator::new(Arc::new(orchestrator))
    }

    fn candidate(url: String, rank: usize) -> SearchResult {
        SearchResult {
            title: format!("result {rank}"),
            url,
            snippet: String::new(),
            source: "duckduckgo".to_string(),
            rank,
        }
    }

    #[tokio::test]
    async fn test_middle_failure_is_isolated() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/one"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<h1>One</h1>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/three"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<p>Three</p>"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/two"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let inputs = vec![
            candidate(format!("{}/one", server.uri()), 1),
            candidate(format!("{}/two", server.uri()), 2),
            candidate(format!("{}/three", server.uri()), 3),
        ];
        let items = coordinator()
            .scrape_all(&inputs, "h1, h2, h3, p", &ExtractionOptions::default())
            .await;

        let flags: Vec<bool> = items.iter().map(|i| i.success).collect();
        assert_eq!(flags, vec![true, false, true]);
        let ranks: Vec<usize> = items.iter().map(|i| i.result.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
        assert_eq!(items[0].scraped.as_ref().unwrap().elements[0].text, "One");
        assert!(items[1]
            .error
            .as_deref()
            .unwrap()
            .starts_with("Scraping failed for"));

        assert_eq!(
            BatchSummary::from_items(&items),
            BatchSummary {
                total_found: 3,
                successful_scrapes: 2,
                failed_scrapes: 1
            }
        );
    }

    #[tokio::test]
    async fn test_empty_and_single_batches() {
        let coordinator = coordinator();
        let none = coordinator
            .scrape_all(&[], "h1", &ExtractionOptions::default())
            .await;
        assert!(none.is_empty());
        assert_eq!(BatchSummary::from_items(&none).total_found, 0);

        let one = coordinator
            .scrape_all(
                &[candidate("not a url".to_string(), 1)],
                "h1",
                &ExtractionOptions::default(),
            )
            .await;
        assert_eq!(one.len(), 1);
        assert!(!one[0].success);
        assert_eq!(one[0].error.as_deref(), Some("Invalid URL format"));
    }

    #[test]
    fn test_item_wire_format_flattens_search_result() {
        let item = BatchItem::failed(candidate("https://a.example".into(), 4), "boom");
        let v = serde_json::to_value(&item).unwrap();
        assert_eq!(v["url"], "https://a.example");
        assert_eq!(v["rank"], 4);
        assert_eq!(v["error"], "boom");
        assert_eq!(v["success"], false);
        assert!(v.get("scraped").is_none());

        let summary = serde_json::to_value(BatchSummary::from_items(&[item])).unwrap();
        assert_eq!(summary["failedScrapes"], 1);
        assert_eq!(summary["totalFound"], 1);
    }
}
