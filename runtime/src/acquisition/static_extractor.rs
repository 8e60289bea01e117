// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Static extraction: a single GET, parsed with `scraper`, no scripts run.

use super::http_client::HttpClient;
use crate::error::ExtractError;
use crate::extraction::document::{collect_result, ParsedDocument};
use crate::extraction::{
    ExtractionMethod, ExtractionRequest, ExtractionResult, Extractor, BROWSER_USER_AGENT,
    DEFAULT_TIMEOUT_MS,
};
use async_trait::async_trait;
use std::time::Instant;
use tracing::debug;

/// Extractor that parses the raw source markup.
pub struct StaticExtractor {
    http: HttpClient,
}

impl StaticExtractor {
    pub fn new() -> Self {
        let http = HttpClient::new(BROWSER_USER_AGENT, DEFAULT_TIMEOUT_MS)
            .with_default_header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .with_default_header("Accept-Language", "en-US,en;q=0.5");
        Self { http }
    }

    pub fn with_client(http: HttpClient) -> Self {
        Self { http }
    }
}

impl Default for StaticExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Extractor for StaticExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Static
    }

    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult, ExtractError> {
        let started = Instant::now();
        let options = request.options();
        let response = self
            .http
            .get(request.target(), &options.extra_headers, options.timeout_ms)
            .await?;
        debug!(
            url = %request.target(),
            final_url = %response.final_url,
            bytes = response.body.len(),
            "static document fetched"
        );

        let document = ParsedDocument::parse(response.body);
        collect_result(&document, request, ExtractionMethod::Static, started).await
    }
}
