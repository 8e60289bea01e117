// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Strategy selection for a single extraction.
//!
//! Rendered extraction is used when the caller asks for JavaScript;
//! otherwise the static strategy runs first and the rendered one is tried
//! once if it fails.

use super::{ExtractionRequest, ExtractionResult, Extractor};
use crate::acquisition::policy::PolicyChecker;
use crate::acquisition::static_extractor::StaticExtractor;
use crate::error::ScrapeError;
use crate::renderer::extractor::RenderedExtractor;
use crate::renderer::BrowserEngine;
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

pub struct ExtractionOrchestrator {
    policy: Option<PolicyChecker>,
    static_extractor: Arc<dyn Extractor>,
    rendered_extractor: Arc<dyn Extractor>,
}

impl ExtractionOrchestrator {
    /// Orchestrator without a robots.txt check.
    pub fn new(static_extractor: Arc<dyn Extractor>, rendered_extractor: Arc<dyn Extractor>) -> Self {
        Self {
            policy: None,
            static_extractor,
            rendered_extractor,
        }
    }

    /// Static HTTP extraction with rendered fallback on `engine`, checking
    /// robots.txt first.
    pub fn standard(engine: Arc<BrowserEngine>) -> Self {
        Self::new(
            Arc::new(StaticExtractor::new()),
            Arc::new(RenderedExtractor::new(engine)),
        )
        .with_policy(PolicyChecker::new())
    }

    /// Consult `policy` before every extraction.
    pub fn with_policy(mut self, policy: PolicyChecker) -> Self {
        self.policy = Some(policy);
        self
    }

    /// Extract `request`, falling back from static to rendered on failure.
    pub async fn scrape_website(
        &self,
        request: &ExtractionRequest,
    ) -> Result<ExtractionResult, ScrapeError> {
        let started = Instant::now();

        if let Some(policy) = &self.policy {
            // Advisory only; the outcome is logged by the checker.
            let _ = policy.check(request.url()).await;
        }

        let outcome = if request.options().render_javascript {
            self.rendered_extractor.extract(request).await
        } else {
            match self.static_extractor.extract(request).await {
                Ok(result) => Ok(result),
                Err(e) => {
                    warn!(
                        url = %request.target(),
                        "static extraction failed, falling back to rendered: {e}"
                    );
                    self.rendered_extractor.extract(request).await
                }
            }
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(url = %request.target(), elapsed_ms, ok = outcome.is_ok(), "scrape completed");

        outcome
            .map(|mut result| {
                result.duration_ms = elapsed_ms;
                result
            })
            .map_err(|source| ScrapeError::new(request.requested(), source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ExtractError, FetchError, RenderError};
    use crate::extraction::{ExtractionMethod, ExtractionOptions, PageMetadata};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedExtractor {
        method: ExtractionMethod,
        succeed: bool,
        calls: AtomicUsize,
    }

    impl ScriptedExtractor {
        fn new(method: ExtractionMethod, succeed: bool) -> Arc<Self> {
            Arc::new(Self {
                method,
                succeed,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Extractor for ScriptedExtractor {
        fn method(&self) -> ExtractionMethod {
            self.method
        }

        async fn extract(
            &self,
            request: &ExtractionRequest,
        ) -> Result<ExtractionResult, ExtractError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.succeed {
                return Err(match self.method {
                    ExtractionMethod::Static => FetchError::Status { status: 500 }.into(),
                    ExtractionMethod::Rendered => {
                        RenderError::Launch("no browser".to_string()).into()
                    }
                });
            }
            Ok(ExtractionResult {
                url: request.requested().to_string(),
                method: self.method,
                selector: request.selector().to_string(),
                found: 0,
                elements: vec![],
                metadata: PageMetadata::default(),
                duration_ms: 0,
            })
        }
    }

    fn request(render_javascript: bool) -> ExtractionRequest {
        ExtractionRequest::new(
            "https://example.com/page",
            "h1",
            ExtractionOptions {
                render_javascript,
                ..Default::default()
            },
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_static_success_never_touches_renderer() {
        let st = ScriptedExtractor::new(ExtractionMethod::Static, true);
        let rd = ScriptedExtractor::new(ExtractionMethod::Rendered, true);
        let orch = ExtractionOrchestrator::new(st.clone(), rd.clone());

        let result = orch.scrape_website(&request(false)).await.unwrap();
        assert_eq!(result.method, ExtractionMethod::Static);
        assert_eq!(st.calls(), 1);
        assert_eq!(rd.calls(), 0);
    }

    #[tokio::test]
    async fn test_static_failure_falls_back_exactly_once() {
        let st = ScriptedExtractor::new(ExtractionMethod::Static, false);
        let rd = ScriptedExtractor::new(ExtractionMethod::Rendered, true);
        let orch = ExtractionOrchestrator::new(st.clone(), rd.clone());

        let result = orch.scrape_website(&request(false)).await.unwrap();
        assert_eq!(result.method, ExtractionMethod::Rendered);
        assert_eq!(st.calls(), 1);
        assert_eq!(rd.calls(), 1);
    }

    #[tokio::test]
    async fn test_fallback_failure_is_wrapped_with_url() {
        let st = ScriptedExtractor::new(ExtractionMethod::Static, false);
        let rd = ScriptedExtractor::new(ExtractionMethod::Rendered, false);
        let orch = ExtractionOrchestrator::new(st.clone(), rd.clone());

        let err = orch.scrape_website(&request(false)).await.unwrap_err();
        assert_eq!(rd.calls(), 1);
        assert_eq!(err.url, "https://example.com/page");
        assert!(matches!(err.source, ExtractError::Render(_)));
        assert_eq!(
            err.to_string(),
            "Scraping failed for https://example.com/page: browser launch failed: no browser"
        );
    }

    #[tokio::test]
    async fn test_javascript_requests_skip_static() {
        let st = ScriptedExtractor::new(ExtractionMethod::Static, true);
        let rd = ScriptedExtractor::new(ExtractionMethod::Rendered, false);
        let orch = ExtractionOrchestrator::new(st.clone(), rd.clone());

        assert!(orch.scrape_website(&request(true)).await.is_err());
        assert_eq!(st.calls(), 0);
        assert_eq!(rd.calls(), 1);
    }
}
