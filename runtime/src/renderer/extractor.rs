// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Rendered extraction: load the page in a browser tab and select from the
//! live DOM, so script-generated content is visible.

use super::{BrowserEngine, PageProfile, RenderContext};
use crate::error::{ExtractError, RenderError};
use crate::extraction::document::{collect_result, LiveDocument};
use crate::extraction::{
    ExtractionMethod, ExtractionRequest, ExtractionResult, Extractor, BROWSER_USER_AGENT,
};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// How long to wait for `wait_for_selector` after navigation.
pub const SELECTOR_WAIT_MS: u64 = 5_000;

pub const VIEWPORT_WIDTH: u32 = 1920;
pub const VIEWPORT_HEIGHT: u32 = 1080;

/// Extractor backed by the shared browser engine.
pub struct RenderedExtractor {
    engine: Arc<BrowserEngine>,
}

impl RenderedExtractor {
    pub fn new(engine: Arc<BrowserEngine>) -> Self {
        Self { engine }
    }

    async fn render_in(
        &self,
        context: &mut dyn RenderContext,
        request: &ExtractionRequest,
        started: Instant,
    ) -> Result<ExtractionResult, ExtractError> {
        let options = request.options();
        context
            .configure(&PageProfile {
                user_agent: BROWSER_USER_AGENT.to_string(),
                viewport_width: VIEWPORT_WIDTH,
                viewport_height: VIEWPORT_HEIGHT,
                extra_headers: options.extra_headers.clone(),
            })
            .await?;

        let nav = context.navigate(request.target(), options.timeout_ms).await?;
        debug!(
            url = %request.target(),
            final_url = %nav.final_url,
            load_ms = nav.load_time_ms,
            "page rendered"
        );

        if let Some(selector) = options.wait_for_selector.as_deref() {
            context.wait_for_selector(selector, SELECTOR_WAIT_MS).await?;
        }

        let document = LiveDocument::new(&*context);
        collect_result(&document, request, ExtractionMethod::Rendered, started).await
    }
}

#[async_trait]
impl Extractor for RenderedExtractor {
    fn method(&self) -> ExtractionMethod {
        ExtractionMethod::Rendered
    }

    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult, ExtractError> {
        let started = Instant::now();
        let renderer = self.engine.acquire().await?;
        let mut tab = TabGuard::new(renderer.new_context().await?, request.target());

        let outcome = match tab.context_mut() {
            Some(context) => self.render_in(context, request, started).await,
            None => Err(RenderError::Page("tab already closed".to_string()).into()),
        };
        tab.close().await;
        outcome
    }
}

/// Owns an open tab until it is closed.
///
/// If the owning future is dropped before [`close`](Self::close) runs (a
/// client disconnect or an outer timeout), the close is spawned from `Drop`.
struct TabGuard {
    context: Option<Box<dyn RenderContext>>,
    url: String,
}

impl TabGuard {
    fn new(context: Box<dyn RenderContext>, url: &str) -> Self {
        Self {
            context: Some(context),
            url: url.to_string(),
        }
    }

    fn context_mut(&mut self) -> Option<&mut dyn RenderContext> {
        match self.context.as_mut() {
            Some(context) => Some(context.as_mut()),
            None => None,
        }
    }

    async fn close(mut self) {
        if let Some(context) = self.context.take() {
            close_tab(context, &self.url).await;
        }
    }
}

impl Drop for TabGuard {
    fn drop(&mut self) {
        let Some(context) = self.context.take() else {
            return;
        };
        let url = std::mem::take(&mut self.url);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                debug!(url = %url, "extraction cancelled, closing tab in background");
                handle.spawn(async move { close_tab(context, &url).await });
            }
            Err(_) => warn!(url = %url, "tab dropped outside a runtime and left open"),
        }
    }
}

async fn close_tab(context: Box<dyn RenderContext>, url: &str) {
    if let Err(e) = context.close().await {
        warn!(url = %url, "failed to close tab: {e}");
    }
}
