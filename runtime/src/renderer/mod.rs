// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Renderer abstraction for browser-based page rendering.
//!
//! Defines the `Renderer` and `RenderContext` traits that abstract over
//! the browser engine (currently Chromium via chromiumoxide), and the
//! [`BrowserEngine`] handle that owns the single shared engine instance.

pub mod chromium;
pub mod extractor;

use crate::error::RenderError;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Result of navigating to a URL.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NavigationResult {
    /// The final URL after any redirects.
    pub final_url: String,
    /// Time taken to load the page in milliseconds.
    pub load_time_ms: u64,
}

/// Per-tab settings applied before navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageProfile {
    pub user_agent: String,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub extra_headers: BTreeMap<String, String>,
}

/// A browser engine that can create rendering contexts.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Create a new browser context (tab).
    async fn new_context(&self) -> Result<Box<dyn RenderContext>, RenderError>;
    /// Shut down the browser engine.
    async fn shutdown(&self) -> Result<(), RenderError>;
    /// Number of currently active contexts.
    fn active_contexts(&self) -> usize;
}

/// A single browser context (tab) for rendering pages.
#[async_trait]
pub trait RenderContext: Send + Sync {
    /// Apply user agent, viewport, and extra headers.
    async fn configure(&mut self, profile: &PageProfile) -> Result<(), RenderError>;
    /// Navigate to a URL with a timeout.
    async fn navigate(&mut self, url: &str, timeout_ms: u64)
        -> Result<NavigationResult, RenderError>;
    /// Wait until `selector` matches an element, or fail after `timeout_ms`.
    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<(), RenderError>;
    /// Execute JavaScript in the page context and return the result.
    async fn execute_js(&self, script: &str) -> Result<serde_json::Value, RenderError>;
    /// Close this context.
    async fn close(self: Box<Self>) -> Result<(), RenderError>;
}

/// Starts a renderer. Split out so the engine handle can be tested
/// without a browser.
#[async_trait]
pub trait RendererLauncher: Send + Sync {
    async fn launch(&self) -> Result<Arc<dyn Renderer>, RenderError>;
}

/// Owned handle to the process-wide rendering engine.
///
/// The engine is launched on first [`acquire`](Self::acquire) and shared by
/// every caller afterwards. The slot lock is held across the launch, so
/// concurrent first callers wait for one launch instead of racing. A crashed
/// engine stays in the slot (and keeps failing) until [`release`](Self::release)
/// is called; the next acquire relaunches.
pub struct BrowserEngine {
    launcher: Arc<dyn RendererLauncher>,
    slot: Mutex<Option<Arc<dyn Renderer>>>,
}

impl BrowserEngine {
    pub fn new(launcher: Arc<dyn RendererLauncher>) -> Self {
        Self {
            launcher,
            slot: Mutex::new(None),
        }
    }

    /// Return the shared renderer, launching it if this is the first use.
    pub async fn acquire(&self) -> Result<Arc<dyn Renderer>, RenderError> {
        let mut slot = self.slot.lock().await;
        if let Some(renderer) = slot.as_ref() {
            return Ok(Arc::clone(renderer));
        }
        info!("launching rendering engine");
        let renderer = self.launcher.launch().await?;
        *slot = Some(Arc::clone(&renderer));
        Ok(renderer)
    }

    /// Shut down the engine if it is running. Safe to call repeatedly.
    pub async fn release(&self) -> Result<(), RenderError> {
        let renderer = self.slot.lock().await.take();
        match renderer {
            Some(renderer) => {
                if renderer.active_contexts() > 0 {
                    warn!(
                        active = renderer.active_contexts(),
                        "releasing rendering engine with open tabs"
                    );
                }
                renderer.shutdown().await?;
                info!("rendering engine released");
                Ok(())
            }
            None => Ok(()),
        }
    }

    /// Whether an engine is currently launched.
    pub async fn is_running(&self) -> bool {
        self.slot.lock().await.is_some()
    }

    /// Open tabs on the running engine, or 0 when none is launched.
    pub async fn active_contexts(&self) -> usize {
        self.slot
            .lock()
            .await
            .as_ref()
            .map(|r| r.active_contexts())
            .unwrap_or(0)
    }
}

/// A no-op renderer used when Chromium is unavailable.
///
/// Static extraction works without a browser; every rendered extraction
/// (including the static→rendered fallback) fails with
/// [`RenderError::Unavailable`].
pub struct NoopRenderer;

#[async_trait]
impl Renderer for NoopRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>, RenderError> {
        Err(RenderError::Unavailable(
            "browser not available, HTTP-only mode".to_string(),
        ))
    }
    async fn shutdown(&self) -> Result<(), RenderError> {
        Ok(())
    }
    fn active_contexts(&self) -> usize {
        0
    }
}

/// Launcher that always yields a [`NoopRenderer`].
pub struct NoopLauncher;

#[async_trait]
impl RendererLauncher for NoopLauncher {
    async fn launch(&self) -> Result<Arc<dyn Renderer>, RenderError> {
        Ok(Arc::new(NoopRenderer))
    }
}
