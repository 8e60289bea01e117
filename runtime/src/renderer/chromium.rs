// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Chromium-based renderer using chromiumoxide.

use super::{NavigationResult, PageProfile, RenderContext, Renderer, RendererLauncher};
use crate::error::RenderError;
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::network::{
    Headers, SetExtraHttpHeadersParams, SetUserAgentOverrideParams,
};
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tracing::debug;

/// Poll interval while waiting for a selector to appear.
const SELECTOR_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Find the Chromium binary path.
pub fn find_chromium() -> Option<PathBuf> {
    // 1. WEBSIFT_CHROMIUM_PATH env
    if let Ok(p) = std::env::var("WEBSIFT_CHROMIUM_PATH") {
        let path = PathBuf::from(&p);
        if path.exists() {
            return Some(path);
        }
    }

    // 2. ~/.websift/chromium/
    if let Some(home) = dirs::home_dir() {
        let candidates = if cfg!(target_os = "macos") {
            vec![
                home.join(".websift/chromium/chrome-mac-arm64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".websift/chromium/chrome-mac-x64/Google Chrome for Testing.app/Contents/MacOS/Google Chrome for Testing"),
                home.join(".websift/chromium/chrome"),
            ]
        } else {
            vec![
                home.join(".websift/chromium/chrome-linux64/chrome"),
                home.join(".websift/chromium/chrome"),
            ]
        };
        for c in candidates {
            if c.exists() {
                return Some(c);
            }
        }
    }

    // 3. System PATH
    for name in ["google-chrome", "chromium", "chromium-browser"] {
        if let Ok(path) = which::which(name) {
            return Some(path);
        }
    }

    // 4. Common macOS location
    if cfg!(target_os = "macos") {
        let common =
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome");
        if common.exists() {
            return Some(common);
        }
    }

    None
}

/// Launch settings for the shared Chromium process.
#[derive(Debug, Clone, Default)]
pub struct ChromiumOptions {
    /// Explicit executable; discovered with [`find_chromium`] when `None`.
    pub executable: Option<PathBuf>,
    /// Keep Chromium's sandbox enabled.
    pub sandbox: bool,
}

/// Chromium-based renderer.
pub struct ChromiumRenderer {
    browser: Mutex<Browser>,
    handler: JoinHandle<()>,
    active_count: Arc<AtomicUsize>,
}

impl ChromiumRenderer {
    /// Launch a headless Chromium instance.
    pub async fn launch(options: &ChromiumOptions) -> Result<Self, RenderError> {
        let chrome_path = options
            .executable
            .clone()
            .or_else(find_chromium)
            .ok_or_else(|| {
                RenderError::Launch(
                    "Chromium not found; set WEBSIFT_CHROMIUM_PATH or install chromium".into(),
                )
            })?;

        let mut builder = BrowserConfig::builder()
            .chrome_executable(chrome_path)
            .arg("--headless=new")
            .arg("--disable-gpu")
            .arg("--disable-dev-shm-usage")
            .arg("--disable-accelerated-2d-canvas")
            .arg("--no-first-run")
            .arg("--disable-extensions")
            .arg("--disable-background-networking");
        if !options.sandbox {
            builder = builder
                .arg("--no-sandbox")
                .arg("--disable-setuid-sandbox")
                .arg("--no-zygote");
        }
        let config = builder
            .build()
            .map_err(|e| RenderError::Launch(format!("failed to build browser config: {e}")))?;

        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| RenderError::Launch(e.to_string()))?;

        let handler = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    debug!("browser handler event error: {e}");
                }
            }
        });

        Ok(Self {
            browser: Mutex::new(browser),
            handler,
            active_count: Arc::new(AtomicUsize::new(0)),
        })
    }
}

#[async_trait]
impl Renderer for ChromiumRenderer {
    async fn new_context(&self) -> Result<Box<dyn RenderContext>, RenderError> {
        let page = self
            .browser
            .lock()
            .await
            .new_page("about:blank")
            .await
            .map_err(|e| RenderError::Page(e.to_string()))?;

        self.active_count.fetch_add(1, Ordering::Relaxed);

        Ok(Box::new(ChromiumContext {
            page,
            active_count: Arc::clone(&self.active_count),
        }))
    }

    async fn shutdown(&self) -> Result<(), RenderError> {
        let mut browser = self.browser.lock().await;
        let closed = browser.close().await;
        let _ = browser.wait().await;
        self.handler.abort();
        closed
            .map(|_| ())
            .map_err(|e| RenderError::Unavailable(format!("browser close failed: {e}")))
    }

    fn active_contexts(&self) -> usize {
        self.active_count.load(Ordering::Relaxed)
    }
}

/// Launches [`ChromiumRenderer`] on first use of the engine handle.
pub struct ChromiumLauncher {
    options: ChromiumOptions,
}

impl ChromiumLauncher {
    pub fn new(options: ChromiumOptions) -> Self {
        Self { options }
    }
}

#[async_trait]
impl RendererLauncher for ChromiumLauncher {
    async fn launch(&self) -> Result<Arc<dyn Renderer>, RenderError> {
        let renderer = ChromiumRenderer::launch(&self.options).await?;
        Ok(Arc::new(renderer))
    }
}

/// A single Chromium page context.
pub struct ChromiumContext {
    page: Page,
    active_count: Arc<AtomicUsize>,
}

#[async_trait]
impl RenderContext for ChromiumContext {
    async fn configure(&mut self, profile: &PageProfile) -> Result<(), RenderError> {
        self.page
            .execute(SetUserAgentOverrideParams::new(profile.user_agent.clone()))
            .await
            .map_err(|e| RenderError::Page(format!("set user agent: {e}")))?;

        self.page
            .execute(SetDeviceMetricsOverrideParams::new(
                i64::from(profile.viewport_width),
                i64::from(profile.viewport_height),
                1.0,
                false,
            ))
            .await
            .map_err(|e| RenderError::Page(format!("set viewport: {e}")))?;

        if !profile.extra_headers.is_empty() {
            let headers = serde_json::to_value(&profile.extra_headers)
                .map_err(|e| RenderError::Page(format!("encode headers: {e}")))?;
            self.page
                .execute(SetExtraHttpHeadersParams::new(Headers::new(headers)))
                .await
                .map_err(|e| RenderError::Page(format!("set extra headers: {e}")))?;
        }
        Ok(())
    }

    async fn navigate(
        &mut self,
        url: &str,
        timeout_ms: u64,
    ) -> Result<NavigationResult, RenderError> {
        let start = Instant::now();

        let result = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
            self.page.goto(url).await?;
            // Wait for the load triggered by goto to settle
            self.page.wait_for_navigation().await?;
            Ok::<_, chromiumoxide::error::CdpError>(())
        })
        .await;

        let load_time_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(Ok(())) => {
                let final_url = self
                    .page
                    .url()
                    .await
                    .unwrap_or_default()
                    .unwrap_or_else(|| url.to_string());

                Ok(NavigationResult {
                    final_url,
                    load_time_ms,
                })
            }
            Ok(Err(e)) => Err(RenderError::Navigation(e.to_string())),
            Err(_) => Err(RenderError::NavigationTimeout { timeout_ms }),
        }
    }

    async fn wait_for_selector(&self, selector: &str, timeout_ms: u64) -> Result<(), RenderError> {
        let found = tokio::time::timeout(Duration::from_millis(timeout_ms), async {
            loop {
                if self.page.find_element(selector).await.is_ok() {
                    return;
                }
                tokio::time::sleep(SELECTOR_POLL_INTERVAL).await;
            }
        })
        .await;

        found.map_err(|_| RenderError::SelectorTimeout {
            selector: selector.to_string(),
            timeout_ms,
        })
    }

    async fn execute_js(&self, script: &str) -> Result<serde_json::Value, RenderError> {
        let result = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| RenderError::Evaluation(e.to_string()))?;

        result
            .into_value()
            .map_err(|e| RenderError::Evaluation(format!("failed to convert JS result: {e:?}")))
    }

    async fn close(self: Box<Self>) -> Result<(), RenderError> {
        self.active_count.fetch_sub(1, Ordering::Relaxed);
        self.page
            .close()
            .await
            .map_err(|e| RenderError::Page(format!("close failed: {e}")))
    }
}
