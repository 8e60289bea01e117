// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Extraction request/result model and the strategy seam.
//!
//! An [`Extractor`] turns an [`ExtractionRequest`] into an
//! [`ExtractionResult`]. Two strategies exist: a static HTTP fetch parsed
//! with `scraper`, and a rendered fetch through the shared browser engine.
//! Both build their result from a [`document::QueryableDocument`], so the
//! selection semantics are identical regardless of backend.

pub mod document;
pub mod orchestrator;

use crate::error::{ExtractError, ValidationError};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use url::Url;

/// Selector used when the caller does not provide one.
pub const DEFAULT_SELECTOR: &str = "h1, h2, h3, p";

/// Default per-call timeout for page fetches and navigations.
pub const DEFAULT_TIMEOUT_MS: u64 = 30_000;

/// Browser-like user agent sent with page fetches and rendered tabs.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (X11; Linux x86_64) \
     AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/120.0.0.0 Safari/537.36";

/// Which strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Static,
    Rendered,
}

impl std::fmt::Display for ExtractionMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ExtractionMethod::Static => f.write_str("static"),
            ExtractionMethod::Rendered => f.write_str("rendered"),
        }
    }
}

/// Caller-controlled knobs for a single extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionOptions {
    /// Render the page in the browser instead of parsing the raw source.
    pub render_javascript: bool,
    /// Selector to wait for after navigation (rendered only).
    pub wait_for_selector: Option<String>,
    /// Timeout for the fetch or navigation, in milliseconds.
    pub timeout_ms: u64,
    /// Extra request headers, name → value.
    pub extra_headers: BTreeMap<String, String>,
}

impl Default for ExtractionOptions {
    fn default() -> Self {
        Self {
            render_javascript: false,
            wait_for_selector: None,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            extra_headers: BTreeMap::new(),
        }
    }
}

/// A validated extraction request. Fields are fixed at construction.
#[derive(Debug, Clone)]
pub struct ExtractionRequest {
    url: Url,
    requested: String,
    selector: String,
    options: ExtractionOptions,
}

impl ExtractionRequest {
    /// Build a request, rejecting URLs that are not absolute.
    pub fn new(
        url: &str,
        selector: impl Into<String>,
        options: ExtractionOptions,
    ) -> Result<Self, ValidationError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingUrl);
        }
        let requested = url.to_string();
        let url = Url::parse(url).map_err(|e| ValidationError::InvalidUrl(e.to_string()))?;
        let selector = selector.into();
        let selector = if selector.trim().is_empty() {
            DEFAULT_SELECTOR.to_string()
        } else {
            selector
        };
        Ok(Self {
            url,
            requested,
            selector,
            options,
        })
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn selector(&self) -> &str {
        &self.selector
    }

    pub fn options(&self) -> &ExtractionOptions {
        &self.options
    }

    /// Normalized absolute URL used for fetching and navigation.
    pub fn target(&self) -> &str {
        self.url.as_str()
    }

    /// The URL as the caller supplied it (trimmed). Results and errors echo
    /// this rather than the normalized form.
    pub fn requested(&self) -> &str {
        &self.requested
    }
}

/// One element matched by the selector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractedElement {
    /// Position within the full match set (dropped empty elements leave gaps).
    pub index: usize,
    /// Lowercase tag name.
    pub tag: String,
    /// Trimmed text content; never empty.
    pub text: String,
    /// Inner markup.
    pub html: String,
    pub attributes: BTreeMap<String, String>,
    pub classes: Vec<String>,
    pub id: Option<String>,
}

/// Standard document metadata; absent fields are empty strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    pub title: String,
    pub description: String,
    pub keywords: String,
    pub charset: String,
    pub viewport: String,
}

impl Default for PageMetadata {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            keywords: String::new(),
            charset: "utf-8".to_string(),
            viewport: String::new(),
        }
    }
}

/// Outcome of one extraction request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractionResult {
    pub url: String,
    pub method: ExtractionMethod,
    pub selector: String,
    pub found: usize,
    #[serde(rename = "data")]
    pub elements: Vec<ExtractedElement>,
    pub metadata: PageMetadata,
    pub duration_ms: u64,
}

/// A single extraction strategy.
#[async_trait]
pub trait Extractor: Send + Sync {
    /// The method label this strategy reports.
    fn method(&self) -> ExtractionMethod;

    /// Fetch the target and extract matching elements.
    async fn extract(&self, request: &ExtractionRequest) -> Result<ExtractionResult, ExtractError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_rejects_missing_and_relative_urls() {
        assert_eq!(
            ExtractionRequest::new("  ", "h1", ExtractionOptions::default()).unwrap_err(),
            ValidationError::MissingUrl
        );
        assert!(matches!(
            ExtractionRequest::new("/relative/path", "h1", ExtractionOptions::default()),
            Err(ValidationError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_request_echoes_caller_url() {
        let req = ExtractionRequest::new(
            " https://Example.com ",
            "h1",
            ExtractionOptions::default(),
        )
        .unwrap();
        assert_eq!(req.requested(), "https://Example.com");
        assert_eq!(req.target(), "https://example.com/");
    }

    #[test]
    fn test_request_defaults_blank_selector() {
        let req = ExtractionRequest::new("https://example.com", "", ExtractionOptions::default())
            .unwrap();
        assert_eq!(req.selector(), DEFAULT_SELECTOR);
        assert_eq!(req.options().timeout_ms, DEFAULT_TIMEOUT_MS);
        assert!(!req.options().render_javascript);
    }

    #[test]
    fn test_result_wire_format() {
        let result = ExtractionResult {
            url: "https://example.com/".into(),
            method: ExtractionMethod::Static,
            selector: "h1".into(),
            found: 0,
            elements: vec![],
            metadata: PageMetadata::default(),
            duration_ms: 12,
        };
        let v = serde_json::to_value(&result).unwrap();
        assert_eq!(v["method"], "static");
        assert_eq!(v["durationMs"], 12);
        assert!(v["data"].is_array());
        assert_eq!(v["metadata"]["charset"], "utf-8");
    }
}
