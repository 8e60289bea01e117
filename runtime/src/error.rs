// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Error types for fetching, rendering, and orchestrating extractions.
//!
//! Failures that the service absorbs (crawl-policy lookups, search providers)
//! are not errors here; they are modelled as outcome enums next to the
//! components that produce them.

/// Failure while fetching a document over plain HTTP.
#[derive(thiserror::Error, Debug)]
pub enum FetchError {
    #[error("request timed out after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    #[error("too many redirects (limit {limit})")]
    TooManyRedirects { limit: usize },

    #[error("request failed with status code {status}")]
    Status { status: u16 },

    #[error("invalid header {name}: {reason}")]
    InvalidHeader { name: String, reason: String },

    #[error("network error: {0}")]
    Network(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

impl FetchError {
    /// Classify a transport-level reqwest failure.
    pub fn from_reqwest(err: &reqwest::Error, timeout_ms: u64, redirect_limit: usize) -> Self {
        if err.is_timeout() {
            FetchError::Timeout { timeout_ms }
        } else if err.is_redirect() {
            FetchError::TooManyRedirects {
                limit: redirect_limit,
            }
        } else {
            FetchError::Network(err.to_string())
        }
    }
}

/// Failure while driving the headless browser.
#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("browser unavailable: {0}")]
    Unavailable(String),

    #[error("failed to open page: {0}")]
    Page(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    #[error("navigation timed out after {timeout_ms}ms")]
    NavigationTimeout { timeout_ms: u64 },

    #[error("waiting for selector `{selector}` failed: {timeout_ms}ms exceeded")]
    SelectorTimeout { selector: String, timeout_ms: u64 },

    #[error("script evaluation failed: {0}")]
    Evaluation(String),
}

/// Failure of a single extraction strategy.
#[derive(thiserror::Error, Debug)]
pub enum ExtractError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error("invalid selector `{selector}`: {reason}")]
    InvalidSelector { selector: String, reason: String },
}

/// Orchestration-level failure, annotated with the target URL.
#[derive(thiserror::Error, Debug)]
#[error("Scraping failed for {url}: {source}")]
pub struct ScrapeError {
    pub url: String,
    #[source]
    pub source: ExtractError,
}

impl ScrapeError {
    pub fn new(url: impl Into<String>, source: ExtractError) -> Self {
        Self {
            url: url.into(),
            source,
        }
    }
}

/// Malformed caller input, rejected before any network activity.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("URL is required")]
    MissingUrl,

    #[error("Invalid URL format")]
    InvalidUrl(String),

    #[error("Search query is required")]
    MissingQuery,
}
