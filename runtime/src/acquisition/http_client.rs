// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Async HTTP client wrapping reqwest.
//!
//! Plain HTTP requests, no browser. Follows up to five redirects,
//! enforces a per-call timeout, and treats non-2xx statuses as failures.

use crate::error::FetchError;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::collections::BTreeMap;
use std::time::Duration;

/// Maximum redirects followed before a fetch fails.
pub const REDIRECT_LIMIT: usize = 5;

/// Response from an HTTP GET request.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// Original requested URL.
    pub url: String,
    /// Final URL after redirects.
    pub final_url: String,
    /// HTTP status code.
    pub status: u16,
    /// Content-Type header, if present.
    pub content_type: Option<String>,
    /// Response body as text.
    pub body: String,
}

/// HTTP client shared by page fetches, crawl-policy lookups, and search
/// providers.
#[derive(Clone)]
pub struct HttpClient {
    client: reqwest::Client,
    /// HTTP/1.1-only fallback client for sites that reject HTTP/2.
    h1_client: reqwest::Client,
    default_headers: BTreeMap<String, String>,
}

impl HttpClient {
    /// Create a client sending `user_agent`, with `timeout_ms` as the
    /// ceiling for calls that do not pass their own timeout.
    pub fn new(user_agent: &str, timeout_ms: u64) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(REDIRECT_LIMIT))
            .user_agent(user_agent)
            .build()
            .unwrap_or_default();

        let h1_client = reqwest::Client::builder()
            .timeout(Duration::from_millis(timeout_ms))
            .redirect(reqwest::redirect::Policy::limited(REDIRECT_LIMIT))
            .user_agent(user_agent)
            .http1_only()
            .build()
            .unwrap_or_default();

        Self {
            client,
            h1_client,
            default_headers: BTreeMap::new(),
        }
    }

    /// Headers sent with every request unless the caller overrides them.
    pub fn with_default_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers
            .insert(name.to_ascii_lowercase(), value.to_string());
        self
    }

    /// Perform a single GET request.
    ///
    /// Falls back to HTTP/1.1 on protocol errors (some CDNs reject HTTP/2).
    pub async fn get(
        &self,
        url: &str,
        extra_headers: &BTreeMap<String, String>,
        timeout_ms: u64,
    ) -> Result<HttpResponse, FetchError> {
        let headers = self.merged_headers(extra_headers)?;
        match self.get_inner(&self.client, url, &headers, timeout_ms).await {
            Ok(resp) => Ok(resp),
            Err(FetchError::Network(msg))
                if msg.contains("http2")
                    || msg.contains("protocol")
                    || msg.contains("connection closed") =>
            {
                self.get_inner(&self.h1_client, url, &headers, timeout_ms)
                    .await
            }
            Err(e) => Err(e),
        }
    }

    fn merged_headers(
        &self,
        extra_headers: &BTreeMap<String, String>,
    ) -> Result<HeaderMap, FetchError> {
        let mut map = HeaderMap::new();
        let pairs = self.default_headers.iter().chain(extra_headers.iter());
        for (name, value) in pairs {
            let header_name = HeaderName::from_bytes(name.as_bytes()).map_err(|e| {
                FetchError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                }
            })?;
            let header_value =
                HeaderValue::from_str(value).map_err(|e| FetchError::InvalidHeader {
                    name: name.clone(),
                    reason: e.to_string(),
                })?;
            // Caller headers come last and replace defaults.
            map.insert(header_name, header_value);
        }
        Ok(map)
    }

    async fn get_inner(
        &self,
        client: &reqwest::Client,
        url: &str,
        headers: &HeaderMap,
        timeout_ms: u64,
    ) -> Result<HttpResponse, FetchError> {
        let r = client
            .get(url)
            .headers(headers.clone())
            .timeout(Duration::from_millis(timeout_ms))
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&e, timeout_ms, REDIRECT_LIMIT))?;

        let status = r.status().as_u16();
        if !r.status().is_success() {
            return Err(FetchError::Status { status });
        }

        let final_url = r.url().to_string();
        let content_type = r
            .headers()
            .get("content-type")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let body = r.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout { timeout_ms }
            } else {
                FetchError::Body(e.to_string())
            }
        })?;

        Ok(HttpResponse {
            url: url.to_string(),
            final_url,
            status,
            content_type,
            body,
        })
    }
}
