// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! `websift scrape <url>`: extract elements from a single page.

use crate::cli::output;
use crate::config::{ConfigOverrides, ServiceConfig};
use crate::extraction::orchestrator::ExtractionOrchestrator;
use crate::extraction::{ExtractionOptions, ExtractionRequest};
use anyhow::{bail, Context, Result};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

/// Arguments for the scrape command.
pub struct ScrapeArgs {
    pub url: String,
    pub selector: String,
    pub javascript: bool,
    pub wait_for: Option<String>,
    pub timeout_ms: u64,
    pub headers: Vec<String>,
}

/// Run the scrape command.
pub async fn run(args: ScrapeArgs) -> Result<()> {
    let options = ExtractionOptions {
        render_javascript: args.javascript,
        wait_for_selector: args.wait_for,
        timeout_ms: args.timeout_ms,
        extra_headers: parse_headers(&args.headers)?,
    };
    let request = ExtractionRequest::new(&args.url, args.selector, options)
        .with_context(|| format!("cannot scrape '{}'", args.url))?;

    let config = ServiceConfig::resolve(ConfigOverrides::default());
    let engine = super::chromium_engine(config.chromium);
    let orchestrator = ExtractionOrchestrator::standard(Arc::clone(&engine));

    let outcome = orchestrator.scrape_website(&request).await;
    if let Err(e) = engine.release().await {
        warn!("browser shutdown failed: {e}");
    }
    let result = outcome?;

    if output::is_json() {
        output::print_json(&result);
    } else {
        output::print_extraction(&result);
    }
    Ok(())
}

/// Parse repeated `--header "Name: value"` flags.
pub fn parse_headers(raw: &[String]) -> Result<BTreeMap<String, String>> {
    let mut headers = BTreeMap::new();
    for entry in raw {
        let Some((name, value)) = entry.split_once(':') else {
            bail!("invalid header '{entry}', expected NAME:VALUE");
        };
        let name = name.trim();
        if name.is_empty() {
            bail!("invalid header '{entry}', name is empty");
        }
        headers.insert(name.to_string(), value.trim().to_string());
    }
    Ok(headers)
}
