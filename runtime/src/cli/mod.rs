// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! CLI subcommand implementations for the websift binary.

pub mod output;
pub mod scrape_cmd;
pub mod search_cmd;
pub mod serve;

use crate::renderer::chromium::{ChromiumLauncher, ChromiumOptions};
use crate::renderer::BrowserEngine;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Install the global tracing subscriber. Logs go to stderr so command
/// output on stdout stays machine-readable.
pub fn init_tracing(verbose: bool, json: bool) {
    let default_directive = if verbose { "websift=debug" } else { "websift=info" };
    let filter = match default_directive.parse() {
        Ok(directive) => EnvFilter::from_default_env().add_directive(directive),
        Err(_) => EnvFilter::from_default_env(),
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

/// Browser engine backed by Chromium, launched on first rendered extraction.
pub fn chromium_engine(options: ChromiumOptions) -> Arc<BrowserEngine> {
    Arc::new(BrowserEngine::new(Arc::new(ChromiumLauncher::new(options))))
}
