// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! `websift serve`: run the REST API.

use crate::config::{ConfigOverrides, ServiceConfig};
use crate::extraction::orchestrator::ExtractionOrchestrator;
use crate::rest::{self, AppState};
use crate::search::orchestrator::SearchOrchestrator;
use anyhow::Result;
use std::sync::Arc;
use tracing::info;

/// Start the server and block until shutdown.
pub async fn run(overrides: ConfigOverrides) -> Result<()> {
    let config = ServiceConfig::resolve(overrides);
    info!("starting Websift v{}", env!("CARGO_PKG_VERSION"));

    let engine = super::chromium_engine(config.chromium.clone());
    let state = Arc::new(AppState::new(
        Arc::new(ExtractionOrchestrator::standard(Arc::clone(&engine))),
        Arc::new(SearchOrchestrator::with_default_providers()),
        engine,
    ));

    rest::start(&config, state).await
}
