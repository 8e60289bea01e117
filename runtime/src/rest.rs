// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API for Websift.
//!
//! JSON endpoints under `/api`, plus an optional static site with
//! single-page-app fallback for every other path.

use crate::batch::{BatchScrapeCoordinator, BatchSummary};
use crate::config::ServiceConfig;
use crate::error::{ScrapeError, ValidationError};
use crate::extraction::orchestrator::ExtractionOrchestrator;
use crate::extraction::{ExtractionOptions, ExtractionRequest, DEFAULT_SELECTOR, DEFAULT_TIMEOUT_MS};
use crate::renderer::BrowserEngine;
use crate::search::orchestrator::SearchOrchestrator;
use crate::search::DEFAULT_MAX_RESULTS;
use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::handler::Handler;
use axum::http::{Method, StatusCode, Uri};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use chrono::{SecondsFormat, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tracing::{error, info, warn};
use uuid::Uuid;

/// Endpoints listed in the API 404 payload.
pub const AVAILABLE_ENDPOINTS: [&str; 4] = [
    "GET /api/health",
    "POST /api/scrape",
    "POST /api/search-scrape",
    "POST /api/validate-url",
];

/// Services shared by every request handler.
pub struct AppState {
    pub started_at: Instant,
    pub orchestrator: Arc<ExtractionOrchestrator>,
    pub search: Arc<SearchOrchestrator>,
    pub batch: BatchScrapeCoordinator,
    pub engine: Arc<BrowserEngine>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<ExtractionOrchestrator>,
        search: Arc<SearchOrchestrator>,
        engine: Arc<BrowserEngine>,
    ) -> Self {
        Self {
            started_at: Instant::now(),
            batch: BatchScrapeCoordinator::new(Arc::clone(&orchestrator)),
            orchestrator,
            search,
            engine,
        }
    }
}

// ── Request bodies ──────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OptionsBody {
    wait_for_selector: Option<String>,
    #[serde(alias = "timeoutMs")]
    timeout: Option<u64>,
    #[serde(default)]
    javascript: bool,
    #[serde(default)]
    headers: BTreeMap<String, String>,
}

impl OptionsBody {
    fn into_options(self) -> ExtractionOptions {
        ExtractionOptions {
            render_javascript: self.javascript,
            wait_for_selector: self.wait_for_selector.filter(|s| !s.is_empty()),
            timeout_ms: self.timeout.filter(|t| *t > 0).unwrap_or(DEFAULT_TIMEOUT_MS),
            extra_headers: self.headers,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ScrapeBody {
    url: Option<String>,
    selector: Option<String>,
    #[serde(default)]
    options: OptionsBody,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchScrapeBody {
    query: Option<String>,
    max_results: Option<usize>,
    selector: Option<String>,
    #[serde(default)]
    options: OptionsBody,
}

// ── Errors ──────────────────────────────────────────────────────

/// Failures surfaced to API clients.
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Body(String),
    Scrape(ScrapeError),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        ApiError::Body(e.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match self {
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, json!({ "error": e.to_string() })),
            ApiError::Body(message) => (
                StatusCode::BAD_REQUEST,
                json!({ "error": "Invalid request body", "message": message }),
            ),
            ApiError::Scrape(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({ "error": "Scraping failed", "message": e.to_string() }),
            ),
        };
        (status, Json(body)).into_response()
    }
}

fn timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

// ── Router ──────────────────────────────────────────────────────

/// Build the axum Router with all REST endpoints.
///
/// Paths outside `/api` are served from `static_dir` when given.
pub fn router(state: Arc<AppState>, static_dir: Option<PathBuf>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/api/health", get(health).fallback(api_not_found))
        .route("/api/scrape", post(handle_scrape).fallback(api_not_found))
        .route(
            "/api/search-scrape",
            post(handle_search_scrape).fallback(api_not_found),
        )
        .route(
            "/api/validate-url",
            post(handle_validate_url).fallback(api_not_found),
        )
        .route("/api", any(api_not_found))
        .route("/api/*rest", any(api_not_found))
        .with_state(state);

    let spa = spa_fallback.with_state(static_dir.clone());
    let app = match static_dir {
        Some(dir) => api.fallback_service(ServeDir::new(dir).fallback(spa)),
        None => api.fallback_service(spa),
    };
    app.layer(cors)
}

/// Serve until Ctrl-C or SIGTERM, then release the browser.
pub async fn start(config: &ServiceConfig, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = router(Arc::clone(&state), config.static_dir.clone());
    let addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Websift listening on http://{addr}");
    info!("Health check: http://{addr}/api/health");
    match &config.static_dir {
        Some(dir) => info!("Serving static files from {}", dir.display()),
        None => info!("No static directory configured"),
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("shutting down, releasing browser");
    state
        .engine
        .release()
        .await
        .context("failed to release browser")?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("failed to listen for Ctrl-C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!("failed to listen for SIGTERM: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("SIGINT received"),
        _ = terminate => info!("SIGTERM received"),
    }
}

// ── Handlers ────────────────────────────────────────────────────

async fn health(State(state): State<Arc<AppState>>) -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": timestamp(),
        "uptime": state.started_at.elapsed().as_secs_f64(),
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn handle_scrape(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ScrapeBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let url = body.url.unwrap_or_default();
    let selector = body.selector.unwrap_or_else(|| DEFAULT_SELECTOR.to_string());
    let request = ExtractionRequest::new(&url, selector, body.options.into_options())?;

    let request_id = Uuid::new_v4();
    info!(%request_id, url = %request.target(), "scrape requested");

    let result = state
        .orchestrator
        .scrape_website(&request)
        .await
        .map_err(|e| {
            error!(%request_id, "{e}");
            ApiError::Scrape(e)
        })?;

    Ok(Json(json!({
        "success": true,
        "data": result,
        "scrapedAt": timestamp(),
    })))
}

async fn handle_search_scrape(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SearchScrapeBody>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(body) = payload?;
    let query = body.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(ValidationError::MissingQuery.into());
    }
    let max_results = body.max_results.unwrap_or(DEFAULT_MAX_RESULTS);
    let selector = body
        .selector
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_SELECTOR.to_string());

    let request_id = Uuid::new_v4();
    info!(%request_id, query = %query, max_results, "search-scrape requested");

    let search_results = state.search.search_websites(&query, max_results).await;
    if search_results.is_empty() {
        return Ok(Json(json!({
            "success": true,
            "data": {
                "query": query,
                "searchResults": [],
                "scrapedData": [],
                "message": "No search results found",
            },
        })));
    }

    let options = body.options.into_options();
    let items = state
        .batch
        .scrape_all(&search_results, &selector, &options)
        .await;
    let summary = BatchSummary::from_items(&items);

    Ok(Json(json!({
        "success": true,
        "data": {
            "query": query,
            "searchResults": search_results,
            "scrapedData": items,
            "summary": summary,
        },
        "scrapedAt": timestamp(),
    })))
}

async fn handle_validate_url(body: Option<Json<Value>>) -> Json<Value> {
    let parsed = body
        .as_ref()
        .and_then(|Json(v)| v.get("url"))
        .and_then(Value::as_str)
        .and_then(|raw| url::Url::parse(raw).ok());

    match parsed {
        Some(url) => Json(json!({
            "valid": true,
            "protocol": format!("{}:", url.scheme()),
            "hostname": url.host_str().unwrap_or(""),
            "pathname": url.path(),
        })),
        None => Json(json!({ "valid": false })),
    }
}

async fn api_not_found(method: Method, uri: Uri) -> (StatusCode, Json<Value>) {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "API endpoint not found",
            "path": uri.path(),
            "method": method.as_str(),
            "availableEndpoints": AVAILABLE_ENDPOINTS,
        })),
    )
}

/// Unknown non-API path: paths that look like files are 404, everything
/// else gets the app's `index.html`.
async fn spa_fallback(State(static_dir): State<Option<PathBuf>>, uri: Uri) -> Response {
    let file_not_found = || {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "File not found" })),
        )
            .into_response()
    };

    if uri.path().contains('.') {
        return file_not_found();
    }
    let Some(dir) = static_dir else {
        return file_not_found();
    };
    match tokio::fs::read_to_string(dir.join("index.html")).await {
        Ok(page) => Html(page).into_response(),
        Err(_) => file_not_found(),
    }
}
