// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! `websift search` and `websift search-scrape`.

use crate::batch::{BatchScrapeCoordinator, BatchSummary};
use crate::cli::output;
use crate::config::{ConfigOverrides, ServiceConfig};
use crate::extraction::orchestrator::ExtractionOrchestrator;
use crate::extraction::ExtractionOptions;
use crate::search::orchestrator::{get_search_suggestions, validate_results, SearchOrchestrator};
use anyhow::{bail, Result};
use std::sync::Arc;
use tracing::warn;

/// How the query is scoped. At most one refinement applies.
#[derive(Debug, Clone, Default)]
pub enum Refinement {
    #[default]
    None,
    Site(String),
    FileType(String),
    DateRange(String),
}

/// Run the search command.
pub async fn run_search(
    query: &str,
    max_results: usize,
    refinement: Refinement,
    validate: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        bail!("Search query is required");
    }
    let search = SearchOrchestrator::with_default_providers();
    let mut results = match &refinement {
        Refinement::None => search.search_websites(query, max_results).await,
        Refinement::Site(site) => search.search_specific_site(query, site, max_results).await,
        Refinement::FileType(ft) => search.search_file_type(query, ft, max_results).await,
        Refinement::DateRange(range) => {
            search.search_with_date_range(query, range, max_results).await
        }
    };
    if validate {
        results = validate_results(results);
    }

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "query": query,
            "results": results,
            "suggestions": get_search_suggestions(query),
        }));
        return Ok(());
    }

    if results.is_empty() {
        if !output::is_quiet() {
            eprintln!("  No results for \"{query}\".");
        }
        return Ok(());
    }
    output::print_search_results(&results);
    if !output::is_quiet() {
        println!();
        println!("  Related: {}", get_search_suggestions(query).join(" · "));
    }
    Ok(())
}

/// Run the search-scrape command.
pub async fn run_search_scrape(
    query: &str,
    max_results: usize,
    selector: &str,
    javascript: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        bail!("Search query is required");
    }
    let config = ServiceConfig::resolve(ConfigOverrides::default());
    let engine = super::chromium_engine(config.chromium);
    let orchestrator = Arc::new(ExtractionOrchestrator::standard(Arc::clone(&engine)));
    let batch = BatchScrapeCoordinator::new(orchestrator);
    let search = SearchOrchestrator::with_default_providers();

    let results = search.search_websites(query, max_results).await;
    let options = ExtractionOptions {
        render_javascript: javascript,
        ..Default::default()
    };
    let items = batch.scrape_all(&results, selector, &options).await;
    if let Err(e) = engine.release().await {
        warn!("browser shutdown failed: {e}");
    }
    let summary = BatchSummary::from_items(&items);

    if output::is_json() {
        output::print_json(&serde_json::json!({
            "query": query,
            "searchResults": results,
            "scrapedData": items,
            "summary": summary,
        }));
        return Ok(());
    }

    if items.is_empty() {
        if !output::is_quiet() {
            eprintln!("  No search results found.");
        }
        return Ok(());
    }
    output::print_batch(&items, &summary);
    Ok(())
}
