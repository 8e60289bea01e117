// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Output helpers shared by CLI commands.
//!
//! Global flags are exported as environment variables by `main` so every
//! command can check them without threading them through.

use crate::batch::{BatchItem, BatchSummary};
use crate::extraction::ExtractionResult;
use crate::search::SearchResult;
use serde::Serialize;

/// Whether `--json` was given.
pub fn is_json() -> bool {
    std::env::var("WEBSIFT_JSON").is_ok()
}

/// Whether `--quiet` was given.
pub fn is_quiet() -> bool {
    std::env::var("WEBSIFT_QUIET").is_ok()
}

/// Pretty-print `value` as JSON on stdout.
pub fn print_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{s}"),
        Err(e) => eprintln!("  failed to encode output: {e}"),
    }
}

/// Shorten `text` to at most `max` characters, marking the cut.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let cut: String = text.chars().take(max.saturating_sub(1)).collect();
    format!("{cut}…")
}

pub fn print_extraction(result: &ExtractionResult) {
    println!("  {} [{}]", result.url, result.method);
    if !result.metadata.title.is_empty() {
        println!("  Title: {}", result.metadata.title);
    }
    println!(
        "  {} element(s) matching `{}` in {}ms",
        result.found, result.selector, result.duration_ms
    );
    println!();
    for el in &result.elements {
        println!("  [{:>3}] <{}> {}", el.index, el.tag, truncate(&el.text, 100));
    }
}

pub fn print_search_results(results: &[SearchResult]) {
    for r in results {
        println!("  {:>2}. {} ({})", r.rank, r.title, r.source);
        println!("      {}", r.url);
        if !r.snippet.is_empty() {
            println!("      {}", truncate(&r.snippet, 120));
        }
    }
}

pub fn print_batch(items: &[BatchItem], summary: &BatchSummary) {
    for item in items {
        match (&item.scraped, &item.error) {
            (Some(scraped), _) => println!(
                "  [ok]   {} ({} element(s))",
                item.result.url, scraped.found
            ),
            (None, Some(err)) => println!("  [fail] {}: {err}", item.result.url),
            (None, None) => println!("  [fail] {}", item.result.url),
        }
    }
    println!();
    println!(
        "  {} found, {} scraped, {} failed",
        summary.total_found, summary.successful_scrapes, summary.failed_scrapes
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("abcdefghij", 5), "abcd…");
        assert_eq!(truncate("ünïcödé", 3), "ün…");
    }
}
