// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! End-to-end scraping and search flows against mock HTTP servers.
//!
//! Tests that need a real browser or the public internet are `#[ignore]`d;
//! run them with `cargo test -- --ignored`.

use std::sync::Arc;
use tokio_test::{assert_err, assert_ok};
use websift_runtime::acquisition::policy::{PolicyChecker, PolicyOutcome};
use websift_runtime::acquisition::static_extractor::StaticExtractor;
use websift_runtime::batch::{BatchScrapeCoordinator, BatchSummary};
use websift_runtime::error::{ExtractError, RenderError};
use websift_runtime::extraction::orchestrator::ExtractionOrchestrator;
use websift_runtime::extraction::{
    ExtractionMethod, ExtractionOptions, ExtractionRequest, Extractor,
};
use websift_runtime::renderer::chromium::{find_chromium, ChromiumLauncher, ChromiumOptions};
use websift_runtime::renderer::extractor::RenderedExtractor;
use websift_runtime::renderer::{BrowserEngine, NoopLauncher};
use websift_runtime::search::bing::BingProvider;
use websift_runtime::search::duckduckgo::DuckDuckGoProvider;
use websift_runtime::search::orchestrator::SearchOrchestrator;
use websift_runtime::search::SearchProvider;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const BLOG: &str = r#"<!DOCTYPE html>
<html><head>
  <meta charset="iso-8859-1">
  <title>Mock Blog</title>
  <meta name="description" content="Posts about things">
  <meta name="viewport" content="width=device-width">
  <style>h1 { color: red }</style>
</head><body>
  <h1 id="top" class="hero big">Welcome</h1>
  <noscript><p>Enable JavaScript</p></noscript>
  <p>First post</p>
  <p>   </p>
  <p data-kind="footer">Footer</p>
</body></html>"#;

fn http_only_orchestrator() -> ExtractionOrchestrator {
    let engine = Arc::new(BrowserEngine::new(Arc::new(NoopLauncher)));
    ExtractionOrchestrator::new(
        Arc::new(StaticExtractor::new()),
        Arc::new(RenderedExtractor::new(engine)),
    )
}

async fn blog_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BLOG))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn test_disallowed_page_is_still_scraped() {
    let server = blog_server().await;
    let url = format!("{}/blog", server.uri());

    let outcome = PolicyChecker::new()
        .check(&url::Url::parse(&url).unwrap())
        .await;
    assert!(matches!(outcome, PolicyOutcome::Disallowed { ref rule } if rule == "/"));

    let orchestrator = http_only_orchestrator().with_policy(PolicyChecker::new());
    let request = ExtractionRequest::new(&url, "h1, p", ExtractionOptions::default()).unwrap();
    let result = assert_ok!(orchestrator.scrape_website(&request).await);

    assert_eq!(result.method, ExtractionMethod::Static);
    let texts: Vec<&str> = result.elements.iter().map(|e| e.text.as_str()).collect();
    assert_eq!(texts, vec!["Welcome", "First post", "Footer"]);
    assert_eq!(result.found, 3);
    // The blank paragraph leaves a gap in the indices.
    let indices: Vec<usize> = result.elements.iter().map(|e| e.index).collect();
    assert_eq!(indices, vec![0, 1, 3]);

    let hero = &result.elements[0];
    assert_eq!(hero.id.as_deref(), Some("top"));
    assert_eq!(hero.classes, vec!["hero".to_string(), "big".to_string()]);
    assert_eq!(
        result.elements[2].attributes.get("data-kind").map(String::as_str),
        Some("footer")
    );

    assert_eq!(result.metadata.title, "Mock Blog");
    assert_eq!(result.metadata.description, "Posts about things");
    assert_eq!(result.metadata.viewport, "width=device-width");
    assert_eq!(result.metadata.charset, "iso-8859-1");
}

#[tokio::test]
async fn test_invalid_selector_is_reported() {
    let server = blog_server().await;
    let request = ExtractionRequest::new(
        &format!("{}/blog", server.uri()),
        "p[[",
        ExtractionOptions::default(),
    )
    .unwrap();
    let err = assert_err!(StaticExtractor::new().extract(&request).await);
    assert!(matches!(err, ExtractError::InvalidSelector { .. }));
}

#[tokio::test]
async fn test_unreachable_host_fails_through_both_strategies() {
    // Port 9 (discard) on localhost is almost never listening.
    let request =
        ExtractionRequest::new("http://127.0.0.1:9/", "h1", ExtractionOptions::default()).unwrap();
    let err = assert_err!(http_only_orchestrator().scrape_website(&request).await);
    assert!(matches!(
        err.source,
        ExtractError::Render(RenderError::Unavailable(_))
    ));
    assert!(err.to_string().starts_with("Scraping failed for http://127.0.0.1:9/"));
}

#[tokio::test]
async fn test_search_falls_back_to_secondary_then_scrapes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ddg"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let bing_page = format!(
        r#"<li class="b_algo"><h2><a href="{0}/blog">Mock Blog</a></h2>
             <div class="b_caption"><p>Posts</p></div></li>
           <li class="b_algo"><h2><a href="{0}/missing">Gone</a></h2></li>"#,
        server.uri()
    );
    Mock::given(method("GET"))
        .and(path("/bing"))
        .respond_with(ResponseTemplate::new(200).set_body_string(bing_page))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/blog"))
        .respond_with(ResponseTemplate::new(200).set_body_string(BLOG))
        .mount(&server)
        .await;

    let providers: Vec<Arc<dyn SearchProvider>> = vec![
        Arc::new(DuckDuckGoProvider::with_endpoint(format!("{}/ddg", server.uri()))),
        Arc::new(BingProvider::with_endpoint(format!("{}/bing", server.uri()))),
    ];
    let results = SearchOrchestrator::new(providers)
        .search_websites("mock", 5)
        .await;
    assert_eq!(results.len(), 2);
    assert!(results.iter().all(|r| r.source == "bing"));

    let batch = BatchScrapeCoordinator::new(Arc::new(http_only_orchestrator()));
    let items = batch
        .scrape_all(&results, "h1", &ExtractionOptions::default())
        .await;
    assert_eq!(items.len(), 2);
    assert!(items[0].success);
    assert!(!items[1].success);
    assert_eq!(
        BatchSummary::from_items(&items),
        BatchSummary {
            total_found: 2,
            successful_scrapes: 1,
            failed_scrapes: 1
        }
    );
}

#[tokio::test]
#[ignore] // Requires internet access
async fn test_example_dot_com() {
    let request =
        ExtractionRequest::new("https://example.com", "h1", ExtractionOptions::default()).unwrap();
    let result = http_only_orchestrator()
        .scrape_website(&request)
        .await
        .unwrap();
    assert_eq!(result.method, ExtractionMethod::Static);
    assert_eq!(result.found, 1);
    assert_eq!(result.metadata.title, "Example Domain");
}

#[tokio::test]
#[ignore] // Requires Chromium and internet access
async fn test_rendered_example_dot_com() {
    if find_chromium().is_none() {
        eprintln!("Skipping: Chromium not found");
        return;
    }
    let engine = Arc::new(BrowserEngine::new(Arc::new(ChromiumLauncher::new(
        ChromiumOptions::default(),
    ))));
    let options = ExtractionOptions {
        render_javascript: true,
        wait_for_selector: Some("h1".to_string()),
        ..Default::default()
    };
    let request = ExtractionRequest::new("https://example.com", "h1, p", options).unwrap();
    let result = RenderedExtractor::new(Arc::clone(&engine))
        .extract(&request)
        .await
        .unwrap();
    engine.release().await.unwrap();

    assert_eq!(result.method, ExtractionMethod::Rendered);
    assert_eq!(result.elements[0].text, "Example Domain");
    assert!(!engine.is_running().await);
}
