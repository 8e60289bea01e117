// Copyright 2026 Websift Contributors
// SPDX-License-Identifier: Apache-2.0

//! Queryable documents: one selection interface over two backends.
//!
//! [`ParsedDocument`] wraps source markup parsed with `scraper`;
//! [`LiveDocument`] runs the same selection inside a rendered browser tab.
//! Extractors only talk to [`QueryableDocument`] and assemble their result
//! through [`collect_result`].

use super::{
    ExtractedElement, ExtractionMethod, ExtractionRequest, ExtractionResult, PageMetadata,
};
use crate::error::{ExtractError, RenderError};
use crate::renderer::RenderContext;
use async_trait::async_trait;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use std::sync::OnceLock;
use std::time::Instant;

/// Subtrees removed from parsed documents before selection.
const NON_CONTENT_SELECTOR: &str = "script, style, noscript";

/// A document that can answer selector queries and report its metadata.
#[async_trait]
pub trait QueryableDocument: Send + Sync {
    /// All elements matching `selector` that carry non-empty text.
    async fn select(&self, selector: &str) -> Result<Vec<ExtractedElement>, ExtractError>;

    /// Title and standard `<meta>` values.
    async fn metadata(&self) -> Result<PageMetadata, ExtractError>;
}

/// Run the selector against `document` and assemble the result.
pub async fn collect_result(
    document: &dyn QueryableDocument,
    request: &ExtractionRequest,
    method: ExtractionMethod,
    started: Instant,
) -> Result<ExtractionResult, ExtractError> {
    let mut elements = document.select(request.selector()).await?;
    elements.retain(|el| !el.text.trim().is_empty());
    let metadata = document.metadata().await?;

    Ok(ExtractionResult {
        url: request.requested().to_string(),
        method,
        selector: request.selector().to_string(),
        found: elements.len(),
        elements,
        metadata,
        duration_ms: started.elapsed().as_millis() as u64,
    })
}

// ── Parsed (static) documents ───────────────────────────────────────────────

/// Source markup queried with `scraper`.
///
/// `scraper::Html` is neither `Send` nor `Sync`, so the document keeps the
/// source and parses it inside each synchronous query. Metadata from the
/// first parse is cached, so a selection followed by a metadata read costs
/// one parse.
#[derive(Debug, Clone)]
pub struct ParsedDocument {
    source: String,
    metadata: OnceLock<PageMetadata>,
}

impl ParsedDocument {
    pub fn parse(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            metadata: OnceLock::new(),
        }
    }

    /// Synchronous selection used by the async trait method.
    pub fn select_elements(&self, selector: &str) -> Result<Vec<ExtractedElement>, ExtractError> {
        let sel = Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
            selector: selector.to_string(),
            reason: e.to_string(),
        })?;
        let cleaned = CleanedHtml::parse(&self.source);
        self.metadata.get_or_init(|| cleaned.metadata());
        Ok(cleaned.select(&sel))
    }

    pub fn page_metadata(&self) -> PageMetadata {
        self.metadata
            .get_or_init(|| CleanedHtml::parse(&self.source).metadata())
            .clone()
    }
}

#[async_trait]
impl QueryableDocument for ParsedDocument {
    async fn select(&self, selector: &str) -> Result<Vec<ExtractedElement>, ExtractError> {
        self.select_elements(selector)
    }

    async fn metadata(&self) -> Result<PageMetadata, ExtractError> {
        Ok(self.page_metadata())
    }
}

/// A parsed tree with script, style, and noscript subtrees removed.
/// Sync-only; never held across an await.
struct CleanedHtml(Html);

impl CleanedHtml {
    fn parse(source: &str) -> Self {
        let mut document = Html::parse_document(source);
        strip_non_content(&mut document);
        Self(document)
    }

    fn select(&self, sel: &Selector) -> Vec<ExtractedElement> {
        self.0
            .select(sel)
            .enumerate()
            .filter_map(|(index, el)| element_from_ref(index, el))
            .collect()
    }

    fn metadata(&self) -> PageMetadata {
        parsed_metadata(&self.0)
    }
}

fn strip_non_content(document: &mut Html) {
    let Ok(sel) = Selector::parse(NON_CONTENT_SELECTOR) else {
        return;
    };
    let ids: Vec<_> = document.select(&sel).map(|el| el.id()).collect();
    for id in ids {
        if let Some(mut node) = document.tree.get_mut(id) {
            node.detach();
        }
    }
}

fn element_from_ref(index: usize, el: ElementRef<'_>) -> Option<ExtractedElement> {
    let text = el.text().collect::<String>().trim().to_string();
    if text.is_empty() {
        return None;
    }
    let value = el.value();
    Some(ExtractedElement {
        index,
        tag: value.name().to_ascii_lowercase(),
        text,
        html: el.inner_html(),
        attributes: value
            .attrs()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect(),
        // `Element::classes` yields tokens out of source order.
        classes: value
            .attr("class")
            .map(|c| c.split_whitespace().map(String::from).collect())
            .unwrap_or_default(),
        id: value.id().map(|s| s.to_string()),
    })
}

fn first_attr(document: &Html, selector: &str, attr: &str) -> Option<String> {
    let sel = Selector::parse(selector).ok()?;
    document
        .select(&sel)
        .next()
        .and_then(|el| el.value().attr(attr))
        .map(|s| s.to_string())
}

fn parsed_metadata(document: &Html) -> PageMetadata {
    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .unwrap_or_default();

    PageMetadata {
        title,
        description: first_attr(document, r#"meta[name="description"]"#, "content")
            .unwrap_or_default(),
        keywords: first_attr(document, r#"meta[name="keywords"]"#, "content").unwrap_or_default(),
        charset: first_attr(document, "meta[charset]", "charset")
            .unwrap_or_else(|| "utf-8".to_string()),
        viewport: first_attr(document, r#"meta[name="viewport"]"#, "content").unwrap_or_default(),
    }
}

// ── Live (rendered) documents ───────────────────────────────────────────────

/// Selection collected in the page; serialized to a string so the browser
/// returns it by value.
const COLLECT_ELEMENTS_JS: &str = r#"
(() => {
  const selector = __SELECTOR__;
  let matches;
  try {
    matches = document.querySelectorAll(selector);
  } catch (e) {
    return JSON.stringify({ invalidSelector: String(e && e.message || e) });
  }
  const elements = [];
  matches.forEach((el, index) => {
    const text = (el.textContent || '').trim();
    if (!text) return;
    const attributes = {};
    for (const attr of el.attributes) attributes[attr.name] = attr.value;
    elements.push({
      index,
      tag: el.tagName.toLowerCase(),
      text,
      html: el.innerHTML,
      attributes,
      classes: Array.from(el.classList),
      id: el.id || null,
    });
  });
  return JSON.stringify({ elements });
})()
"#;

const COLLECT_METADATA_JS: &str = r#"
(() => {
  const attr = (sel, name) => {
    const el = document.querySelector(sel);
    return (el && el.getAttribute(name)) || '';
  };
  return JSON.stringify({
    title: document.title || '',
    description: attr('meta[name="description"]', 'content'),
    keywords: attr('meta[name="keywords"]', 'content'),
    charset: attr('meta[charset]', 'charset') || 'utf-8',
    viewport: attr('meta[name="viewport"]', 'content'),
  });
})()
"#;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct LiveSelection {
    #[serde(default)]
    elements: Vec<ExtractedElement>,
    invalid_selector: Option<String>,
}

/// The DOM of an open browser tab.
pub struct LiveDocument<'a> {
    context: &'a dyn RenderContext,
}

impl<'a> LiveDocument<'a> {
    pub fn new(context: &'a dyn RenderContext) -> Self {
        Self { context }
    }

    async fn evaluate_json<T: for<'de> Deserialize<'de>>(
        &self,
        script: &str,
    ) -> Result<T, RenderError> {
        let value = self.context.execute_js(script).await?;
        let raw = value
            .as_str()
            .ok_or_else(|| RenderError::Evaluation("script did not return a string".into()))?;
        serde_json::from_str(raw).map_err(|e| RenderError::Evaluation(e.to_string()))
    }
}

/// Embed `selector` as a JS string literal in the collection script.
pub fn selection_script(selector: &str) -> String {
    let literal = serde_json::Value::String(selector.to_string()).to_string();
    COLLECT_ELEMENTS_JS.replace("__SELECTOR__", &literal)
}

#[async_trait]
impl QueryableDocument for LiveDocument<'_> {
    async fn select(&self, selector: &str) -> Result<Vec<ExtractedElement>, ExtractError> {
        let selection: LiveSelection = self.evaluate_json(&selection_script(selector)).await?;
        if let Some(reason) = selection.invalid_selector {
            return Err(ExtractError::InvalidSelector {
                selector: selector.to_string(),
                reason,
            });
        }
        Ok(selection.elements)
    }

    async fn metadata(&self) -> Result<PageMetadata, ExtractError> {
        Ok(self.evaluate_json(COLLECT_METADATA_JS).await?)
    }
}
