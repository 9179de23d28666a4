//! Web search module - DuckDuckGo fallback branch
//!
//! Off-topic questions are answered from a live DuckDuckGo search. The
//! engine's HTML results page is fetched (no API key needed), the top
//! snippets are aggregated into one text, and the whole thing is
//! wrapped as exactly one Document regardless of hit count.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use scraper::{Html, Selector};

use crate::knowledge::Document;

/// DuckDuckGo HTML results endpoint
const DDG_HTML_URL: &str = "https://html.duckduckgo.com/html/";

/// Snippets aggregated per search
const MAX_RESULTS: usize = 5;

/// HTTP timeout for search calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Body used when the engine returns no results at all
const NO_RESULTS_TEXT: &str = "No good DuckDuckGo Search Result was found";

// ============================================================================
// WebSearch Trait
// ============================================================================

/// Interface for the web search fallback
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Always yields exactly one Document
    async fn search(&self, question: &str) -> Result<Document>;
}

// ============================================================================
// DuckDuckGoSearch
// ============================================================================

/// DuckDuckGo HTML search client
pub struct DuckDuckGoSearch {
    client: reqwest::Client,
    max_results: usize,
}

impl DuckDuckGoSearch {
    /// Create a new search client
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("thairecipes/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            max_results: MAX_RESULTS,
        })
    }
}

#[async_trait]
impl WebSearch for DuckDuckGoSearch {
    async fn search(&self, question: &str) -> Result<Document> {
        tracing::info!("Searching DuckDuckGo: {:?}", question);

        let response = self
            .client
            .get(DDG_HTML_URL)
            .query(&[("q", question)])
            .send()
            .await
            .context("Failed to send search request")?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("DuckDuckGo returned {}", status);
        }

        let html = response
            .text()
            .await
            .context("Failed to read search response body")?;

        let text = aggregate_results(&html, self.max_results);
        let body = if text.is_empty() {
            NO_RESULTS_TEXT.to_string()
        } else {
            text
        };

        Ok(Document::new(body))
    }
}

// ============================================================================
// Result Parsing
// ============================================================================

/// Join the top result snippets into one aggregated text
///
/// Result snippets live in `.result__snippet` elements; the linked
/// title (`.result__a`) stands in when a result has no snippet.
fn aggregate_results(html: &str, max: usize) -> String {
    let document = Html::parse_document(html);

    let snippets = collect_first_texts(&document, ".result__snippet", max);
    let texts = if snippets.is_empty() {
        collect_first_texts(&document, ".result__a", max)
    } else {
        snippets
    };

    texts.join(" ")
}

/// Text content of the first `max` matches of a selector
fn collect_first_texts(document: &Html, selector_str: &str, max: usize) -> Vec<String> {
    let mut texts = Vec::new();

    if let Ok(selector) = Selector::parse(selector_str) {
        for element in document.select(&selector).take(max) {
            let text = normalize_whitespace(&element.text().collect::<String>());
            if !text.is_empty() {
                texts.push(text);
            }
        }
    }

    texts
}

/// Collapse runs of whitespace into single spaces
fn normalize_whitespace(text: &str) -> String {
    if let Ok(re) = regex::Regex::new(r"\s+") {
        re.replace_all(text, " ").trim().to_string()
    } else {
        text.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    const RESULTS_PAGE: &str = r#"
        <html><body>
            <div class="result">
                <a class="result__a" href="https://example.com/paris">Paris - Wikipedia</a>
                <a class="result__snippet">Paris is the capital
                    and largest city of France.</a>
            </div>
            <div class="result">
                <a class="result__a" href="https://example.com/france">France</a>
                <a class="result__snippet">France, officially the French Republic,
                    has its capital in <b>Paris</b>.</a>
            </div>
        </body></html>
    "#;

    #[test]
    fn test_aggregate_joins_snippets() {
        let text = aggregate_results(RESULTS_PAGE, 5);
        assert!(text.contains("Paris is the capital and largest city of France."));
        assert!(text.contains("French Republic"));
    }

    #[test]
    fn test_aggregate_strips_markup_and_whitespace() {
        let text = aggregate_results(RESULTS_PAGE, 5);
        assert!(!text.contains('\n'));
        assert!(!text.contains("<b>"));
        assert!(!text.contains("  "));
    }

    #[test]
    fn test_aggregate_respects_max() {
        let text = aggregate_results(RESULTS_PAGE, 1);
        assert!(text.contains("largest city"));
        assert!(!text.contains("French Republic"));
    }

    #[test]
    fn test_aggregate_falls_back_to_titles() {
        let html = r#"
            <html><body>
                <a class="result__a" href="https://example.com">Thai Basil Chicken</a>
            </body></html>
        "#;
        assert_eq!(aggregate_results(html, 5), "Thai Basil Chicken");
    }

    #[test]
    fn test_aggregate_empty_page() {
        assert_eq!(aggregate_results("<html><body></body></html>", 5), "");
    }

    #[test]
    fn test_normalize_whitespace() {
        assert_eq!(normalize_whitespace("  a\n\tb   c "), "a b c");
        assert_eq!(normalize_whitespace(""), "");
    }
}
