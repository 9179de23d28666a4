//! Router module - question classification via Gemini structured output
//!
//! Decides, per question, which data source answers it: the recipe
//! vector index or a live web search. The model is constrained to a
//! two-value enumeration; anything outside it is an explicit parse
//! error, never a silent default.

use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ============================================================================
// DataSource
// ============================================================================

/// Routing decision: which data source serves the question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DataSource {
    /// Astra DB recipe index
    #[serde(rename = "vectorstore")]
    Vectorstore,
    /// Live DuckDuckGo search
    #[serde(rename = "duckduckgo-search")]
    DuckDuckGoSearch,
}

impl DataSource {
    /// Wire label of this data source
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::Vectorstore => "vectorstore",
            DataSource::DuckDuckGoSearch => "duckduckgo-search",
        }
    }
}

impl FromStr for DataSource {
    type Err = RouteParseError;

    fn from_str(label: &str) -> Result<Self, Self::Err> {
        match label {
            "vectorstore" => Ok(DataSource::Vectorstore),
            "duckduckgo-search" => Ok(DataSource::DuckDuckGoSearch),
            other => Err(RouteParseError::UnknownLabel(other.to_string())),
        }
    }
}

/// Routing output that failed the two-value contract
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteParseError {
    #[error("unrecognized data source label: {0:?}")]
    UnknownLabel(String),
    #[error("empty routing response")]
    Empty,
}

// ============================================================================
// Router Trait
// ============================================================================

/// Interface for classifying a question into a data source
#[async_trait]
pub trait Router: Send + Sync {
    async fn route(&self, question: &str) -> Result<DataSource>;
}

// ============================================================================
// GeminiRouter
// ============================================================================

/// Gemini generateContent endpoint used for routing
const GEMINI_GENERATE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash-exp:generateContent";

/// HTTP timeout for routing calls
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Low temperature biases the router toward deterministic labels
const ROUTING_TEMPERATURE: f32 = 0.1;

/// A label needs no prose
const ROUTING_MAX_TOKENS: u32 = 30;

/// Routing system instruction
const ROUTER_SYSTEM_PROMPT: &str = "\
You are ThaiRecipes, a helpful and concise assistant specializing in Thai cuisine.

For inquiries related to Thai recipes, ingredients, cooking techniques, or cultural \
food traditions, route the question to the vectorstore to retrieve the most relevant \
documents quickly.

For all other topics, route the question to duckduckgo-search to find the best \
available information promptly.

Respond with exactly one label: \"vectorstore\" or \"duckduckgo-search\".";

/// Gemini-backed question router
pub struct GeminiRouter {
    api_key: String,
    client: reqwest::Client,
}

impl GeminiRouter {
    /// Create a new router client
    pub fn new(api_key: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self { api_key, client })
    }

    fn build_request(question: &str) -> GenerateRequest {
        GenerateRequest {
            system_instruction: Content {
                role: None,
                parts: vec![Part {
                    text: ROUTER_SYSTEM_PROMPT.to_string(),
                }],
            },
            contents: vec![Content {
                role: Some("user".to_string()),
                parts: vec![Part {
                    text: question.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: ROUTING_TEMPERATURE,
                max_output_tokens: ROUTING_MAX_TOKENS,
                response_mime_type: "application/json".to_string(),
                response_schema: serde_json::json!({
                    "type": "STRING",
                    "enum": ["vectorstore", "duckduckgo-search"]
                }),
            },
        }
    }
}

#[async_trait]
impl Router for GeminiRouter {
    async fn route(&self, question: &str) -> Result<DataSource> {
        let request = Self::build_request(question);

        let response = self
            .client
            .post(GEMINI_GENERATE_URL)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .context("Failed to send routing request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read routing response body")?;

        if !status.is_success() {
            anyhow::bail!("Gemini API error ({}): {}", status, body);
        }

        let generate_response: GenerateResponse =
            serde_json::from_str(&body).context("Failed to parse routing response")?;

        let raw = generate_response
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content.parts.into_iter().next())
            .map(|p| p.text)
            .ok_or_else(|| anyhow::anyhow!("No text in routing response"))?;

        let decision = parse_route(&raw).context("Routing output outside contract")?;
        tracing::info!("Routed question to {}", decision.as_str());

        Ok(decision)
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction")]
    system_instruction: Content,
    contents: Vec<Content>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    #[serde(skip_serializing_if = "Option::is_none")]
    role: Option<String>,
    parts: Vec<Part>,
}

#[derive(Debug, Serialize)]
struct Part {
    text: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
    #[serde(rename = "responseMimeType")]
    response_mime_type: String,
    #[serde(rename = "responseSchema")]
    response_schema: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Vec<TextPart>,
}

#[derive(Debug, Deserialize)]
struct TextPart {
    text: String,
}

// ============================================================================
// Strict Label Parsing
// ============================================================================

/// Parse the raw model output into a routing decision
///
/// Accepts a bare label, a JSON string label (what constrained decoding
/// returns), or a `{"datasource": "..."}` object. Anything else fails
/// with the offending label.
pub fn parse_route(raw: &str) -> Result<DataSource, RouteParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(RouteParseError::Empty);
    }

    if let Ok(value) = serde_json::from_str::<serde_json::Value>(trimmed) {
        match value {
            serde_json::Value::String(label) => return DataSource::from_str(&label),
            serde_json::Value::Object(map) => {
                if let Some(label) = map.get("datasource").and_then(|v| v.as_str()) {
                    return DataSource::from_str(label);
                }
                return Err(RouteParseError::UnknownLabel(trimmed.to_string()));
            }
            _ => return Err(RouteParseError::UnknownLabel(trimmed.to_string())),
        }
    }

    DataSource::from_str(trimmed)
}

// ============================================================================
// Tests
// ============================================================================
