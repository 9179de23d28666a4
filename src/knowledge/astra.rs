//! Astra DB Data API client - vector similarity search
//!
//! The recipe index lives in a DataStax Astra database and is assumed
//! pre-populated; this client only ever reads from it.
//! ref: https://docs.datastax.com/en/astra-db-serverless/api-reference/document-methods/find-many.html

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

use crate::config::Config;

use super::vector::{Document, ScoredDocument, VectorIndex};

/// HTTP timeout for index queries
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ============================================================================
// AstraVectorIndex
// ============================================================================

/// Astra DB-backed vector index
pub struct AstraVectorIndex {
    client: reqwest::Client,
    endpoint: Url,
    token: String,
    keyspace: String,
    collection: String,
}

impl AstraVectorIndex {
    /// Create a client for the configured database and collection
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            endpoint: config.astra_endpoint()?,
            token: config.astra_token.clone(),
            keyspace: config.keyspace.clone(),
            collection: config.collection.clone(),
        })
    }

    /// Data API URL of the collection
    fn collection_url(&self) -> Result<Url> {
        self.endpoint
            .join(&format!(
                "api/json/v1/{}/{}",
                self.keyspace, self.collection
            ))
            .context("Failed to build collection URL")
    }
}

#[async_trait]
impl VectorIndex for AstraVectorIndex {
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<ScoredDocument>> {
        let command = serde_json::json!({
            "find": {
                "sort": { "$vector": query_embedding },
                "options": { "limit": limit, "includeSimilarity": true }
            }
        });

        let response = self
            .client
            .post(self.collection_url()?)
            .header("Token", &self.token)
            .json(&command)
            .send()
            .await
            .context("Failed to send vector search request")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read vector search response body")?;

        if !status.is_success() {
            anyhow::bail!("Astra Data API error ({}): {}", status, body);
        }

        let find_response: FindResponse =
            serde_json::from_str(&body).context("Failed to parse vector search response")?;

        // Command-level errors come back with HTTP 200
        if let Some(errors) = find_response.errors {
            let messages: Vec<String> = errors.into_iter().map(|e| e.message).collect();
            anyhow::bail!("Astra Data API command failed: {}", messages.join("; "));
        }

        let records = find_response
            .data
            .map(|d| d.documents)
            .unwrap_or_default();

        let results: Vec<ScoredDocument> = records
            .into_iter()
            .filter_map(document_from_record)
            .collect();

        tracing::debug!(
            "Vector search returned {} scored documents (limit {})",
            results.len(),
            limit
        );

        Ok(results)
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct FindResponse {
    #[serde(default)]
    data: Option<FindData>,
    #[serde(default)]
    errors: Option<Vec<ApiError>>,
}

#[derive(Debug, Deserialize)]
struct FindData {
    #[serde(default)]
    documents: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

// ============================================================================
// Record Mapping
// ============================================================================

/// Map one Data API record to a scored document
///
/// The text body lives in `content`; `$similarity` carries the score.
/// Remaining fields (minus the stored `$vector`) become metadata.
/// Records without a body or score are dropped.
fn document_from_record(mut record: serde_json::Value) -> Option<ScoredDocument> {
    let fields = record.as_object_mut()?;

    let similarity = fields.remove("$similarity")?.as_f64()? as f32;
    let page_content = fields.remove("content")?.as_str()?.to_string();
    fields.remove("$vector");

    let metadata = if fields.is_empty() {
        None
    } else {
        Some(serde_json::Value::Object(fields.clone()))
    };

    Some(ScoredDocument {
        document: Document {
            page_content,
            metadata,
        },
        similarity,
    })
}

// ============================================================================
// Tests
// ============================================================================
