//! Vector index types and trait
//!
//! Both branches of the workflow emit the same `Document` shape, so the
//! caller never cares which data source produced a result.

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ============================================================================
// Types
// ============================================================================

/// A unit of retrieved content
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    /// Text body
    pub page_content: String,
    /// Optional source metadata
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl Document {
    /// Document with a text body and no metadata
    pub fn new(page_content: impl Into<String>) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: None,
        }
    }

    /// Document with a text body and metadata
    pub fn with_metadata(page_content: impl Into<String>, metadata: serde_json::Value) -> Self {
        Self {
            page_content: page_content.into(),
            metadata: Some(metadata),
        }
    }
}

/// A retrieved document with its similarity score
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: Document,
    /// Similarity on the index's scale (0.0 ~ 1.0 for Astra cosine)
    pub similarity: f32,
}

// ============================================================================
// VectorIndex Trait
// ============================================================================

/// Read-only similarity search over an externally managed index
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Nearest neighbors of the query embedding, best first
    async fn search(&self, query_embedding: &[f32], limit: usize) -> Result<Vec<ScoredDocument>>;
}

// ============================================================================
// Tests
// ============================================================================
