//! Knowledge Retriever - embed, search, filter by score
//!
//! Composes the Gemini embedder and the Astra index into the
//! vectorstore branch of the workflow: top-3 nearest neighbors, kept
//! only above the similarity threshold, best first. Zero survivors is a
//! legitimate result, not an error.

use anyhow::{Context, Result};
use async_trait::async_trait;

use crate::config::Config;
use crate::embedding::{EmbeddingProvider, GeminiEmbedding};

use super::astra::AstraVectorIndex;
use super::vector::{Document, ScoredDocument, VectorIndex};

/// Nearest neighbors requested per question
pub const TOP_K: usize = 3;

/// Minimum similarity a document must exceed to be returned
pub const SCORE_THRESHOLD: f32 = 0.5;

// ============================================================================
// Retriever Trait
// ============================================================================

/// Interface for fetching ranked documents for a question
#[async_trait]
pub trait Retriever: Send + Sync {
    async fn retrieve(&self, question: &str) -> Result<Vec<Document>>;
}

// ============================================================================
// KnowledgeRetriever
// ============================================================================

/// Retriever over the Astra DB recipe index
pub struct KnowledgeRetriever {
    embedder: GeminiEmbedding,
    index: AstraVectorIndex,
}

impl KnowledgeRetriever {
    /// Build the retriever from runtime configuration
    pub fn new(config: &Config) -> Result<Self> {
        let embedder = GeminiEmbedding::new(config.google_api_key.clone())
            .context("Failed to create embedder")?;
        let index = AstraVectorIndex::new(config).context("Failed to create vector index")?;

        Ok(Self { embedder, index })
    }
}

#[async_trait]
impl Retriever for KnowledgeRetriever {
    async fn retrieve(&self, question: &str) -> Result<Vec<Document>> {
        let query_embedding = self
            .embedder
            .embed(question)
            .await
            .context("Failed to embed question")?;

        let scored = self
            .index
            .search(&query_embedding, TOP_K)
            .await
            .context("Vector search failed")?;

        let documents = select_above_threshold(scored, SCORE_THRESHOLD);
        tracing::info!(
            "Retrieved {} documents above threshold {}",
            documents.len(),
            SCORE_THRESHOLD
        );

        Ok(documents)
    }
}

// ============================================================================
// Score Filtering
// ============================================================================

/// Keep documents strictly above the threshold, ordered best first
pub(crate) fn select_above_threshold(
    mut scored: Vec<ScoredDocument>,
    threshold: f32,
) -> Vec<Document> {
    scored.retain(|entry| entry.similarity > threshold);
    scored.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    scored.into_iter().map(|entry| entry.document).collect()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn scored(text: &str, similarity: f32) -> ScoredDocument {
        ScoredDocument {
            document: Document::new(text),
            similarity,
        }
    }

    #[test]
    fn test_threshold_filters_low_scores() {
        let results = vec![scored("a", 0.81), scored("b", 0.42), scored("c", 0.63)];

        let documents = select_above_threshold(results, SCORE_THRESHOLD);
        assert_eq!(documents.len(), 2);
        assert_eq!(documents[0].page_content, "a");
        assert_eq!(documents[1].page_content, "c");
    }

    #[test]
    fn test_threshold_is_strict() {
        let results = vec![scored("edge", SCORE_THRESHOLD)];
        assert!(select_above_threshold(results, SCORE_THRESHOLD).is_empty());
    }

    #[test]
    fn test_ordering_is_descending() {
        let results = vec![scored("low", 0.55), scored("high", 0.95), scored("mid", 0.7)];

        let documents = select_above_threshold(results, SCORE_THRESHOLD);
        let texts: Vec<&str> = documents.iter().map(|d| d.page_content.as_str()).collect();
        assert_eq!(texts, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_empty_result_is_valid() {
        let documents = select_above_threshold(vec![], SCORE_THRESHOLD);
        assert!(documents.is_empty());
    }

    #[test]
    fn test_never_more_than_top_k() {
        // The index is queried with TOP_K, so the filter input is already
        // bounded; the filter itself never grows the set.
        let results: Vec<ScoredDocument> = (0..TOP_K)
            .map(|i| scored(&format!("doc {}", i), 0.9 - i as f32 * 0.1))
            .collect();

        let documents = select_above_threshold(results, SCORE_THRESHOLD);
        assert!(documents.len() <= TOP_K);
    }
}
