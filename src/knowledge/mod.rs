//! Knowledge module - recipe retrieval from the Astra DB vector index
//!
//! - vector: Document shape + VectorIndex trait
//! - astra: Astra DB Data API client (read-only)
//! - retriever: embed -> search -> threshold filter pipeline

mod astra;
mod retriever;
mod vector;

// Re-exports
pub use astra::AstraVectorIndex;
pub use retriever::{KnowledgeRetriever, Retriever, SCORE_THRESHOLD, TOP_K};
pub use vector::{Document, ScoredDocument, VectorIndex};
