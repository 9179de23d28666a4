//! thairecipes - Thai cuisine assistant with routed retrieval
//!
//! Each incoming question is classified by a Gemini router into one of
//! two data sources: an Astra DB vector index of Thai recipe documents,
//! or a live DuckDuckGo web search. Exactly one source is consulted per
//! question and its results are returned in a single normalized shape.

pub mod cli;
pub mod config;
pub mod embedding;
pub mod knowledge;
pub mod router;
pub mod search;
pub mod session;
pub mod workflow;

// Re-exports
pub use config::Config;
pub use embedding::{EmbeddingProvider, GeminiEmbedding};
pub use knowledge::{
    AstraVectorIndex, Document, KnowledgeRetriever, Retriever, ScoredDocument, VectorIndex,
    SCORE_THRESHOLD, TOP_K,
};
pub use router::{DataSource, GeminiRouter, RouteParseError, Router};
pub use search::{DuckDuckGoSearch, WebSearch};
pub use session::{render_documents, ChatHistory, ChatRole, ChatTurn};
pub use workflow::{GraphState, Workflow};
