//! Workflow module - the query-routing state machine
//!
//! One decision point, two terminal branches: the router classifies the
//! question, then exactly one of the recipe retriever or the web search
//! runs and fills the state's documents. A pure dispatch - no merge
//! step, no retry edge, no cross-branch fallback when a branch comes
//! back empty. A router failure aborts the run before either branch
//! executes.

use anyhow::{Context, Result};

use crate::config::Config;
use crate::knowledge::{Document, KnowledgeRetriever, Retriever};
use crate::router::{DataSource, GeminiRouter, Router};
use crate::search::{DuckDuckGoSearch, WebSearch};

// ============================================================================
// GraphState
// ============================================================================

/// State threaded through one workflow invocation
#[derive(Debug, Clone)]
pub struct GraphState {
    /// The question, verbatim, never rewritten by a branch
    pub question: String,
    /// Documents produced by whichever branch ran
    pub documents: Vec<Document>,
    /// Reserved for a future answer-generation step
    pub generation: Option<String>,
}

// ============================================================================
// Workflow
// ============================================================================

/// Routing workflow over the three seams
pub struct Workflow<R, K, S> {
    router: R,
    retriever: K,
    search: S,
}

impl Workflow<GeminiRouter, KnowledgeRetriever, DuckDuckGoSearch> {
    /// Production workflow wired from runtime configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            GeminiRouter::new(config.google_api_key.clone())
                .context("Failed to create router")?,
            KnowledgeRetriever::new(config).context("Failed to create retriever")?,
            DuckDuckGoSearch::new().context("Failed to create web search")?,
        ))
    }
}

impl<R, K, S> Workflow<R, K, S>
where
    R: Router,
    K: Retriever,
    S: WebSearch,
{
    pub fn new(router: R, retriever: K, search: S) -> Self {
        Self {
            router,
            retriever,
            search,
        }
    }

    /// Run one question through route -> branch -> done
    pub async fn run(&self, question: &str) -> Result<GraphState> {
        let decision = self
            .router
            .route(question)
            .await
            .context("Routing failed")?;

        tracing::info!("Question routed to {}", decision.as_str());

        let documents = match decision {
            DataSource::Vectorstore => self
                .retriever
                .retrieve(question)
                .await
                .context("Retrieval failed")?,
            DataSource::DuckDuckGoSearch => {
                let document = self
                    .search
                    .search(question)
                    .await
                    .context("Web search failed")?;
                vec![document]
            }
        };

        Ok(GraphState {
            question: question.to_string(),
            documents,
            generation: None,
        })
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct FixedRouter {
        decision: DataSource,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Router for FixedRouter {
        async fn route(&self, _question: &str) -> Result<DataSource> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.decision)
        }
    }

    struct FailingRouter;

    #[async_trait]
    impl Router for FailingRouter {
        async fn route(&self, _question: &str) -> Result<DataSource> {
            anyhow::bail!("connection reset by peer")
        }
    }

    struct StubRetriever {
        documents: Vec<Document>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl Retriever for StubRetriever {
        async fn retrieve(&self, _question: &str) -> Result<Vec<Document>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.documents.clone())
        }
    }

    struct StubSearch {
        text: String,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl WebSearch for StubSearch {
        async fn search(&self, _question: &str) -> Result<Document> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Document::new(self.text.clone()))
        }
    }

    struct Counters {
        route: Arc<AtomicUsize>,
        retrieve: Arc<AtomicUsize>,
        search: Arc<AtomicUsize>,
    }

    fn workflow_with(
        decision: DataSource,
        documents: Vec<Document>,
    ) -> (Workflow<FixedRouter, StubRetriever, StubSearch>, Counters) {
        let counters = Counters {
            route: Arc::new(AtomicUsize::new(0)),
            retrieve: Arc::new(AtomicUsize::new(0)),
            search: Arc::new(AtomicUsize::new(0)),
        };

        let workflow = Workflow::new(
            FixedRouter {
                decision,
                calls: counters.route.clone(),
            },
            StubRetriever {
                documents,
                calls: counters.retrieve.clone(),
            },
            StubSearch {
                text: "raw search text".to_string(),
                calls: counters.search.clone(),
            },
        );

        (workflow, counters)
    }

    // P1: exactly one branch runs per invocation
    #[tokio::test]
    async fn test_vectorstore_branch_is_exclusive() {
        let (workflow, counters) =
            workflow_with(DataSource::Vectorstore, vec![Document::new("doc")]);

        workflow.run("How spicy is Tom Yum?").await.unwrap();

        assert_eq!(counters.route.load(Ordering::SeqCst), 1);
        assert_eq!(counters.retrieve.load(Ordering::SeqCst), 1);
        assert_eq!(counters.search.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_search_branch_is_exclusive() {
        let (workflow, counters) = workflow_with(DataSource::DuckDuckGoSearch, vec![]);

        workflow.run("What is the capital of France?").await.unwrap();

        assert_eq!(counters.route.load(Ordering::SeqCst), 1);
        assert_eq!(counters.retrieve.load(Ordering::SeqCst), 0);
        assert_eq!(counters.search.load(Ordering::SeqCst), 1);
    }

    // P2: same label, same branch, every time
    #[tokio::test]
    async fn test_routing_is_deterministic() {
        let (workflow, counters) =
            workflow_with(DataSource::Vectorstore, vec![Document::new("doc")]);

        for _ in 0..3 {
            workflow.run("Green curry paste?").await.unwrap();
        }

        assert_eq!(counters.retrieve.load(Ordering::SeqCst), 3);
        assert_eq!(counters.search.load(Ordering::SeqCst), 0);
    }

    // P5: question survives the run untouched
    #[tokio::test]
    async fn test_question_is_never_rewritten() {
        let question = "  How do I make Pad Thai?\n";
        let (workflow, _) = workflow_with(DataSource::Vectorstore, vec![]);

        let state = workflow.run(question).await.unwrap();
        assert_eq!(state.question, question);
        assert!(state.generation.is_none());
    }

    // Scenario A: two retrieved documents, score order preserved
    #[tokio::test]
    async fn test_retrieved_documents_keep_their_order() {
        let documents = vec![
            Document::new("Pad Thai recipe, score 0.81"),
            Document::new("Noodle history, score 0.63"),
        ];
        let (workflow, _) = workflow_with(DataSource::Vectorstore, documents.clone());

        let state = workflow.run("How do I make Pad Thai?").await.unwrap();
        assert_eq!(state.documents.len(), 2);
        assert_eq!(state.documents, documents);
    }

    // Scenario B / P4: search branch always yields exactly one document
    #[tokio::test]
    async fn test_search_branch_yields_single_document() {
        let (workflow, _) = workflow_with(DataSource::DuckDuckGoSearch, vec![]);

        let state = workflow.run("What is the capital of France?").await.unwrap();
        assert_eq!(state.documents.len(), 1);
        assert_eq!(state.documents[0].page_content, "raw search text");
    }

    // Scenario C: empty retrieval is terminal success, no fallback to search
    #[tokio::test]
    async fn test_empty_retrieval_is_success_without_fallback() {
        let (workflow, counters) = workflow_with(DataSource::Vectorstore, vec![]);

        let state = workflow.run("Thai curry history").await.unwrap();
        assert!(state.documents.is_empty());
        assert_eq!(counters.search.load(Ordering::SeqCst), 0);
    }

    // Scenario D: router failure aborts before any branch
    #[tokio::test]
    async fn test_router_failure_propagates() {
        let retrieve_calls = Arc::new(AtomicUsize::new(0));
        let search_calls = Arc::new(AtomicUsize::new(0));

        let workflow = Workflow::new(
            FailingRouter,
            StubRetriever {
                documents: vec![Document::new("doc")],
                calls: retrieve_calls.clone(),
            },
            StubSearch {
                text: "text".to_string(),
                calls: search_calls.clone(),
            },
        );

        let result = workflow.run("anything").await;
        assert!(result.is_err());
        assert_eq!(retrieve_calls.load(Ordering::SeqCst), 0);
        assert_eq!(search_calls.load(Ordering::SeqCst), 0);
    }

    // Branch errors propagate unchanged, no partial state
    #[tokio::test]
    async fn test_branch_failure_propagates() {
        struct FailingRetriever;

        #[async_trait]
        impl Retriever for FailingRetriever {
            async fn retrieve(&self, _question: &str) -> Result<Vec<Document>> {
                anyhow::bail!("index unreachable")
            }
        }

        let workflow = Workflow::new(
            FixedRouter {
                decision: DataSource::Vectorstore,
                calls: Arc::new(AtomicUsize::new(0)),
            },
            FailingRetriever,
            StubSearch {
                text: "text".to_string(),
                calls: Arc::new(AtomicUsize::new(0)),
            },
        );

        let result = workflow.run("Pad See Ew?").await;
        let message = format!("{:#}", result.unwrap_err());
        assert!(message.contains("index unreachable"));
    }
}
