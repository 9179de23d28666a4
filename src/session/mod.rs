//! Session module - chat transcript and document rendering
//!
//! A process-local append-only log of one interactive session. Nothing
//! here is persisted; the transcript dies with the session.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::knowledge::Document;

// ============================================================================
// Types
// ============================================================================

/// Who produced a turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    Human,
    Ai,
}

/// One turn of the conversation
#[derive(Debug, Clone, Serialize)]
pub struct ChatTurn {
    pub role: ChatRole,
    pub content: String,
    pub at: DateTime<Utc>,
}

// ============================================================================
// ChatHistory
// ============================================================================

/// Append-only transcript of one session
#[derive(Debug)]
pub struct ChatHistory {
    session_id: Uuid,
    turns: Vec<ChatTurn>,
}

impl ChatHistory {
    pub fn new() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            turns: Vec::new(),
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session_id
    }

    /// Append a user turn
    pub fn push_human(&mut self, content: impl Into<String>) {
        self.push(ChatRole::Human, content.into());
    }

    /// Append an assistant turn
    pub fn push_ai(&mut self, content: impl Into<String>) {
        self.push(ChatRole::Ai, content.into());
    }

    fn push(&mut self, role: ChatRole, content: String) {
        self.turns.push(ChatTurn {
            role,
            content,
            at: Utc::now(),
        });
    }

    pub fn turns(&self) -> &[ChatTurn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }
}

impl Default for ChatHistory {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Rendering
// ============================================================================

/// Join document bodies into one display string, in sequence order
pub fn render_documents(documents: &[Document]) -> String {
    documents
        .iter()
        .map(|doc| doc.page_content.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_appends_in_order() {
        let mut history = ChatHistory::new();
        history.push_human("How do I make Pad Thai?");
        history.push_ai("Soak the rice noodles first.");
        history.push_human("For how long?");

        assert_eq!(history.len(), 3);
        assert_eq!(history.turns()[0].role, ChatRole::Human);
        assert_eq!(history.turns()[1].role, ChatRole::Ai);
        assert_eq!(history.turns()[2].content, "For how long?");
    }

    #[test]
    fn test_new_history_is_empty() {
        let history = ChatHistory::new();
        assert!(history.is_empty());
    }

    #[test]
    fn test_sessions_have_distinct_ids() {
        assert_ne!(ChatHistory::new().session_id(), ChatHistory::new().session_id());
    }

    #[test]
    fn test_role_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ChatRole::Human).unwrap(), "\"human\"");
        assert_eq!(serde_json::to_string(&ChatRole::Ai).unwrap(), "\"ai\"");
    }

    #[test]
    fn test_render_documents_joins_with_newline() {
        let documents = vec![
            Document::new("Pad Thai uses rice noodles."),
            Document::new("Tamarind gives the sauce its sourness."),
        ];

        assert_eq!(
            render_documents(&documents),
            "Pad Thai uses rice noodles.\nTamarind gives the sauce its sourness."
        );
    }

    #[test]
    fn test_render_single_document_has_no_newline() {
        let documents = vec![Document::new("one")];
        assert_eq!(render_documents(&documents), "one");
    }

    #[test]
    fn test_render_empty_documents() {
        assert_eq!(render_documents(&[]), "");
    }
}
