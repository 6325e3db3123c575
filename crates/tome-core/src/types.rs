//! Core data types flowing through the question-answering pipeline.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A retrievable text chunk with provenance and a similarity score.
///
/// Passages are owned by the document store; the conversation engine holds
/// them only for the duration of a turn. The score ranks passages within a
/// single search and is never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passage {
    /// Chunk content.
    pub text: String,
    /// Identifier of the originating document.
    pub source_id: String,
    /// Similarity score from the store (higher = more relevant).
    pub score: f64,
}

/// An ingestion input unit: one chunk of document text with provenance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentChunk {
    /// Chunk content.
    pub text: String,
    /// Identifier of the originating document.
    pub source_id: String,
}

/// One question/reasoning/answer triple within a conversation.
///
/// Immutable once appended to a conversation's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Question text as submitted by the user.
    pub question: String,
    /// Model-produced reasoning trace (may be empty).
    pub reasoning: String,
    /// Model-produced final answer.
    pub answer: String,
    /// True if this turn triggered a document search.
    pub retrieval_performed: bool,
    /// Epoch seconds at which the turn was recorded.
    pub created_at: i64,
}

/// The reasoning/answer pair returned to the caller for one turn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnOutcome {
    /// The model's intermediate deliberation text.
    pub reasoning: String,
    /// The model's final answer.
    pub answer: String,
}

/// Per-conversation state owned by the conversation engine.
///
/// Created empty at conversation start, mutated exclusively by the engine,
/// and discarded when the conversation ends. `active_context` is non-empty
/// only after at least one retrieval has occurred in this conversation.
#[derive(Debug, Clone)]
pub struct ConversationState {
    /// Conversation identifier.
    pub id: Uuid,
    /// Chronological turn history (append-only; oldest turns may be
    /// summarized away as a unit, never edited individually).
    pub turns: Vec<Turn>,
    /// Passages currently considered relevant. Replaced wholesale on fresh
    /// retrieval, untouched on follow-up turns.
    pub active_context: Vec<Passage>,
    /// Condensed text of older turns, set once the turn count crosses the
    /// summarization threshold.
    pub summary: Option<String>,
}

impl ConversationState {
    /// Create a fresh, empty conversation.
    pub fn new(id: Uuid) -> Self {
        Self {
            id,
            turns: Vec::new(),
            active_context: Vec::new(),
            summary: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_conversation_is_empty() {
        let state = ConversationState::new(Uuid::new_v4());
        assert!(state.turns.is_empty());
        assert!(state.active_context.is_empty());
        assert!(state.summary.is_none());
    }

    #[test]
    fn test_turn_serde_round_trip() {
        let turn = Turn {
            question: "What is the refund window?".to_string(),
            reasoning: "The policy section mentions 30 days.".to_string(),
            answer: "30 days.".to_string(),
            retrieval_performed: true,
            created_at: 1_700_000_000,
        };
        let json = serde_json::to_string(&turn).unwrap();
        let back: Turn = serde_json::from_str(&json).unwrap();
        assert_eq!(turn, back);
    }

    #[test]
    fn test_passage_serde() {
        let passage = Passage {
            text: "Refunds are accepted within 30 days.".to_string(),
            source_id: "policy.md".to_string(),
            score: 0.91,
        };
        let json = serde_json::to_value(&passage).unwrap();
        assert_eq!(json["source_id"], "policy.md");
    }
}
