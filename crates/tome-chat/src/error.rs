//! Error types for the conversation engine.

use uuid::Uuid;

use tome_core::error::TomeError;
use tome_llm::ModelError;

use crate::phase::TurnPhase;

/// The underlying cause of an aborted turn.
///
/// Both the model endpoint failing outright and the document store failing
/// during a required retrieval make generation impossible; the engine
/// surfaces them uniformly so the caller can retry the same question.
#[derive(Debug, thiserror::Error)]
pub enum GenerationFailure {
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Store(#[from] TomeError),
}

/// Errors from the conversation engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("question cannot be empty")]
    EmptyQuestion,
    #[error("question exceeds maximum length of {0} characters")]
    QuestionTooLong(usize),
    #[error("conversation not found: {0}")]
    ConversationNotFound(Uuid),
    #[error("generation failed for question {question:?}: {source}")]
    Generation {
        /// The submitted question, carried so the caller can resubmit it.
        question: String,
        source: GenerationFailure,
    },
    #[error("invalid turn phase transition: {0:?} -> {1:?}")]
    InvalidPhase(TurnPhase, TurnPhase),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<TomeError> for ChatError {
    fn from(err: TomeError) -> Self {
        ChatError::Storage(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        let err = ChatError::EmptyQuestion;
        assert_eq!(err.to_string(), "question cannot be empty");

        let err = ChatError::QuestionTooLong(2000);
        assert_eq!(
            err.to_string(),
            "question exceeds maximum length of 2000 characters"
        );

        let id = Uuid::nil();
        let err = ChatError::ConversationNotFound(id);
        assert_eq!(
            err.to_string(),
            "conversation not found: 00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn test_generation_error_carries_question_and_cause() {
        let err = ChatError::Generation {
            question: "what is the refund window?".to_string(),
            source: GenerationFailure::Model(ModelError::Timeout(120)),
        };
        let msg = err.to_string();
        assert!(msg.contains("what is the refund window?"));
        assert!(msg.contains("timed out after 120 seconds"));
    }

    #[test]
    fn test_store_failure_maps_into_generation_failure() {
        let failure: GenerationFailure =
            TomeError::Search("index unavailable".to_string()).into();
        assert!(matches!(failure, GenerationFailure::Store(_)));
        assert!(failure.to_string().contains("index unavailable"));
    }

    #[test]
    fn test_tome_error_maps_to_storage() {
        let err: ChatError = TomeError::Storage("disk full".to_string()).into();
        assert!(matches!(err, ChatError::Storage(_)));
        assert!(err.to_string().contains("disk full"));
    }
}
