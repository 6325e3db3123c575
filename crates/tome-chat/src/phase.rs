//! Turn lifecycle phases with validated transitions.
//!
//! One turn moves through:
//! Idle -> Classifying -> [Retrieving] -> Generating -> Parsing -> Recorded -> Idle
//! Retrieving is skipped for follow-up turns.

use tracing::debug;
use uuid::Uuid;

use crate::error::ChatError;

/// Phase of the turn currently being processed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnPhase {
    /// Awaiting a question.
    Idle,
    /// Deciding whether fresh retrieval is required.
    Classifying,
    /// Searching the document store (conditional).
    Retrieving,
    /// Waiting on the model's answer.
    Generating,
    /// Splitting reasoning from answer.
    Parsing,
    /// Turn appended to history.
    Recorded,
}

/// Validate that a phase transition is allowed.
///
/// Valid transitions:
/// - Idle -> Classifying
/// - Classifying -> Retrieving
/// - Classifying -> Generating (follow-up: retrieval skipped)
/// - Retrieving -> Generating
/// - Generating -> Parsing
/// - Parsing -> Recorded
/// - Recorded -> Idle
pub fn validate_transition(from: TurnPhase, to: TurnPhase) -> Result<(), ChatError> {
    let valid = matches!(
        (from, to),
        (TurnPhase::Idle, TurnPhase::Classifying)
            | (TurnPhase::Classifying, TurnPhase::Retrieving)
            | (TurnPhase::Classifying, TurnPhase::Generating)
            | (TurnPhase::Retrieving, TurnPhase::Generating)
            | (TurnPhase::Generating, TurnPhase::Parsing)
            | (TurnPhase::Parsing, TurnPhase::Recorded)
            | (TurnPhase::Recorded, TurnPhase::Idle)
    );

    if valid {
        Ok(())
    } else {
        Err(ChatError::InvalidPhase(from, to))
    }
}

/// Tracks the current phase of one in-flight turn.
pub(crate) struct PhaseTracker {
    conversation_id: Uuid,
    current: TurnPhase,
}

impl PhaseTracker {
    pub(crate) fn new(conversation_id: Uuid) -> Self {
        Self {
            conversation_id,
            current: TurnPhase::Idle,
        }
    }

    /// Move to the next phase, rejecting invalid transitions.
    pub(crate) fn advance(&mut self, next: TurnPhase) -> Result<(), ChatError> {
        validate_transition(self.current, next)?;
        debug!(
            conversation = %self.conversation_id,
            from = ?self.current,
            to = ?next,
            "Turn phase transition"
        );
        self.current = next;
        Ok(())
    }
}
