//! Conversation orchestration core for Tome.
//!
//! Owns per-conversation state and drives the turn lifecycle: decide whether
//! fresh retrieval is required, assemble the prompt, invoke the model, split
//! its reasoning trace from the final answer, and persist the running
//! conversation so later turns can reference earlier ones.

pub mod classifier;
pub mod engine;
pub mod error;
pub mod parser;
pub mod phase;
pub mod prompts;

pub use classifier::RetrievalVerdict;
pub use engine::ChatEngine;
pub use error::{ChatError, GenerationFailure};
pub use parser::{split_reasoning, ParsedReply};
pub use phase::TurnPhase;
pub use prompts::{AnswerTemplate, FollowupTemplate, SummaryTemplate};
