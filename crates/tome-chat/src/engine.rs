//! The conversation engine: drives one turn from question to recorded answer.
//!
//! The engine owns in-memory conversation state and coordinates the document
//! store, the model endpoint, and the persistence layer. Turns within one
//! conversation are serialized by a per-conversation async mutex; separate
//! conversations proceed independently.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use tracing::{debug, info, warn};
use uuid::Uuid;

use tome_core::config::{ChatConfig, RetrievalConfig};
use tome_core::types::{ConversationState, Passage, Turn, TurnOutcome};
use tome_llm::DynModelInvoker;
use tome_storage::ConversationRepository;
use tome_vector::DynDocumentStore;

use crate::classifier::RetrievalVerdict;
use crate::error::{ChatError, GenerationFailure};
use crate::parser::split_reasoning;
use crate::phase::{PhaseTracker, TurnPhase};
use crate::prompts::{AnswerTemplate, FollowupTemplate, SummaryTemplate};

type Session = Arc<tokio::sync::Mutex<ConversationState>>;

/// Orchestrates conversations over a document store and a model endpoint.
pub struct ChatEngine {
    store: Arc<dyn DynDocumentStore>,
    model: Arc<dyn DynModelInvoker>,
    repo: ConversationRepository,
    sessions: Mutex<HashMap<Uuid, Session>>,
    chat: ChatConfig,
    retrieval: RetrievalConfig,
}

impl ChatEngine {
    /// Create an engine over the given store, model, and repository.
    pub fn new(
        store: Arc<dyn DynDocumentStore>,
        model: Arc<dyn DynModelInvoker>,
        repo: ConversationRepository,
        chat: ChatConfig,
        retrieval: RetrievalConfig,
    ) -> Self {
        Self {
            store,
            model,
            repo,
            sessions: Mutex::new(HashMap::new()),
            chat,
            retrieval,
        }
    }

    /// Start a new, empty conversation and return its identifier.
    pub fn start_conversation(&self) -> Result<Uuid, ChatError> {
        let id = Uuid::new_v4();
        self.repo.create(id)?;
        self.insert_session(id, ConversationState::new(id))?;
        info!(conversation = %id, "Conversation started");
        Ok(id)
    }

    /// End a conversation, discarding its state and persisted history.
    pub fn end_conversation(&self, id: Uuid) -> Result<(), ChatError> {
        if !self.repo.exists(id)? {
            return Err(ChatError::ConversationNotFound(id));
        }
        self.sessions_lock()?.remove(&id);
        self.repo.delete(id)?;
        info!(conversation = %id, "Conversation ended");
        Ok(())
    }

    /// Return the (non-summarized) turn history of a conversation.
    pub async fn get_history(&self, id: Uuid) -> Result<Vec<Turn>, ChatError> {
        let session = self.session(id)?;
        let state = session.lock().await;
        Ok(state.turns.clone())
    }

    /// Process one question end to end and return its outcome.
    ///
    /// On error the conversation is left exactly as it was before the call,
    /// so the same question can simply be resubmitted.
    pub async fn submit_question(
        &self,
        id: Uuid,
        question: &str,
    ) -> Result<TurnOutcome, ChatError> {
        let question = question.trim();
        if question.is_empty() {
            return Err(ChatError::EmptyQuestion);
        }
        if question.chars().count() > self.chat.max_question_len {
            return Err(ChatError::QuestionTooLong(self.chat.max_question_len));
        }

        let session = self.session(id)?;
        let mut state = session.lock().await;
        let mut tracker = PhaseTracker::new(id);

        tracker.advance(TurnPhase::Classifying)?;
        let verdict = self.classify(&state, question).await;
        debug!(conversation = %id, verdict = ?verdict, "Retrieval decision");

        let retrieved = if verdict.requires_retrieval() {
            tracker.advance(TurnPhase::Retrieving)?;
            let passages = self
                .store
                .search_boxed(question, self.retrieval.k)
                .await
                .map_err(|e| ChatError::Generation {
                    question: question.to_string(),
                    source: GenerationFailure::Store(e),
                })?;
            debug!(conversation = %id, hits = passages.len(), "Passages retrieved");
            Some(passages)
        } else {
            None
        };

        tracker.advance(TurnPhase::Generating)?;
        let context: &[Passage] = retrieved.as_deref().unwrap_or(&state.active_context);
        let prompt = AnswerTemplate {
            question,
            context,
            summary: state.summary.as_deref(),
        }
        .render();

        let raw = self
            .model
            .generate_boxed(&prompt)
            .await
            .map_err(|e| ChatError::Generation {
                question: question.to_string(),
                source: GenerationFailure::Model(e),
            })?;

        tracker.advance(TurnPhase::Parsing)?;
        let parsed = split_reasoning(&raw);

        tracker.advance(TurnPhase::Recorded)?;
        let retrieval_performed = retrieved.is_some();
        let turn = Turn {
            question: question.to_string(),
            reasoning: parsed.reasoning.clone(),
            answer: parsed.answer.clone(),
            retrieval_performed,
            created_at: chrono::Utc::now().timestamp(),
        };
        // Persist first: a storage failure must leave in-memory state untouched.
        self.repo.append_turn(id, &turn)?;
        state.turns.push(turn);
        if let Some(passages) = retrieved {
            state.active_context = passages;
        }
        tracker.advance(TurnPhase::Idle)?;

        info!(
            conversation = %id,
            turn = state.turns.len(),
            retrieved = retrieval_performed,
            "Turn recorded"
        );

        self.maybe_summarize(&mut state).await;

        Ok(TurnOutcome {
            reasoning: parsed.reasoning,
            answer: parsed.answer,
        })
    }

    /// Decide whether this question needs a fresh document search.
    ///
    /// The first turn of a conversation always retrieves, as does any turn
    /// submitted while no active context is held (e.g. after a restart
    /// rebuilt the session from storage). Otherwise the model classifies the
    /// question against the previous turn; if the classifier itself fails,
    /// the engine falls back to retrieving.
    async fn classify(&self, state: &ConversationState, question: &str) -> RetrievalVerdict {
        let Some(last_turn) = state.turns.last() else {
            return RetrievalVerdict::NeedsRetrieval;
        };
        if state.active_context.is_empty() {
            return RetrievalVerdict::NeedsRetrieval;
        }

        let prompt = FollowupTemplate {
            question,
            last_turn,
        }
        .render();

        match self.model.generate_boxed(&prompt).await {
            Ok(reply) => RetrievalVerdict::from_reply(&reply),
            Err(err) => {
                warn!(
                    conversation = %state.id,
                    error = %err,
                    "Retrieval classifier failed; retrieving anyway"
                );
                RetrievalVerdict::Ambiguous
            }
        }
    }

    /// Condense the oldest turns into the rolling summary once the history
    /// crosses the configured threshold.
    ///
    /// Failure here is non-fatal: the turn already succeeded, the full
    /// history is retained, and summarization is retried after the next turn.
    async fn maybe_summarize(&self, state: &mut ConversationState) {
        if state.turns.len() <= self.chat.summarize_after {
            return;
        }
        let drop_count = state.turns.len() - self.chat.keep_recent;

        let prompt = SummaryTemplate {
            prior_summary: state.summary.as_deref(),
            turns: &state.turns[..drop_count],
        }
        .render();

        let raw = match self.model.generate_boxed(&prompt).await {
            Ok(raw) => raw,
            Err(err) => {
                warn!(
                    conversation = %state.id,
                    error = %err,
                    "Summarization failed; keeping full history"
                );
                return;
            }
        };

        let summary = split_reasoning(&raw).answer;
        if summary.is_empty() {
            warn!(conversation = %state.id, "Summarization produced empty text; keeping full history");
            return;
        }

        if let Err(err) = self.repo.compact(state.id, &summary, drop_count) {
            warn!(
                conversation = %state.id,
                error = %err,
                "Failed to persist summary; keeping full history"
            );
            return;
        }

        state.turns.drain(..drop_count);
        state.summary = Some(summary);
        info!(
            conversation = %state.id,
            dropped = drop_count,
            kept = state.turns.len(),
            "Older turns summarized"
        );
    }

    /// Look up a live session, rebuilding it from storage if this process
    /// has not seen the conversation yet.
    ///
    /// A rebuilt session starts with no active context, so its next turn
    /// retrieves unconditionally.
    fn session(&self, id: Uuid) -> Result<Session, ChatError> {
        if let Some(session) = self.sessions_lock()?.get(&id) {
            return Ok(Arc::clone(session));
        }

        let Some((turns, summary)) = self.repo.load(id)? else {
            return Err(ChatError::ConversationNotFound(id));
        };
        let mut state = ConversationState::new(id);
        state.turns = turns;
        state.summary = summary;
        debug!(conversation = %id, turns = state.turns.len(), "Session rebuilt from storage");

        self.insert_session(id, state)
    }

    fn insert_session(&self, id: Uuid, state: ConversationState) -> Result<Session, ChatError> {
        let mut sessions = self.sessions_lock()?;
        // A concurrent caller may have rebuilt the same session already.
        let session = sessions
            .entry(id)
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(state)));
        Ok(Arc::clone(session))
    }

    fn sessions_lock(
        &self,
    ) -> Result<std::sync::MutexGuard<'_, HashMap<Uuid, Session>>, ChatError> {
        self.sessions
            .lock()
            .map_err(|e| ChatError::Storage(format!("Session map lock poisoned: {}", e)))
    }
}

impl std::fmt::Debug for ChatEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatEngine")
            .field("model", &self.model.model_name())
            .finish()
    }
}
