//! Route handler functions for all API endpoints.
//!
//! Each handler extracts path/body parameters via axum extractors,
//! interacts with AppState services, and returns JSON responses.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use tracing::info;
use uuid::Uuid;

use tome_vector::split_text;

use crate::error::ApiError;
use crate::state::AppState;

// =============================================================================
// Request types
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
}

#[derive(Debug, Deserialize)]
pub struct IngestDocument {
    pub source_id: String,
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct IngestRequest {
    pub documents: Vec<IngestDocument>,
}

// =============================================================================
// Response types
// =============================================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationCreatedResponse {
    pub id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ConversationDeletedResponse {
    pub deleted: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AskResponse {
    pub reasoning: String,
    pub answer: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TurnResponse {
    pub question: String,
    pub reasoning: String,
    pub answer: String,
    pub retrieval_performed: bool,
    pub created_at: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub turns: Vec<TurnResponse>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IngestResponse {
    pub documents: usize,
    pub chunks: usize,
}

// =============================================================================
// Handlers
// =============================================================================

/// GET /health - liveness check.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.start_time.elapsed().as_secs(),
    })
}

/// POST /conversations - start a new conversation.
pub async fn create_conversation(
    State(state): State<AppState>,
) -> Result<(StatusCode, Json<ConversationCreatedResponse>), ApiError> {
    let id = state.engine.start_conversation()?;
    Ok((StatusCode::CREATED, Json(ConversationCreatedResponse { id })))
}

/// DELETE /conversations/{id} - end a conversation and discard its history.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ConversationDeletedResponse>, ApiError> {
    state.engine.end_conversation(id)?;
    Ok(Json(ConversationDeletedResponse { deleted: true }))
}

/// POST /conversations/{id}/messages - submit a question.
pub async fn ask(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    let outcome = state.engine.submit_question(id, &req.question).await?;
    Ok(Json(AskResponse {
        reasoning: outcome.reasoning,
        answer: outcome.answer,
    }))
}

/// GET /conversations/{id}/history - the conversation's recorded turns.
pub async fn history(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<HistoryResponse>, ApiError> {
    let turns = state
        .engine
        .get_history(id)
        .await?
        .into_iter()
        .map(|t| TurnResponse {
            question: t.question,
            reasoning: t.reasoning,
            answer: t.answer,
            retrieval_performed: t.retrieval_performed,
            created_at: t.created_at,
        })
        .collect();
    Ok(Json(HistoryResponse { turns }))
}

/// POST /documents - chunk and index documents for retrieval.
pub async fn ingest(
    State(state): State<AppState>,
    Json(req): Json<IngestRequest>,
) -> Result<Json<IngestResponse>, ApiError> {
    if req.documents.is_empty() {
        return Err(ApiError::BadRequest("No documents provided".to_string()));
    }

    let chunking = &state.config.chunking;
    let mut chunks = Vec::new();
    for doc in &req.documents {
        if doc.source_id.trim().is_empty() {
            return Err(ApiError::BadRequest(
                "Document source_id cannot be empty".to_string(),
            ));
        }
        if doc.text.trim().is_empty() {
            return Err(ApiError::BadRequest(format!(
                "Document {} has no text",
                doc.source_id
            )));
        }
        chunks.extend(split_text(
            &doc.text,
            &doc.source_id,
            chunking.max_chars,
            chunking.overlap_chars,
        ));
    }

    let indexed = state.store.upsert_boxed(&chunks).await?;
    info!(
        documents = req.documents.len(),
        chunks = indexed,
        "Documents ingested"
    );

    Ok(Json(IngestResponse {
        documents: req.documents.len(),
        chunks: indexed,
    }))
}
