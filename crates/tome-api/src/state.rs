//! Application state shared across all route handlers.
//!
//! AppState holds references to all services and shared resources.
//! It is passed to handlers via axum's State extractor.

use std::sync::Arc;
use std::time::Instant;

use tome_chat::ChatEngine;
use tome_core::config::TomeConfig;
use tome_vector::DynDocumentStore;

/// Shared application state.
///
/// All fields use `Arc` for cheap cloning across handler tasks.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration (read-only once the server is up).
    pub config: Arc<TomeConfig>,
    /// Conversation engine driving every turn.
    pub engine: Arc<ChatEngine>,
    /// Document store for ingestion.
    pub store: Arc<dyn DynDocumentStore>,
    /// Server start time for uptime calculation.
    pub start_time: Instant,
}

impl AppState {
    /// Create a new AppState with the given components.
    pub fn new(
        config: TomeConfig,
        engine: Arc<ChatEngine>,
        store: Arc<dyn DynDocumentStore>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            engine,
            store,
            start_time: Instant::now(),
        }
    }
}
