//! HTTP API for Tome.
//!
//! Exposes conversation lifecycle, question submission, history, and
//! document ingestion over a localhost axum server.

pub mod error;
pub mod handlers;
pub mod routes;
pub mod state;

pub use routes::{create_router, start_server};
pub use state::AppState;
