//! Router setup with all API routes and middleware.
//!
//! Configures the axum Router with CORS, tracing, compression, and all
//! endpoint handlers.

use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderValue, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use tome_core::error::TomeError;

use crate::handlers;
use crate::state::AppState;

/// Create the axum Router with all routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // CORS middleware: allow localhost origins on the configured port plus
    // port+1 for a dev frontend.
    let port = state.config.server.port;
    let dev_port = port.saturating_add(1);
    let origins: Vec<HeaderValue> = [
        format!("http://127.0.0.1:{}", port),
        format!("http://localhost:{}", port),
        format!("http://127.0.0.1:{}", dev_port),
        format!("http://localhost:{}", dev_port),
    ]
    .iter()
    .filter_map(|origin| origin.parse().ok())
    .collect();

    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT]);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/conversations", post(handlers::create_conversation))
        .route(
            "/conversations/{id}",
            axum::routing::delete(handlers::delete_conversation),
        )
        .route("/conversations/{id}/messages", post(handlers::ask))
        .route("/conversations/{id}/history", get(handlers::history))
        .route("/documents", post(handlers::ingest))
        .layer(DefaultBodyLimit::max(4 * 1024 * 1024)) // 4MB for document ingestion
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Start the HTTP server on the configured address.
pub async fn start_server(state: AppState) -> Result<(), TomeError> {
    let addr = format!(
        "{}:{}",
        state.config.server.host, state.config.server.port
    );

    let router = create_router(state);

    tracing::info!("Starting API server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, router).await?;

    Ok(())
}
