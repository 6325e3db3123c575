//! Tome application binary - composition root.
//!
//! Ties together all Tome crates into a single executable:
//! 1. Load configuration from TOML
//! 2. Open the SQLite conversation database
//! 3. Build the document store (embedding service + vector index)
//! 4. Build the model invoker and conversation engine
//! 5. Start the axum REST API server

mod cli;

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use tome_api::state::AppState;
use tome_api::start_server;
use tome_chat::ChatEngine;
use tome_core::config::TomeConfig;
use tome_llm::{DynModelInvoker, MockModel, OllamaInvoker};
use tome_storage::{ConversationRepository, Database};
use tome_vector::{DynDocumentStore, MockEmbedding, OllamaEmbedding, VectorIndex, VectorStore};

use cli::CliArgs;

/// Expand ~ to the home directory in a path string.
fn resolve_data_dir(data_dir: &str) -> PathBuf {
    if let Some(rest) = data_dir.strip_prefix("~/") {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(data_dir)
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = CliArgs::parse();

    // Config is loaded before tracing so the file's log level can serve as
    // the default filter. RUST_LOG and --log-level both take precedence.
    let config_file = args.resolve_config_path();
    let mut config = TomeConfig::load_or_default(&config_file);

    let default_level = args
        .resolve_log_level()
        .unwrap_or_else(|| config.general.log_level.clone());
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .init();

    tracing::info!("Starting Tome v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(path = %config_file.display(), "Configuration loaded");

    // CLI overrides.
    config.server.port = args.resolve_port(config.server.port);
    if let Some(data_dir) = args.resolve_data_dir() {
        config.general.data_dir = data_dir;
    }

    // Storage.
    let data_dir = resolve_data_dir(&config.general.data_dir);
    let db_path = data_dir.join("tome.db");
    let db = Arc::new(Database::new(&db_path)?);
    let repo = ConversationRepository::new(db);

    // Document store: embedding service + in-memory vector index.
    let index = Arc::new(VectorIndex::new());
    let store: Arc<dyn DynDocumentStore> = match config.embedding.provider.as_str() {
        "mock" => {
            tracing::warn!("Using mock embedding service (offline mode)");
            Arc::new(VectorStore::new(index, MockEmbedding::new()))
        }
        _ => {
            let embedder = OllamaEmbedding::new(
                &config.embedding.url,
                &config.embedding.model,
                config.embedding.dims,
                config.embedding.timeout_secs,
            )?;
            tracing::info!(
                url = %config.embedding.url,
                model = %config.embedding.model,
                "Embedding service ready"
            );
            Arc::new(VectorStore::new(index, embedder))
        }
    };

    // Model invoker.
    let model: Arc<dyn DynModelInvoker> = match config.model.provider.as_str() {
        "mock" => {
            tracing::warn!("Using mock model (offline mode)");
            Arc::new(MockModel::new())
        }
        _ => {
            let invoker = OllamaInvoker::new(
                &config.model.url,
                &config.model.model,
                config.model.timeout_secs,
            )?;
            tracing::info!(
                url = %config.model.url,
                model = %config.model.model,
                "Model endpoint ready"
            );
            Arc::new(invoker)
        }
    };

    // Conversation engine.
    let engine = Arc::new(ChatEngine::new(
        Arc::clone(&store),
        model,
        repo,
        config.chat.clone(),
        config.retrieval.clone(),
    ));

    // API server.
    let state = AppState::new(config, engine, store);
    start_server(state).await?;

    Ok(())
}
