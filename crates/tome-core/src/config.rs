use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{Result, TomeError};

/// Top-level configuration for the Tome application.
///
/// Loaded from `~/.tome/config.toml` by default. Each section corresponds
/// to one component of the question-answering pipeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub model: ModelConfig,
    #[serde(default)]
    pub embedding: EmbeddingConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

impl TomeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed, or if a
    /// section fails validation.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: TomeConfig = toml::from_str(&content)?;
        config.validate()?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self).map_err(|e| TomeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Validate cross-field constraints that serde defaults cannot express.
    pub fn validate(&self) -> Result<()> {
        if self.retrieval.k == 0 {
            return Err(TomeError::Config("retrieval.k must be > 0".to_string()));
        }
        if self.chat.summarize_after == 0 {
            return Err(TomeError::Config(
                "chat.summarize_after must be > 0".to_string(),
            ));
        }
        if self.chat.keep_recent >= self.chat.summarize_after {
            return Err(TomeError::Config(
                "chat.keep_recent must be smaller than chat.summarize_after".to_string(),
            ));
        }
        if self.chunking.max_chars == 0 {
            return Err(TomeError::Config(
                "chunking.max_chars must be > 0".to_string(),
            ));
        }
        if self.chunking.overlap_chars >= self.chunking.max_chars {
            return Err(TomeError::Config(
                "chunking.overlap_chars must be smaller than chunking.max_chars".to_string(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory for the SQLite conversation database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.tome/data".to_string(),
            log_level: "info".to_string(),
        }
    }
}

/// Language model endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Provider: "ollama" or "mock" (offline, for development and tests).
    pub provider: String,
    /// Base URL of the Ollama server.
    pub url: String,
    /// Model name to run, e.g. "deepseek-r1:1.5b".
    pub model: String,
    /// Bounded wait for one generate call, in seconds.
    pub timeout_secs: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            url: "http://127.0.0.1:11434".to_string(),
            model: "deepseek-r1:1.5b".to_string(),
            timeout_secs: 120,
        }
    }
}

/// Embedding endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EmbeddingConfig {
    /// Provider: "ollama" or "mock".
    pub provider: String,
    /// Base URL of the Ollama server.
    pub url: String,
    /// Embedding model name, e.g. "nomic-embed-text".
    pub model: String,
    /// Vector dimensionality produced by the model.
    pub dims: usize,
    /// Bounded wait for one embed call, in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            url: "http://127.0.0.1:11434".to_string(),
            model: "nomic-embed-text".to_string(),
            dims: 768,
            timeout_secs: 30,
        }
    }
}

/// Passage retrieval settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Number of passages fetched per retrieval (top-k).
    pub k: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self { k: 4 }
    }
}

/// Conversation engine settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Summarize and drop the oldest turns once the turn count exceeds this.
    pub summarize_after: usize,
    /// Number of most recent turns kept verbatim when summarizing.
    pub keep_recent: usize,
    /// Maximum question length in characters.
    pub max_question_len: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            summarize_after: 10,
            keep_recent: 4,
            max_question_len: 2000,
        }
    }
}

/// Document chunking settings for ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Maximum chunk size in characters.
    pub max_chars: usize,
    /// Overlap between consecutive chunks in characters.
    pub overlap_chars: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chars: 2000,
            overlap_chars: 400,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
        }
    }
}
