//! Tome vector crate - embedding services, in-memory index, chunking, and
//! the document store adapter consumed by the conversation engine.
//!
//! Provides brute-force cosine similarity search over insertion-ordered
//! entries (deterministic ranking, stable ties), an embedding service trait
//! with Ollama and mock implementations, and a character-window chunker for
//! document ingestion.

pub mod chunk;
pub mod embedding;
pub mod index;
pub mod store;

pub use chunk::split_text;
pub use embedding::{DynEmbeddingService, EmbeddingService, MockEmbedding, OllamaEmbedding};
pub use index::{SearchHit, VectorIndex};
pub use store::{DocumentStore, DynDocumentStore, VectorStore};
