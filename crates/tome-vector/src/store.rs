//! Document store adapter: the insert/query interface consumed by the
//! conversation engine.
//!
//! `VectorStore` combines an [`EmbeddingService`] with the in-memory
//! [`VectorIndex`]. Chunk IDs are derived from `(text, source_id)` so that
//! re-upserting the same chunk overwrites instead of duplicating.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

use serde_json::json;
use tracing::debug;
use uuid::Uuid;

use tome_core::error::TomeError;
use tome_core::types::{DocumentChunk, Passage};

use crate::embedding::{DynEmbeddingService, EmbeddingService};
use crate::index::VectorIndex;

/// The vector database interface consumed by the conversation engine.
///
/// `search` must return at most `k` passages ordered best-first; an empty
/// result is a valid, non-error outcome. `upsert` is idempotent per
/// `(text, source_id)` pair.
pub trait DocumentStore: Send + Sync {
    /// Insert or overwrite document chunks; returns the number processed.
    fn upsert(
        &self,
        chunks: &[DocumentChunk],
    ) -> impl std::future::Future<Output = Result<usize, TomeError>> + Send;

    /// Retrieve the top-k passages most similar to the query.
    fn search(
        &self,
        query: &str,
        k: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Passage>, TomeError>> + Send;
}

/// Object-safe version of [`DocumentStore`] for dynamic dispatch.
///
/// A blanket implementation is provided so that every `DocumentStore`
/// automatically implements `DynDocumentStore`.
pub trait DynDocumentStore: Send + Sync {
    /// Insert or overwrite document chunks (boxed future).
    fn upsert_boxed<'a>(
        &'a self,
        chunks: &'a [DocumentChunk],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<usize, TomeError>> + Send + 'a>>;

    /// Retrieve the top-k passages most similar to the query (boxed future).
    fn search_boxed<'a>(
        &'a self,
        query: &'a str,
        k: usize,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<Passage>, TomeError>> + Send + 'a>,
    >;
}

/// Blanket impl: any `DocumentStore` automatically implements `DynDocumentStore`.
impl<T: DocumentStore> DynDocumentStore for T {
    fn upsert_boxed<'a>(
        &'a self,
        chunks: &'a [DocumentChunk],
    ) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<usize, TomeError>> + Send + 'a>>
    {
        Box::pin(self.upsert(chunks))
    }

    fn search_boxed<'a>(
        &'a self,
        query: &'a str,
        k: usize,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Vec<Passage>, TomeError>> + Send + 'a>,
    > {
        Box::pin(self.search(query, k))
    }
}

/// Document store backed by the in-memory [`VectorIndex`].
pub struct VectorStore {
    index: Arc<VectorIndex>,
    embedder: Box<dyn DynEmbeddingService>,
}

impl VectorStore {
    /// Create a new store with a shared index and embedding service.
    pub fn new(index: Arc<VectorIndex>, embedder: impl EmbeddingService + 'static) -> Self {
        Self {
            index,
            embedder: Box::new(embedder),
        }
    }

    /// Create a new store from a pre-boxed dynamic embedding service.
    pub fn new_dyn(index: Arc<VectorIndex>, embedder: Box<dyn DynEmbeddingService>) -> Self {
        Self { index, embedder }
    }
}

/// Derive a stable entry ID from a chunk's content and provenance.
fn chunk_id(chunk: &DocumentChunk) -> Uuid {
    let mut high = DefaultHasher::new();
    chunk.text.hash(&mut high);
    chunk.source_id.hash(&mut high);

    let mut low = DefaultHasher::new();
    chunk.source_id.hash(&mut low);
    chunk.text.hash(&mut low);
    // Second hasher salted so the two halves differ.
    1u8.hash(&mut low);

    Uuid::from_u64_pair(high.finish(), low.finish())
}

impl DocumentStore for VectorStore {
    async fn upsert(&self, chunks: &[DocumentChunk]) -> Result<usize, TomeError> {
        for chunk in chunks {
            let embedding = self.embedder.embed_boxed(&chunk.text).await?;
            self.index.insert(
                chunk_id(chunk),
                embedding,
                json!({
                    "text": chunk.text,
                    "source_id": chunk.source_id,
                }),
            )?;
        }
        debug!(count = chunks.len(), "Chunks upserted");
        Ok(chunks.len())
    }

    async fn search(&self, query: &str, k: usize) -> Result<Vec<Passage>, TomeError> {
        let query_vec = self.embedder.embed_boxed(query).await?;
        let hits = self.index.search(&query_vec, k)?;

        let passages = hits
            .into_iter()
            .map(|hit| Passage {
                text: hit
                    .metadata
                    .get("text")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                source_id: hit
                    .metadata
                    .get("source_id")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default()
                    .to_string(),
                score: hit.score,
            })
            .collect();

        Ok(passages)
    }
}
