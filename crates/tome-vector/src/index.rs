//! In-memory vector index with brute-force cosine similarity search.
//!
//! Entries are kept in insertion order so that equal-score ties resolve to
//! the older entry and repeated searches over an unchanged index return
//! identical orderings. All operations are O(n) for search, which is
//! acceptable for moderate corpus sizes.

use std::sync::{Arc, RwLock};

use serde_json::Value;
use uuid::Uuid;

use tome_core::error::TomeError;

/// A single hit returned from a vector search.
#[derive(Debug, Clone)]
pub struct SearchHit {
    /// The ID of the matching vector entry.
    pub id: Uuid,
    /// Cosine similarity score (-1.0 to 1.0).
    pub score: f64,
    /// Metadata associated with the entry.
    pub metadata: Value,
}

/// An entry stored in the vector index.
#[derive(Debug, Clone)]
struct VectorEntry {
    id: Uuid,
    embedding: Vec<f32>,
    metadata: Value,
}

/// In-memory vector index using brute-force cosine similarity.
///
/// Thread-safe via interior RwLock; entries live in an insertion-ordered Vec
/// so search results are fully deterministic.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    entries: Arc<RwLock<Vec<VectorEntry>>>,
}

impl VectorIndex {
    /// Create a new empty vector index.
    pub fn new() -> Self {
        Self {
            entries: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Insert a vector with associated metadata into the index.
    ///
    /// Overwrites any existing entry with the same ID in place, preserving
    /// that entry's position in insertion order.
    pub fn insert(&self, id: Uuid, embedding: Vec<f32>, metadata: Value) -> Result<(), TomeError> {
        let mut entries = self
            .entries
            .write()
            .map_err(|e| TomeError::Search(format!("Lock poisoned: {}", e)))?;

        let entry = VectorEntry {
            id,
            embedding,
            metadata,
        };

        match entries.iter_mut().find(|e| e.id == id) {
            Some(existing) => *existing = entry,
            None => entries.push(entry),
        }
        Ok(())
    }

    /// Search for the k nearest neighbors to the query vector by cosine similarity.
    ///
    /// Returns at most k results sorted by descending similarity score; ties
    /// keep insertion order (the sort is stable). Never pads the result.
    pub fn search(&self, query: &[f32], k: usize) -> Result<Vec<SearchHit>, TomeError> {
        let entries = self
            .entries
            .read()
            .map_err(|e| TomeError::Search(format!("Lock poisoned: {}", e)))?;

        let mut scored: Vec<SearchHit> = entries
            .iter()
            .map(|entry| SearchHit {
                id: entry.id,
                score: cosine_similarity(query, &entry.embedding),
                metadata: entry.metadata.clone(),
            })
            .collect();

        // Stable sort by descending score: equal scores keep store order.
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);

        Ok(scored)
    }

    /// Number of entries currently in the index.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    /// True if the index holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Compute cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero-magnitude inputs.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;

    for (x, y) in a.iter().zip(b.iter()) {
        dot += f64::from(*x) * f64::from(*y);
        norm_a += f64::from(*x) * f64::from(*x);
        norm_b += f64::from(*y) * f64::from(*y);
    }

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot / (norm_a.sqrt() * norm_b.sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_insert_and_search() {
        let index = VectorIndex::new();
        let id = Uuid::new_v4();
        index
            .insert(id, vec![1.0, 0.0, 0.0], json!({"text": "x-axis"}))
            .unwrap();

        let hits = index.search(&[1.0, 0.0, 0.0], 5).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, id);
        assert!((hits[0].score - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_search_orders_by_descending_score() {
        let index = VectorIndex::new();
        let near = Uuid::new_v4();
        let far = Uuid::new_v4();
        index
            .insert(far, vec![0.0, 1.0], json!({"text": "far"}))
            .unwrap();
        index
            .insert(near, vec![1.0, 0.1], json!({"text": "near"}))
            .unwrap();

        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].id, near);
        assert_eq!(hits[1].id, far);
    }

    #[test]
    fn test_search_ties_keep_insertion_order() {
        let index = VectorIndex::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();
        // Identical vectors: identical scores.
        index.insert(first, vec![1.0, 0.0], json!({"n": 1})).unwrap();
        index.insert(second, vec![1.0, 0.0], json!({"n": 2})).unwrap();

        let hits = index.search(&[1.0, 0.0], 2).unwrap();
        assert_eq!(hits[0].id, first);
        assert_eq!(hits[1].id, second);
    }

    #[test]
    fn test_search_is_idempotent() {
        let index = VectorIndex::new();
        for i in 0..10 {
            index
                .insert(
                    Uuid::new_v4(),
                    vec![i as f32, (10 - i) as f32],
                    json!({"i": i}),
                )
                .unwrap();
        }

        let first = index.search(&[3.0, 7.0], 5).unwrap();
        let second = index.search(&[3.0, 7.0], 5).unwrap();

        let ids_a: Vec<Uuid> = first.iter().map(|h| h.id).collect();
        let ids_b: Vec<Uuid> = second.iter().map(|h| h.id).collect();
        assert_eq!(ids_a, ids_b);
    }

    #[test]
    fn test_search_never_pads() {
        let index = VectorIndex::new();
        index
            .insert(Uuid::new_v4(), vec![1.0, 0.0], json!({}))
            .unwrap();

        let hits = index.search(&[1.0, 0.0], 10).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_search_empty_index() {
        let index = VectorIndex::new();
        let hits = index.search(&[1.0, 0.0], 4).unwrap();
        assert!(hits.is_empty());
    }

    #[test]
    fn test_insert_same_id_overwrites_in_place() {
        let index = VectorIndex::new();
        let id = Uuid::new_v4();
        index.insert(id, vec![1.0, 0.0], json!({"v": 1})).unwrap();
        index.insert(id, vec![0.0, 1.0], json!({"v": 2})).unwrap();

        assert_eq!(index.len(), 1);
        let hits = index.search(&[0.0, 1.0], 1).unwrap();
        assert_eq!(hits[0].metadata["v"], 2);
    }

    #[test]
    fn test_cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-9);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-9);
        assert!((cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]) + 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_cosine_similarity_mismatched_or_zero() {
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }
}
