//! Conversation persistence: one row per conversation plus ordered turns.

use rusqlite::{params, OptionalExtension};
use std::sync::Arc;
use uuid::Uuid;

use tome_core::error::TomeError;
use tome_core::types::Turn;

use crate::db::Database;

/// Repository for conversation rows and their turn sequences.
#[derive(Clone, Debug)]
pub struct ConversationRepository {
    db: Arc<Database>,
}

impl ConversationRepository {
    /// Create a repository over the given database.
    pub fn new(db: Arc<Database>) -> Self {
        Self { db }
    }

    /// Insert a new, empty conversation row.
    pub fn create(&self, id: Uuid) -> Result<(), TomeError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "INSERT INTO conversations (id) VALUES (?1)",
                params![id.to_string()],
            )
            .map_err(|e| TomeError::Storage(format!("Failed to create conversation: {}", e)))?;
            Ok(())
        })
    }

    /// Check whether a conversation row exists.
    pub fn exists(&self, id: Uuid) -> Result<bool, TomeError> {
        self.db.with_conn(|conn| {
            let found: Option<String> = conn
                .query_row(
                    "SELECT id FROM conversations WHERE id = ?1",
                    params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| TomeError::Storage(format!("Failed to query conversation: {}", e)))?;
            Ok(found.is_some())
        })
    }

    /// Load a conversation's remaining turns (ordered) and summary.
    ///
    /// Returns `None` if the conversation does not exist.
    pub fn load(&self, id: Uuid) -> Result<Option<(Vec<Turn>, Option<String>)>, TomeError> {
        self.db.with_conn(|conn| {
            let summary: Option<Option<String>> = conn
                .query_row(
                    "SELECT summary FROM conversations WHERE id = ?1",
                    params![id.to_string()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|e| TomeError::Storage(format!("Failed to load conversation: {}", e)))?;

            let Some(summary) = summary else {
                return Ok(None);
            };

            let mut stmt = conn
                .prepare(
                    "SELECT question, reasoning, answer, retrieval_performed, created_at
                     FROM turns WHERE conversation_id = ?1 ORDER BY turn_index ASC",
                )
                .map_err(|e| TomeError::Storage(format!("Failed to prepare turn query: {}", e)))?;

            let turns = stmt
                .query_map(params![id.to_string()], |row| {
                    Ok(Turn {
                        question: row.get(0)?,
                        reasoning: row.get(1)?,
                        answer: row.get(2)?,
                        retrieval_performed: row.get::<_, i64>(3)? != 0,
                        created_at: row.get(4)?,
                    })
                })
                .map_err(|e| TomeError::Storage(format!("Failed to query turns: {}", e)))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| TomeError::Storage(format!("Failed to read turn row: {}", e)))?;

            Ok(Some((turns, summary)))
        })
    }

    /// Append one turn to a conversation.
    ///
    /// The turn index continues from the highest ever recorded for this
    /// conversation, so indices stay monotonic across summarization.
    pub fn append_turn(&self, id: Uuid, turn: &Turn) -> Result<(), TomeError> {
        self.db.with_conn(|conn| {
            let next_index: i64 = conn
                .query_row(
                    "SELECT COALESCE(MAX(turn_index), -1) + 1 FROM turns
                     WHERE conversation_id = ?1",
                    params![id.to_string()],
                    |row| row.get(0),
                )
                .map_err(|e| TomeError::Storage(format!("Failed to compute turn index: {}", e)))?;

            let inserted = conn
                .execute(
                    "INSERT INTO turns
                     (conversation_id, turn_index, question, reasoning, answer,
                      retrieval_performed, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    params![
                        id.to_string(),
                        next_index,
                        turn.question,
                        turn.reasoning,
                        turn.answer,
                        turn.retrieval_performed as i64,
                        turn.created_at,
                    ],
                )
                .map_err(|e| TomeError::Storage(format!("Failed to append turn: {}", e)))?;

            if inserted != 1 {
                return Err(TomeError::Storage("Turn insert affected no rows".to_string()));
            }
            Ok(())
        })
    }

    /// Replace the conversation summary and delete its oldest `drop_count`
    /// turns in a single transaction.
    pub fn compact(&self, id: Uuid, summary: &str, drop_count: usize) -> Result<(), TomeError> {
        self.db.with_conn(|conn| {
            let tx = conn
                .unchecked_transaction()
                .map_err(|e| TomeError::Storage(format!("Failed to begin transaction: {}", e)))?;

            tx.execute(
                "UPDATE conversations SET summary = ?1 WHERE id = ?2",
                params![summary, id.to_string()],
            )
            .map_err(|e| TomeError::Storage(format!("Failed to update summary: {}", e)))?;

            tx.execute(
                "DELETE FROM turns WHERE conversation_id = ?1 AND turn_index IN (
                     SELECT turn_index FROM turns WHERE conversation_id = ?1
                     ORDER BY turn_index ASC LIMIT ?2
                 )",
                params![id.to_string(), drop_count as i64],
            )
            .map_err(|e| TomeError::Storage(format!("Failed to prune turns: {}", e)))?;

            tx.commit()
                .map_err(|e| TomeError::Storage(format!("Failed to commit compaction: {}", e)))?;
            Ok(())
        })
    }

    /// Delete a conversation and (via cascade) its turns.
    pub fn delete(&self, id: Uuid) -> Result<(), TomeError> {
        self.db.with_conn(|conn| {
            conn.execute(
                "DELETE FROM conversations WHERE id = ?1",
                params![id.to_string()],
            )
            .map_err(|e| TomeError::Storage(format!("Failed to delete conversation: {}", e)))?;
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_repo() -> ConversationRepository {
        ConversationRepository::new(Arc::new(Database::in_memory().unwrap()))
    }

    fn make_turn(question: &str, retrieved: bool) -> Turn {
        Turn {
            question: question.to_string(),
            reasoning: "because".to_string(),
            answer: format!("answer to {}", question),
            retrieval_performed: retrieved,
            created_at: 1_700_000_000,
        }
    }

    #[test]
    fn test_create_and_load_empty() {
        let repo = make_repo();
        let id = Uuid::new_v4();
        repo.create(id).unwrap();

        let (turns, summary) = repo.load(id).unwrap().unwrap();
        assert!(turns.is_empty());
        assert!(summary.is_none());
    }

    #[test]
    fn test_load_missing_conversation() {
        let repo = make_repo();
        assert!(repo.load(Uuid::new_v4()).unwrap().is_none());
    }

    #[test]
    fn test_append_and_load_preserves_order() {
        let repo = make_repo();
        let id = Uuid::new_v4();
        repo.create(id).unwrap();

        repo.append_turn(id, &make_turn("first", true)).unwrap();
        repo.append_turn(id, &make_turn("second", false)).unwrap();
        repo.append_turn(id, &make_turn("third", true)).unwrap();

        let (turns, _) = repo.load(id).unwrap().unwrap();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns[0].question, "first");
        assert_eq!(turns[1].question, "second");
        assert_eq!(turns[2].question, "third");
        assert!(turns[0].retrieval_performed);
        assert!(!turns[1].retrieval_performed);
    }

    #[test]
    fn test_compact_drops_oldest_and_sets_summary() {
        let repo = make_repo();
        let id = Uuid::new_v4();
        repo.create(id).unwrap();

        for i in 0..5 {
            repo.append_turn(id, &make_turn(&format!("q{}", i), i == 0))
                .unwrap();
        }

        repo.compact(id, "the gist so far", 3).unwrap();

        let (turns, summary) = repo.load(id).unwrap().unwrap();
        assert_eq!(summary.as_deref(), Some("the gist so far"));
        assert_eq!(turns.len(), 2);
        assert_eq!(turns[0].question, "q3");
        assert_eq!(turns[1].question, "q4");
    }

    #[test]
    fn test_indices_stay_monotonic_after_compaction() {
        let repo = make_repo();
        let id = Uuid::new_v4();
        repo.create(id).unwrap();

        for i in 0..4 {
            repo.append_turn(id, &make_turn(&format!("q{}", i), false))
                .unwrap();
        }
        repo.compact(id, "gist", 2).unwrap();
        repo.append_turn(id, &make_turn("after", false)).unwrap();

        let (turns, _) = repo.load(id).unwrap().unwrap();
        assert_eq!(turns.len(), 3);
        assert_eq!(turns.last().unwrap().question, "after");
    }

    #[test]
    fn test_delete_cascades_to_turns() {
        let repo = make_repo();
        let id = Uuid::new_v4();
        repo.create(id).unwrap();
        repo.append_turn(id, &make_turn("q", true)).unwrap();

        repo.delete(id).unwrap();
        assert!(repo.load(id).unwrap().is_none());
        assert!(!repo.exists(id).unwrap());
    }

    #[test]
    fn test_two_conversations_are_isolated() {
        let repo = make_repo();
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        repo.create(a).unwrap();
        repo.create(b).unwrap();

        repo.append_turn(a, &make_turn("for a", true)).unwrap();

        let (turns_b, _) = repo.load(b).unwrap().unwrap();
        assert!(turns_b.is_empty());
    }
}
