//! SQLite persistence for Tome conversations.
//!
//! One row per conversation (with optional summary) plus an ordered turn
//! table. The conversation engine writes through this crate so a restarted
//! host sees the same history the engine held in memory.

pub mod conversations;
pub mod db;
pub mod migrations;

pub use conversations::ConversationRepository;
pub use db::Database;
