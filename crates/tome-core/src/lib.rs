//! Shared foundation for the Tome workspace: the data types that flow
//! through the question-answering pipeline, the top-level error enum, and
//! TOML configuration.

pub mod config;
pub mod error;
pub mod types;

pub use config::TomeConfig;
pub use error::{Result, TomeError};
pub use types::*;
