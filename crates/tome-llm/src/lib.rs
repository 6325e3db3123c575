//! Language-model invocation for Tome.
//!
//! Wraps the model-serving endpoint behind the [`ModelInvoker`] trait:
//! `OllamaInvoker` talks to a local Ollama server, `MockModel` replays
//! scripted replies for deterministic tests.

pub mod error;
pub mod invoker;
pub mod ollama;

pub use error::ModelError;
pub use invoker::{DynModelInvoker, MockModel, ModelInvoker};
pub use ollama::OllamaInvoker;
