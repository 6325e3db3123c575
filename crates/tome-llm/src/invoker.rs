//! Model invoker trait and the scripted mock used in tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::error::ModelError;

/// Synchronous-contract interface to the language-model endpoint.
///
/// `generate` blocks the calling turn until the complete text is available
/// or the bounded wait elapses; no streaming is required by consumers.
pub trait ModelInvoker: Send + Sync {
    /// Run one prompt to completion and return the raw model output.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, ModelError>> + Send;

    /// Returns the model identifier (e.g. `"deepseek-r1:1.5b"`).
    fn model_name(&self) -> &str;
}

/// Object-safe version of [`ModelInvoker`] for dynamic dispatch.
///
/// A blanket implementation is provided so that every `ModelInvoker`
/// automatically implements `DynModelInvoker`.
pub trait DynModelInvoker: Send + Sync {
    /// Run one prompt to completion (boxed future).
    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<String, ModelError>> + Send + 'a>,
    >;

    /// Returns the model identifier.
    fn model_name(&self) -> &str;
}

/// Blanket impl: any `ModelInvoker` automatically implements `DynModelInvoker`.
impl<T: ModelInvoker> DynModelInvoker for T {
    fn generate_boxed<'a>(
        &'a self,
        prompt: &'a str,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<String, ModelError>> + Send + 'a>,
    > {
        Box::pin(self.generate(prompt))
    }

    fn model_name(&self) -> &str {
        ModelInvoker::model_name(self)
    }
}

/// Mock invoker replaying a scripted FIFO of replies.
///
/// Each `generate` call pops the next scripted result, so tests can steer
/// classifier verdicts, answer bodies, and failures deterministically. The
/// prompts received are recorded for assertion.
#[derive(Debug, Default)]
pub struct MockModel {
    replies: Mutex<VecDeque<Result<String, ModelError>>>,
    prompts: Mutex<Vec<String>>,
}

impl MockModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful reply.
    pub fn push_reply(&self, text: impl Into<String>) {
        self.replies
            .lock()
            .expect("mock reply queue poisoned")
            .push_back(Ok(text.into()));
    }

    /// Queue a failure.
    pub fn push_error(&self, err: ModelError) {
        self.replies
            .lock()
            .expect("mock reply queue poisoned")
            .push_back(Err(err));
    }

    /// All prompts received so far, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("mock prompt log poisoned").clone()
    }

    /// Number of scripted replies not yet consumed.
    pub fn remaining(&self) -> usize {
        self.replies.lock().expect("mock reply queue poisoned").len()
    }
}

impl ModelInvoker for MockModel {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        self.prompts
            .lock()
            .expect("mock prompt log poisoned")
            .push(prompt.to_string());

        self.replies
            .lock()
            .expect("mock reply queue poisoned")
            .pop_front()
            .unwrap_or_else(|| {
                Err(ModelError::Unavailable(
                    "mock model has no scripted reply".to_string(),
                ))
            })
    }

    fn model_name(&self) -> &str {
        "mock"
    }
}
