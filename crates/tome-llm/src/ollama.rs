//! Ollama model invoker.
//!
//! Calls `POST {url}/api/generate` with `stream: false` and returns the
//! complete response text. No retries: the conversation engine treats any
//! failure as fatal to the turn and leaves retry policy to the caller.

use std::time::Duration;

use tracing::debug;

use crate::error::ModelError;
use crate::invoker::ModelInvoker;

/// Invoker backed by a local Ollama server.
pub struct OllamaInvoker {
    client: reqwest::Client,
    url: String,
    model: String,
    timeout_secs: u64,
}

impl OllamaInvoker {
    /// Create a new invoker for the given server URL and model name.
    ///
    /// `timeout_secs` bounds each generate call; exceeding it surfaces as
    /// [`ModelError::Timeout`].
    pub fn new(
        url: impl Into<String>,
        model: impl Into<String>,
        timeout_secs: u64,
    ) -> Result<Self, ModelError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ModelError::Unavailable(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            url: url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout_secs,
        })
    }
}

impl ModelInvoker for OllamaInvoker {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let body = serde_json::json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false,
        });

        debug!(model = %self.model, prompt_len = prompt.len(), "Ollama generate call");

        let response = self
            .client
            .post(format!("{}/api/generate", self.url))
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ModelError::Timeout(self.timeout_secs)
                } else {
                    ModelError::Unavailable(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body_text = response.text().await.unwrap_or_default();
            return Err(ModelError::InvalidResponse(format!(
                "Ollama error {}: {}",
                status, body_text
            )));
        }

        let json: serde_json::Value = response
            .json()
            .await
            .map_err(|e| ModelError::InvalidResponse(e.to_string()))?;

        json.get("response")
            .and_then(|r| r.as_str())
            .map(str::to_string)
            .ok_or_else(|| {
                ModelError::InvalidResponse("missing 'response' field in reply".to_string())
            })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_trailing_slash_is_trimmed() {
        let invoker = OllamaInvoker::new("http://127.0.0.1:11434/", "deepseek-r1:1.5b", 120)
            .unwrap();
        assert_eq!(invoker.url, "http://127.0.0.1:11434");
        assert_eq!(ModelInvoker::model_name(&invoker), "deepseek-r1:1.5b");
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_unavailable() {
        // Port 9 (discard) is reliably closed; expect a connect error, not a panic.
        let invoker = OllamaInvoker::new("http://127.0.0.1:9", "m", 2).unwrap();
        let err = invoker.generate("hello").await.unwrap_err();
        assert!(matches!(
            err,
            ModelError::Unavailable(_) | ModelError::Timeout(_)
        ));
    }
}
