//! Error types for model invocation.

use thiserror::Error;

/// Errors from the model-serving endpoint.
#[derive(Debug, Error)]
pub enum ModelError {
    /// The serving endpoint could not be reached.
    #[error("model endpoint unreachable: {0}")]
    Unavailable(String),
    /// The call exceeded the configured bounded wait.
    #[error("model call timed out after {0} seconds")]
    Timeout(u64),
    /// The endpoint replied but the payload was not usable.
    #[error("malformed model response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_error_display() {
        let err = ModelError::Unavailable("connection refused".to_string());
        assert_eq!(
            err.to_string(),
            "model endpoint unreachable: connection refused"
        );

        let err = ModelError::Timeout(120);
        assert_eq!(err.to_string(), "model call timed out after 120 seconds");

        let err = ModelError::InvalidResponse("missing field".to_string());
        assert_eq!(err.to_string(), "malformed model response: missing field");
    }

    #[test]
    fn test_model_error_debug() {
        let err = ModelError::Timeout(5);
        assert!(format!("{:?}", err).contains("Timeout"));
    }
}
