use thiserror::Error;

/// Error type for all LLM provider operations.
#[derive(Debug, Error)]
pub enum LLMError {
    /// Authentication or missing-credential failures.
    #[error("Auth Error: {0}")]
    AuthError(String),

    /// The request was rejected before reaching the provider.
    #[error("Invalid Request: {0}")]
    InvalidRequest(String),

    /// Transport-level HTTP failures.
    #[error("HTTP Error: {0}")]
    HttpError(String),

    /// The provider answered with a non-success status.
    #[error("Provider Error: {0}")]
    ProviderError(String),

    /// The provider answered 2xx but the body did not match the expected shape.
    #[error("Response Format Error: {message}")]
    ResponseFormatError { message: String, raw_response: String },

    #[error("JSON Parse Error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<reqwest::Error> for LLMError {
    fn from(err: reqwest::Error) -> Self {
        LLMError::HttpError(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_includes_detail() {
        let err = LLMError::AuthError("Missing API key".to_string());
        assert!(err.to_string().contains("Missing API key"));

        let err = LLMError::ResponseFormatError {
            message: "missing choices".to_string(),
            raw_response: "{}".to_string(),
        };
        assert!(err.to_string().contains("missing choices"));
    }
}
