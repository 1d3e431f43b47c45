//! Language model integration
//!
//! Features:
//! - Gemini `generateContent` backend implementing `upop_core::LanguageModel`
//! - Explicit role mapping onto Gemini's `user` / `model` vocabulary
//! - JSON-only output mode for structured extraction

pub mod gemini;

pub use gemini::{GeminiBackend, GeminiConfig};

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Response blocked: {0}")]
    Blocked(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.without_url().to_string())
        }
    }
}

impl From<LlmError> for upop_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Configuration(msg) => upop_core::Error::Configuration(msg),
            other => upop_core::Error::Generation(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        let err: upop_core::Error = LlmError::Configuration("GOOGLE_API_KEY not set".into()).into();
        assert!(matches!(err, upop_core::Error::Configuration(_)));

        let err: upop_core::Error = LlmError::Timeout.into();
        assert!(matches!(err, upop_core::Error::Generation(_)));

        let err: upop_core::Error = LlmError::Api("HTTP 500".into()).into();
        assert!(matches!(err, upop_core::Error::Generation(_)));
    }
}
