//! uPOP Server
//!
//! HTTP surface over the interview, blueprint and audio stages, plus
//! health, readiness, metrics and config reload endpoints.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{
    init_metrics, record_audio_bytes, record_error, record_llm_latency, record_request,
    record_synthesis_latency,
};
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Caller-facing operation, used to pick the error message shown to clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Chat,
    Blueprint,
    Audio,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operation::Chat => "chat",
            Operation::Blueprint => "blueprint",
            Operation::Audio => "audio",
        }
    }

    /// Opaque message for upstream failures
    pub fn failure_message(&self) -> &'static str {
        match self {
            Operation::Chat => "Failed to get response from AI",
            Operation::Blueprint => "Failed to generate blueprint",
            Operation::Audio => "Failed to generate audio",
        }
    }

    /// Actionable message when the operation's upstream has no credential
    pub fn unconfigured_message(&self) -> &'static str {
        match self {
            Operation::Chat | Operation::Blueprint => "Google API key not configured",
            Operation::Audio => "ElevenLabs API key not configured",
        }
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Server errors
#[derive(Error, Debug)]
pub enum ServerError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("{operation} failed: {source}")]
    Pipeline {
        operation: Operation,
        #[source]
        source: upop_core::Error,
    },

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn pipeline(operation: Operation) -> impl FnOnce(upop_core::Error) -> Self {
        move |source| ServerError::Pipeline { operation, source }
    }

    pub fn unconfigured(operation: Operation) -> Self {
        ServerError::Pipeline {
            operation,
            source: upop_core::Error::Configuration(operation.unconfigured_message().to_string()),
        }
    }

    /// Status code and client-visible message
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ServerError::InvalidRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::Pipeline { operation, source } => match source {
                upop_core::Error::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                upop_core::Error::Configuration(_) => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    operation.unconfigured_message().to_string(),
                ),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    operation.failure_message().to_string(),
                ),
            },
            ServerError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            ),
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ServerError::InvalidRequest(_) => "invalid_input",
            ServerError::Pipeline { source, .. } => source.kind(),
            ServerError::Internal(_) => "internal",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = %self, kind = self.kind(), "Request failed");
        } else {
            tracing::warn!(error = %self, kind = self.kind(), "Request rejected");
        }
        record_error(self.kind());

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use upop_core::Error;

    #[test]
    fn test_opaque_messages() {
        let err = ServerError::pipeline(Operation::Blueprint)(Error::SchemaViolation {
            fields: vec!["core_emotion".into()],
            detail: "secret model output".into(),
        });
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "Failed to generate blueprint");

        let err = ServerError::pipeline(Operation::Chat)(Error::Generation("HTTP 503".into()));
        assert_eq!(err.status_and_message().1, "Failed to get response from AI");
    }

    #[test]
    fn test_configuration_messages() {
        let (status, message) = ServerError::unconfigured(Operation::Audio).status_and_message();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(message, "ElevenLabs API key not configured");

        let (_, message) = ServerError::unconfigured(Operation::Chat).status_and_message();
        assert_eq!(message, "Google API key not configured");
    }

    #[test]
    fn test_invalid_input_is_bad_request() {
        let err = ServerError::pipeline(Operation::Chat)(Error::InvalidInput("message is empty".into()));
        let (status, message) = err.status_and_message();
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(message, "message is empty");
    }
}
