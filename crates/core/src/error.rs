//! Error taxonomy shared by every pipeline stage
//!
//! Each variant maps to one caller-visible failure class. Crate-local errors
//! (LLM, sound backend, configuration) convert into this type so the HTTP edge
//! only has to reason about five cases.

use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// Malformed or empty caller-supplied data
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Upstream credential or service not configured
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Conversational or generative model call failed or returned unusable output
    #[error("Generation failed: {0}")]
    Generation(String),

    /// Extracted document does not satisfy the blueprint schema
    #[error("Schema violation ({}): {detail}", fields.join(", "))]
    SchemaViolation {
        /// Offending field names, in schema order
        fields: Vec<String>,
        /// Parser or validator detail (never shown to callers)
        detail: String,
    },

    /// Audio stream absent, empty, or the upstream call errored
    #[error("Synthesis failed: {0}")]
    Synthesis(String),
}

impl Error {
    /// Schema violation that is not attributable to individual fields
    /// (unparseable output, non-object root)
    pub fn unparseable(detail: impl Into<String>) -> Self {
        Error::SchemaViolation {
            fields: Vec::new(),
            detail: detail.into(),
        }
    }

    /// Short machine-readable name, used for metrics labels and log fields
    pub fn kind(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "invalid_input",
            Error::Configuration(_) => "configuration",
            Error::Generation(_) => "generation",
            Error::SchemaViolation { .. } => "schema_violation",
            Error::Synthesis(_) => "synthesis",
        }
    }
}

/// Result alias used across the workspace
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_violation_lists_fields() {
        let err = Error::SchemaViolation {
            fields: vec!["core_emotion".to_string(), "sonic_vibe".to_string()],
            detail: "required field empty".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("core_emotion, sonic_vibe"));
        assert_eq!(err.kind(), "schema_violation");
    }

    #[test]
    fn test_kinds_are_distinct() {
        let kinds = [
            Error::InvalidInput(String::new()).kind(),
            Error::Configuration(String::new()).kind(),
            Error::Generation(String::new()).kind(),
            Error::unparseable("x").kind(),
            Error::Synthesis(String::new()).kind(),
        ];
        for (i, a) in kinds.iter().enumerate() {
            for b in kinds.iter().skip(i + 1) {
                assert_ne!(a, b);
            }
        }
    }
}
