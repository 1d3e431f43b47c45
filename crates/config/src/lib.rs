//! Configuration management for the uPOP pipeline
//!
//! Supports loading configuration from:
//! - YAML/TOML files under `config/`
//! - Environment variables (`UPOP__` prefix)
//! - The plain `GOOGLE_API_KEY` / `ELEVENLABS_API_KEY` variables for credentials
//!
//! Prompt text and generation constants live here as well so every crate reads
//! them from one place.

pub mod constants;
pub mod prompts;
pub mod settings;

pub use prompts::{
    extraction_prompt, EXTRACTION_INSTRUCTIONS, INTERVIEWER_SYSTEM_PROMPT, OPENING_GREETING,
};
pub use settings::{
    load_settings, load_settings_from, LlmConfig, ObservabilityConfig, RuntimeEnvironment,
    ServerConfig, Settings, SynthesisConfig,
};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

impl From<ConfigError> for upop_core::Error {
    fn from(err: ConfigError) -> Self {
        upop_core::Error::Configuration(err.to_string())
    }
}
