//! Sound generation integration
//!
//! Features:
//! - ElevenLabs `sound-generation` backend implementing `upop_core::SoundGenerator`
//! - Chunked response body exposed as an ordered byte stream

pub mod elevenlabs;

pub use elevenlabs::{ElevenLabsBackend, ElevenLabsConfig};

use thiserror::Error;

/// Sound backend errors
#[derive(Error, Debug)]
pub enum SoundError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Timeout")]
    Timeout,

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for SoundError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            SoundError::Timeout
        } else {
            SoundError::Network(err.without_url().to_string())
        }
    }
}

impl From<SoundError> for upop_core::Error {
    fn from(err: SoundError) -> Self {
        match err {
            SoundError::Configuration(msg) => upop_core::Error::Configuration(msg),
            other => upop_core::Error::Synthesis(other.to_string()),
        }
    }
}
