//! Centralized constants for the uPOP pipeline
//!
//! Single source of truth for upstream endpoints, model names and generation
//! parameters. Settings defaults read from here; nothing else should hardcode
//! these values.

/// Upstream service endpoints
pub mod endpoints {
    /// Gemini REST API base
    pub const GEMINI_DEFAULT: &str = "https://generativelanguage.googleapis.com/v1beta";

    /// ElevenLabs API base
    pub const ELEVENLABS_DEFAULT: &str = "https://api.elevenlabs.io";
}

/// Model names
pub mod models {
    /// Used for both the interview and blueprint extraction
    pub const GEMINI_FLASH: &str = "gemini-2.0-flash";

    /// Label for the ElevenLabs sound-generation endpoint
    pub const ELEVENLABS_SOUND: &str = "eleven-sound-generation";
}

/// Audio synthesis parameters
pub mod synthesis {
    /// Length of each generated clip
    pub const DURATION_SECONDS: f32 = 7.0;

    /// How literally the sound model follows the prompt (0.0 - 1.0)
    pub const PROMPT_INFLUENCE: f32 = 0.7;

    /// ElevenLabs bounds on `duration_seconds`
    pub const MIN_DURATION_SECONDS: f32 = 0.5;
    pub const MAX_DURATION_SECONDS: f32 = 22.0;

    /// Requested codec/bitrate
    pub const OUTPUT_FORMAT: &str = "mp3_44100_128";
}

/// Generation parameters
pub mod generation {
    pub const CHAT_TEMPERATURE: f32 = 0.9;

    /// Lower for extraction so the JSON stays close to the transcript
    pub const EXTRACTION_TEMPERATURE: f32 = 0.2;

    pub const MAX_OUTPUT_TOKENS: u32 = 2048;
}

/// Timeouts
pub mod timeouts {
    /// LLM request timeout (seconds)
    pub const LLM_REQUEST_SECS: u64 = 60;

    /// Sound generation request timeout (seconds)
    pub const SYNTHESIS_REQUEST_SECS: u64 = 120;
}

/// Plain environment variables honoured for credentials
pub mod env {
    pub const GOOGLE_API_KEY: &str = "GOOGLE_API_KEY";
    pub const ELEVENLABS_API_KEY: &str = "ELEVENLABS_API_KEY";

    /// Selects `config/{env}` overlay
    pub const RUNTIME_ENV: &str = "UPOP_ENV";
}
