//! Main settings module

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::constants::{endpoints, env, generation, models, synthesis, timeouts};
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Relaxed validation, warnings only
    #[default]
    Development,
    Staging,
    /// All validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    #[serde(default)]
    pub server: ServerConfig,

    /// Gemini backend (interview + extraction)
    #[serde(default)]
    pub llm: LlmConfig,

    /// ElevenLabs backend
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Settings {
    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_llm()?;
        self.validate_synthesis()?;
        Ok(())
    }

    /// Fill missing credentials from the plain `GOOGLE_API_KEY` /
    /// `ELEVENLABS_API_KEY` variables
    pub fn apply_credential_fallbacks<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if self.llm.api_key.is_none() {
            self.llm.api_key = lookup(env::GOOGLE_API_KEY).filter(|k| !k.trim().is_empty());
        }
        if self.synthesis.api_key.is_none() {
            self.synthesis.api_key =
                lookup(env::ELEVENLABS_API_KEY).filter(|k| !k.trim().is_empty());
        }
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        let server = &self.server;

        if server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port cannot be 0".to_string(),
            });
        }

        if server.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.environment.is_production() && server.cors_enabled && server.cors_origins.is_empty()
        {
            tracing::warn!(
                "CORS is enabled in production but no origins are configured. \
                 Browser clients will be rejected."
            );
        }

        Ok(())
    }

    fn validate_llm(&self) -> Result<(), ConfigError> {
        let llm = &self.llm;

        if llm.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("llm.endpoint".to_string()));
        }

        for (field, model) in [
            ("llm.chat_model", &llm.chat_model),
            ("llm.extraction_model", &llm.extraction_model),
        ] {
            if model.trim().is_empty() {
                return Err(ConfigError::MissingField(field.to_string()));
            }
        }

        for (field, value) in [
            ("llm.chat_temperature", llm.chat_temperature),
            ("llm.extraction_temperature", llm.extraction_temperature),
        ] {
            if !(0.0..=2.0).contains(&value) {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: format!("Must be between 0.0 and 2.0, got {}", value),
                });
            }
        }

        if llm.max_output_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_output_tokens".to_string(),
                message: "Must be at least 1".to_string(),
            });
        }

        if llm.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.environment.is_production() && llm.api_key.is_none() {
            tracing::warn!("Gemini API key is not configured; chat and blueprint will fail");
        }

        Ok(())
    }

    fn validate_synthesis(&self) -> Result<(), ConfigError> {
        let cfg = &self.synthesis;

        if cfg.endpoint.trim().is_empty() {
            return Err(ConfigError::MissingField("synthesis.endpoint".to_string()));
        }

        if !(synthesis::MIN_DURATION_SECONDS..=synthesis::MAX_DURATION_SECONDS)
            .contains(&cfg.duration_seconds)
        {
            return Err(ConfigError::InvalidValue {
                field: "synthesis.duration_seconds".to_string(),
                message: format!(
                    "Must be between {} and {} seconds, got {}",
                    synthesis::MIN_DURATION_SECONDS,
                    synthesis::MAX_DURATION_SECONDS,
                    cfg.duration_seconds
                ),
            });
        }

        if !(0.0..=1.0).contains(&cfg.prompt_influence) {
            return Err(ConfigError::InvalidValue {
                field: "synthesis.prompt_influence".to_string(),
                message: format!("Must be between 0.0 and 1.0, got {}", cfg.prompt_influence),
            });
        }

        if cfg.timeout_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "synthesis.timeout_seconds".to_string(),
                message: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.environment.is_production() && cfg.api_key.is_none() {
            tracing::warn!("ElevenLabs API key is not configured; audio rendering will fail");
        }

        Ok(())
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Request timeout in seconds
    #[serde(default = "default_server_timeout")]
    pub timeout_seconds: u64,

    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Empty means "allow localhost only" outside production
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_server_timeout() -> u64 {
    180
}
fn default_true() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            timeout_seconds: default_server_timeout(),
            cors_enabled: default_true(),
            cors_origins: Vec::new(),
        }
    }
}

/// Gemini backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_llm_endpoint")]
    pub endpoint: String,

    /// Model used by the interviewer
    #[serde(default = "default_model")]
    pub chat_model: String,

    /// Model used for blueprint extraction
    #[serde(default = "default_model")]
    pub extraction_model: String,

    #[serde(default = "default_chat_temperature")]
    pub chat_temperature: f32,

    #[serde(default = "default_extraction_temperature")]
    pub extraction_temperature: f32,

    #[serde(default = "default_max_output_tokens")]
    pub max_output_tokens: u32,

    #[serde(default = "default_llm_timeout")]
    pub timeout_seconds: u64,

    /// Set via `UPOP__LLM__API_KEY` or `GOOGLE_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_llm_endpoint() -> String {
    endpoints::GEMINI_DEFAULT.to_string()
}
fn default_model() -> String {
    models::GEMINI_FLASH.to_string()
}
fn default_chat_temperature() -> f32 {
    generation::CHAT_TEMPERATURE
}
fn default_extraction_temperature() -> f32 {
    generation::EXTRACTION_TEMPERATURE
}
fn default_max_output_tokens() -> u32 {
    generation::MAX_OUTPUT_TOKENS
}
fn default_llm_timeout() -> u64 {
    timeouts::LLM_REQUEST_SECS
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            endpoint: default_llm_endpoint(),
            chat_model: default_model(),
            extraction_model: default_model(),
            chat_temperature: default_chat_temperature(),
            extraction_temperature: default_extraction_temperature(),
            max_output_tokens: default_max_output_tokens(),
            timeout_seconds: default_llm_timeout(),
            api_key: None,
        }
    }
}

/// ElevenLabs sound generation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthesisConfig {
    #[serde(default = "default_synthesis_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_duration")]
    pub duration_seconds: f32,

    #[serde(default = "default_prompt_influence")]
    pub prompt_influence: f32,

    #[serde(default = "default_output_format")]
    pub output_format: String,

    #[serde(default = "default_synthesis_timeout")]
    pub timeout_seconds: u64,

    /// Set via `UPOP__SYNTHESIS__API_KEY` or `ELEVENLABS_API_KEY`
    #[serde(default, skip_serializing)]
    pub api_key: Option<String>,
}

fn default_synthesis_endpoint() -> String {
    endpoints::ELEVENLABS_DEFAULT.to_string()
}
fn default_duration() -> f32 {
    synthesis::DURATION_SECONDS
}
fn default_prompt_influence() -> f32 {
    synthesis::PROMPT_INFLUENCE
}
fn default_output_format() -> String {
    synthesis::OUTPUT_FORMAT.to_string()
}
fn default_synthesis_timeout() -> u64 {
    timeouts::SYNTHESIS_REQUEST_SECS
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            endpoint: default_synthesis_endpoint(),
            duration_seconds: default_duration(),
            prompt_influence: default_prompt_influence(),
            output_format: default_output_format(),
            timeout_seconds: default_synthesis_timeout(),
            api_key: None,
        }
    }
}

/// Observability configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_json: bool,

    #[serde(default = "default_true")]
    pub metrics_enabled: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: true,
        }
    }
}

/// Load settings from files and environment
///
/// Priority (highest to lowest):
/// 1. Environment variables (`UPOP__` prefix, `__` separator)
/// 2. `config/{env}.{yaml,toml}` (if env specified)
/// 3. `config/default.{yaml,toml}`
/// 4. Built-in defaults
///
/// Credentials not set through the above fall back to `GOOGLE_API_KEY` and
/// `ELEVENLABS_API_KEY`.
pub fn load_settings(env_name: Option<&str>) -> Result<Settings, ConfigError> {
    load_settings_from("config", env_name)
}

/// Same as [`load_settings`] with an explicit config directory
pub fn load_settings_from(dir: &str, env_name: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder();

    builder = builder.add_source(File::with_name(&format!("{}/default", dir)).required(false));

    if let Some(env_name) = env_name {
        builder = builder
            .add_source(File::with_name(&format!("{}/{}", dir, env_name)).required(false));
    }

    builder = builder.add_source(
        Environment::with_prefix("UPOP")
            .prefix_separator("__")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;
    let mut settings: Settings = config.try_deserialize()?;

    settings.apply_credential_fallbacks(|key| std::env::var(key).ok());
    settings.validate()?;

    Ok(settings)
}
