//! ElevenLabs sound generation backend

use std::time::Duration;

use async_trait::async_trait;
use futures::StreamExt;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use upop_config::constants::models;
use upop_config::SynthesisConfig;
use upop_core::{AudioChunkStream, SoundGenerator, SoundRequest};

use crate::SoundError;

const XI_API_KEY_HEADER: &str = "xi-api-key";

/// ElevenLabs backend configuration
#[derive(Debug, Clone)]
pub struct ElevenLabsConfig {
    /// API base, e.g. `https://api.elevenlabs.io`
    pub endpoint: String,
    pub api_key: String,
    /// Codec/bitrate query parameter, e.g. `mp3_44100_128`
    pub output_format: String,
    pub timeout: Duration,
}

impl ElevenLabsConfig {
    /// Build from settings; fails when no API key is configured
    pub fn from_settings(settings: &SynthesisConfig) -> Result<Self, SoundError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                SoundError::Configuration("ElevenLabs API key not configured".to_string())
            })?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            api_key,
            output_format: settings.output_format.clone(),
            timeout: Duration::from_secs(settings.timeout_seconds),
        })
    }
}

#[derive(Debug, Serialize)]
struct SoundGenerationBody<'a> {
    text: &'a str,
    duration_seconds: f32,
    prompt_influence: f32,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: serde_json::Value,
}

/// ElevenLabs text-to-sound-effects backend
pub struct ElevenLabsBackend {
    config: ElevenLabsConfig,
    client: Client,
}

impl ElevenLabsBackend {
    pub fn new(config: ElevenLabsConfig) -> Result<Self, SoundError> {
        if config.api_key.trim().is_empty() {
            return Err(SoundError::Configuration(
                "ElevenLabs API key not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| SoundError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn api_url(&self) -> String {
        format!(
            "{}/v1/sound-generation",
            self.config.endpoint.trim_end_matches('/')
        )
    }

    fn api_error(status: reqwest::StatusCode, body: &str) -> SoundError {
        let detail = serde_json::from_str::<ErrorBody>(body)
            .map(|e| match e.detail {
                serde_json::Value::String(s) => s,
                serde_json::Value::Object(map) => map
                    .get("message")
                    .and_then(|m| m.as_str())
                    .map(str::to_string)
                    .unwrap_or_else(|| serde_json::Value::Object(map).to_string()),
                other => other.to_string(),
            })
            .unwrap_or_else(|_| body.to_string());
        SoundError::Api(format!("HTTP {}: {}", status, detail))
    }
}

#[async_trait]
impl SoundGenerator for ElevenLabsBackend {
    async fn generate(&self, request: SoundRequest) -> upop_core::Result<AudioChunkStream> {
        let body = SoundGenerationBody {
            text: &request.text,
            duration_seconds: request.duration_seconds,
            prompt_influence: request.prompt_influence,
        };

        tracing::debug!(
            duration_seconds = request.duration_seconds,
            prompt_influence = request.prompt_influence,
            prompt_chars = request.text.len(),
            "Requesting sound generation"
        );

        let response = self
            .client
            .post(self.api_url())
            .query(&[("output_format", self.config.output_format.as_str())])
            .header(XI_API_KEY_HEADER, &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(SoundError::from)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, "ElevenLabs API error");
            return Err(Self::api_error(status, &text).into());
        }

        let stream = response
            .bytes_stream()
            .map(|chunk| chunk.map_err(|e| upop_core::Error::from(SoundError::from(e))));

        Ok(Box::pin(stream))
    }

    async fn is_available(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    fn model_name(&self) -> &str {
        models::ELEVENLABS_SOUND
    }
}
