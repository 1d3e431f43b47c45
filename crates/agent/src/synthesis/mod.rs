//! Audio synthesis
//!
//! Compiles a blueprint into a text prompt, submits it to the sound
//! generator, and reassembles the streamed chunks into a single artifact.
//! A partial artifact is never returned: any stream error, an empty stream,
//! or an empty buffer fails the whole render.

mod assembly;
mod prompt;

pub use assembly::reassemble;
pub use prompt::compile_prompt;

use std::sync::Arc;

use bytes::Bytes;
use futures::StreamExt;

use upop_config::constants::synthesis;
use upop_core::{AudioArtifact, Blueprint, Error, Result, SoundGenerator, SoundRequest};

fn synthesis_failure(err: Error) -> Error {
    match err {
        Error::Configuration(_) | Error::Synthesis(_) => err,
        other => Error::Synthesis(other.to_string()),
    }
}

/// Blueprint -> audio artifact
pub struct SynthesisCompiler {
    sound: Arc<dyn SoundGenerator>,
    duration_seconds: f32,
    prompt_influence: f32,
}

impl SynthesisCompiler {
    pub fn new(sound: Arc<dyn SoundGenerator>) -> Self {
        Self {
            sound,
            duration_seconds: synthesis::DURATION_SECONDS,
            prompt_influence: synthesis::PROMPT_INFLUENCE,
        }
    }

    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.duration_seconds = seconds;
        self
    }

    pub fn with_prompt_influence(mut self, influence: f32) -> Self {
        self.prompt_influence = influence;
        self
    }

    /// Compile the blueprint's prompt and render it
    pub async fn synthesize(&self, blueprint: &Blueprint) -> Result<AudioArtifact> {
        let prompt = compile_prompt(blueprint);
        self.render(&prompt).await
    }

    /// Render an already compiled prompt
    pub async fn render(&self, prompt: &str) -> Result<AudioArtifact> {
        let prompt = prompt.trim();
        if prompt.is_empty() {
            return Err(Error::InvalidInput("prompt is empty".to_string()));
        }

        let request = SoundRequest {
            text: prompt.to_string(),
            duration_seconds: self.duration_seconds,
            prompt_influence: self.prompt_influence,
        };

        tracing::debug!(
            model = self.sound.model_name(),
            duration_seconds = self.duration_seconds,
            prompt_influence = self.prompt_influence,
            "Rendering audio"
        );

        let mut stream = self
            .sound
            .generate(request)
            .await
            .map_err(synthesis_failure)?;

        let mut chunks: Vec<Bytes> = Vec::new();
        while let Some(chunk) = stream.next().await {
            chunks.push(chunk.map_err(synthesis_failure)?);
        }

        if chunks.is_empty() {
            return Err(Error::Synthesis("audio stream produced no chunks".to_string()));
        }

        let buffer = reassemble(&chunks);
        if buffer.is_empty() {
            return Err(Error::Synthesis("audio stream was empty".to_string()));
        }

        tracing::debug!(chunks = chunks.len(), bytes = buffer.len(), "Audio assembled");

        Ok(AudioArtifact::mpeg(buffer))
    }
}
