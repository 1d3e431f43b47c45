//! Application State
//!
//! Shared state across all handlers. Pipeline stages are built from settings
//! and rebuilt on config reload.

use std::sync::Arc;

use parking_lot::RwLock;

use upop_agent::{BlueprintExtractor, InterviewController, SynthesisCompiler};
use upop_config::{load_settings, LlmConfig, Settings, SynthesisConfig};
use upop_core::{LanguageModel, SoundGenerator};
use upop_llm::{GeminiBackend, GeminiConfig};
use upop_sound::{ElevenLabsBackend, ElevenLabsConfig};

#[derive(Default)]
struct Stages {
    llm_model: Option<String>,
    interview: Option<Arc<InterviewController>>,
    extractor: Option<Arc<BlueprintExtractor>>,
    sound_model: Option<String>,
    synthesis: Option<Arc<SynthesisCompiler>>,
}

impl Stages {
    fn from_settings(config: &Settings) -> Self {
        let mut stages = Self::default();

        match gemini_backend(&config.llm) {
            Ok(llm) => stages.set_language_model(llm, &config.llm),
            Err(e) => tracing::warn!(error = %e, "Language model backend unavailable"),
        }
        match elevenlabs_backend(&config.synthesis) {
            Ok(sound) => stages.set_sound_generator(sound, &config.synthesis),
            Err(e) => tracing::warn!(error = %e, "Sound generation backend unavailable"),
        }

        stages
    }

    fn set_language_model(&mut self, llm: Arc<dyn LanguageModel>, config: &LlmConfig) {
        self.llm_model = Some(llm.model_name().to_string());
        self.interview = Some(Arc::new(
            InterviewController::new(llm.clone())
                .with_model(config.chat_model.clone())
                .with_temperature(config.chat_temperature),
        ));
        self.extractor = match BlueprintExtractor::new(llm) {
            Ok(extractor) => Some(Arc::new(
                extractor
                    .with_model(config.extraction_model.clone())
                    .with_temperature(config.extraction_temperature),
            )),
            Err(e) => {
                tracing::error!(error = %e, "Failed to build blueprint extractor");
                None
            },
        };
    }

    fn set_sound_generator(&mut self, sound: Arc<dyn SoundGenerator>, config: &SynthesisConfig) {
        self.sound_model = Some(sound.model_name().to_string());
        self.synthesis = Some(Arc::new(
            SynthesisCompiler::new(sound)
                .with_duration(config.duration_seconds)
                .with_prompt_influence(config.prompt_influence),
        ));
    }
}

fn gemini_backend(config: &LlmConfig) -> upop_core::Result<Arc<dyn LanguageModel>> {
    let backend = GeminiConfig::from_settings(config).and_then(GeminiBackend::new)?;
    Ok(Arc::new(backend))
}

fn elevenlabs_backend(config: &SynthesisConfig) -> upop_core::Result<Arc<dyn SoundGenerator>> {
    let backend = ElevenLabsConfig::from_settings(config).and_then(ElevenLabsBackend::new)?;
    Ok(Arc::new(backend))
}

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration wrapped in RwLock for hot-reload support
    pub config: Arc<RwLock<Settings>>,
    stages: Arc<RwLock<Stages>>,
    /// Environment name for config reload
    env: Option<String>,
}

impl AppState {
    /// Create application state, building backends from the configured credentials
    pub fn new(config: Settings) -> Self {
        Self::with_env(config, None)
    }

    /// Create application state with environment name for reload support
    pub fn with_env(config: Settings, env: Option<String>) -> Self {
        let stages = Stages::from_settings(&config);
        Self {
            config: Arc::new(RwLock::new(config)),
            stages: Arc::new(RwLock::new(stages)),
            env,
        }
    }

    /// Replace the language model used by the chat and blueprint stages
    pub fn with_language_model(self, llm: Arc<dyn LanguageModel>) -> Self {
        {
            let config = self.config.read();
            self.stages.write().set_language_model(llm, &config.llm);
        }
        self
    }

    /// Replace the sound generator used by the audio stage
    pub fn with_sound_generator(self, sound: Arc<dyn SoundGenerator>) -> Self {
        {
            let config = self.config.read();
            self.stages.write().set_sound_generator(sound, &config.synthesis);
        }
        self
    }

    pub fn interview(&self) -> Option<Arc<InterviewController>> {
        self.stages.read().interview.clone()
    }

    pub fn extractor(&self) -> Option<Arc<BlueprintExtractor>> {
        self.stages.read().extractor.clone()
    }

    pub fn synthesis(&self) -> Option<Arc<SynthesisCompiler>> {
        self.stages.read().synthesis.clone()
    }

    pub fn llm_model(&self) -> Option<String> {
        self.stages.read().llm_model.clone()
    }

    pub fn sound_model(&self) -> Option<String> {
        self.stages.read().sound_model.clone()
    }

    /// Reload configuration from files and rebuild the backends
    ///
    /// Backends injected with `with_language_model` / `with_sound_generator`
    /// are replaced by the ones the new settings describe.
    pub fn reload_config(&self) -> Result<(), String> {
        let new_config = load_settings(self.env.as_deref()).map_err(|e| e.to_string())?;
        let stages = Stages::from_settings(&new_config);

        *self.config.write() = new_config;
        *self.stages.write() = stages;

        tracing::info!("Configuration reloaded successfully");
        Ok(())
    }
}
