//! Interview controller
//!
//! Replays the conversation to the model under the interviewer system prompt
//! and appends the artist's utterance plus the model's reply. Nothing is
//! appended unless the model produced a usable reply.

use std::sync::Arc;

use upop_config::INTERVIEWER_SYSTEM_PROMPT;
use upop_core::{Conversation, Error, GenerateRequest, LanguageModel, Result, Speaker};

/// Drives one interview turn at a time
pub struct InterviewController {
    llm: Arc<dyn LanguageModel>,
    system_prompt: String,
    model: Option<String>,
    temperature: Option<f32>,
}

impl InterviewController {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            llm,
            system_prompt: INTERVIEWER_SYSTEM_PROMPT.to_string(),
            model: None,
            temperature: None,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = prompt.into();
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Ask the model for the interviewer's next line
    ///
    /// On success the conversation grows by exactly two turns (artist, then
    /// interviewer) and the reply is returned. On failure the conversation is
    /// untouched.
    pub async fn advance(&self, conversation: &mut Conversation, utterance: &str) -> Result<String> {
        let utterance = utterance.trim();
        if utterance.is_empty() {
            return Err(Error::InvalidInput("message is empty".to_string()));
        }

        let mut request = GenerateRequest::new(self.system_prompt.as_str())
            .with_history(conversation)
            .with_user_message(utterance);
        if let Some(model) = &self.model {
            request = request.with_model(model.as_str());
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }

        tracing::debug!(
            model = self.llm.model_name(),
            history_turns = conversation.len(),
            "Advancing interview"
        );

        let response = self.llm.generate(request).await.map_err(|e| match e {
            Error::Configuration(_) | Error::Generation(_) => e,
            other => Error::Generation(other.to_string()),
        })?;

        let reply = response.text.trim();
        if reply.is_empty() {
            tracing::warn!(finish_reason = ?response.finish_reason, "Model returned an empty reply");
            return Err(Error::Generation("model returned no text".to_string()));
        }

        conversation.push(Speaker::Artist, utterance)?;
        conversation.push(Speaker::Interviewer, reply)?;

        Ok(reply.to_string())
    }
}
