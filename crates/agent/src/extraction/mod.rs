//! Blueprint extraction
//!
//! Serializes the conversation into a labelled transcript, asks the model for
//! a JSON document shaped by the blueprint schema, then repairs and validates
//! the reply. The result is all-or-nothing: either every required field is
//! present and non-empty, or the caller gets a `SchemaViolation` naming the
//! fields that failed.

pub mod normalize;
pub mod schema;

use std::collections::HashSet;
use std::sync::Arc;

use jsonschema::error::ValidationErrorKind;
use jsonschema::JSONSchema;
use serde_json::Value;

use upop_config::extraction_prompt;
use upop_core::{
    Blueprint, Conversation, Error, GenerateRequest, LanguageModel, ResponseFormat, Result,
    BLUEPRINT_FIELDS,
};

pub use normalize::normalize;
pub use schema::{prompt_schema, validation_schema, SchemaBuilder};

/// Remove a surrounding Markdown code fence (```` ```json ... ``` ````), if any
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };

    // Drop the info string (`json`, `JSON`, ...) on the opening line
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };

    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

/// Requests and validates blueprints
pub struct BlueprintExtractor {
    llm: Arc<dyn LanguageModel>,
    validator: JSONSchema,
    prompt_schema: String,
    model: Option<String>,
    temperature: Option<f32>,
}

impl BlueprintExtractor {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Result<Self> {
        let validation = validation_schema();
        let validator = JSONSchema::compile(&validation)
            .map_err(|e| Error::Configuration(format!("invalid blueprint schema: {}", e)))?;
        let prompt_schema = serde_json::to_string_pretty(&prompt_schema())
            .map_err(|e| Error::Configuration(format!("unrenderable blueprint schema: {}", e)))?;

        Ok(Self {
            llm,
            validator,
            prompt_schema,
            model: None,
            temperature: None,
        })
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    /// Request body sent to the model for this conversation
    pub fn build_request(&self, conversation: &Conversation) -> GenerateRequest {
        let prompt = extraction_prompt(&conversation.transcript(), &self.prompt_schema);
        let mut request = GenerateRequest::bare()
            .with_user_message(prompt)
            .with_response_format(ResponseFormat::Json);
        if let Some(model) = &self.model {
            request = request.with_model(model.as_str());
        }
        if let Some(temperature) = self.temperature {
            request = request.with_temperature(temperature);
        }
        request
    }

    /// Extract a blueprint from the full conversation
    pub async fn extract(&self, conversation: &Conversation) -> Result<Blueprint> {
        let request = self.build_request(conversation);

        tracing::debug!(
            model = self.llm.model_name(),
            turns = conversation.len(),
            "Requesting blueprint extraction"
        );

        let response = self.llm.generate(request).await.map_err(|e| match e {
            Error::Configuration(_) | Error::Generation(_) => e,
            other => Error::Generation(other.to_string()),
        })?;

        self.parse(&response.text)
    }

    /// Repair, validate and normalize raw model output
    pub fn parse(&self, raw: &str) -> Result<Blueprint> {
        let body = strip_code_fence(raw);
        let value: Value = serde_json::from_str(body)
            .map_err(|e| Error::unparseable(format!("model output is not JSON: {}", e)))?;

        let Some(object) = value.as_object() else {
            return Err(Error::unparseable("model output root is not an object"));
        };

        let offending = self.offending_fields(&value);
        if !offending.is_empty() {
            return Err(Error::SchemaViolation {
                fields: offending,
                detail: "required field missing, empty, or wrongly typed".to_string(),
            });
        }

        let blueprint = normalize(object);

        let missing: Vec<String> = blueprint
            .missing_required()
            .into_iter()
            .map(str::to_string)
            .collect();
        if !missing.is_empty() {
            return Err(Error::SchemaViolation {
                fields: missing,
                detail: "required field empty after normalization".to_string(),
            });
        }

        Ok(blueprint)
    }

    /// Field names reported by the validator, in canonical field order
    fn offending_fields(&self, value: &Value) -> Vec<String> {
        let mut names: HashSet<String> = HashSet::new();

        if let Err(errors) = self.validator.validate(value) {
            for error in errors {
                match &error.kind {
                    ValidationErrorKind::Required { property } => {
                        if let Some(name) = property.as_str() {
                            names.insert(name.to_string());
                        }
                    },
                    _ => {
                        let path = error.instance_path.to_string();
                        if let Some(name) = path.trim_start_matches('/').split('/').next() {
                            if !name.is_empty() {
                                names.insert(name.to_string());
                            }
                        }
                    },
                }
            }
        }

        BLUEPRINT_FIELDS
            .iter()
            .filter(|field| names.contains(field.name))
            .map(|field| field.name.to_string())
            .collect()
    }
}
