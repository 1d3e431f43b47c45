//! Google Gemini backend
//!
//! Talks to `POST {endpoint}/models/{model}:generateContent`. System messages
//! become `systemInstruction`; the remaining history is replayed as `contents`
//! with Gemini's two-role vocabulary.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use upop_config::LlmConfig;
use upop_core::{
    FinishReason, GenerateRequest, GenerateResponse, LanguageModel, ResponseFormat, Role,
    TokenUsage,
};

use crate::LlmError;

const API_KEY_HEADER: &str = "x-goog-api-key";

/// Gemini backend configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API base, e.g. `https://generativelanguage.googleapis.com/v1beta`
    pub endpoint: String,
    /// Default model when the request does not override it
    pub model: String,
    pub api_key: String,
    pub max_output_tokens: u32,
    pub timeout: Duration,
}

impl GeminiConfig {
    /// Build from settings; fails when no API key is configured
    pub fn from_settings(settings: &LlmConfig) -> Result<Self, LlmError> {
        let api_key = settings
            .api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| LlmError::Configuration("Google API key not configured".to_string()))?;

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            model: settings.chat_model.clone(),
            api_key,
            max_output_tokens: settings.max_output_tokens,
            timeout: Duration::from_secs(settings.timeout_seconds),
        })
    }
}

/// Gemini's role vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum GeminiRole {
    User,
    Model,
}

impl GeminiRole {
    /// System messages are lifted out before this is called
    fn from_role(role: Role) -> Option<Self> {
        match role {
            Role::User => Some(GeminiRole::User),
            Role::Assistant => Some(GeminiRole::Model),
            Role::System => None,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    role: Option<GeminiRole>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
    candidate_count: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_mime_type: Option<&'static str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    usage_metadata: Option<UsageMetadata>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiError,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

/// Gemini `generateContent` backend
pub struct GeminiBackend {
    config: GeminiConfig,
    client: Client,
}

impl GeminiBackend {
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        if config.api_key.trim().is_empty() {
            return Err(LlmError::Configuration(
                "Google API key not configured".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn api_url(&self, model: &str) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.config.endpoint.trim_end_matches('/'),
            model
        )
    }

    fn build_request(&self, request: &GenerateRequest) -> Result<GeminiRequest, LlmError> {
        let contents: Vec<GeminiContent> = request
            .messages
            .iter()
            .filter_map(|m| {
                GeminiRole::from_role(m.role).map(|role| GeminiContent {
                    role: Some(role),
                    parts: vec![GeminiPart {
                        text: m.content.clone(),
                    }],
                })
            })
            .collect();

        if contents.is_empty() {
            return Err(LlmError::InvalidResponse(
                "request has no user or model content".to_string(),
            ));
        }

        let system_instruction = request.system_instruction().map(|text| GeminiContent {
            role: None,
            parts: vec![GeminiPart { text }],
        });

        let response_mime_type = match request.response_format {
            ResponseFormat::Text => None,
            ResponseFormat::Json => Some("application/json"),
        };

        Ok(GeminiRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                temperature: request.temperature,
                max_output_tokens: Some(self.config.max_output_tokens),
                candidate_count: 1,
                response_mime_type,
            },
        })
    }

    fn parse_response(body: GeminiResponse) -> Result<GenerateResponse, LlmError> {
        if let Some(reason) = body.prompt_feedback.and_then(|f| f.block_reason) {
            return Err(LlmError::Blocked(reason));
        }

        let candidate = body
            .candidates
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("No candidates in response".to_string()))?;

        let text: String = candidate
            .content
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();

        let finish_reason = match candidate.finish_reason.as_deref() {
            None | Some("STOP") => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("RECITATION") | Some("BLOCKLIST") | Some("PROHIBITED_CONTENT") => {
                FinishReason::ContentFilter
            },
            Some(_) => FinishReason::Other,
        };

        let mut response = GenerateResponse::text(text);
        response.finish_reason = finish_reason;
        if let Some(usage) = body.usage_metadata {
            response = response.with_usage(TokenUsage::new(
                usage.prompt_token_count,
                usage.candidates_token_count,
            ));
        }
        Ok(response)
    }

    fn api_error(status: reqwest::StatusCode, body: &str) -> LlmError {
        let message = serde_json::from_str::<GeminiErrorEnvelope>(body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| body.to_string());
        LlmError::Api(format!("HTTP {}: {}", status, message))
    }
}

#[async_trait]
impl LanguageModel for GeminiBackend {
    async fn generate(&self, request: GenerateRequest) -> upop_core::Result<GenerateResponse> {
        let start = Instant::now();
        let model = request
            .model
            .clone()
            .unwrap_or_else(|| self.config.model.clone());
        let body = self.build_request(&request)?;

        tracing::debug!(
            model = %model,
            turns = body.contents.len(),
            json = matches!(request.response_format, ResponseFormat::Json),
            "Sending generateContent request"
        );

        let response = self
            .client
            .post(self.api_url(&model))
            .header(API_KEY_HEADER, self.config.api_key.as_str())
            .json(&body)
            .send()
            .await
            .map_err(LlmError::from)?;

        let status = response.status();
        let text = response.text().await.map_err(LlmError::from)?;

        if !status.is_success() {
            tracing::warn!(status = %status, model = %model, "Gemini API error");
            return Err(Self::api_error(status, &text).into());
        }

        let parsed: GeminiResponse = serde_json::from_str(&text)
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        let result = Self::parse_response(parsed)?;

        tracing::debug!(
            model = %model,
            latency_ms = start.elapsed().as_millis() as u64,
            finish_reason = ?result.finish_reason,
            chars = result.text.len(),
            "Gemini response received"
        );

        Ok(result)
    }

    async fn is_available(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Path;
    use axum::http::{HeaderMap, StatusCode};
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    fn config(endpoint: &str) -> GeminiConfig {
        GeminiConfig {
            endpoint: endpoint.to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key: "test-key".to_string(),
            max_output_tokens: 256,
            timeout: Duration::from_secs(5),
        }
    }

    async fn spawn(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[test]
    fn test_missing_key_rejected() {
        let mut cfg = config("http://localhost");
        cfg.api_key = String::new();
        assert!(matches!(
            GeminiBackend::new(cfg),
            Err(LlmError::Configuration(_))
        ));

        let settings = LlmConfig::default();
        assert!(matches!(
            GeminiConfig::from_settings(&settings),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn test_request_role_mapping() {
        let backend = GeminiBackend::new(config("http://localhost")).unwrap();
        let request = GenerateRequest::new("be a producer")
            .with_assistant_message("Welcome")
            .with_user_message("hi");

        let body = backend.build_request(&request).unwrap();
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["contents"][0]["role"], "model");
        assert_eq!(value["contents"][1]["role"], "user");
        assert_eq!(value["contents"][1]["parts"][0]["text"], "hi");
        assert_eq!(value["systemInstruction"]["parts"][0]["text"], "be a producer");
        assert!(value["systemInstruction"].get("role").is_none());
        assert!(value["generationConfig"].get("responseMimeType").is_none());
    }

    #[test]
    fn test_json_format_sets_mime_type() {
        let backend = GeminiBackend::new(config("http://localhost")).unwrap();
        let request = GenerateRequest::bare()
            .with_user_message("extract")
            .with_response_format(ResponseFormat::Json)
            .with_temperature(0.2);

        let value = serde_json::to_value(backend.build_request(&request).unwrap()).unwrap();
        assert_eq!(value["generationConfig"]["responseMimeType"], "application/json");
        assert!(value.get("systemInstruction").is_none());
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 256);
    }

    #[test]
    fn test_system_only_request_rejected() {
        let backend = GeminiBackend::new(config("http://localhost")).unwrap();
        assert!(backend.build_request(&GenerateRequest::new("system")).is_err());
    }

    #[test]
    fn test_parse_response_joins_parts() {
        let body: GeminiResponse = serde_json::from_value(json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Hello "}, {"text": "there"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 10, "candidatesTokenCount": 3}
        }))
        .unwrap();

        let response = GeminiBackend::parse_response(body).unwrap();
        assert_eq!(response.text, "Hello there");
        assert_eq!(response.finish_reason, FinishReason::Stop);
        assert_eq!(response.usage.unwrap().total_tokens, 13);
    }

    #[test]
    fn test_parse_response_blocked() {
        let body: GeminiResponse =
            serde_json::from_value(json!({"promptFeedback": {"blockReason": "SAFETY"}})).unwrap();
        assert!(matches!(
            GeminiBackend::parse_response(body),
            Err(LlmError::Blocked(_))
        ));

        let empty: GeminiResponse = serde_json::from_value(json!({})).unwrap();
        assert!(matches!(
            GeminiBackend::parse_response(empty),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_generate_round_trip() {
        let router = Router::new().route(
            "/models/:call",
            post(
                |Path(call): Path<String>, headers: HeaderMap, Json(body): Json<Value>| async move {
                    assert_eq!(call, "gemini-2.0-flash:generateContent");
                    assert_eq!(
                        headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()),
                        Some("test-key")
                    );
                    let last = body["contents"]
                        .as_array()
                        .and_then(|c| c.last())
                        .map(|c| c["parts"][0]["text"].clone())
                        .unwrap_or(Value::Null);
                    Json(json!({
                        "candidates": [{
                            "content": {"role": "model", "parts": [{"text": format!("echo: {}", last.as_str().unwrap_or(""))}]},
                            "finishReason": "STOP"
                        }]
                    }))
                },
            ),
        );
        let base = spawn(router).await;
        let backend = GeminiBackend::new(config(&base)).unwrap();

        let response = backend
            .generate(GenerateRequest::new("sys").with_user_message("ping"))
            .await
            .unwrap();
        assert_eq!(response.text, "echo: ping");
    }

    #[tokio::test]
    async fn test_generate_api_error() {
        let router = Router::new().route(
            "/models/:call",
            post(|| async {
                (
                    StatusCode::BAD_REQUEST,
                    Json(json!({"error": {"message": "API key not valid"}})),
                )
            }),
        );
        let base = spawn(router).await;
        let backend = GeminiBackend::new(config(&base)).unwrap();

        let err = backend
            .generate(GenerateRequest::bare().with_user_message("ping"))
            .await
            .unwrap_err();
        match err {
            upop_core::Error::Generation(msg) => assert!(msg.contains("API key not valid")),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_network_error_hides_api_key() {
        let mut cfg = config("http://127.0.0.1:1");
        cfg.api_key = "SECRET-KEY-123".to_string();
        let backend = GeminiBackend::new(cfg).unwrap();

        let err = backend
            .generate(GenerateRequest::new("sys").with_user_message("ping"))
            .await
            .unwrap_err();
        assert!(matches!(err, upop_core::Error::Generation(_)));
        assert!(!err.to_string().contains("SECRET-KEY-123"));
    }
}
