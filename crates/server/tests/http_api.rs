//! HTTP API tests
//!
//! Drive the router in-process with `oneshot` against mock backends.

use std::sync::Arc;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, HeaderMap, Method, Request, StatusCode};
use axum::Router;
use bytes::Bytes;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tower::ServiceExt;

use upop_agent::compile_prompt;
use upop_config::{Settings, OPENING_GREETING};
use upop_core::{
    AudioChunkStream, Blueprint, Error, GenerateRequest, GenerateResponse, LanguageModel,
    ResponseFormat, Result, Role, SoundGenerator, SoundRequest,
};
use upop_server::{create_router, AppState};

const BLUEPRINT_REPLY: &str = r#"```json
{
  "core_emotion": "bittersweet relief",
  "singing_to": "",
  "narrative_summary": "Driving home at 2am after a date that ended a chapter.",
  "sonic_vibe": "2am synth-driven",
  "instrumentation_ideas": ["dreamy synth pads", "808s"],
  "artist_purpose": "to process a breakup"
}
```"#;

struct MockLlm {
    chat_reply: Option<String>,
    json_reply: String,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockLlm {
    fn replying(chat_reply: &str) -> Arc<Self> {
        Arc::new(Self {
            chat_reply: Some(chat_reply.to_string()),
            json_reply: BLUEPRINT_REPLY.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }

    fn failing() -> Arc<Self> {
        Arc::new(Self {
            chat_reply: None,
            json_reply: r#"{"core_emotion": "", "leaked": "internal model output"}"#.to_string(),
            requests: Mutex::new(Vec::new()),
        })
    }
}

#[async_trait]
impl LanguageModel for MockLlm {
    async fn generate(&self, request: GenerateRequest) -> Result<GenerateResponse> {
        let json = request.response_format == ResponseFormat::Json;
        self.requests.lock().push(request);

        if json {
            return Ok(GenerateResponse::text(self.json_reply.clone()));
        }
        self.chat_reply
            .clone()
            .map(|text| GenerateResponse::text(text))
            .ok_or_else(|| Error::Generation("HTTP 503: upstream overloaded".to_string()))
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn model_name(&self) -> &str {
        "mock-gemini"
    }
}

/// Returns the prompt bytes as the "audio", split in two chunks
struct EchoSound;

#[async_trait]
impl SoundGenerator for EchoSound {
    async fn generate(&self, request: SoundRequest) -> Result<AudioChunkStream> {
        let bytes = request.text.into_bytes();
        let mid = bytes.len() / 2;
        let chunks: Vec<Result<Bytes>> = vec![
            Ok(Bytes::copy_from_slice(&bytes[..mid])),
            Ok(Bytes::copy_from_slice(&bytes[mid..])),
        ];
        Ok(Box::pin(futures::stream::iter(chunks)))
    }

    async fn is_available(&self) -> bool {
        true
    }

    fn model_name(&self) -> &str {
        "echo-sound"
    }
}

fn configured_app(llm: Arc<MockLlm>) -> Router {
    let state = AppState::new(Settings::default())
        .with_language_model(llm)
        .with_sound_generator(Arc::new(EchoSound));
    create_router(state)
}

fn unconfigured_app() -> Router {
    create_router(AppState::new(Settings::default()))
}

async fn send(app: Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, HeaderMap, Bytes) {
    let body = body.map(|v| Body::from(v.to_string())).unwrap_or_else(Body::empty);
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(body)
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, bytes)
}

fn json_body(bytes: &Bytes) -> Value {
    serde_json::from_slice(bytes).unwrap()
}

fn four_turns() -> Value {
    json!([
        {"role": "assistant", "content": OPENING_GREETING},
        {"role": "user", "content": "Driving home after a bad date. Bittersweet relief, honestly."},
        {"role": "assistant", "content": "What does that drive sound like?"},
        {"role": "user", "content": "2am synth-driven. I need this to process a breakup."}
    ])
}

#[tokio::test]
async fn test_chat_returns_reply_and_drops_placeholder() {
    let llm = MockLlm::replying("What song was playing in the car?");
    let app = configured_app(llm.clone());

    let message = "I want to write about driving home after a bad date";
    let (status, headers, body) = send(
        app,
        Method::POST,
        "/api/chat",
        Some(json!({
            "message": message,
            "conversation": [
                {"role": "assistant", "content": OPENING_GREETING},
                {"role": "user", "content": message}
            ]
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(json_body(&body)["response"], "What song was playing in the car?");

    let requests = llm.requests.lock();
    let roles: Vec<Role> = requests[0].messages.iter().map(|m| m.role).collect();
    assert_eq!(roles, vec![Role::System, Role::Assistant, Role::User]);
}

#[tokio::test]
async fn test_chat_rejects_blank_message() {
    let app = configured_app(MockLlm::replying("unused"));
    let (status, _, body) = send(
        app,
        Method::POST,
        "/api/chat",
        Some(json!({"message": "   ", "conversation": [{"role": "assistant", "content": "Hi"}]})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(json_body(&body)["error"].is_string());
}

#[tokio::test]
async fn test_chat_rejects_malformed_body() {
    let app = configured_app(MockLlm::replying("unused"));
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/chat")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_chat_failure_is_opaque() {
    let app = configured_app(MockLlm::failing());
    let (status, headers, body) = send(
        app,
        Method::POST,
        "/api/chat",
        Some(json!({"message": "hello", "conversation": [{"role": "assistant", "content": "Hi"}]})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(headers.contains_key("x-request-id"));
    assert_eq!(json_body(&body), json!({"error": "Failed to get response from AI"}));
}

#[tokio::test]
async fn test_chat_without_credentials() {
    let (status, _, body) = send(
        unconfigured_app(),
        Method::POST,
        "/api/chat",
        Some(json!({"message": "hello", "conversation": [{"role": "assistant", "content": "Hi"}]})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body)["error"], "Google API key not configured");
}

#[tokio::test]
async fn test_blueprint_requires_two_turns() {
    let app = configured_app(MockLlm::replying("unused"));
    let (status, _, _) = send(
        app,
        Method::POST,
        "/api/blueprint",
        Some(json!({"conversation": [{"role": "assistant", "content": OPENING_GREETING}]})),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_blueprint_extracted() {
    let app = configured_app(MockLlm::replying("unused"));
    let (status, _, body) = send(
        app,
        Method::POST,
        "/api/blueprint",
        Some(json!({"conversation": four_turns()})),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let blueprint: Blueprint = serde_json::from_value(json_body(&body)["blueprint"].clone()).unwrap();
    assert_eq!(blueprint.core_emotion, "bittersweet relief");
    assert_eq!(blueprint.sonic_vibe, "2am synth-driven");
    assert_eq!(blueprint.artist_purpose, "to process a breakup");
    assert_eq!(blueprint.singing_to, "");
    assert!(blueprint.vocal_style.is_empty());
}

#[tokio::test]
async fn test_blueprint_violation_hides_model_output() {
    let app = configured_app(MockLlm::failing());
    let (status, _, body) = send(
        app,
        Method::POST,
        "/api/blueprint",
        Some(json!({"conversation": four_turns()})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(!text.contains("internal model output"));
    assert_eq!(json_body(&body)["error"], "Failed to generate blueprint");
}

#[tokio::test]
async fn test_audio_from_prompt() {
    let app = configured_app(MockLlm::replying("unused"));
    let prompt = "Create an instrumental track. The mood is bittersweet relief.";
    let (status, headers, body) =
        send(app, Method::POST, "/api/audio", Some(json!({"prompt": prompt}))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_TYPE], "audio/mpeg");
    assert_eq!(headers[header::CONTENT_LENGTH], body.len().to_string().as_str());
    assert_eq!(&body[..], prompt.as_bytes());
}

#[tokio::test]
async fn test_audio_from_blueprint() {
    let app = configured_app(MockLlm::replying("unused"));
    let blueprint = json!({
        "core_emotion": "bittersweet relief",
        "sonic_vibe": "2am synth-driven",
        "instrumentation_ideas": "synth pads, 808s"
    });
    let (status, headers, body) =
        send(app, Method::POST, "/api/audio", Some(json!({"blueprint": blueprint}))).await;

    let expected = compile_prompt(&Blueprint {
        core_emotion: "bittersweet relief".to_string(),
        sonic_vibe: "2am synth-driven".to_string(),
        instrumentation_ideas: vec!["synth pads".to_string(), "808s".to_string()],
        ..Default::default()
    });

    assert_eq!(status, StatusCode::OK);
    assert_eq!(headers[header::CONTENT_LENGTH], expected.len().to_string().as_str());
    assert_eq!(&body[..], expected.as_bytes());
}

#[tokio::test]
async fn test_audio_blank_prompt_falls_back_to_blueprint() {
    let app = configured_app(MockLlm::replying("unused"));
    let blueprint = json!({"core_emotion": "bittersweet relief"});
    let (status, _, body) = send(
        app,
        Method::POST,
        "/api/audio",
        Some(json!({"prompt": "  ", "blueprint": blueprint})),
    )
    .await;

    let expected = compile_prompt(&Blueprint {
        core_emotion: "bittersweet relief".to_string(),
        ..Default::default()
    });
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&body[..], expected.as_bytes());
}

#[tokio::test]
async fn test_audio_requires_prompt_or_blueprint() {
    let app = configured_app(MockLlm::replying("unused"));
    let (status, _, _) = send(app.clone(), Method::POST, "/api/audio", Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(app, Method::POST, "/api/audio", Some(json!({"prompt": ""}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_audio_without_credentials() {
    let (status, _, body) = send(
        unconfigured_app(),
        Method::POST,
        "/api/audio",
        Some(json!({"prompt": "Create an instrumental track."})),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json_body(&body)["error"], "ElevenLabs API key not configured");
}

#[tokio::test]
async fn test_opening_greeting() {
    let (status, _, body) = send(unconfigured_app(), Method::GET, "/api/opening", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        json_body(&body),
        json!({"role": "assistant", "content": OPENING_GREETING})
    );
}

#[tokio::test]
async fn test_health_and_readiness() {
    let (status, _, body) = send(unconfigured_app(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json_body(&body)["checks"]["llm"]["configured"], false);

    let (status, _, body) = send(unconfigured_app(), Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json_body(&body)["checks"]["synthesis"], "ElevenLabs API key not configured");

    let app = configured_app(MockLlm::replying("unused"));
    let (status, _, _) = send(app, Method::GET, "/ready", None).await;
    assert_eq!(status, StatusCode::OK);
}
