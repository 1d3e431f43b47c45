//! HTTP Endpoints
//!
//! Stateless JSON API: the caller owns the conversation and sends it back
//! with every request.

use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Json, MatchedPath, Request, State},
    http::{
        header::{CONTENT_LENGTH, CONTENT_TYPE},
        HeaderName, HeaderValue, Method, StatusCode,
    },
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use upop_agent::extraction::normalize;
use upop_config::OPENING_GREETING;
use upop_core::{Blueprint, Conversation, Speaker};

use crate::metrics::{
    metrics_handler, record_audio_bytes, record_llm_latency, record_request,
    record_synthesis_latency,
};
use crate::state::AppState;
use crate::{Operation, ServerError};

pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Per-request correlation id, stored in request extensions
#[derive(Debug, Clone)]
pub struct RequestId(pub String);

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.read();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    let timeout = Duration::from_secs(config.server.timeout_seconds);
    drop(config);

    Router::new()
        .route("/api/chat", post(chat))
        .route("/api/blueprint", post(blueprint))
        .route("/api/audio", post(audio))
        .route("/api/opening", get(opening))
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .route("/metrics", get(metrics_handler))
        .route("/admin/reload-config", post(reload_config))
        .route_layer(middleware::from_fn(track_requests))
        .layer(TimeoutLayer::new(timeout))
        .layer(TraceLayer::new_for_http().make_span_with(|request: &Request| {
            let request_id = request
                .extensions()
                .get::<RequestId>()
                .map(|id| id.0.as_str())
                .unwrap_or("-");
            tracing::info_span!(
                "http_request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id,
            )
        }))
        .layer(cors_layer)
        .layer(middleware::from_fn(assign_request_id))
        .with_state(state)
}

/// Build CORS layer from configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)]);

    if parsed_origins.is_empty() {
        tracing::info!("No valid CORS origins configured, defaulting to localhost:3000");
        return layer.allow_origin(HeaderValue::from_static("http://localhost:3000"));
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    layer.allow_origin(parsed_origins)
}

async fn assign_request_id(mut request: Request, next: Next) -> Response {
    let id = Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestId(id.clone()));

    let mut response = next.run(request).await;
    if let Ok(value) = HeaderValue::from_str(&id) {
        response.headers_mut().insert(REQUEST_ID_HEADER, value);
    }
    response
}

async fn track_requests(request: Request, next: Next) -> Response {
    let endpoint = request
        .extensions()
        .get::<MatchedPath>()
        .map(|path| path.as_str().to_string())
        .unwrap_or_else(|| request.uri().path().to_string());

    let response = next.run(request).await;
    record_request(&endpoint, response.status().as_u16());
    response
}

/// Wire role: `assistant` is the interviewer, `user` is the artist
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WireRole {
    Assistant,
    User,
}

impl From<WireRole> for Speaker {
    fn from(role: WireRole) -> Self {
        match role {
            WireRole::Assistant => Speaker::Interviewer,
            WireRole::User => Speaker::Artist,
        }
    }
}

impl From<Speaker> for WireRole {
    fn from(speaker: Speaker) -> Self {
        match speaker {
            Speaker::Interviewer => WireRole::Assistant,
            Speaker::Artist => WireRole::User,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WireMessage {
    pub role: WireRole,
    pub content: String,
}

fn to_conversation(messages: &[WireMessage]) -> upop_core::Result<Conversation> {
    Conversation::from_turns(
        messages
            .iter()
            .map(|m| (Speaker::from(m.role), m.content.as_str())),
    )
}

fn invalid_body(rejection: JsonRejection) -> ServerError {
    ServerError::InvalidRequest(rejection.body_text())
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation: Vec<WireMessage>,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

/// POST /api/chat
async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ServerError> {
    let Json(ChatRequest {
        message,
        mut conversation,
    }) = payload.map_err(invalid_body)?;

    let message = message.trim();
    if message.is_empty() {
        return Err(ServerError::InvalidRequest("message must not be empty".to_string()));
    }

    // Callers append the pending artist message before the reply arrives
    if matches!(
        conversation.last(),
        Some(last) if last.role == WireRole::User && last.content.trim() == message
    ) {
        conversation.pop();
    }

    let mut conversation =
        to_conversation(&conversation).map_err(ServerError::pipeline(Operation::Chat))?;
    let interview = state
        .interview()
        .ok_or_else(|| ServerError::unconfigured(Operation::Chat))?;

    let started = Instant::now();
    let result = interview.advance(&mut conversation, message).await;
    record_llm_latency("chat", started.elapsed().as_secs_f64());

    let response = result.map_err(ServerError::pipeline(Operation::Chat))?;
    tracing::debug!(turns = conversation.len(), "Interview advanced");

    Ok(Json(ChatResponse { response }))
}

#[derive(Debug, Deserialize)]
pub struct BlueprintRequest {
    #[serde(default)]
    pub conversation: Vec<WireMessage>,
}

#[derive(Debug, Serialize)]
pub struct BlueprintResponse {
    pub blueprint: Blueprint,
}

/// POST /api/blueprint
async fn blueprint(
    State(state): State<AppState>,
    payload: Result<Json<BlueprintRequest>, JsonRejection>,
) -> Result<Json<BlueprintResponse>, ServerError> {
    let Json(request) = payload.map_err(invalid_body)?;

    if request.conversation.len() < 2 {
        return Err(ServerError::InvalidRequest(
            "conversation must contain at least 2 turns".to_string(),
        ));
    }

    let conversation =
        to_conversation(&request.conversation).map_err(ServerError::pipeline(Operation::Blueprint))?;
    let extractor = state
        .extractor()
        .ok_or_else(|| ServerError::unconfigured(Operation::Blueprint))?;

    let started = Instant::now();
    let result = extractor.extract(&conversation).await;
    record_llm_latency("blueprint", started.elapsed().as_secs_f64());

    let blueprint = result.map_err(ServerError::pipeline(Operation::Blueprint))?;
    tracing::info!(core_emotion = %blueprint.core_emotion, "Blueprint extracted");

    Ok(Json(BlueprintResponse { blueprint }))
}

#[derive(Debug, Deserialize)]
pub struct AudioRequest {
    #[serde(default)]
    pub prompt: Option<String>,
    #[serde(default)]
    pub blueprint: Option<Value>,
}

enum AudioSource {
    Prompt(String),
    Blueprint(Blueprint),
}

/// POST /api/audio
async fn audio(
    State(state): State<AppState>,
    payload: Result<Json<AudioRequest>, JsonRejection>,
) -> Result<Response, ServerError> {
    let Json(request) = payload.map_err(invalid_body)?;

    let prompt = request.prompt.filter(|p| !p.trim().is_empty());
    let source = match (prompt, request.blueprint) {
        (Some(prompt), _) => AudioSource::Prompt(prompt),
        (None, Some(Value::Object(fields))) => AudioSource::Blueprint(normalize(&fields)),
        (None, Some(_)) => {
            return Err(ServerError::InvalidRequest("blueprint must be a JSON object".to_string()))
        },
        (None, None) => {
            return Err(ServerError::InvalidRequest(
                "either prompt or blueprint is required".to_string(),
            ))
        },
    };

    let synthesis = state
        .synthesis()
        .ok_or_else(|| ServerError::unconfigured(Operation::Audio))?;

    let started = Instant::now();
    let result = match &source {
        AudioSource::Prompt(prompt) => synthesis.render(prompt).await,
        AudioSource::Blueprint(blueprint) => synthesis.synthesize(blueprint).await,
    };
    record_synthesis_latency(started.elapsed().as_secs_f64());

    let artifact = result.map_err(ServerError::pipeline(Operation::Audio))?;
    let length = artifact.len();
    let media_type = artifact.media_type();
    record_audio_bytes(length);
    tracing::info!(bytes = length, "Audio rendered");

    Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, media_type)
        .header(CONTENT_LENGTH, HeaderValue::from(length))
        .body(Body::from(artifact.into_bytes()))
        .map_err(|e| ServerError::Internal(e.to_string()))
}

/// GET /api/opening
async fn opening() -> Json<WireMessage> {
    Json(WireMessage {
        role: WireRole::Assistant,
        content: OPENING_GREETING.to_string(),
    })
}

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let llm_model = state.llm_model();
    let sound_model = state.sound_model();

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "status": "healthy",
            "version": env!("CARGO_PKG_VERSION"),
            "checks": {
                "llm": {
                    "configured": llm_model.is_some(),
                    "model": llm_model,
                },
                "synthesis": {
                    "configured": sound_model.is_some(),
                    "model": sound_model,
                },
            }
        })),
    )
}

/// Readiness check: both upstreams must have credentials
async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    let llm_ready = state.interview().is_some() && state.extractor().is_some();
    let synthesis_ready = state.synthesis().is_some();
    let ready = llm_ready && synthesis_ready;

    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status,
        Json(serde_json::json!({
            "status": if ready { "ready" } else { "not_ready" },
            "checks": {
                "llm": if llm_ready { "ok" } else { Operation::Chat.unconfigured_message() },
                "synthesis": if synthesis_ready { "ok" } else { Operation::Audio.unconfigured_message() },
            }
        })),
    )
}

/// Reload configuration from files
async fn reload_config(State(state): State<AppState>) -> impl IntoResponse {
    match state.reload_config() {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "message": "Configuration reloaded successfully"
            })),
        ),
        Err(e) => {
            tracing::error!(error = %e, "Configuration reload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "error",
                    "message": e
                })),
            )
        },
    }
}
