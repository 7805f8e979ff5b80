//! HTTP gateway for Loupe.
//!
//! Exposes the agent over JSON endpoints and streams inspection, context and
//! token-usage updates to observers as server-sent events.
//!
//! Built on Axum.

use axum::{
    Router,
    extract::State,
    http::{HeaderValue, Method, StatusCode, header},
    response::Json,
    response::sse::{Event as SseEvent, Sse},
    routing::{get, post},
};
use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use loupe_agent::{AgentLoop, SessionSnapshot};
use loupe_config::AppConfig;
use loupe_core::message::Message;
use loupe_core::usage::TokenUsage;
use loupe_inspection::{InspectionHub, Observer, Topic};
use loupe_providers::OpenAiCompatProvider;

/// First frame written to a new inspection observer.
pub const INSPECTION_GREETING: &str = "Connected to Agent Inspection Channel!";

/// Shared application state for the gateway.
pub struct AppState {
    pub config: AppConfig,
    pub agent: Arc<AgentLoop>,
}

type SharedState = Arc<AppState>;

/// Build the Axum router with all gateway routes.
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(&state.config.gateway.cors_origin);

    Router::new()
        .route("/health", get(health_handler))
        .route("/api/agent", post(agent_handler))
        .route("/api/agent/events/inspection", get(inspection_events))
        .route("/api/agent/events/context", get(context_events))
        .route("/api/agent/events/usage", get(usage_events))
        .route("/api/agent/context", get(context_handler))
        .route("/api/agent/context/clear", post(clear_handler))
        .route("/api/agent/usage", get(usage_handler))
        .route("/api/agent/tools", get(tools_handler))
        .route("/api/agent/snapshot", get(snapshot_handler))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(state)
}

/// CORS restricted to the configured frontend origin.
fn cors_layer(origin: &str) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE]);

    match HeaderValue::from_str(origin) {
        Ok(value) => base.allow_origin(AllowOrigin::list([value])),
        Err(e) => {
            warn!(origin, error = %e, "Invalid CORS origin, cross-origin requests disabled");
            base
        }
    }
}

/// Start the gateway HTTP server.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let addr = format!("{}:{}", config.gateway.host, config.gateway.port);

    if !config.has_api_key() {
        warn!("No API key configured; model calls will be rejected upstream");
    }

    let provider = Arc::new(OpenAiCompatProvider::from_config(&config)?);
    let tools = Arc::new(loupe_tools::default_registry());
    let hub = Arc::new(InspectionHub::new(config.inspection.queue_capacity));
    let agent = Arc::new(AgentLoop::from_config(&config, provider, tools, hub));

    let app = build_router(Arc::new(AppState { config, agent }));

    info!(addr = %addr, "Agent backend starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

#[derive(Deserialize)]
struct AgentRequest {
    prompt: String,
}

#[derive(Serialize)]
struct AgentResponse {
    text: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

/// `POST /api/agent`. The run lives in its own task, so a client that goes
/// away only loses the response; the run still completes.
async fn agent_handler(
    State(state): State<SharedState>,
    Json(payload): Json<AgentRequest>,
) -> Result<Json<AgentResponse>, (StatusCode, Json<ErrorResponse>)> {
    info!(prompt_len = payload.prompt.len(), "Agent request");

    let agent = state.agent.clone();
    let run = tokio::spawn(async move { agent.run(&payload.prompt).await });

    let error = match run.await {
        Ok(Ok(text)) => return Ok(Json(AgentResponse { text })),
        Ok(Err(e)) => e.to_string(),
        Err(e) => format!("Agent task failed: {e}"),
    };
    error!(error = %error, "Agent run failed");
    Err((StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error })))
}

async fn context_handler(State(state): State<SharedState>) -> Json<Vec<Message>> {
    Json(state.agent.session().context().snapshot())
}

async fn clear_handler(State(state): State<SharedState>) -> Json<TokenUsage> {
    Json(state.agent.clear().await)
}

async fn usage_handler(State(state): State<SharedState>) -> Json<TokenUsage> {
    Json(state.agent.session().usage().current())
}

async fn tools_handler(State(state): State<SharedState>) -> Json<Vec<serde_json::Value>> {
    Json(state.agent.session().tool_schemas())
}

async fn snapshot_handler(State(state): State<SharedState>) -> Json<SessionSnapshot> {
    Json(state.agent.session().snapshot())
}

// --- Observer streams ---

async fn inspection_events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let observer = state.agent.session().hub().attach(Topic::Inspection);
    info!(id = observer.id(), "Inspection observer connected");
    event_stream(Some(INSPECTION_GREETING.to_string()), observer)
}

async fn context_events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let observer = state.agent.session().hub().attach(Topic::Context);
    info!(id = observer.id(), "Context observer connected");
    let initial = serde_json::to_string(&state.agent.session().context().snapshot()).ok();
    event_stream(initial, observer)
}

async fn usage_events(
    State(state): State<SharedState>,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    let observer = state.agent.session().hub().attach(Topic::Usage);
    info!(id = observer.id(), "Usage observer connected");
    let initial = serde_json::to_string(&state.agent.session().usage().current()).ok();
    event_stream(initial, observer)
}

/// Stream observer frames to the client as SSE events, starting with `first`.
///
/// The observer lives inside the body stream, so a client disconnect drops
/// it and frees the topic.
fn event_stream(
    first: Option<String>,
    observer: Observer,
) -> Sse<impl Stream<Item = Result<SseEvent, Infallible>>> {
    Sse::new(payloads(first, observer).map(|payload| Ok::<_, Infallible>(sse_event(&payload))))
}

fn payloads(first: Option<String>, observer: Observer) -> impl Stream<Item = String> {
    let frames = futures::stream::unfold(observer, |mut observer| async move {
        observer.recv().await.map(|frame| (frame, observer))
    });
    futures::stream::iter(first).chain(frames)
}

/// One `data:` field per line; a bare `\r` also ends a line.
fn sse_event(payload: &str) -> SseEvent {
    if payload.contains('\r') {
        SseEvent::default().data(payload.replace("\r\n", "\n").replace('\r', "\n"))
    } else {
        SseEvent::default().data(payload)
    }
}
