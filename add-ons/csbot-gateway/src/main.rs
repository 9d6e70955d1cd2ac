//! Axum-based chat gateway: HTTP entry point for the cascade resolver.
//!
//! One stateless endpoint: `POST /chat` takes `{"message": "..."}` and
//! returns `{"response": "..."}` with the first answer the cascade accepts.
//! All dependencies (knowledge map, corpus, web searcher, generative bridge)
//! are constructed once at startup and injected read-only; the gateway holds
//! the API key, clients never see it.

use axum::extract::{Json, State};
use axum::http::{Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use csbot_core::{
    default_endpoints, Answer, BotConfig, ClockMode, CohereBridge, Corpus, GenerativeSource,
    Resolver, StaticKnowledge, UnconfiguredGenerative, WebSearcher, WebSource,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::CorsLayer;

#[derive(Clone)]
struct AppState {
    config: Arc<BotConfig>,
    resolver: Arc<Resolver>,
}

#[tokio::main]
async fn main() {
    // Load .env first: COHERE_API_KEY and CSBOT_* toggles live there.
    if let Err(e) = dotenvy::dotenv() {
        eprintln!("[csbot-gateway] .env not loaded: {} (using system environment)", e);
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = BotConfig::from_env();

    // Initialization order matters: corpus first (fatal on error), then the
    // remaining read-only dependencies, then the resolver. Nothing is
    // reinitialized during the process lifetime.
    let corpus = match Corpus::load(&config.corpus_path) {
        Ok(corpus) => {
            tracing::info!(records = corpus.len(), path = %config.corpus_path, "Corpus loaded");
            Arc::new(corpus)
        }
        Err(e) => {
            tracing::error!(error = %e, path = %config.corpus_path, "Failed to load corpus");
            std::process::exit(1);
        }
    };

    let clock = if config.live_clock {
        ClockMode::PerRequest
    } else {
        ClockMode::FrozenAtStartup
    };
    let knowledge = Arc::new(StaticKnowledge::new(clock));

    let call_timeout = Duration::from_secs(config.http_timeout_secs);
    let web: Arc<dyn WebSource> = Arc::new(WebSearcher::new(default_endpoints(), call_timeout));
    let generative: Arc<dyn GenerativeSource> = match CohereBridge::from_env(call_timeout) {
        Some(bridge) => Arc::new(bridge),
        None => {
            tracing::warn!("COHERE_API_KEY not set - generative stage will degrade when reached");
            Arc::new(UnconfiguredGenerative)
        }
    };

    let resolver = Arc::new(Resolver::new(
        knowledge,
        corpus,
        config.fuzzy_threshold,
        web,
        generative,
    ));
    let addr = format!("0.0.0.0:{}", config.port);
    let app = build_app(AppState {
        config: Arc::new(config),
        resolver,
    });

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, %addr, "Failed to bind");
            std::process::exit(1);
        }
    };
    tracing::info!(%addr, "csbot gateway listening");
    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!(error = %e, "Server error");
    }
}

fn build_app(state: AppState) -> Router {
    // CORS: the chat UI is served from arbitrary origins; the endpoint is
    // open by design (no auth in scope).
    let cors = CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(tower_http::cors::Any);

    Router::new()
        .route("/chat", post(chat))
        .route("/api/v1/health", get(health))
        .layer(cors)
        .with_state(state)
}

/// GET /api/v1/health - liveness probe.
async fn health() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /chat - resolve one query through the cascade.
///
/// A missing or empty `message` field is a client error, reported as
/// structured JSON. Everything else gets a 200 with some answer text; the
/// overall deadline converts a stuck cascade into the degraded answer rather
/// than an unbounded request.
async fn chat(State(state): State<AppState>, Json(body): Json<serde_json::Value>) -> Response {
    let message = body
        .get("message")
        .and_then(|v| v.as_str())
        .map(str::trim)
        .filter(|s| !s.is_empty());
    let Some(message) = message else {
        return (
            StatusCode::BAD_REQUEST,
            axum::Json(serde_json::json!({
                "status": "error",
                "error": "Request body must include a non-empty 'message' string field",
            })),
        )
            .into_response();
    };

    tracing::info!(target: "csbot::chat", chars = message.len(), "Chat request received");
    let deadline = Duration::from_secs(state.config.request_deadline_secs);
    let answer = match tokio::time::timeout(deadline, state.resolver.resolve(message)).await {
        Ok(answer) => answer,
        Err(_) => {
            tracing::warn!(target: "csbot::chat", "Request deadline exceeded - degrading");
            Answer::degraded()
        }
    };

    axum::Json(serde_json::json!({
        "status": "ok",
        "response": answer.text,
        "source": answer.source,
    }))
    .into_response()
}
