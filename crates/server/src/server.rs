use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    extract::State,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use cookbook_core::config::ServerConfig;
use cookbook_core::{AppError, AppResult};
use cookbook_knowledge::{chat, ChatRequest, ChatResponse, RagContext};
use serde_json::json;
use tokio::sync::Mutex;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::error::ApiError;

/// Shared handler state.
///
/// The context sits behind an async mutex: each question runs search,
/// prompt and model call to completion before the next one starts.
#[derive(Clone)]
pub struct AppState {
    ctx: Arc<Mutex<RagContext>>,
    request_timeout: Option<Duration>,
}

impl AppState {
    pub fn new(ctx: RagContext) -> Self {
        Self {
            ctx: Arc::new(Mutex::new(ctx)),
            request_timeout: None,
        }
    }

    /// Answer 504 when a request takes longer than `timeout`, queueing included.
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }
}

pub fn app_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat_handler))
        .route("/api/ai/chat", post(chat_handler))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run_server(config: &ServerConfig, ctx: RagContext) -> AppResult<()> {
    let state =
        AppState::new(ctx).with_timeout(config.request_timeout_secs.map(Duration::from_secs));
    let app = app_router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .map_err(|e| {
            AppError::Config(format!(
                "Invalid server address {}:{}: {}",
                config.host, config.port, e
            ))
        })?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Server(format!("Failed to bind {}: {}", addr, e)))?;
    info!("cookbook listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| AppError::Server(format!("Server error: {}", e)))?;

    info!("cookbook server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

async fn health() -> impl IntoResponse {
    Json(json!({"status": "ok"}))
}

async fn chat_handler(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let question = request.question.unwrap_or_default();
    if question.trim().is_empty() {
        return Err(AppError::Validation(
            "Field 'question' must be a non-empty string".to_string(),
        )
        .into());
    }

    let answer = async {
        let ctx = state.ctx.lock().await;
        chat(&ctx, &question).await
    };

    let response = match state.request_timeout {
        Some(limit) => tokio::time::timeout(limit, answer)
            .await
            .map_err(|_| ApiError::Timeout(limit))??,
        None => answer.await?,
    };

    Ok(Json(response))
}
