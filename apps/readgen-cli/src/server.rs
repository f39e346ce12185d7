//! HTTP boundary hosting the generation engine.
//!
//! Exposes `POST /api/generate` and `GET /health`. Every failure leaves the
//! server as `{"error": "<message>"}` with a status chosen by error kind.

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use readgen_core::api::{ErrorResponse, GENERATE_PATH, GenerateRequest, GenerateResponse};
use readgen_core::{CoreError, Engine, ErrorKind};
use serde_json::{Value, json};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

const HEALTH_PATH: &str = "/health";

#[derive(Clone)]
struct AppState {
    engine: Arc<Engine>,
}

/// Build the router with all routes and middleware.
pub fn router(engine: Arc<Engine>) -> Router {
    Router::new()
        .route(GENERATE_PATH, post(generate).fallback(method_not_allowed))
        .route(HEALTH_PATH, get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(AppState { engine })
}

/// Serve the router on `bind` until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the address cannot be bound or the server fails.
pub async fn serve(engine: Arc<Engine>, bind: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;
    let addr = listener.local_addr().context("failed to read local address")?;
    info!(%addr, model = engine.model(), "listening");

    axum::serve(listener, router(engine))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "failed to listen for shutdown signal");
    }
}

async fn generate(
    State(state): State<AppState>,
    payload: Result<Json<GenerateRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    let repo_url = payload
        .ok()
        .and_then(|Json(body)| body.repo_url)
        .filter(|url| !url.trim().is_empty())
        .ok_or_else(|| ApiError::new(StatusCode::BAD_REQUEST, "repoUrl is required"))?;

    let result = state.engine.generate(&repo_url).await?;
    Ok(Json(GenerateResponse {
        readme: result.markdown,
    }))
}

async fn method_not_allowed() -> ApiError {
    ApiError::new(StatusCode::METHOD_NOT_ALLOWED, "Method not allowed")
}

async fn health() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Failure response: a status plus the message sent to the caller.
#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

fn status_for(err: &CoreError) -> StatusCode {
    match err.kind() {
        ErrorKind::InvalidUrl => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::RateLimit => StatusCode::TOO_MANY_REQUESTS,
        ErrorKind::HostingApi | ErrorKind::EmptyGeneration => StatusCode::BAD_GATEWAY,
        ErrorKind::Orchestration => match err {
            CoreError::Generation(_) => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        },
    }
}

impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let status = status_for(&err);
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %err, "generation failed");
        } else {
            warn!(status = status.as_u16(), error = %err, "generation rejected");
        }
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ErrorResponse::new(self.message))).into_response()
    }
}
