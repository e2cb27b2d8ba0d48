//! Health probes and the Prometheus exposition endpoint

use crate::state::AppState;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::sync::Arc;

/// GET /healthz — liveness: the process is up.
pub async fn healthz() -> &'static str {
    "ok"
}

/// GET /readyz — readiness: critical dependencies are reachable.
pub async fn readyz(State(state): State<Arc<AppState>>) -> Response {
    if let Err(err) = sqlx::query("SELECT 1").execute(&state.db).await {
        tracing::warn!(error = %err, "readiness check: database unavailable");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "not ready", "error": "database unavailable"})),
        )
            .into_response();
    }

    let mut redis = state.redis.clone();
    let ping: redis::RedisResult<()> = redis::cmd("PING").query_async(&mut redis).await;
    if let Err(err) = ping {
        tracing::warn!(error = %err, "readiness check: cache unavailable");
        return (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({"status": "not ready", "error": "redis unavailable"})),
        )
            .into_response();
    }

    (StatusCode::OK, "ok").into_response()
}

/// GET /metrics — Prometheus text exposition format.
pub async fn metrics(State(state): State<Arc<AppState>>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.http_metrics.render(),
    )
        .into_response()
}
