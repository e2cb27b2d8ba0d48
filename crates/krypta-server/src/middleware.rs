//! HTTP middleware: request ids, logging, authentication

use crate::error::ApiError;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::State;
use axum::http::Request;
use axum::middleware::Next;
use axum::response::Response;
use std::sync::Arc;

/// Per-request correlation id, attached to request extensions and carried
/// into every log line about the request.
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

pub async fn request_id_middleware(mut request: Request<Body>, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();
    request.extensions_mut().insert(RequestId(request_id));
    next.run(request).await
}

/// Log request start/finish and feed the Prometheus counters.
pub async fn logging_middleware(
    State(state): State<Arc<AppState>>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_owned();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_default();
    let start = std::time::Instant::now();

    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        "request started"
    );

    let response = next.run(request).await;

    let elapsed = start.elapsed();
    let status = response.status().as_u16();
    tracing::info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        status,
        duration_ms = elapsed.as_millis() as u64,
        "request completed"
    );
    state
        .http_metrics
        .observe(method.as_str(), &path, status, elapsed.as_secs_f64());

    response
}

/// Authenticate the request and attach the caller's identity.
///
/// Failures short-circuit with the auth error taxonomy: 412 for a missing
/// or malformed header, 401 for a dead key, 403 never originates here.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let auth_data = state.auth.authenticate(header).await?;
    request.extensions_mut().insert(auth_data);

    Ok(next.run(request).await)
}
