//! HTTP route definitions
//!
//! Request flow: recovery → request-id → logging → CORS → auth (for
//! authenticated routes) → handler. Business routes are POST with a
//! 100 KiB JSON body limit; blob routes stream raw bodies up to the
//! configured upload limit.

use crate::handlers;
use crate::middleware;
use crate::state::AppState;
use axum::body::Body;
use axum::extract::DefaultBodyLimit;
use axum::http::{header, HeaderName, Method, Response, StatusCode};
use axum::middleware as axum_middleware;
use axum::routing::{get, post};
use axum::Router;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};

/// JSON request bodies are small control messages.
const JSON_BODY_LIMIT: usize = 100 * 1024;

/// Create the main router
pub fn create_router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([
            header::ORIGIN,
            HeaderName::from_static("x-requested-with"),
            header::CONTENT_TYPE,
            header::ACCEPT,
            header::AUTHORIZATION,
            HeaderName::from_static("nk-crypto-meta"),
        ])
        .expose_headers([HeaderName::from_static("nk-crypto-meta")]);

    let json_routes = Router::new()
        // User endpoints
        .route("/user/assert", post(handlers::user::assert))
        .route("/user/logout", post(handlers::user::logout))
        .route(
            "/user/logout-all-sessions",
            post(handlers::user::logout_all_sessions),
        )
        .route(
            "/user/list-all-sessions",
            post(handlers::user::list_all_sessions),
        )
        .route("/user/list", post(handlers::user::list))
        .route("/user/find", post(handlers::user::find))
        .route("/user/update-profile", post(handlers::user::update_profile))
        .route("/user/update-password", post(handlers::user::update_password))
        // Admin endpoints
        .route("/admin/iam/add-user", post(handlers::admin::add_user))
        .route(
            "/admin/iam/set-global-permissions",
            post(handlers::admin::set_global_permissions),
        )
        .route(
            "/admin/iam/set-banning-status",
            post(handlers::admin::set_banning_status),
        )
        .route(
            "/admin/iam/overwrite-user-password",
            post(handlers::admin::overwrite_user_password),
        )
        // Bucket endpoints
        .route("/bucket/create", post(handlers::bucket::create))
        .route("/bucket/list", post(handlers::bucket::list))
        .route("/bucket/rename", post(handlers::bucket::rename))
        .route("/bucket/set-metadata", post(handlers::bucket::set_metadata))
        .route(
            "/bucket/set-authorization",
            post(handlers::bucket::set_authorization),
        )
        .route("/bucket/destroy", post(handlers::bucket::destroy))
        // Directory endpoints
        .route("/directory/create", post(handlers::directory::create))
        .route("/directory/get", post(handlers::directory::get))
        .route("/directory/rename", post(handlers::directory::rename))
        .route("/directory/move", post(handlers::directory::move_))
        .route("/directory/delete", post(handlers::directory::delete))
        .route(
            "/directory/set-metadata",
            post(handlers::directory::set_metadata),
        )
        .route(
            "/directory/set-encrypted-metadata",
            post(handlers::directory::set_encrypted_metadata),
        )
        // File endpoints
        .route("/file/create", post(handlers::file::create))
        .route("/file/get", post(handlers::file::get))
        .route("/file/rename", post(handlers::file::rename))
        .route("/file/move", post(handlers::file::move_))
        .route("/file/delete", post(handlers::file::delete))
        .route("/file/set-metadata", post(handlers::file::set_metadata))
        .route(
            "/file/set-encrypted-metadata",
            post(handlers::file::set_encrypted_metadata),
        )
        // Metrics endpoint
        .route("/metrics/get-summary", post(handlers::metrics::get_summary))
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT));

    let blob_routes = Router::new()
        .route(
            "/blob/read/{bucket_id}/{file_id}",
            post(handlers::blob::read),
        )
        .route(
            "/blob/write/{bucket_id}/{file_id}",
            post(handlers::blob::write),
        )
        .route(
            "/blob/write-quantized/{bucket_id}/{file_id}/{blob_id}/{offset}/{should_end}",
            post(handlers::blob::write_quantized),
        )
        .layer(DefaultBodyLimit::max(
            state.settings.blob_storage.max_file_size_bytes as usize,
        ));

    let authenticated = Router::new()
        .merge(json_routes)
        .merge(blob_routes)
        .route_layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::auth_middleware,
        ));

    let public = Router::new()
        .route("/user/login", post(handlers::user::login))
        .layer(DefaultBodyLimit::max(JSON_BODY_LIMIT));

    Router::new()
        // Health probes and Prometheus metrics
        .route("/healthz", get(handlers::health::healthz))
        .route("/readyz", get(handlers::health::readyz))
        .route("/metrics", get(handlers::health::metrics))
        // API routes
        .nest("/api", Router::new().merge(public).merge(authenticated))
        .fallback(not_found)
        // Outermost last: recovery wraps everything
        .layer(cors)
        .layer(axum_middleware::from_fn_with_state(
            Arc::clone(&state),
            middleware::logging_middleware,
        ))
        .layer(axum_middleware::from_fn(middleware::request_id_middleware))
        .layer(CatchPanicLayer::custom(recover_panic))
        .with_state(state)
}

async fn not_found() -> (StatusCode, &'static str) {
    (StatusCode::NOT_FOUND, "Not Found")
}

/// Turn a panic anywhere in the handler chain into the generic error
/// envelope instead of a dropped connection.
fn recover_panic(err: Box<dyn std::any::Any + Send + 'static>) -> Response<Body> {
    let detail = if let Some(message) = err.downcast_ref::<String>() {
        message.clone()
    } else if let Some(message) = err.downcast_ref::<&str>() {
        (*message).to_owned()
    } else {
        "unknown panic".to_owned()
    };
    tracing::error!(panic = %detail, "panic recovered");

    let body = serde_json::json!({
        "hasError": true,
        "error": {
            "code": "GENERIC_SERVER_ERROR",
            "message": "We have encountered an unexpected server error.",
            "details": {},
        },
    });
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}
