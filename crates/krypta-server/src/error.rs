//! API error responses
//!
//! Wraps the core error taxonomy and renders it as the JSON envelope
//! `{hasError: true, error: {code, message, details}}` with the status
//! code the taxonomy dictates. Client errors (user/validation) are the
//! caller's problem and are not logged at error level.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use krypta_core::error::Error;
use serde_json::json;

/// Error type returned by every handler.
#[derive(Debug)]
pub struct ApiError(pub Error);

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        Self(err)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        Self(Error::Database(err))
    }
}

impl From<krypta_store::StoreError> for ApiError {
    fn from(err: krypta_store::StoreError) -> Self {
        Self(Error::Store(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        if !self.0.is_client_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        let serialized = self.0.serialize();
        let body = json!({
            "hasError": true,
            "error": serialized,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_maps_status_and_envelope() {
        let response =
            ApiError(Error::user("API_KEY_EXPIRED", "Your session has expired. Login again."))
                .into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_precondition_failed_for_auth_header_errors() {
        let response =
            ApiError(Error::user("AUTHORIZATION_HEADER_MISSING", "missing")).into_response();
        assert_eq!(response.status(), StatusCode::PRECONDITION_FAILED);
    }

    #[test]
    fn test_infrastructure_error_is_500() {
        let response = ApiError(Error::Database(sqlx::Error::PoolClosed)).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
