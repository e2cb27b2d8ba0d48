//! Error taxonomy
//!
//! Three deliberate kinds plus infrastructure wrappers:
//! - [`Error::User`] — expected client mistakes, carried with a machine code
//! - [`Error::Validation`] — malformed request bodies, with field details
//! - [`Error::Developer`] — server-side bugs surfaced with a code
//!
//! Infrastructure failures (database, cache, object store) map to 500 and
//! are serialized as `GENERIC_SERVER_ERROR` so internal messages never
//! reach clients.

use serde::Serialize;
use thiserror::Error;

/// Result type alias using `Error`
pub type Result<T> = std::result::Result<T, Error>;

/// Errors produced by the domain layer.
#[derive(Error, Debug)]
pub enum Error {
    /// Expected client error (4xx) with a machine-readable code
    #[error("{message}")]
    User { code: String, message: String },

    /// Request body failed validation
    #[error("{message}")]
    Validation {
        message: String,
        details: serde_json::Value,
    },

    /// Server-side defect (5xx) with a machine-readable code
    #[error("{message}")]
    Developer { code: String, message: String },

    /// Metadata store failure
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Cache failure
    #[error("cache error: {0}")]
    Cache(#[from] redis::RedisError),

    /// Object store failure
    #[error("object store error: {0}")]
    Store(#[from] krypta_store::StoreError),
}

/// JSON structure for the `error` field of the response envelope.
#[derive(Debug, Serialize)]
pub struct SerializedError {
    pub code: String,
    pub message: String,
    pub details: serde_json::Value,
}

impl Error {
    pub fn user(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::User {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn developer(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Developer {
            code: code.into(),
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>, details: serde_json::Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    /// HTTP status code this error maps to.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::User { code, .. } => match code.as_str() {
                "API_KEY_EXPIRED" | "API_KEY_NOT_FOUND" => 401,
                "ACCESS_DENIED" | "USER_BANNED" => 403,
                "AUTHORIZATION_HEADER_MISSING" | "AUTHORIZATION_HEADER_MALFORMATTED" => 412,
                _ => 400,
            },
            Self::Validation { .. } => 400,
            Self::Developer { .. } | Self::Database(_) | Self::Cache(_) | Self::Store(_) => 500,
        }
    }

    /// Whether the failure was the client's fault. Client errors are not
    /// logged at error level.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::User { .. } | Self::Validation { .. })
    }

    /// Serialize to the wire structure. Infrastructure errors collapse to
    /// `GENERIC_SERVER_ERROR` with a canned message.
    pub fn serialize(&self) -> SerializedError {
        match self {
            Self::User { code, message } | Self::Developer { code, message } => SerializedError {
                code: code.clone(),
                message: message.clone(),
                details: serde_json::json!({}),
            },
            Self::Validation { message, details } => SerializedError {
                code: "VALIDATION_ERROR".to_owned(),
                message: message.clone(),
                details: details.clone(),
            },
            Self::Database(_) | Self::Cache(_) | Self::Store(_) => SerializedError {
                code: "GENERIC_SERVER_ERROR".to_owned(),
                message: "We have encountered an unexpected server error. It has been logged \
                          and administrators will be notified."
                    .to_owned(),
                details: serde_json::json!({}),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_status_codes() {
        assert_eq!(Error::user("API_KEY_EXPIRED", "x").http_status(), 401);
        assert_eq!(Error::user("API_KEY_NOT_FOUND", "x").http_status(), 401);
        assert_eq!(Error::user("ACCESS_DENIED", "x").http_status(), 403);
        assert_eq!(Error::user("USER_BANNED", "x").http_status(), 403);
        assert_eq!(
            Error::user("AUTHORIZATION_HEADER_MISSING", "x").http_status(),
            412
        );
        assert_eq!(
            Error::user("AUTHORIZATION_HEADER_MALFORMATTED", "x").http_status(),
            412
        );
        assert_eq!(Error::user("DUPLICATE_BUCKET_NAME", "x").http_status(), 400);
    }

    #[test]
    fn test_developer_error_is_500() {
        let err = Error::developer("API_KEY_CREATION_FAILED", "ran out of attempts");
        assert_eq!(err.http_status(), 500);
        assert!(!err.is_client_error());
        assert_eq!(err.serialize().code, "API_KEY_CREATION_FAILED");
    }

    #[test]
    fn test_validation_error_carries_details() {
        let err = Error::validation("bad body", serde_json::json!({"field": "userName"}));
        assert_eq!(err.http_status(), 400);
        assert!(err.is_client_error());
        let serialized = err.serialize();
        assert_eq!(serialized.code, "VALIDATION_ERROR");
        assert_eq!(serialized.details["field"], "userName");
    }

    #[test]
    fn test_infrastructure_error_never_leaks() {
        let err = Error::Database(sqlx::Error::PoolClosed);
        assert_eq!(err.http_status(), 500);
        let serialized = err.serialize();
        assert_eq!(serialized.code, "GENERIC_SERVER_ERROR");
        assert!(!serialized.message.contains("pool"));
    }
}
