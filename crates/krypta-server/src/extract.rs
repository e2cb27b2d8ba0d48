//! Request extraction and validation
//!
//! JSON bodies are size-limited by the router (100 KiB on business
//! routes), rejected on unknown fields by the DTOs' serde attributes, and
//! checked against the `validator` constraints declared on each request
//! struct. Failures surface as `VALIDATION_ERROR` with field details.

use crate::error::ApiError;
use axum::extract::{FromRequest, Request};
use axum::Json;
use krypta_core::error::Error;
use validator::{Validate, ValidationError};

/// A JSON body that deserialized cleanly and passed validation.
pub struct ValidJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidJson<T>
where
    T: serde::de::DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state).await.map_err(|rejection| {
            ApiError(Error::validation(
                format!("Invalid request body: {}", rejection.body_text()),
                serde_json::json!({}),
            ))
        })?;

        value.validate().map_err(|errors| {
            let details =
                serde_json::to_value(&errors).unwrap_or_else(|_| serde_json::json!({}));
            ApiError(Error::validation("Request validation failed", details))
        })?;

        Ok(Self(value))
    }
}

/// 16-character alphanumeric entity id.
pub fn entity_id(value: &str) -> Result<(), ValidationError> {
    if krypta_core::ident::is_valid_id(value) {
        Ok(())
    } else {
        Err(ValidationError::new("entity_id"))
    }
}

/// Arbitrary client metadata must be present, not JSON null.
pub fn meta_data_value(value: &serde_json::Value) -> Result<(), ValidationError> {
    if value.is_null() {
        Err(ValidationError::new("meta_data_null"))
    } else {
        Ok(())
    }
}

/// Allowed values of the user-find `by` discriminator.
pub fn find_by_choice(value: &str) -> Result<(), ValidationError> {
    match value {
        "userName" | "userId" => Ok(()),
        _ => Err(ValidationError::new("find_by_choice")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_rules() {
        assert!(entity_id("a1B2c3D4e5F6g7H8").is_ok());
        assert!(entity_id("too-short").is_err());
        assert!(entity_id("exactly_16_chars").is_err());
    }

    #[test]
    fn test_meta_data_rejects_null() {
        assert!(meta_data_value(&serde_json::json!(null)).is_err());
        assert!(meta_data_value(&serde_json::json!({})).is_ok());
        assert!(meta_data_value(&serde_json::json!({"k": [1, 2]})).is_ok());
    }

    #[test]
    fn test_find_by_choice() {
        assert!(find_by_choice("userName").is_ok());
        assert!(find_by_choice("userId").is_ok());
        assert!(find_by_choice("email").is_err());
    }
}
