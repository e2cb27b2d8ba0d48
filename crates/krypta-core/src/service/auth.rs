//! Authorization-header authentication

use crate::error::{Error, Result};
use crate::model::AuthData;
use crate::service::{SessionService, UserService};
use chrono::Utc;

/// Pull the API key out of an `Authorization: Bearer <key>` header.
///
/// Missing header → `AUTHORIZATION_HEADER_MISSING` (412); wrong scheme or
/// wrong key length → `AUTHORIZATION_HEADER_MALFORMATTED` (412).
fn extract_api_key(header: Option<&str>, expected_length: usize) -> Result<&str> {
    let header = header.map(str::trim).unwrap_or_default();
    if header.is_empty() {
        return Err(Error::user(
            "AUTHORIZATION_HEADER_MISSING",
            "Authorization header is missing",
        ));
    }

    let api_key = match header.split_once(' ') {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        _ => {
            return Err(Error::user(
                "AUTHORIZATION_HEADER_MALFORMATTED",
                "Authorization header is malformatted",
            ))
        }
    };
    if api_key.len() != expected_length {
        return Err(Error::user(
            "AUTHORIZATION_HEADER_MALFORMATTED",
            "Authorization header is malformatted",
        ));
    }
    Ok(api_key)
}

#[derive(Clone, Debug)]
pub struct AuthService {
    sessions: SessionService,
    users: UserService,
    api_key_length: usize,
}

impl AuthService {
    pub fn new(sessions: SessionService, users: UserService, api_key_length: usize) -> Self {
        Self {
            sessions,
            users,
            api_key_length,
        }
    }

    /// Validate an `Authorization` header and resolve the caller.
    ///
    /// The cache decides liveness; the age check against the configured
    /// validity duration is defense in depth for a cache that failed to
    /// evict on time.
    pub async fn authenticate(&self, authorization_header: Option<&str>) -> Result<AuthData> {
        let api_key = extract_api_key(authorization_header, self.api_key_length)?;

        let cached = self.sessions.resolve(api_key).await?.ok_or_else(|| {
            Error::user("API_KEY_EXPIRED", "Your session has expired. Login again.")
        })?;

        let age_ms = Utc::now().timestamp_millis() - cached.created_at;
        if age_ms > self.sessions.validity().num_milliseconds() {
            return Err(Error::user(
                "API_KEY_EXPIRED",
                "Your session has expired. Login again.",
            ));
        }

        let user = self.users.find_by_id_or_fail(&cached.user_id).await?;

        Ok(AuthData {
            api_key: api_key.to_owned(),
            user_id: cached.user_id,
            session_id: cached.session_id,
            user,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(err: Error) -> String {
        match err {
            Error::User { code, .. } => code,
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_missing_header() {
        assert_eq!(code(extract_api_key(None, 8).unwrap_err()), "AUTHORIZATION_HEADER_MISSING");
        assert_eq!(
            code(extract_api_key(Some("   "), 8).unwrap_err()),
            "AUTHORIZATION_HEADER_MISSING"
        );
    }

    #[test]
    fn test_bearer_scheme_case_insensitive() {
        assert_eq!(extract_api_key(Some("Bearer abcd1234"), 8).unwrap(), "abcd1234");
        assert_eq!(extract_api_key(Some("bearer abcd1234"), 8).unwrap(), "abcd1234");
    }

    #[test]
    fn test_wrong_scheme_rejected() {
        assert_eq!(
            code(extract_api_key(Some("Basic abcd1234"), 8).unwrap_err()),
            "AUTHORIZATION_HEADER_MALFORMATTED"
        );
        assert_eq!(
            code(extract_api_key(Some("abcd1234"), 8).unwrap_err()),
            "AUTHORIZATION_HEADER_MALFORMATTED"
        );
    }

    #[test]
    fn test_wrong_key_length_rejected() {
        assert_eq!(
            code(extract_api_key(Some("Bearer short"), 8).unwrap_err()),
            "AUTHORIZATION_HEADER_MALFORMATTED"
        );
    }
}
