//! Superuser authentication.
//!
//! Superusers present the configured token as `Authorization: Bearer <token>`.
//! With no token configured, nobody is a superuser.

use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};

use crate::config::Settings;
use crate::error::AppError;
use crate::state::AppState;

/// Extractor that only succeeds for superuser requests.
#[derive(Debug, Clone, Copy)]
pub struct Superuser;

impl FromRequestParts<AppState> for Superuser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        if is_superuser(&parts.headers, &state.settings) {
            Ok(Superuser)
        } else {
            Err(AppError::Unauthorized(
                "The request requires valid superuser authorization token to be set.".to_string(),
            ))
        }
    }
}

/// Whether the headers carry the configured superuser token.
pub fn is_superuser(headers: &HeaderMap, settings: &Settings) -> bool {
    let Some(expected) = settings.superuser_token() else {
        return false;
    };
    bearer_token(headers)
        .is_some_and(|token| constant_time_eq(token.as_bytes(), expected.as_bytes()))
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let token = value.strip_prefix("Bearer ").unwrap_or(value).trim();
    (!token.is_empty()).then_some(token)
}

fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn settings(token: Option<&str>) -> Settings {
        Settings {
            superuser_token: token.map(str::to_string),
            ..Settings::default()
        }
    }

    fn headers(auth: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_str(auth).unwrap());
        headers
    }

    #[test]
    fn accepts_bearer_and_bare_token() {
        let settings = settings(Some("s3cret"));
        assert!(is_superuser(&headers("Bearer s3cret"), &settings));
        assert!(is_superuser(&headers("s3cret"), &settings));
    }

    #[test]
    fn rejects_wrong_or_missing_token() {
        let settings = settings(Some("s3cret"));
        assert!(!is_superuser(&headers("Bearer nope"), &settings));
        assert!(!is_superuser(&headers("Bearer "), &settings));
        assert!(!is_superuser(&HeaderMap::new(), &settings));
    }

    #[test]
    fn no_configured_token_rejects_everything() {
        assert!(!is_superuser(&headers("Bearer anything"), &settings(None)));
        assert!(!is_superuser(&headers("Bearer "), &settings(Some(""))));
    }
}
