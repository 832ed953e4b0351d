//! Per-request caller information taken from headers.

use std::convert::Infallible;

use axum::extract::FromRequestParts;
use axum::http::header::ACCEPT_LANGUAGE;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use uuid::Uuid;

use super::state::AppState;

/// Header carrying the acting user's id.
pub const X_USER_ID: &str = "x-user-id";

const DEFAULT_LANGUAGE: &str = "en";

/// Caller identity and language, extracted for every resource handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    pub user_id: Option<Uuid>,
    pub language: String,
}

impl RequestContext {
    pub fn from_headers(headers: &HeaderMap, fallback_language: &str) -> Self {
        Self {
            user_id: x_user_id(headers),
            language: language(headers, fallback_language),
        }
    }
}

impl FromRequestParts<AppState> for RequestContext {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers, &state.language))
    }
}

/// The `x-user-id` header as a UUID; missing or unparseable gives `None`.
pub fn x_user_id(headers: &HeaderMap) -> Option<Uuid> {
    headers
        .get(X_USER_ID)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .and_then(|v| Uuid::parse_str(v).ok())
}

/// Two-letter lowercase language code.
///
/// Takes the first two characters of `Accept-Language` when it has at least
/// two, otherwise `fallback`. Anything that is not two ASCII letters
/// becomes `en`.
pub fn language(headers: &HeaderMap, fallback: &str) -> String {
    let header = headers
        .get(ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    let source = if header.chars().count() >= 2 {
        header
    } else {
        fallback
    };

    let code: String = source.chars().take(2).collect::<String>().to_lowercase();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_lowercase()) {
        code
    } else {
        DEFAULT_LANGUAGE.to_string()
    }
}
