//! Bearer-key guard for the chat and tool routes.

use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::api::state::AppState;

use super::response::{ApiResponse, ErrorCode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AuthFailure {
    NoKeysConfigured,
    MissingHeader,
    MalformedHeader,
    UnknownKey,
}

impl AuthFailure {
    fn message(self) -> &'static str {
        match self {
            Self::NoKeysConfigured => {
                "API keys not configured. Set REUNE_API_KEYS to enable access."
            }
            Self::MissingHeader => "Missing authorization header",
            Self::MalformedHeader => {
                "Invalid authorization header format. Expected: Bearer <token>"
            }
            Self::UnknownKey => "Invalid API key",
        }
    }
}

/// The scheme is matched case-insensitively; the key itself is not.
fn check_bearer(api_keys: &[String], headers: &HeaderMap) -> Result<(), AuthFailure> {
    if api_keys.is_empty() {
        return Err(AuthFailure::NoKeysConfigured);
    }

    let value = headers
        .get(AUTHORIZATION)
        .ok_or(AuthFailure::MissingHeader)?
        .to_str()
        .map_err(|_| AuthFailure::MalformedHeader)?;

    let token = match value.split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => return Err(AuthFailure::MalformedHeader),
    };

    if api_keys.iter().any(|key| key == token) {
        Ok(())
    } else {
        Err(AuthFailure::UnknownKey)
    }
}

/// Rejects with a 401 envelope unless the request carries a configured key.
/// With no keys configured every protected route stays closed.
pub async fn v1_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    match check_bearer(&state.config.server.api_keys, request.headers()) {
        Ok(()) => next.run(request).await,
        Err(failure) => {
            tracing::debug!(?failure, path = %request.uri().path(), "Rejected v1 request");
            ApiResponse::<()>::error(ErrorCode::Unauthorized, failure.message()).into_response()
        }
    }
}
