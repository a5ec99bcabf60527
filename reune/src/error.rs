use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::api::v1::response::ApiResponse;

/// Failures surfaced by the crate. Soft analysis failures never get here;
/// they fall back to the keyword path inside the analyzer.
#[derive(Error, Debug)]
pub enum ReuneError {
    #[error("Database error: {0}")]
    Database(#[from] libsql::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("LLM unavailable: {0}")]
    LlmUnavailable(String),

    #[error("LLM rate limit exceeded, retry after {retry_after:?} seconds")]
    LlmRateLimit { retry_after: Option<u64> },

    #[error("RPC error in {procedure}: {message}")]
    Rpc { procedure: String, message: String },

    #[error("RPC unavailable: {0}")]
    RpcUnavailable(String),

    /// Rejected before any draw is attempted (too few or duplicate participants).
    #[error("{0}")]
    InvalidDraw(String),

    /// No valid assignment found within the attempt budget.
    #[error("{0}")]
    DrawExhausted(String),
}

impl IntoResponse for ReuneError {
    fn into_response(self) -> Response {
        ApiResponse::<()>::from(self).into_response()
    }
}

pub type Result<T> = std::result::Result<T, ReuneError>;
