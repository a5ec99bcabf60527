//! Response envelope shared by every v1 endpoint.
//!
//! ```json
//! { "data": { ... }, "meta": { "total": 2 } }
//! { "error": { "code": "invalid_request", "message": "..." } }
//! ```
//!
//! `data` and `error` are mutually exclusive. The HTTP status never appears
//! in the body; it follows from the constructor or the [`ErrorCode`].

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ReuneError;

const INTERNAL_MESSAGE: &str = "An internal error occurred";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    InvalidRequest,
    Unauthorized,
    /// The request was valid but could not be satisfied, e.g. a gift-exchange
    /// draw whose exclusions leave no valid assignment.
    Conflict,
    /// The chat model refused for quota or rate reasons.
    RateLimited,
    InternalError,
    /// A collaborator (chat model, event platform) is not configured.
    ServiceUnavailable,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            Self::InvalidRequest => StatusCode::BAD_REQUEST,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Conflict => StatusCode::CONFLICT,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::Unauthorized => "unauthorized",
            Self::Conflict => "conflict",
            Self::RateLimited => "rate_limited",
            Self::InternalError => "internal_error",
            Self::ServiceUnavailable => "service_unavailable",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ApiError {
    pub code: ErrorCode,
    /// Safe to show to the person chatting. Never carries internal details.
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResponseMeta {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<ResponseMeta>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    fn with_status(data: T, meta: Option<ResponseMeta>, status: StatusCode) -> Self {
        Self {
            data: Some(data),
            meta,
            error: None,
            status,
        }
    }

    pub fn success(data: T) -> Self {
        Self::with_status(data, None, StatusCode::OK)
    }

    /// Success with list metadata, used by history listings.
    pub fn success_with_meta(data: T, meta: ResponseMeta) -> Self {
        Self::with_status(data, Some(meta), StatusCode::OK)
    }

    /// HTTP 201, for stored feedback.
    pub fn created(data: T) -> Self {
        Self::with_status(data, None, StatusCode::CREATED)
    }

    pub fn error(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            data: None,
            meta: None,
            error: Some(ApiError {
                code,
                message: message.into(),
            }),
            status: code.status(),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let status = self.status;
        match serde_json::to_value(&self) {
            Ok(body) => (status, Json(body)).into_response(),
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize v1 response");
                let code = ErrorCode::InternalError;
                let body = serde_json::json!({
                    "error": { "code": code.as_str(), "message": INTERNAL_MESSAGE }
                });
                (code.status(), Json(body)).into_response()
            }
        }
    }
}

impl<T: Serialize> From<ReuneError> for ApiResponse<T> {
    /// Internal failures are logged and replaced by a generic message.
    fn from(err: ReuneError) -> Self {
        match err {
            ReuneError::Validation(msg) | ReuneError::InvalidDraw(msg) => {
                ApiResponse::error(ErrorCode::InvalidRequest, msg)
            }

            ReuneError::DrawExhausted(msg) => ApiResponse::error(ErrorCode::Conflict, msg),

            ReuneError::Json(e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid JSON: {e}"))
            }

            ReuneError::UrlParse(e) => {
                ApiResponse::error(ErrorCode::InvalidRequest, format!("Invalid URL: {e}"))
            }

            ReuneError::LlmRateLimit { retry_after } => {
                let msg = match retry_after {
                    Some(secs) => format!("Rate limit exceeded, retry after {secs} seconds"),
                    None => "Rate limit exceeded".to_string(),
                };
                ApiResponse::error(ErrorCode::RateLimited, msg)
            }

            ReuneError::LlmUnavailable(msg) | ReuneError::RpcUnavailable(msg) => {
                ApiResponse::error(ErrorCode::ServiceUnavailable, msg)
            }

            internal @ (ReuneError::Database(_)
            | ReuneError::Internal(_)
            | ReuneError::Llm(_)
            | ReuneError::Rpc { .. }) => {
                tracing::error!(error = %internal, "Internal error mapped to v1 response");
                ApiResponse::error(ErrorCode::InternalError, INTERNAL_MESSAGE)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapped(err: ReuneError) -> ApiResponse<()> {
        err.into()
    }

    #[test]
    fn success_and_error_are_exclusive() {
        let json = serde_json::to_value(ApiResponse::success("olá")).unwrap();
        assert_eq!(json["data"], "olá");
        assert!(json.get("error").is_none());
        assert!(json.get("meta").is_none());

        let json =
            serde_json::to_value(ApiResponse::<()>::error(ErrorCode::Conflict, "sumiu")).unwrap();
        assert!(json.get("data").is_none());
        assert_eq!(json["error"]["code"], "conflict");
        assert_eq!(json["error"]["message"], "sumiu");
    }

    #[test]
    fn history_listing_carries_total() {
        let resp = ApiResponse::success_with_meta(vec!["a", "b"], ResponseMeta { total: Some(2) });
        let json = serde_json::to_value(&resp).unwrap();
        assert_eq!(json["meta"]["total"], 2);
        assert_eq!(resp.status(), StatusCode::OK);
    }

    #[test]
    fn created_is_201() {
        assert_eq!(ApiResponse::created(1).status(), StatusCode::CREATED);
    }

    #[test]
    fn code_wire_names_match_display() {
        for code in [
            ErrorCode::InvalidRequest,
            ErrorCode::RateLimited,
            ErrorCode::ServiceUnavailable,
        ] {
            let json = serde_json::to_value(code).unwrap();
            assert_eq!(json, code.to_string());
        }
    }

    #[test]
    fn rpc_failure_does_not_leak_details() {
        let resp = mapped(ReuneError::Rpc {
            procedure: "get_event_plan".into(),
            message: "secret debug info".into(),
        });
        let err = resp.error.unwrap();
        assert_eq!(err.code, ErrorCode::InternalError);
        assert_eq!(err.message, INTERNAL_MESSAGE);
    }

    #[test]
    fn collaborator_errors_map_to_their_status() {
        assert_eq!(
            mapped(ReuneError::LlmUnavailable("no LLM".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            mapped(ReuneError::RpcUnavailable("no RPC".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            mapped(ReuneError::LlmRateLimit { retry_after: Some(3) }).status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[test]
    fn draw_errors_keep_their_message() {
        let resp = mapped(ReuneError::InvalidDraw("poucos participantes".into()));
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        assert_eq!(resp.error.unwrap().message, "poucos participantes");

        assert_eq!(
            mapped(ReuneError::DrawExhausted("tente novamente".into())).status(),
            StatusCode::CONFLICT
        );
    }
}
