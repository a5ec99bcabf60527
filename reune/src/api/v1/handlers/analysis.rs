//! v1 Analysis handlers: one-shot message analysis and date checks.

use axum::extract::State;
use validator::Validate;

use crate::api::v1::dto::{
    validation_message, AnalyzeRequest, AnalyzeResponse, DateValidationResponse,
    ValidateDateRequest,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::{AppJson, AppState};
use crate::conversation::classify_intent;
use crate::models::AnalysisContext;
use crate::nlp::{validate_event_date, validate_event_date_at};

/// `POST /api/v1/analyze`
///
/// Runs the analyzer on a single message without touching any conversation.
#[utoipa::path(
    post,
    path = "/api/v1/analyze",
    tag = "analysis",
    operation_id = "analysis.analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Structured reading of the message", body = AnalyzeResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn analyze_message(
    State(state): State<AppState>,
    AppJson(req): AppJson<AnalyzeRequest>,
) -> ApiResponse<AnalyzeResponse> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, validation_message(&e));
    }

    let context: AnalysisContext = req.context.map(Into::into).unwrap_or_default();
    let analyzer = state.orchestrator.analyzer();
    let analysis = analyzer.analyze(&req.message, &context).await;
    let classification = classify_intent(&analysis, Some(&context));

    ApiResponse::success(AnalyzeResponse {
        analysis: analysis.into(),
        classification: classification.into(),
        model_used: analyzer.uses_model(),
    })
}

/// `POST /api/v1/dates:validate`
#[utoipa::path(
    post,
    path = "/api/v1/dates:validate",
    tag = "analysis",
    operation_id = "analysis.validateDate",
    request_body = ValidateDateRequest,
    responses(
        (status = 200, description = "Date policy verdict", body = DateValidationResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn validate_date(
    AppJson(req): AppJson<ValidateDateRequest>,
) -> ApiResponse<DateValidationResponse> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, validation_message(&e));
    }

    let validation = match req.today {
        Some(today) => validate_event_date_at(&req.text, today),
        None => validate_event_date(&req.text),
    };
    ApiResponse::success(validation.into())
}
