//! v1 Feedback handlers.

use axum::extract::State;
use validator::Validate;

use crate::api::v1::dto::{validation_message, FeedbackResponse, SubmitFeedbackRequest};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::{AppJson, AppState};
use crate::models::FeedbackOptions;

/// `POST /api/v1/feedback`
#[utoipa::path(
    post,
    path = "/api/v1/feedback",
    tag = "feedback",
    operation_id = "feedback.submit",
    request_body = SubmitFeedbackRequest,
    responses(
        (status = 201, description = "Feedback stored", body = FeedbackResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn submit_feedback(
    State(state): State<AppState>,
    AppJson(req): AppJson<SubmitFeedbackRequest>,
) -> ApiResponse<FeedbackResponse> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, validation_message(&e));
    }

    let options = FeedbackOptions {
        event_id: req.event_id,
        message_id: req.message_id,
        rating: req.rating,
        comment: req.comment,
        metadata: req.metadata,
    };

    match state
        .orchestrator
        .feedback()
        .submit_feedback(&req.user_id, req.feedback_type, options)
        .await
    {
        Some(feedback) => ApiResponse::created(FeedbackResponse::from(feedback)),
        None => ApiResponse::error(ErrorCode::InternalError, "Failed to store feedback"),
    }
}
