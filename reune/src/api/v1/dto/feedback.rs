//! Explicit user feedback DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::{FeedbackType, Metadata, UserFeedback};

/// Request body for `POST /v1/feedback`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmitFeedbackRequest {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    /// `thumbs_up`, `thumbs_down`, `report` or `suggestion`.
    #[schema(value_type = String)]
    pub feedback_type: FeedbackType,
    pub event_id: Option<String>,
    pub message_id: Option<String>,
    #[validate(range(min = 1, max = 5))]
    pub rating: Option<u8>,
    #[validate(length(max = 2000))]
    pub comment: Option<String>,
    #[serde(default)]
    #[schema(value_type = Object)]
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackResponse {
    pub id: String,
    pub user_id: String,
    pub feedback_type: String,
    pub event_id: Option<String>,
    pub message_id: Option<String>,
    pub rating: Option<u8>,
    pub comment: Option<String>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<UserFeedback> for FeedbackResponse {
    fn from(feedback: UserFeedback) -> Self {
        Self {
            id: feedback.id,
            user_id: feedback.user_id,
            feedback_type: feedback.feedback_type.to_string(),
            event_id: feedback.event_id,
            message_id: feedback.message_id,
            rating: feedback.rating,
            comment: feedback.comment,
            created_at: feedback.created_at,
        }
    }
}
