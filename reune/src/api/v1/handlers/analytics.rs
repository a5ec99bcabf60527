//! v1 Analytics handlers.

use axum::extract::{Path, State};

use crate::api::v1::dto::{ConfusionPatternsResponse, PerformanceMetricsResponse};
use crate::api::v1::response::ApiResponse;
use crate::api::AppState;

/// `GET /api/v1/analytics/{userId}/metrics`
#[utoipa::path(
    get,
    path = "/api/v1/analytics/{userId}/metrics",
    tag = "analytics",
    operation_id = "analytics.metrics",
    params(("userId" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Conversation quality over the last week", body = PerformanceMetricsResponse),
    )
)]
pub async fn get_metrics(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResponse<PerformanceMetricsResponse> {
    let metrics = state.orchestrator.feedback().performance_metrics(&user_id).await;
    ApiResponse::success(metrics.into())
}

/// `GET /api/v1/analytics/{userId}/patterns`
#[utoipa::path(
    get,
    path = "/api/v1/analytics/{userId}/patterns",
    tag = "analytics",
    operation_id = "analytics.patterns",
    params(("userId" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Intents the user keeps getting wrong", body = ConfusionPatternsResponse),
    )
)]
pub async fn get_patterns(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResponse<ConfusionPatternsResponse> {
    let patterns = state
        .orchestrator
        .feedback()
        .detect_confusion_patterns(&user_id)
        .await;

    ApiResponse::success(ConfusionPatternsResponse {
        patterns: patterns.into_iter().map(Into::into).collect(),
    })
}
