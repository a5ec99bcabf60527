//! v1 Chat handlers.

use axum::extract::{Path, Query, State};
use validator::Validate;

use crate::api::v1::dto::{
    validation_message, ChatTurnRequest, ChatTurnResponse, ClearContextResponse,
    ListMessagesQuery, MessageResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode, ResponseMeta};
use crate::api::{AppJson, AppState};

const DEFAULT_MESSAGE_LIMIT: u32 = 50;
const MAX_MESSAGE_LIMIT: u32 = 200;

/// `POST /api/v1/chat/turns`
#[utoipa::path(
    post,
    path = "/api/v1/chat/turns",
    tag = "chat",
    operation_id = "chat.turn",
    request_body = ChatTurnRequest,
    responses(
        (status = 200, description = "Assistant reply for the turn", body = ChatTurnResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn chat_turn(
    State(state): State<AppState>,
    AppJson(req): AppJson<ChatTurnRequest>,
) -> ApiResponse<ChatTurnResponse> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, validation_message(&e));
    }
    if req.message.trim().is_empty() {
        return ApiResponse::error(ErrorCode::InvalidRequest, "Message cannot be empty");
    }

    let event_id = req.event_id.as_deref().filter(|id| !id.trim().is_empty());
    match state
        .orchestrator
        .handle_turn(&req.user_id, req.message.trim(), event_id)
        .await
    {
        Ok(outcome) => ApiResponse::success(ChatTurnResponse::from(outcome)),
        Err(e) => e.into(),
    }
}

/// `DELETE /api/v1/chat/{userId}/context`
#[utoipa::path(
    delete,
    path = "/api/v1/chat/{userId}/context",
    tag = "chat",
    operation_id = "chat.clearContext",
    params(("userId" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "Context and history cleared", body = ClearContextResponse),
    )
)]
pub async fn clear_context(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResponse<ClearContextResponse> {
    if let Err(e) = state.orchestrator.contexts().clear_user_context(&user_id).await {
        return e.into();
    }

    ApiResponse::success(ClearContextResponse {
        user_id,
        cleared: true,
    })
}

/// `GET /api/v1/chat/{userId}/messages`
#[utoipa::path(
    get,
    path = "/api/v1/chat/{userId}/messages",
    tag = "chat",
    operation_id = "chat.listMessages",
    params(
        ("userId" = String, Path, description = "User ID"),
        ListMessagesQuery,
    ),
    responses(
        (status = 200, description = "Recent messages, oldest first", body = Vec<MessageResponse>),
    )
)]
pub async fn list_messages(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(query): Query<ListMessagesQuery>,
) -> ApiResponse<Vec<MessageResponse>> {
    let limit = query
        .limit
        .unwrap_or(DEFAULT_MESSAGE_LIMIT)
        .clamp(1, MAX_MESSAGE_LIMIT);

    let messages = match state.db.recent_messages(&user_id, limit).await {
        Ok(messages) => messages,
        Err(e) => return e.into(),
    };

    let total = messages.len() as u64;
    ApiResponse::success_with_meta(
        messages.into_iter().map(MessageResponse::from).collect(),
        ResponseMeta { total: Some(total) },
    )
}
