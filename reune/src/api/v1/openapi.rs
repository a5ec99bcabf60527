use axum::Json;
use utoipa::OpenApi;
use utoipa_redoc::{Redoc, Servable};

use super::dto;
use super::handlers;
use super::response;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "ReUNE API",
        version = "1.0.0",
        description = "Conversational core of the ReUNE event planner. Understands Portuguese \
                       planning messages, keeps per-user conversation state and offers \
                       planning tools.",
    ),
    paths(
        handlers::health::health_check,
        handlers::chat::chat_turn,
        handlers::chat::clear_context,
        handlers::chat::list_messages,
        handlers::analysis::analyze_message,
        handlers::analysis::validate_date,
        handlers::feedback::submit_feedback,
        handlers::analytics::get_metrics,
        handlers::analytics::get_patterns,
        handlers::planning::estimate_churrasco_items,
        handlers::planning::secret_santa_draw,
    ),
    components(schemas(
        // Response envelope
        response::ErrorCode,
        response::ApiError,
        response::ResponseMeta,
        // Chat
        dto::ChatTurnRequest,
        dto::ChatTurnResponse,
        dto::ProactiveActionDto,
        dto::CollectedDataDto,
        dto::ConversationContextDto,
        dto::ListMessagesQuery,
        dto::MessageResponse,
        dto::ClearContextResponse,
        // Analysis
        dto::AnalysisContextDto,
        dto::AnalyzeRequest,
        dto::AnalyzeResponse,
        dto::MessageAnalysisDto,
        dto::ClassificationDto,
        dto::ValidateDateRequest,
        dto::DateValidationResponse,
        // Feedback
        dto::SubmitFeedbackRequest,
        dto::FeedbackResponse,
        // Analytics
        dto::PerformanceMetricsResponse,
        dto::PerformanceSummaryDto,
        dto::FeedbackStatsDto,
        dto::LowConfidenceInteractionDto,
        dto::FrequentErrorDto,
        dto::DailyMetricDto,
        dto::ConfusionPatternsResponse,
        dto::ConfusionPatternDto,
        // Planning
        dto::ChurrascoEstimateRequest,
        dto::ChurrascoEstimateResponse,
        dto::SuggestedItemDto,
        dto::SecretSantaDrawRequest,
        dto::SecretSantaDrawResponse,
        dto::SecretSantaPairDto,
        // Health (handler-local types)
        handlers::health::HealthData,
        handlers::health::DatabaseStatus,
        handlers::health::LlmStatus,
        handlers::health::RpcStatus,
    )),
    tags(
        (name = "health", description = "Health check"),
        (name = "chat", description = "Conversation turns and per-user history"),
        (name = "analysis", description = "One-shot message analysis and date policy"),
        (name = "feedback", description = "Explicit user feedback on replies"),
        (name = "analytics", description = "Conversation quality metrics"),
        (name = "planning", description = "Shopping estimates and gift-exchange draws"),
    ),
    security(
        ("bearer_auth" = [])
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "bearer_auth",
            utoipa::openapi::security::SecurityScheme::Http(utoipa::openapi::security::Http::new(
                utoipa::openapi::security::HttpAuthScheme::Bearer,
            )),
        );
    }
}

pub async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

pub fn redoc_router<S: Clone + Send + Sync + 'static>() -> axum::Router<S> {
    Redoc::with_url("/docs", ApiDoc::openapi()).into()
}
