use axum::{
    middleware,
    routing::{delete, get, post},
    Router,
};

use crate::api::state::AppState;

use super::handlers;
use super::middleware::v1_auth_middleware;

pub fn v1_router(state: AppState) -> Router<AppState> {
    let chat = Router::new()
        .route("/turns", post(handlers::chat::chat_turn))
        .route("/{userId}/context", delete(handlers::chat::clear_context))
        .route("/{userId}/messages", get(handlers::chat::list_messages));

    let analytics = Router::new()
        .route("/{userId}/metrics", get(handlers::analytics::get_metrics))
        .route("/{userId}/patterns", get(handlers::analytics::get_patterns));

    let estimates = Router::new().route(
        "/churrasco",
        post(handlers::planning::estimate_churrasco_items),
    );

    let public_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/openapi.json", get(super::openapi::openapi_json))
        .merge(super::openapi::redoc_router());

    let protected_routes = Router::new()
        .nest("/chat", chat)
        .route("/analyze", post(handlers::analysis::analyze_message))
        .route("/dates:validate", post(handlers::analysis::validate_date))
        .route("/feedback", post(handlers::feedback::submit_feedback))
        .nest("/analytics", analytics)
        .nest("/estimates", estimates)
        .route(
            "/secret-santa:draw",
            post(handlers::planning::secret_santa_draw),
        )
        .route_layer(middleware::from_fn_with_state(state, v1_auth_middleware));

    Router::new().merge(public_routes).merge(protected_routes)
}
