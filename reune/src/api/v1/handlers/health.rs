use axum::extract::State;
use serde::Serialize;

use crate::api::state::AppState;
use crate::api::v1::response::ApiResponse;

/// Collaborator report. `status` is `degraded` when local storage fails;
/// a missing model or platform only narrows what chat turns can do.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct HealthData {
    pub status: &'static str,
    pub version: &'static str,
    pub database: DatabaseStatus,
    pub llm: LlmStatus,
    pub rpc: RpcStatus,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct DatabaseStatus {
    pub status: &'static str,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct LlmStatus {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    /// `model` or `heuristic`: which path message analysis takes.
    pub analysis: &'static str,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct RpcStatus {
    /// `configured` or `unavailable`.
    pub status: &'static str,
}

/// `GET /api/v1/health`
#[utoipa::path(
    get,
    path = "/api/v1/health",
    tag = "health",
    operation_id = "health.check",
    responses(
        (status = 200, description = "Collaborator status", body = HealthData),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> ApiResponse<HealthData> {
    let database_ok = match state.db.sync().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check database sync failed");
            false
        }
    };

    let analysis = if state.orchestrator.analyzer().uses_model() {
        "model"
    } else {
        "heuristic"
    };

    let llm = match state.llm.config().filter(|_| state.llm.is_available()) {
        Some(config) => LlmStatus {
            status: "available",
            provider: Some(state.llm.backend().name().to_string()),
            model: Some(config.model.clone()),
            analysis,
        },
        None => LlmStatus {
            status: "unavailable",
            provider: None,
            model: None,
            analysis,
        },
    };

    ApiResponse::success(HealthData {
        status: if database_ok { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        database: DatabaseStatus {
            status: if database_ok { "ok" } else { "error" },
        },
        llm,
        rpc: RpcStatus {
            status: if state.rpc.is_available() {
                "configured"
            } else {
                "unavailable"
            },
        },
    })
}
