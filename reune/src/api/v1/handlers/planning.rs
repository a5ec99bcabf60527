//! v1 Planning tool handlers. Pure computation, no storage.

use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::SeedableRng;
use validator::Validate;

use crate::api::v1::dto::{
    validation_message, ChurrascoEstimateRequest, ChurrascoEstimateResponse,
    SecretSantaDrawRequest, SecretSantaDrawResponse,
};
use crate::api::v1::response::{ApiError, ApiResponse, ErrorCode};
use crate::api::AppJson;
use crate::planning::{estimate_churrasco, perform_draw};

/// `POST /api/v1/estimates/churrasco`
#[utoipa::path(
    post,
    path = "/api/v1/estimates/churrasco",
    tag = "planning",
    operation_id = "planning.estimateChurrasco",
    request_body = ChurrascoEstimateRequest,
    responses(
        (status = 200, description = "Suggested shopping list", body = ChurrascoEstimateResponse),
        (status = 400, description = "Invalid request", body = ApiError),
    )
)]
pub async fn estimate_churrasco_items(
    AppJson(req): AppJson<ChurrascoEstimateRequest>,
) -> ApiResponse<ChurrascoEstimateResponse> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, validation_message(&e));
    }

    let items = estimate_churrasco(req.headcount);
    ApiResponse::success(ChurrascoEstimateResponse::new(req.headcount, items))
}

/// `POST /api/v1/secret-santa:draw`
#[utoipa::path(
    post,
    path = "/api/v1/secret-santa:draw",
    tag = "planning",
    operation_id = "planning.secretSantaDraw",
    request_body = SecretSantaDrawRequest,
    responses(
        (status = 200, description = "One receiver per participant", body = SecretSantaDrawResponse),
        (status = 400, description = "Fewer than two or duplicated participants", body = ApiError),
        (status = 409, description = "No draw avoids the previous pairs", body = ApiError),
    )
)]
pub async fn secret_santa_draw(
    AppJson(req): AppJson<SecretSantaDrawRequest>,
) -> ApiResponse<SecretSantaDrawResponse> {
    if let Err(e) = req.validate() {
        return ApiResponse::error(ErrorCode::InvalidRequest, validation_message(&e));
    }

    let previous: HashSet<(String, String)> = req
        .previous_pairs
        .into_iter()
        .map(|pair| (pair.giver_id, pair.receiver_id))
        .collect();
    let mut rng = match req.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    match perform_draw(&req.participants, Some(&previous), &mut rng) {
        Ok(pairs) => ApiResponse::success(SecretSantaDrawResponse {
            pairs: pairs.into_iter().map(Into::into).collect(),
        }),
        Err(e) => e.into(),
    }
}
