//! Churrasco estimate and Secret Santa draw DTOs.

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::wire_tag;
use crate::models::SuggestedItem;
use crate::planning::SecretSantaPair;

/// Request body for `POST /v1/estimates/churrasco`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChurrascoEstimateRequest {
    #[validate(range(min = 1, max = 1000))]
    pub headcount: u32,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SuggestedItemDto {
    pub name: String,
    pub quantity: f64,
    pub unit: String,
    pub category: String,
    /// `A` (essential), `B` or `C` (optional).
    pub priority: String,
    pub estimated_value: f64,
}

impl From<SuggestedItem> for SuggestedItemDto {
    fn from(item: SuggestedItem) -> Self {
        Self {
            priority: wire_tag(&item.priority),
            name: item.name,
            quantity: item.quantity,
            unit: item.unit,
            category: item.category,
            estimated_value: item.estimated_value,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChurrascoEstimateResponse {
    pub headcount: u32,
    pub items: Vec<SuggestedItemDto>,
    pub total_estimated_value: f64,
}

impl ChurrascoEstimateResponse {
    pub fn new(headcount: u32, items: Vec<SuggestedItem>) -> Self {
        let total = items.iter().map(|item| item.estimated_value).sum::<f64>();
        Self {
            headcount,
            items: items.into_iter().map(Into::into).collect(),
            total_estimated_value: (total * 100.0).round() / 100.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretSantaPairDto {
    pub giver_id: String,
    pub receiver_id: String,
}

impl From<SecretSantaPair> for SecretSantaPairDto {
    fn from(pair: SecretSantaPair) -> Self {
        Self {
            giver_id: pair.giver_id,
            receiver_id: pair.receiver_id,
        }
    }
}

/// Request body for `POST /v1/secret-santa:draw`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretSantaDrawRequest {
    #[validate(length(max = 500))]
    pub participants: Vec<String>,
    /// Pairs from a previous exchange that must not repeat.
    #[serde(default)]
    pub previous_pairs: Vec<SecretSantaPairDto>,
    /// Fixes the shuffle for reproducible draws.
    pub seed: Option<u64>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SecretSantaDrawResponse {
    pub pairs: Vec<SecretSantaPairDto>,
}
