//! Message analysis and date validation DTOs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::wire_tag;
use crate::models::{AnalysisContext, IntentClassification, MessageAnalysis};
use crate::nlp::DateValidation;

/// Already-known event facts that steer the analysis.
#[derive(Debug, Clone, Default, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisContextDto {
    pub event_type: Option<String>,
    pub headcount: Option<u32>,
    pub date: Option<String>,
    pub menu: Option<String>,
    pub event_status: Option<String>,
}

impl From<AnalysisContextDto> for AnalysisContext {
    fn from(dto: AnalysisContextDto) -> Self {
        Self {
            event_type: dto.event_type,
            headcount: dto.headcount,
            date: dto.date,
            menu: dto.menu,
            event_status: dto.event_status,
        }
    }
}

/// Request body for `POST /v1/analyze`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    #[validate(length(min = 1, max = 4000))]
    pub message: String,
    pub context: Option<AnalysisContextDto>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageAnalysisDto {
    pub intent: String,
    pub category: Option<String>,
    pub subtype: Option<String>,
    pub purpose: Option<String>,
    pub menu: Option<String>,
    pub headcount: Option<u32>,
    pub date: Option<String>,
    pub time: Option<String>,
    pub includes_drinks: Option<bool>,
    pub includes_starters: Option<bool>,
    pub confidence: f32,
}

impl From<MessageAnalysis> for MessageAnalysisDto {
    fn from(analysis: MessageAnalysis) -> Self {
        Self {
            intent: analysis.intent.as_str().to_string(),
            category: analysis.category,
            subtype: analysis.subtype,
            purpose: analysis.purpose,
            menu: analysis.menu,
            headcount: analysis.headcount,
            date: analysis.date,
            time: analysis.time,
            includes_drinks: analysis.includes_drinks,
            includes_starters: analysis.includes_starters,
            confidence: analysis.confidence,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClassificationDto {
    pub intent: String,
    pub confidence: f32,
    pub needs_clarification: bool,
    pub suggested_replies: Vec<String>,
}

impl From<IntentClassification> for ClassificationDto {
    fn from(classification: IntentClassification) -> Self {
        Self {
            intent: classification.intent.as_str().to_string(),
            confidence: classification.confidence,
            needs_clarification: classification.needs_clarification,
            suggested_replies: classification.suggested_replies.unwrap_or_default(),
        }
    }
}

/// Response for `POST /v1/analyze`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub analysis: MessageAnalysisDto,
    pub classification: ClassificationDto,
    /// Whether a language model produced the analysis.
    pub model_used: bool,
}

/// Request body for `POST /v1/dates:validate`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ValidateDateRequest {
    #[validate(length(min = 1, max = 200))]
    pub text: String,
    /// Reference day. Defaults to today in server local time.
    #[schema(value_type = Option<String>, format = Date)]
    pub today: Option<NaiveDate>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DateValidationResponse {
    pub valid: bool,
    pub iso_date: Option<String>,
    /// `past` or `too_close`.
    pub warning: Option<String>,
    pub message: Option<String>,
    pub suggested_date: Option<String>,
    pub days_from_now: Option<i64>,
}

impl From<DateValidation> for DateValidationResponse {
    fn from(validation: DateValidation) -> Self {
        Self {
            valid: validation.valid,
            iso_date: validation.iso_date,
            warning: validation.warning.as_ref().map(wire_tag),
            message: validation.message,
            suggested_date: validation.suggested_date,
            days_from_now: validation.days_from_now,
        }
    }
}
