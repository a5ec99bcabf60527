//! Per-user conversation quality DTOs.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::conversation::{ConfusionPattern, PerformanceMetrics};
use crate::models::{ConversationAnalytic, ConversationMetric, FrequentError};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceSummaryDto {
    pub total_interactions: u32,
    pub avg_confidence: f32,
    /// Share of interactions neither corrected nor confused.
    pub success_rate: f32,
    pub clarification_rate: f32,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FeedbackStatsDto {
    pub positive: u32,
    pub negative: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LowConfidenceInteractionDto {
    pub id: String,
    pub intent: String,
    pub confidence: f32,
    pub clarification_needed: bool,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<ConversationAnalytic> for LowConfidenceInteractionDto {
    fn from(analytic: ConversationAnalytic) -> Self {
        Self {
            id: analytic.id,
            intent: analytic.intent,
            confidence: analytic.confidence_level,
            clarification_needed: analytic.clarification_needed,
            created_at: analytic.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct FrequentErrorDto {
    pub intent: String,
    pub error_count: u32,
    pub avg_confidence: f32,
}

impl From<FrequentError> for FrequentErrorDto {
    fn from(error: FrequentError) -> Self {
        Self {
            intent: error.intent,
            error_count: error.error_count,
            avg_confidence: error.avg_confidence,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DailyMetricDto {
    #[schema(value_type = String, format = Date)]
    pub date: NaiveDate,
    pub total_interactions: u32,
    pub avg_confidence: f32,
    pub correction_count: u32,
    pub clarification_count: u32,
    pub avg_response_time_ms: f64,
    pub unique_intents: u32,
    pub events_touched: u32,
}

impl From<ConversationMetric> for DailyMetricDto {
    fn from(metric: ConversationMetric) -> Self {
        Self {
            date: metric.date,
            total_interactions: metric.total_interactions,
            avg_confidence: metric.avg_confidence,
            correction_count: metric.correction_count,
            clarification_count: metric.clarification_count,
            avg_response_time_ms: metric.avg_response_time_ms,
            unique_intents: metric.unique_intents,
            events_touched: metric.events_touched,
        }
    }
}

/// Response for `GET /v1/analytics/{userId}/metrics`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceMetricsResponse {
    pub summary: PerformanceSummaryDto,
    pub feedback: FeedbackStatsDto,
    pub recent_low_confidence: Vec<LowConfidenceInteractionDto>,
    pub frequent_errors: Vec<FrequentErrorDto>,
    pub daily_metrics: Vec<DailyMetricDto>,
}

impl From<PerformanceMetrics> for PerformanceMetricsResponse {
    fn from(metrics: PerformanceMetrics) -> Self {
        Self {
            summary: PerformanceSummaryDto {
                total_interactions: metrics.summary.total_interactions,
                avg_confidence: metrics.summary.avg_confidence,
                success_rate: metrics.summary.success_rate,
                clarification_rate: metrics.summary.clarification_rate,
            },
            feedback: FeedbackStatsDto {
                positive: metrics.feedback.positive,
                negative: metrics.feedback.negative,
                total: metrics.feedback.total,
            },
            recent_low_confidence: metrics
                .recent_low_confidence
                .into_iter()
                .map(Into::into)
                .collect(),
            frequent_errors: metrics.frequent_errors.into_iter().map(Into::into).collect(),
            daily_metrics: metrics.daily_metrics.into_iter().map(Into::into).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfusionPatternDto {
    pub intent: String,
    pub frequency: u32,
    pub suggestion: String,
}

impl From<ConfusionPattern> for ConfusionPatternDto {
    fn from(pattern: ConfusionPattern) -> Self {
        Self {
            intent: pattern.intent,
            frequency: pattern.frequency,
            suggestion: pattern.suggestion.to_string(),
        }
    }
}

/// Response for `GET /v1/analytics/{userId}/patterns`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConfusionPatternsResponse {
    pub patterns: Vec<ConfusionPatternDto>,
}
