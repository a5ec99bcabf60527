use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::common::{FeedbackType, Metadata, ResponseType};

/// One logged interaction. Created once per turn and later flagged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationAnalytic {
    pub id: String,
    pub user_id: String,
    pub event_id: Option<String>,
    pub message_id: Option<String>,
    pub intent: String,
    pub confidence_level: f32,
    pub response_type: ResponseType,
    pub user_corrected: bool,
    pub user_confused: bool,
    pub clarification_needed: bool,
    pub response_time_ms: Option<u64>,
    pub tokens_used: Option<u32>,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

/// Optional fields accepted when logging an interaction.
#[derive(Debug, Clone, Default)]
pub struct InteractionOptions {
    pub event_id: Option<String>,
    pub message_id: Option<String>,
    pub user_corrected: bool,
    pub user_confused: bool,
    pub clarification_needed: bool,
    pub response_time_ms: Option<u64>,
    pub tokens_used: Option<u32>,
    pub metadata: Metadata,
}

/// Per-day aggregate over the analytics log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMetric {
    pub date: NaiveDate,
    pub total_interactions: u32,
    pub avg_confidence: f32,
    pub correction_count: u32,
    pub clarification_count: u32,
    pub avg_response_time_ms: f64,
    pub unique_intents: u32,
    pub events_touched: u32,
}

/// Intent with a history of corrected or confused interactions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrequentError {
    pub intent: String,
    pub error_count: u32,
    pub avg_confidence: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserFeedback {
    pub id: String,
    pub user_id: String,
    pub event_id: Option<String>,
    pub message_id: Option<String>,
    pub feedback_type: FeedbackType,
    pub rating: Option<u8>,
    pub comment: Option<String>,
    pub metadata: Metadata,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackOptions {
    pub event_id: Option<String>,
    pub message_id: Option<String>,
    pub rating: Option<u8>,
    pub comment: Option<String>,
    pub metadata: Metadata,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct FeedbackStats {
    pub positive: u32,
    pub negative: u32,
    pub total: u32,
}
