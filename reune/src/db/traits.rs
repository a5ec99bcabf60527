use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    ConversationAnalytic, ConversationContext, ConversationMessage, ConversationMetric,
    FeedbackStats, FrequentError, UserFeedback,
};

// ---------------------------------------------------------------------------
// Individual store traits
// ---------------------------------------------------------------------------

/// Append-mostly log of handled turns plus its aggregates.
#[async_trait]
pub trait AnalyticsStore: Send + Sync {
    async fn insert_analytic(&self, analytic: &ConversationAnalytic) -> Result<()>;
    /// Returns false when no record has the given id.
    async fn mark_corrected(&self, id: &str) -> Result<bool>;
    async fn mark_confused(&self, id: &str) -> Result<bool>;
    /// Per-day aggregates since `since`, newest day first.
    async fn daily_metrics(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ConversationMetric>>;
    /// Intents with corrected or confused interactions since `since`, most
    /// errors first.
    async fn frequent_errors(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<FrequentError>>;
    async fn low_confidence_interactions(
        &self,
        user_id: &str,
        threshold: f32,
        limit: u32,
    ) -> Result<Vec<ConversationAnalytic>>;
}

#[async_trait]
pub trait FeedbackStore: Send + Sync {
    async fn insert_feedback(&self, feedback: &UserFeedback) -> Result<()>;
    async fn list_feedback(&self, user_id: &str, limit: u32) -> Result<Vec<UserFeedback>>;
    async fn feedback_stats(&self, user_id: &str) -> Result<FeedbackStats>;
}

/// Conversation history.
#[async_trait]
pub trait MessageStore: Send + Sync {
    async fn insert_message(&self, message: &ConversationMessage) -> Result<()>;
    /// Latest `limit` messages in chronological order.
    async fn recent_messages(&self, user_id: &str, limit: u32)
        -> Result<Vec<ConversationMessage>>;
    async fn clear_messages(&self, user_id: &str) -> Result<u64>;
}

#[async_trait]
pub trait ContextStore: Send + Sync {
    async fn get_context(&self, user_id: &str) -> Result<Option<ConversationContext>>;
    async fn upsert_context(&self, context: &ConversationContext) -> Result<()>;
}

// ---------------------------------------------------------------------------
// Unified backend supertrait
// ---------------------------------------------------------------------------

/// A complete database backend that combines all store traits plus lifecycle
/// operations.
#[async_trait]
pub trait DatabaseBackend: AnalyticsStore + FeedbackStore + MessageStore + ContextStore {
    /// Sync with remote (e.g. Turso replication). No-op for local-only backends.
    async fn sync(&self) -> Result<()>;
}
