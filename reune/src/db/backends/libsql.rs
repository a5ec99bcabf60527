use crate::db::connection::Database;
use crate::db::repository::{
    AnalyticsRepository, ContextRepository, FeedbackRepository, MessageRepository,
};
use crate::db::traits::{
    AnalyticsStore, ContextStore, DatabaseBackend, FeedbackStore, MessageStore,
};
use crate::error::Result;
use crate::models::{
    ConversationAnalytic, ConversationContext, ConversationMessage, ConversationMetric,
    FeedbackStats, FrequentError, UserFeedback,
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl AnalyticsStore for LibSqlBackend {
    async fn insert_analytic(&self, analytic: &ConversationAnalytic) -> Result<()> {
        let conn = self.db.connect()?;
        AnalyticsRepository::create(&conn, analytic).await
    }
    async fn mark_corrected(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        AnalyticsRepository::set_corrected(&conn, id).await
    }
    async fn mark_confused(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        AnalyticsRepository::set_confused(&conn, id).await
    }
    async fn daily_metrics(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ConversationMetric>> {
        let conn = self.db.connect()?;
        AnalyticsRepository::daily_metrics(&conn, user_id, since).await
    }
    async fn frequent_errors(
        &self,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<FrequentError>> {
        let conn = self.db.connect()?;
        AnalyticsRepository::frequent_errors(&conn, user_id, since).await
    }
    async fn low_confidence_interactions(
        &self,
        user_id: &str,
        threshold: f32,
        limit: u32,
    ) -> Result<Vec<ConversationAnalytic>> {
        let conn = self.db.connect()?;
        AnalyticsRepository::low_confidence(&conn, user_id, threshold, limit).await
    }
}

#[async_trait]
impl FeedbackStore for LibSqlBackend {
    async fn insert_feedback(&self, feedback: &UserFeedback) -> Result<()> {
        let conn = self.db.connect()?;
        FeedbackRepository::create(&conn, feedback).await
    }
    async fn list_feedback(&self, user_id: &str, limit: u32) -> Result<Vec<UserFeedback>> {
        let conn = self.db.connect()?;
        FeedbackRepository::list_by_user(&conn, user_id, limit).await
    }
    async fn feedback_stats(&self, user_id: &str) -> Result<FeedbackStats> {
        let conn = self.db.connect()?;
        FeedbackRepository::stats(&conn, user_id).await
    }
}

#[async_trait]
impl MessageStore for LibSqlBackend {
    async fn insert_message(&self, message: &ConversationMessage) -> Result<()> {
        let conn = self.db.connect()?;
        MessageRepository::create(&conn, message).await
    }
    async fn recent_messages(
        &self,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<ConversationMessage>> {
        let conn = self.db.connect()?;
        MessageRepository::recent_by_user(&conn, user_id, limit).await
    }
    async fn clear_messages(&self, user_id: &str) -> Result<u64> {
        let conn = self.db.connect()?;
        MessageRepository::delete_by_user(&conn, user_id).await
    }
}

#[async_trait]
impl ContextStore for LibSqlBackend {
    async fn get_context(&self, user_id: &str) -> Result<Option<ConversationContext>> {
        let conn = self.db.connect()?;
        ContextRepository::get_by_user(&conn, user_id).await
    }
    async fn upsert_context(&self, context: &ConversationContext) -> Result<()> {
        let conn = self.db.connect()?;
        ContextRepository::upsert(&conn, context).await
    }
}

#[async_trait]
impl DatabaseBackend for LibSqlBackend {
    async fn sync(&self) -> Result<()> {
        self.db.sync().await
    }
}
