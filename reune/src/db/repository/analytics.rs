use chrono::{DateTime, NaiveDate, Utc};
use libsql::{params, Connection};

use super::{parse_timestamp, timestamp};
use crate::error::Result;
use crate::models::{ConversationAnalytic, ConversationMetric, FrequentError};

pub struct AnalyticsRepository;

impl AnalyticsRepository {
    pub async fn create(conn: &Connection, analytic: &ConversationAnalytic) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO conversation_analytics (
                id, user_id, event_id, message_id, intent, confidence_level,
                response_type, user_corrected, user_confused, clarification_needed,
                response_time_ms, tokens_used, metadata, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14
            )
            "#,
            params![
                analytic.id.clone(),
                analytic.user_id.clone(),
                analytic.event_id.clone(),
                analytic.message_id.clone(),
                analytic.intent.clone(),
                analytic.confidence_level as f64,
                analytic.response_type.to_string(),
                analytic.user_corrected as i64,
                analytic.user_confused as i64,
                analytic.clarification_needed as i64,
                analytic.response_time_ms.map(|ms| ms as i64),
                analytic.tokens_used.map(i64::from),
                serde_json::to_string(&analytic.metadata)?,
                timestamp(&analytic.created_at),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<ConversationAnalytic>> {
        let mut rows = conn
            .query(
                &format!("SELECT {COLUMNS} FROM conversation_analytics WHERE id = ?1"),
                params![id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_analytic(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn set_corrected(conn: &Connection, id: &str) -> Result<bool> {
        let affected = conn
            .execute(
                "UPDATE conversation_analytics SET user_corrected = 1 WHERE id = ?1",
                params![id],
            )
            .await?;
        Ok(affected > 0)
    }

    pub async fn set_confused(conn: &Connection, id: &str) -> Result<bool> {
        let affected = conn
            .execute(
                "UPDATE conversation_analytics SET user_confused = 1 WHERE id = ?1",
                params![id],
            )
            .await?;
        Ok(affected > 0)
    }

    pub async fn daily_metrics(
        conn: &Connection,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<ConversationMetric>> {
        let mut rows = conn
            .query(
                r#"
                SELECT
                    substr(created_at, 1, 10) AS day,
                    COUNT(*),
                    AVG(confidence_level),
                    SUM(user_corrected),
                    SUM(clarification_needed),
                    AVG(response_time_ms),
                    COUNT(DISTINCT intent),
                    COUNT(DISTINCT event_id)
                FROM conversation_analytics
                WHERE user_id = ?1 AND created_at >= ?2
                GROUP BY day
                ORDER BY day DESC
                "#,
                params![user_id, timestamp(&since)],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            let day: String = row.get(0)?;
            let Ok(date) = NaiveDate::parse_from_str(&day, "%Y-%m-%d") else {
                tracing::warn!(day = %day, "Skipping analytics bucket with malformed date");
                continue;
            };

            results.push(ConversationMetric {
                date,
                total_interactions: row.get::<i64>(1)? as u32,
                avg_confidence: row.get::<f64>(2)? as f32,
                correction_count: row.get::<i64>(3)? as u32,
                clarification_count: row.get::<i64>(4)? as u32,
                avg_response_time_ms: row.get::<Option<f64>>(5)?.unwrap_or(0.0),
                unique_intents: row.get::<i64>(6)? as u32,
                events_touched: row.get::<i64>(7)? as u32,
            });
        }

        Ok(results)
    }

    pub async fn frequent_errors(
        conn: &Connection,
        user_id: &str,
        since: DateTime<Utc>,
    ) -> Result<Vec<FrequentError>> {
        let mut rows = conn
            .query(
                r#"
                SELECT intent, COUNT(*) AS error_count, AVG(confidence_level)
                FROM conversation_analytics
                WHERE user_id = ?1
                  AND created_at >= ?2
                  AND (user_corrected = 1 OR user_confused = 1)
                GROUP BY intent
                ORDER BY error_count DESC, intent ASC
                "#,
                params![user_id, timestamp(&since)],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(FrequentError {
                intent: row.get(0)?,
                error_count: row.get::<i64>(1)? as u32,
                avg_confidence: row.get::<f64>(2)? as f32,
            });
        }

        Ok(results)
    }

    /// Most recent interactions at or below `threshold`, newest first.
    pub async fn low_confidence(
        conn: &Connection,
        user_id: &str,
        threshold: f32,
        limit: u32,
    ) -> Result<Vec<ConversationAnalytic>> {
        let mut rows = conn
            .query(
                &format!(
                    "SELECT {COLUMNS} FROM conversation_analytics \
                     WHERE user_id = ?1 AND confidence_level <= ?2 \
                     ORDER BY created_at DESC LIMIT ?3"
                ),
                params![user_id, threshold as f64, limit as i64],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_analytic(&row)?);
        }

        Ok(results)
    }

    fn row_to_analytic(row: &libsql::Row) -> Result<ConversationAnalytic> {
        Ok(ConversationAnalytic {
            id: row.get(0)?,
            user_id: row.get(1)?,
            event_id: row.get(2)?,
            message_id: row.get(3)?,
            intent: row.get(4)?,
            confidence_level: row.get::<f64>(5)? as f32,
            response_type: row.get::<String>(6)?.parse().unwrap_or_default(),
            user_corrected: row.get::<i64>(7)? != 0,
            user_confused: row.get::<i64>(8)? != 0,
            clarification_needed: row.get::<i64>(9)? != 0,
            response_time_ms: row.get::<Option<i64>>(10)?.map(|ms| ms.max(0) as u64),
            tokens_used: row.get::<Option<i64>>(11)?.map(|t| t.max(0) as u32),
            metadata: row
                .get::<Option<String>>(12)?
                .and_then(|raw| serde_json::from_str(&raw).ok())
                .unwrap_or_default(),
            created_at: parse_timestamp(&row.get::<String>(13)?),
        })
    }
}

const COLUMNS: &str = "id, user_id, event_id, message_id, intent, confidence_level, \
    response_type, user_corrected, user_confused, clarification_needed, \
    response_time_ms, tokens_used, metadata, created_at";
