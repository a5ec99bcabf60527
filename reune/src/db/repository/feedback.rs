use libsql::{params, Connection};

use super::{parse_timestamp, timestamp};
use crate::error::{Result, ReuneError};
use crate::models::{FeedbackStats, UserFeedback};

pub struct FeedbackRepository;

impl FeedbackRepository {
    pub async fn create(conn: &Connection, feedback: &UserFeedback) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO user_feedback (
                id, user_id, event_id, message_id, feedback_type, rating, comment,
                metadata, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9
            )
            "#,
            params![
                feedback.id.clone(),
                feedback.user_id.clone(),
                feedback.event_id.clone(),
                feedback.message_id.clone(),
                feedback.feedback_type.to_string(),
                feedback.rating.map(i64::from),
                feedback.comment.clone(),
                serde_json::to_string(&feedback.metadata)?,
                timestamp(&feedback.created_at),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn list_by_user(
        conn: &Connection,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<UserFeedback>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, user_id, event_id, message_id, feedback_type, rating, comment,
                       metadata, created_at
                FROM user_feedback
                WHERE user_id = ?1
                ORDER BY created_at DESC
                LIMIT ?2
                "#,
                params![user_id, limit as i64],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_feedback(&row)?);
        }

        Ok(results)
    }

    pub async fn stats(conn: &Connection, user_id: &str) -> Result<FeedbackStats> {
        let mut rows = conn
            .query(
                r#"
                SELECT
                    COALESCE(SUM(feedback_type = 'thumbs_up'), 0),
                    COALESCE(SUM(feedback_type = 'thumbs_down'), 0),
                    COUNT(*)
                FROM user_feedback
                WHERE user_id = ?1
                "#,
                params![user_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(FeedbackStats {
                positive: row.get::<i64>(0)? as u32,
                negative: row.get::<i64>(1)? as u32,
                total: row.get::<i64>(2)? as u32,
            }),
            None => Ok(FeedbackStats::default()),
        }
    }

    fn row_to_feedback(row: &libsql::Row) -> Result<UserFeedback> {
        Ok(UserFeedback {
            id: row.get(0)?,
            user_id: row.get(1)?,
            event_id: row.get(2)?,
            message_id: row.get(3)?,
            feedback_type: row
                .get::<String>(4)?
                .parse()
                .map_err(ReuneError::Validation)?,
            rating: row
                .get::<Option<i64>>(5)?
                .and_then(|r| u8::try_from(r).ok()),
            comment: row.get(6)?,
            metadata: row
                .get::<Option<String>>(7)?
                .and_then(|raw| serde_json::from_str(&raw).ok())
                .unwrap_or_default(),
            created_at: parse_timestamp(&row.get::<String>(8)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use crate::models::FeedbackType;
    use chrono::{Duration, Utc};

    async fn setup_test_db() -> Connection {
        let conn = libsql::Builder::new_local(":memory:")
            .build()
            .await
            .unwrap()
            .connect()
            .unwrap();
        schema::init_schema(&conn).await.unwrap();
        conn
    }

    fn feedback(id: &str, user_id: &str, kind: FeedbackType) -> UserFeedback {
        UserFeedback {
            id: id.to_string(),
            user_id: user_id.to_string(),
            event_id: None,
            message_id: Some("m1".to_string()),
            feedback_type: kind,
            rating: Some(4),
            comment: None,
            metadata: Default::default(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_stats_count_by_type() {
        let conn = setup_test_db().await;
        for (id, kind) in [
            ("f1", FeedbackType::ThumbsUp),
            ("f2", FeedbackType::ThumbsUp),
            ("f3", FeedbackType::ThumbsDown),
            ("f4", FeedbackType::Suggestion),
        ] {
            FeedbackRepository::create(&conn, &feedback(id, "user1", kind))
                .await
                .unwrap();
        }
        FeedbackRepository::create(&conn, &feedback("f5", "user2", FeedbackType::ThumbsUp))
            .await
            .unwrap();

        let stats = FeedbackRepository::stats(&conn, "user1").await.unwrap();
        assert_eq!(
            stats,
            FeedbackStats {
                positive: 2,
                negative: 1,
                total: 4
            }
        );
    }

    #[tokio::test]
    async fn test_stats_empty_user() {
        let conn = setup_test_db().await;
        let stats = FeedbackRepository::stats(&conn, "nobody").await.unwrap();
        assert_eq!(stats, FeedbackStats::default());
    }

    #[tokio::test]
    async fn test_list_newest_first() {
        let conn = setup_test_db().await;
        let mut older = feedback("f1", "user1", FeedbackType::Report);
        older.created_at = Utc::now() - Duration::hours(1);
        older.comment = Some("resposta estranha".to_string());
        FeedbackRepository::create(&conn, &older).await.unwrap();
        FeedbackRepository::create(&conn, &feedback("f2", "user1", FeedbackType::ThumbsUp))
            .await
            .unwrap();

        let listed = FeedbackRepository::list_by_user(&conn, "user1", 10)
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].id, "f2");
        assert_eq!(listed[1].feedback_type, FeedbackType::Report);
        assert_eq!(listed[1].comment.as_deref(), Some("resposta estranha"));
        assert_eq!(listed[1].rating, Some(4));
    }
}
