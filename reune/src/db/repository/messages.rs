use libsql::{params, Connection};

use super::{parse_timestamp, timestamp};
use crate::error::{Result, ReuneError};
use crate::models::ConversationMessage;

pub struct MessageRepository;

impl MessageRepository {
    pub async fn create(conn: &Connection, message: &ConversationMessage) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO conversation_messages (
                id, user_id, event_id, role, content, created_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6
            )
            "#,
            params![
                message.id.clone(),
                message.user_id.clone(),
                message.event_id.clone(),
                message.role.to_string(),
                message.content.clone(),
                timestamp(&message.created_at),
            ],
        )
        .await?;

        Ok(())
    }

    /// Latest `limit` messages, returned oldest first.
    pub async fn recent_by_user(
        conn: &Connection,
        user_id: &str,
        limit: u32,
    ) -> Result<Vec<ConversationMessage>> {
        let mut rows = conn
            .query(
                r#"
                SELECT id, user_id, event_id, role, content, created_at
                FROM conversation_messages
                WHERE user_id = ?1
                ORDER BY created_at DESC, rowid DESC
                LIMIT ?2
                "#,
                params![user_id, limit as i64],
            )
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_message(&row)?);
        }
        results.reverse();

        Ok(results)
    }

    pub async fn delete_by_user(conn: &Connection, user_id: &str) -> Result<u64> {
        let deleted = conn
            .execute(
                "DELETE FROM conversation_messages WHERE user_id = ?1",
                params![user_id],
            )
            .await?;
        Ok(deleted)
    }

    fn row_to_message(row: &libsql::Row) -> Result<ConversationMessage> {
        Ok(ConversationMessage {
            id: row.get(0)?,
            user_id: row.get(1)?,
            event_id: row.get(2)?,
            role: row.get::<String>(3)?.parse().map_err(ReuneError::Validation)?,
            content: row.get(4)?,
            created_at: parse_timestamp(&row.get::<String>(5)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use crate::models::MessageRole;
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

    async fn insert(conn: &Connection, id: &str, user_id: &str, minutes_ago: i64) {
        let message = ConversationMessage {
            id: id.to_string(),
            user_id: user_id.to_string(),
            event_id: None,
            role: if minutes_ago % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            },
            content: format!("mensagem {id}"),
            created_at: Utc::now() - Duration::minutes(minutes_ago),
        };
        MessageRepository::create(conn, &message).await.unwrap();
    }

    #[tokio::test]
    async fn test_recent_returns_latest_in_order() {
        let conn = setup_test_db().await;
        insert(&conn, "m1", "user1", 30).await;
        insert(&conn, "m2", "user1", 20).await;
        insert(&conn, "m3", "user1", 10).await;
        insert(&conn, "x1", "user2", 5).await;

        let recent = MessageRepository::recent_by_user(&conn, "user1", 2)
            .await
            .unwrap();
        let ids: Vec<&str> = recent.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m2", "m3"]);
        assert_eq!(recent[1].role, MessageRole::User);
    }

    #[tokio::test]
    async fn test_delete_by_user() {
        let conn = setup_test_db().await;
        insert(&conn, "m1", "user1", 3).await;
        insert(&conn, "m2", "user1", 2).await;
        insert(&conn, "x1", "user2", 1).await;

        let deleted = MessageRepository::delete_by_user(&conn, "user1").await.unwrap();
        assert_eq!(deleted, 2);
        assert!(MessageRepository::recent_by_user(&conn, "user1", 10)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            MessageRepository::recent_by_user(&conn, "user2", 10)
                .await
                .unwrap()
                .len(),
            1
        );
    }
}
