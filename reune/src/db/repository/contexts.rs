use libsql::{params, Connection};

use super::{parse_timestamp, timestamp};
use crate::error::Result;
use crate::models::ConversationContext;

pub struct ContextRepository;

impl ContextRepository {
    pub async fn get_by_user(conn: &Connection, user_id: &str) -> Result<Option<ConversationContext>> {
        let mut rows = conn
            .query(
                r#"
                SELECT user_id, state, event_id, collected_data, missing_slots,
                       confidence_level, last_intent, summary, last_proactive_at, updated_at
                FROM conversation_contexts
                WHERE user_id = ?1
                "#,
                params![user_id],
            )
            .await?;

        match rows.next().await? {
            Some(row) => Ok(Some(Self::row_to_context(&row)?)),
            None => Ok(None),
        }
    }

    pub async fn upsert(conn: &Connection, context: &ConversationContext) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO conversation_contexts (
                user_id, state, event_id, collected_data, missing_slots,
                confidence_level, last_intent, summary, last_proactive_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10
            )
            ON CONFLICT(user_id) DO UPDATE SET
                state = excluded.state,
                event_id = excluded.event_id,
                collected_data = excluded.collected_data,
                missing_slots = excluded.missing_slots,
                confidence_level = excluded.confidence_level,
                last_intent = excluded.last_intent,
                summary = excluded.summary,
                last_proactive_at = excluded.last_proactive_at,
                updated_at = excluded.updated_at
            "#,
            params![
                context.user_id.clone(),
                context.state.clone(),
                context.event_id.clone(),
                serde_json::to_string(&context.collected_data)?,
                serde_json::to_string(&context.missing_slots)?,
                context.confidence_level as f64,
                context.last_intent.map(|intent| intent.as_str().to_string()),
                context.summary.clone(),
                context.last_proactive_at.as_ref().map(timestamp),
                timestamp(&context.updated_at),
            ],
        )
        .await?;

        Ok(())
    }

    fn row_to_context(row: &libsql::Row) -> Result<ConversationContext> {
        Ok(ConversationContext {
            user_id: row.get(0)?,
            state: row.get(1)?,
            event_id: row.get(2)?,
            collected_data: serde_json::from_str(&row.get::<String>(3)?).unwrap_or_default(),
            missing_slots: serde_json::from_str(&row.get::<String>(4)?).unwrap_or_default(),
            confidence_level: row.get::<f64>(5)? as f32,
            last_intent: row
                .get::<Option<String>>(6)?
                .and_then(|raw| raw.parse().ok()),
            summary: row.get(7)?,
            last_proactive_at: row
                .get::<Option<String>>(8)?
                .map(|raw| parse_timestamp(&raw)),
            updated_at: parse_timestamp(&row.get::<String>(9)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::schema;
    use crate::models::{Intent, STATE_COLLECTING_CORE};
    use chrono::Utc;

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

    #[tokio::test]
    async fn test_missing_context_is_none() {
        let conn = setup_test_db().await;
        assert!(ContextRepository::get_by_user(&conn, "user1")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_upsert_replaces_row() {
        let conn = setup_test_db().await;
        let mut context = ConversationContext::initial("user1");
        ContextRepository::upsert(&conn, &context).await.unwrap();

        context.state = STATE_COLLECTING_CORE.to_string();
        context.event_id = Some("42".to_string());
        context.collected_data.subtype = Some("churrasco".to_string());
        context.collected_data.headcount = Some(20);
        context.missing_slots = context.collected_data.missing_slots();
        context.last_intent = Some(Intent::CreateEvent);
        context.last_proactive_at = Some(Utc::now());
        ContextRepository::upsert(&conn, &context).await.unwrap();

        let loaded = ContextRepository::get_by_user(&conn, "user1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(loaded.state, STATE_COLLECTING_CORE);
        assert_eq!(loaded.event_id.as_deref(), Some("42"));
        assert_eq!(loaded.collected_data, context.collected_data);
        assert_eq!(loaded.missing_slots, vec!["data_evento".to_string()]);
        assert_eq!(loaded.last_intent, Some(Intent::CreateEvent));
        assert!(loaded.last_proactive_at.is_some());
    }
}
