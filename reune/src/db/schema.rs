use libsql::Connection;

use crate::error::Result;

pub async fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
        -- One row per handled turn
        CREATE TABLE IF NOT EXISTS conversation_analytics (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            event_id TEXT,
            message_id TEXT,
            intent TEXT NOT NULL,
            confidence_level REAL NOT NULL,
            response_type TEXT NOT NULL DEFAULT 'template',
            user_corrected INTEGER NOT NULL DEFAULT 0,
            user_confused INTEGER NOT NULL DEFAULT 0,
            clarification_needed INTEGER NOT NULL DEFAULT 0,
            response_time_ms INTEGER,
            tokens_used INTEGER,
            metadata TEXT DEFAULT '{}',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_analytics_user_created
            ON conversation_analytics(user_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_analytics_intent ON conversation_analytics(intent);

        -- Explicit user feedback on replies
        CREATE TABLE IF NOT EXISTS user_feedback (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            event_id TEXT,
            message_id TEXT,
            feedback_type TEXT NOT NULL,
            rating INTEGER,
            comment TEXT,
            metadata TEXT DEFAULT '{}',
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_feedback_user ON user_feedback(user_id, created_at);

        -- Conversation history
        CREATE TABLE IF NOT EXISTS conversation_messages (
            id TEXT PRIMARY KEY,
            user_id TEXT NOT NULL,
            event_id TEXT,
            role TEXT NOT NULL,
            content TEXT NOT NULL,
            created_at TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_messages_user_created
            ON conversation_messages(user_id, created_at);

        -- Per-user conversation state
        CREATE TABLE IF NOT EXISTS conversation_contexts (
            user_id TEXT PRIMARY KEY,
            state TEXT NOT NULL DEFAULT 'idle',
            event_id TEXT,
            collected_data TEXT NOT NULL DEFAULT '{}',
            missing_slots TEXT NOT NULL DEFAULT '[]',
            confidence_level REAL NOT NULL DEFAULT 0.5,
            last_intent TEXT,
            summary TEXT,
            last_proactive_at TEXT,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .await?;

    Ok(())
}
