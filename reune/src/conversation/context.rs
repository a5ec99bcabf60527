use std::sync::Arc;

use chrono::Utc;
use nanoid::nanoid;

use crate::db::{ContextStore, MessageStore};
use crate::error::Result;
use crate::llm::ChatMessage;
use crate::models::{ConversationContext, ConversationMessage, MessageRole};

/// Persistent per-user conversation memory.
#[derive(Clone)]
pub struct ContextManager {
    contexts: Arc<dyn ContextStore>,
    messages: Arc<dyn MessageStore>,
    history_limit: u32,
}

impl ContextManager {
    pub fn new(
        contexts: Arc<dyn ContextStore>,
        messages: Arc<dyn MessageStore>,
        history_limit: u32,
    ) -> Self {
        Self {
            contexts,
            messages,
            history_limit,
        }
    }

    /// Load the user's context, creating and storing the initial one on first
    /// contact, together with the recent history.
    pub async fn load_user_context(
        &self,
        user_id: &str,
    ) -> Result<(ConversationContext, Vec<ConversationMessage>)> {
        let context = match self.contexts.get_context(user_id).await? {
            Some(context) => context,
            None => {
                tracing::debug!(user_id = %user_id, "Creating initial conversation context");
                let context = ConversationContext::initial(user_id);
                self.contexts.upsert_context(&context).await?;
                context
            }
        };

        let history = self.history(user_id).await?;
        Ok((context, history))
    }

    pub async fn history(&self, user_id: &str) -> Result<Vec<ConversationMessage>> {
        self.messages
            .recent_messages(user_id, self.history_limit)
            .await
    }

    pub async fn save_message(
        &self,
        user_id: &str,
        role: MessageRole,
        content: &str,
        event_id: Option<&str>,
    ) -> Result<ConversationMessage> {
        let message = ConversationMessage {
            id: nanoid!(),
            user_id: user_id.to_string(),
            event_id: event_id.map(str::to_string),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        };
        self.messages.insert_message(&message).await?;
        Ok(message)
    }

    pub async fn update_context(&self, context: &mut ConversationContext) -> Result<()> {
        context.updated_at = Utc::now();
        self.contexts.upsert_context(context).await
    }

    /// Drop the history and reset the context to its initial state.
    pub async fn clear_user_context(&self, user_id: &str) -> Result<()> {
        let removed = self.messages.clear_messages(user_id).await?;
        self.contexts
            .upsert_context(&ConversationContext::initial(user_id))
            .await?;
        tracing::info!(user_id = %user_id, removed, "Conversation context cleared");
        Ok(())
    }
}

/// History condensed for a chat model: older turns collapse into a single
/// system message, the last `max_recent` stay verbatim.
pub fn contextual_summary(
    messages: &[ConversationMessage],
    context: &ConversationContext,
    max_recent: usize,
) -> Vec<ChatMessage> {
    if messages.len() <= max_recent {
        return messages.iter().map(to_chat_message).collect();
    }

    let split = messages.len() - max_recent;
    let (old, recent) = messages.split_at(split);

    let mut history = Vec::with_capacity(max_recent + 1);
    history.push(ChatMessage::system(summarize_old_messages(old.len(), context)));
    history.extend(recent.iter().map(to_chat_message));
    history
}

fn summarize_old_messages(count: usize, context: &ConversationContext) -> String {
    let data = &context.collected_data;
    let mut parts = vec!["**Resumo da conversa anterior:**".to_string()];

    if !data.is_empty() {
        parts.push("Informações coletadas:".to_string());
        if let Some(category) = &data.category {
            parts.push(format!("- Tipo de evento: {category}"));
        }
        if let Some(subtype) = &data.subtype {
            parts.push(format!("- Subtipo: {subtype}"));
        }
        if let Some(headcount) = data.headcount {
            parts.push(format!("- Quantidade de pessoas: {headcount}"));
        }
        if let Some(menu) = &data.menu {
            parts.push(format!("- Menu: {menu}"));
        }
        if let Some(date) = &data.date {
            parts.push(format!("- Data: {date}"));
        }
    }

    if let Some(summary) = context.summary.as_deref().filter(|s| !s.is_empty()) {
        parts.push(format!("\nContexto adicional: {summary}"));
    }

    parts.push(format!("\nTotal de {count} mensagens anteriores resumidas acima."));
    parts.join("\n")
}

fn to_chat_message(message: &ConversationMessage) -> ChatMessage {
    match message.role {
        MessageRole::User => ChatMessage::user(&message.content),
        MessageRole::Assistant => ChatMessage::assistant(&message.content),
        MessageRole::System => ChatMessage::system(&message.content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ChatRole;

    fn message(i: usize) -> ConversationMessage {
        ConversationMessage {
            id: format!("m{i}"),
            user_id: "u1".to_string(),
            event_id: None,
            role: if i % 2 == 0 {
                MessageRole::User
            } else {
                MessageRole::Assistant
            },
            content: format!("mensagem {i}"),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn short_history_is_kept_verbatim() {
        let messages: Vec<_> = (0..4).map(message).collect();
        let context = ConversationContext::initial("u1");
        let history = contextual_summary(&messages, &context, 10);
        assert_eq!(history.len(), 4);
        assert_eq!(history[1].role, ChatRole::Assistant);
    }

    #[test]
    fn long_history_collapses_older_turns() {
        let messages: Vec<_> = (0..14).map(message).collect();
        let mut context = ConversationContext::initial("u1");
        context.collected_data.subtype = Some("churrasco".to_string());
        context.collected_data.headcount = Some(20);
        context.summary = Some("Usuário prefere sábado".to_string());

        let history = contextual_summary(&messages, &context, 10);
        assert_eq!(history.len(), 11);
        assert_eq!(history[0].role, ChatRole::System);
        assert_eq!(
            history[0].content,
            "**Resumo da conversa anterior:**\n\
             Informações coletadas:\n\
             - Subtipo: churrasco\n\
             - Quantidade de pessoas: 20\n\
             \nContexto adicional: Usuário prefere sábado\n\
             \nTotal de 4 mensagens anteriores resumidas acima."
        );
        assert_eq!(history[1].content, "mensagem 4");
    }
}
