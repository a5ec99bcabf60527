//! Chat turn and history DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::planning::SuggestedItemDto;
use super::wire_tag;
use crate::conversation::{ProactiveAction, TurnOutcome};
use crate::models::{CollectedData, ConversationContext, ConversationMessage};

/// Request body for `POST /v1/chat/turns`.
#[derive(Debug, Clone, Deserialize, Validate, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnRequest {
    #[validate(length(min = 1, max = 128))]
    pub user_id: String,
    /// The user's utterance.
    #[validate(length(min = 1, max = 4000))]
    pub message: String,
    /// Event on the hosted platform this conversation is about.
    pub event_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProactiveActionDto {
    /// `suggestion`, `reminder`, `automation` or `clarification`.
    #[serde(rename = "type")]
    pub kind: String,
    /// Ready-to-display text, emoji included.
    pub message: String,
    pub action_label: Option<String>,
    pub auto_execute: bool,
}

impl ProactiveActionDto {
    fn new(action: ProactiveAction, message: String, auto_execute: bool) -> Self {
        Self {
            kind: wire_tag(&action.kind),
            message,
            action_label: action.action_label,
            auto_execute,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CollectedDataDto {
    pub category: Option<String>,
    pub subtype: Option<String>,
    pub purpose: Option<String>,
    pub menu: Option<String>,
    pub headcount: Option<u32>,
    pub date: Option<String>,
    pub time: Option<String>,
}

impl From<CollectedData> for CollectedDataDto {
    fn from(data: CollectedData) -> Self {
        Self {
            category: data.category,
            subtype: data.subtype,
            purpose: data.purpose,
            menu: data.menu,
            headcount: data.headcount,
            date: data.date,
            time: data.time,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ConversationContextDto {
    pub state: String,
    pub event_id: Option<String>,
    pub collected_data: CollectedDataDto,
    pub missing_slots: Vec<String>,
    pub confidence_level: f32,
    pub last_intent: Option<String>,
}

impl From<ConversationContext> for ConversationContextDto {
    fn from(context: ConversationContext) -> Self {
        Self {
            state: context.state,
            event_id: context.event_id,
            collected_data: context.collected_data.into(),
            missing_slots: context.missing_slots,
            confidence_level: context.confidence_level,
            last_intent: context.last_intent.map(|i| i.as_str().to_string()),
        }
    }
}

/// Response for `POST /v1/chat/turns`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatTurnResponse {
    pub reply: String,
    /// `template`, `correction`, `clarification`, `date_warning`,
    /// `items_generated` or `farewell`.
    pub reply_kind: String,
    pub intent: String,
    pub confidence: f32,
    pub needs_clarification: bool,
    pub suggested_replies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proactive: Option<ProactiveActionDto>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggested_items: Vec<SuggestedItemDto>,
    pub analytic_id: Option<String>,
    pub context: ConversationContextDto,
}

impl From<TurnOutcome> for ChatTurnResponse {
    fn from(outcome: TurnOutcome) -> Self {
        let reply_kind = wire_tag(&outcome.reply_kind);
        let proactive = match (outcome.proactive_action, outcome.proactive_message) {
            (Some(action), Some(message)) => Some(ProactiveActionDto::new(
                action,
                message,
                outcome.auto_execute,
            )),
            _ => None,
        };

        Self {
            reply: outcome.reply,
            reply_kind,
            intent: outcome.intent.as_str().to_string(),
            confidence: outcome.confidence,
            needs_clarification: outcome.needs_clarification,
            suggested_replies: outcome.suggested_replies,
            proactive,
            suggested_items: outcome
                .suggested_items
                .into_iter()
                .map(Into::into)
                .collect(),
            analytic_id: outcome.analytic_id,
            context: outcome.context.into(),
        }
    }
}

/// Query parameters for `GET /v1/chat/{userId}/messages`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema, utoipa::IntoParams)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesQuery {
    /// Maximum messages to return (default 50, max 200).
    pub limit: Option<u32>,
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    /// `user`, `assistant` or `system`.
    pub role: String,
    pub content: String,
    pub event_id: Option<String>,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<ConversationMessage> for MessageResponse {
    fn from(message: ConversationMessage) -> Self {
        Self {
            id: message.id,
            role: message.role.to_string(),
            content: message.content,
            event_id: message.event_id,
            created_at: message.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ClearContextResponse {
    pub user_id: String,
    pub cleared: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn turn_request_deserializes_camel_case() {
        let json = r#"{"userId": "u1", "message": "Churrasco para 20", "eventId": "42"}"#;
        let req: ChatTurnRequest = serde_json::from_str(json).expect("deserialize");
        assert_eq!(req.user_id, "u1");
        assert_eq!(req.event_id.as_deref(), Some("42"));
        assert!(req.validate().is_ok());
    }

    #[test]
    fn empty_message_fails_validation() {
        let req = ChatTurnRequest {
            user_id: "u1".to_string(),
            message: String::new(),
            event_id: None,
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn context_dto_serializes_camel_case() {
        let context = ConversationContext::initial("u1");
        let json = serde_json::to_value(ConversationContextDto::from(context)).expect("serialize");
        assert_eq!(json["state"], "idle");
        assert!(json.get("collectedData").is_some());
        assert!(json.get("missingSlots").is_some());
    }
}
