//! Turns situational insights into user-facing actions.

use serde::Serialize;

use super::situational::{InsightPayload, InsightType, NextStep, SituationalInsight};
use crate::models::{Event, EventStatus};

/// Tags of actions that are safe to run without asking.
const SAFE_AUTOMATIONS: [&str; 2] = ["generate_items", "show_summary"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Suggestion,
    Reminder,
    Automation,
    Clarification,
}

impl ActionType {
    pub fn emoji(&self) -> &'static str {
        match self {
            Self::Suggestion => "💡",
            Self::Reminder => "⏰",
            Self::Automation => "✨",
            Self::Clarification => "🤔",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ActionPayload {
    Insight(InsightPayload),
    Action { action: String },
    EventReminder { event_id: String, days_until: i64 },
}

impl ActionPayload {
    /// Tag used to decide whether the action may run unattended.
    pub fn action_tag(&self) -> Option<&str> {
        match self {
            Self::Action { action } => Some(action),
            Self::Insight(InsightPayload::NextStep { step }) => Some(step.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProactiveAction {
    #[serde(rename = "type")]
    pub kind: ActionType,
    pub message: String,
    pub action_label: Option<String>,
    pub auto_execute: bool,
    pub payload: Option<ActionPayload>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AutomationPreferences {
    pub disable_auto_actions: bool,
}

pub fn generate_proactive_action(insight: &SituationalInsight) -> ProactiveAction {
    let payload = Some(ActionPayload::Insight(insight.payload.clone()));

    match insight.kind {
        InsightType::IncompleteEvent => ProactiveAction {
            kind: ActionType::Suggestion,
            message: format!(
                "{} {}",
                insight.message,
                insight.suggested_action.as_deref().unwrap_or_default()
            ),
            action_label: Some("Continuar".to_string()),
            auto_execute: false,
            payload,
        },
        InsightType::ApproachingEvent => ProactiveAction {
            kind: ActionType::Reminder,
            message: insight.message.clone(),
            action_label: insight.suggested_action.clone(),
            auto_execute: false,
            payload,
        },
        InsightType::ReadyForNextStep => ProactiveAction {
            kind: ActionType::Suggestion,
            message: insight.message.clone(),
            action_label: insight.suggested_action.clone(),
            auto_execute: matches!(
                insight.payload,
                InsightPayload::NextStep {
                    step: NextStep::GenerateItems
                }
            ),
            payload,
        },
        InsightType::StaleConversation => ProactiveAction {
            kind: ActionType::Suggestion,
            message: insight.message.clone(),
            action_label: Some("Sim, vamos continuar!".to_string()),
            auto_execute: false,
            payload,
        },
        InsightType::MissingCriticalInfo => ProactiveAction {
            kind: ActionType::Clarification,
            message: insight.message.clone(),
            action_label: Some("Responder".to_string()),
            auto_execute: false,
            payload,
        },
    }
}

fn automation(message: &str, label: &str, action: &str) -> ProactiveAction {
    ProactiveAction {
        kind: ActionType::Automation,
        message: message.to_string(),
        action_label: Some(label.to_string()),
        auto_execute: false,
        payload: Some(ActionPayload::Action {
            action: action.to_string(),
        }),
    }
}

/// Follow-ups implied by the event status alone.
pub fn generate_complementary_automations(event: &Event) -> Vec<ProactiveAction> {
    match event.status {
        EventStatus::DistributionPendingConfirmation => vec![automation(
            "Show! Lista confirmada. Agora vamos pros participantes?",
            "Adicionar participantes",
            "add_participants",
        )],
        EventStatus::Finalized => vec![automation(
            "Prontinho! Seu evento tá todo organizado. Quer um resumo completo?",
            "Ver resumo",
            "show_summary",
        )],
        _ => Vec::new(),
    }
}

pub fn generate_time_based_reminder(event: &Event, days_until: i64) -> Option<ProactiveAction> {
    let (message, label) = match days_until {
        1 => (
            "⏰ Ei! Seu evento é amanhã. Tá tudo confirmado?",
            Some("Revisar evento".to_string()),
        ),
        0 => ("🎉 Hoje é o dia! Boa sorte com o evento!", None),
        _ => return None,
    };

    Some(ProactiveAction {
        kind: ActionType::Reminder,
        message: message.to_string(),
        action_label: label,
        auto_execute: false,
        payload: Some(ActionPayload::EventReminder {
            event_id: event.id.clone(),
            days_until,
        }),
    })
}

/// Prefix the type emoji unless the message already carries it. The label is
/// rendered separately as a quick reply.
pub fn format_proactive_message(action: &ProactiveAction) -> String {
    let emoji = action.kind.emoji();
    if action.message.contains(emoji) {
        action.message.clone()
    } else {
        format!("{emoji} {}", action.message)
    }
}

pub fn should_auto_execute(
    action: &ProactiveAction,
    prefs: Option<&AutomationPreferences>,
) -> bool {
    if !action.auto_execute {
        return false;
    }
    if prefs.is_some_and(|p| p.disable_auto_actions) {
        return false;
    }

    action
        .payload
        .as_ref()
        .and_then(ActionPayload::action_tag)
        .is_some_and(|tag| SAFE_AUTOMATIONS.contains(&tag))
}
