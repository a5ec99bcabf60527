use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::analysis::{Intent, MessageAnalysis};

/// State tag of a fresh or cleared conversation.
pub const STATE_IDLE: &str = "idle";
pub const STATE_COLLECTING_CORE: &str = "collecting_core";
pub const STATE_AWAITING_ITEMS_CONFIRMATION: &str = "awaiting_items_confirmation";
pub const STATE_ITEMS_CONFIRMED: &str = "items_confirmed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

impl std::fmt::Display for MessageRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
            Self::System => write!(f, "system"),
        }
    }
}

impl std::str::FromStr for MessageRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            "system" => Ok(Self::System),
            _ => Err(format!("Unknown message role: {s}")),
        }
    }
}

/// One persisted line of conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub id: String,
    pub user_id: String,
    pub event_id: Option<String>,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Fields gathered across turns, stored as JSON with the platform's keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct CollectedData {
    #[serde(rename = "categoria_evento", skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(rename = "subtipo_evento", skip_serializing_if = "Option::is_none")]
    pub subtype: Option<String>,
    #[serde(rename = "finalidade_evento", skip_serializing_if = "Option::is_none")]
    pub purpose: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<String>,
    #[serde(rename = "qtd_pessoas", skip_serializing_if = "Option::is_none")]
    pub headcount: Option<u32>,
    #[serde(rename = "data_evento", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(rename = "hora_evento", skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

impl CollectedData {
    /// Fill in whatever the analysis extracted, keeping earlier values for
    /// fields the new utterance did not mention.
    pub fn merge_from(&mut self, analysis: &MessageAnalysis) {
        fn take(slot: &mut Option<String>, value: &Option<String>) {
            if let Some(v) = value.as_ref().filter(|v| !v.trim().is_empty()) {
                *slot = Some(v.clone());
            }
        }

        take(&mut self.category, &analysis.category);
        take(&mut self.subtype, &analysis.subtype);
        take(&mut self.purpose, &analysis.purpose);
        take(&mut self.menu, &analysis.menu);
        take(&mut self.date, &analysis.date);
        take(&mut self.time, &analysis.time);
        if let Some(n) = analysis.headcount.filter(|n| *n > 0) {
            self.headcount = Some(n);
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Name used when talking about the event: category first, then subtype.
    pub fn display_kind(&self) -> Option<&str> {
        self.category.as_deref().or(self.subtype.as_deref())
    }

    /// Slots the core flow still needs before items can be generated.
    pub fn missing_slots(&self) -> Vec<String> {
        let mut missing = Vec::new();
        if self.display_kind().is_none() {
            missing.push("tipo_evento".to_string());
        }
        if self.headcount.is_none() {
            missing.push("qtd_pessoas".to_string());
        }
        if self.date.is_none() {
            missing.push("data_evento".to_string());
        }
        missing
    }
}

/// Per-user conversation state persisted between turns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub user_id: String,
    pub state: String,
    pub event_id: Option<String>,
    pub collected_data: CollectedData,
    pub missing_slots: Vec<String>,
    pub confidence_level: f32,
    pub last_intent: Option<Intent>,
    pub summary: Option<String>,
    /// When the last unsolicited suggestion was shown to this user.
    pub last_proactive_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl ConversationContext {
    pub fn initial(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            state: STATE_IDLE.to_string(),
            event_id: None,
            collected_data: CollectedData::default(),
            missing_slots: Vec::new(),
            confidence_level: 0.5,
            last_intent: None,
            summary: None,
            last_proactive_at: None,
            updated_at: Utc::now(),
        }
    }
}
