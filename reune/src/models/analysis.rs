use serde::{Deserialize, Serialize};

/// What the user is trying to do in a single utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Intent {
    #[serde(rename = "criar_evento")]
    CreateEvent,
    #[serde(rename = "definir_menu")]
    DefineMenu,
    #[serde(rename = "confirmar_evento")]
    ConfirmEvent,
    #[serde(rename = "mostrar_itens")]
    ShowItems,
    #[serde(rename = "editar_evento")]
    EditEvent,
    #[serde(rename = "adicionar_participantes")]
    AddParticipants,
    #[serde(rename = "encerrar_conversa")]
    EndConversation,
    #[serde(rename = "out_of_domain")]
    OutOfDomain,
    #[default]
    #[serde(rename = "desconhecida", other)]
    Unknown,
}

impl Intent {
    pub const ALL: [Intent; 9] = [
        Intent::CreateEvent,
        Intent::DefineMenu,
        Intent::ConfirmEvent,
        Intent::ShowItems,
        Intent::EditEvent,
        Intent::AddParticipants,
        Intent::EndConversation,
        Intent::OutOfDomain,
        Intent::Unknown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CreateEvent => "criar_evento",
            Self::DefineMenu => "definir_menu",
            Self::ConfirmEvent => "confirmar_evento",
            Self::ShowItems => "mostrar_itens",
            Self::EditEvent => "editar_evento",
            Self::AddParticipants => "adicionar_participantes",
            Self::EndConversation => "encerrar_conversa",
            Self::OutOfDomain => "out_of_domain",
            Self::Unknown => "desconhecida",
        }
    }

    /// Intents that never need a follow-up question.
    pub fn is_always_clear(&self) -> bool {
        matches!(
            self,
            Self::ConfirmEvent | Self::ShowItems | Self::EndConversation
        )
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Intent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_lowercase();
        Intent::ALL
            .into_iter()
            .find(|intent| intent.as_str() == normalized)
            .ok_or_else(|| format!("Unknown intent: {s}"))
    }
}

/// Structured reading of one user utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct MessageAnalysis {
    pub intent: Intent,
    /// Social form of the gathering (almoço, jantar, lanche...).
    pub category: Option<String>,
    /// Culinary style (churrasco, feijoada, pizza...).
    pub subtype: Option<String>,
    /// Emotional motive (aniversário, confraternização...).
    pub purpose: Option<String>,
    pub menu: Option<String>,
    pub headcount: Option<u32>,
    /// ISO `YYYY-MM-DD` when a date could be normalized.
    pub date: Option<String>,
    pub time: Option<String>,
    pub includes_drinks: Option<bool>,
    pub includes_starters: Option<bool>,
    pub confidence: f32,
}

/// Already-known event facts handed to the analyzer and the classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct AnalysisContext {
    pub event_type: Option<String>,
    pub headcount: Option<u32>,
    pub date: Option<String>,
    pub menu: Option<String>,
    pub event_status: Option<String>,
}

/// Outcome of intent classification for one turn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IntentClassification {
    pub intent: Intent,
    pub confidence: f32,
    pub needs_clarification: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_replies: Option<Vec<String>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_round_trips_wire_tags() {
        for intent in Intent::ALL {
            let parsed: Intent = intent.as_str().parse().expect("parse");
            assert_eq!(parsed, intent);
        }
    }

    #[test]
    fn unknown_wire_tag_deserializes_as_unknown() {
        let intent: Intent = serde_json::from_str("\"pedir_pizza\"").expect("deserialize");
        assert_eq!(intent, Intent::Unknown);
    }

    #[test]
    fn always_clear_intents() {
        assert!(Intent::ConfirmEvent.is_always_clear());
        assert!(Intent::ShowItems.is_always_clear());
        assert!(Intent::EndConversation.is_always_clear());
        assert!(!Intent::CreateEvent.is_always_clear());
    }
}
