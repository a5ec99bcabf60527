//! Event-plan entities owned by the hosted platform.
//!
//! Field names on the wire follow the platform's Portuguese schema; the Rust
//! side uses English names and `serde(rename)` to bridge them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum EventStatus {
    #[serde(rename = "draft")]
    Draft,
    #[default]
    #[serde(rename = "collecting_core")]
    CollectingCore,
    #[serde(rename = "itens_pendentes_confirmacao")]
    ItemsPendingConfirmation,
    #[serde(rename = "distrib_pendente_confirmacao")]
    DistributionPendingConfirmation,
    #[serde(rename = "finalizado")]
    Finalized,
    #[serde(rename = "aguardando_data")]
    AwaitingDate,
    #[serde(rename = "aguardando_decisao_data")]
    AwaitingDateDecision,
    #[serde(rename = "past")]
    Past,
    #[serde(rename = "cancelled")]
    Cancelled,
    #[serde(other)]
    Unknown,
}

impl EventStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::CollectingCore => "collecting_core",
            Self::ItemsPendingConfirmation => "itens_pendentes_confirmacao",
            Self::DistributionPendingConfirmation => "distrib_pendente_confirmacao",
            Self::Finalized => "finalizado",
            Self::AwaitingDate => "aguardando_data",
            Self::AwaitingDateDecision => "aguardando_decisao_data",
            Self::Past => "past",
            Self::Cancelled => "cancelled",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Event {
    pub id: String,
    #[serde(rename = "usuario_id", default)]
    pub user_id: String,
    #[serde(rename = "nome_evento", default)]
    pub name: String,
    #[serde(rename = "tipo_evento", default)]
    pub event_type: Option<String>,
    #[serde(rename = "categoria_evento", default)]
    pub category: Option<String>,
    #[serde(rename = "subtipo_evento", default)]
    pub subtype: Option<String>,
    #[serde(rename = "finalidade_evento", default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub menu: Option<String>,
    /// ISO date or date-time as stored by the platform.
    #[serde(rename = "data_evento", default)]
    pub date: Option<String>,
    #[serde(rename = "hora_evento", default)]
    pub time: Option<String>,
    #[serde(rename = "qtd_pessoas", default)]
    pub headcount: Option<u32>,
    #[serde(rename = "inclui_bebidas", default)]
    pub includes_drinks: Option<bool>,
    #[serde(rename = "inclui_entradas", default)]
    pub includes_starters: Option<bool>,
    #[serde(default)]
    pub status: EventStatus,
}

impl Event {
    /// Calendar date of the event, ignoring any time component.
    pub fn calendar_date(&self) -> Option<NaiveDate> {
        let raw = self.date.as_deref()?.trim();
        let day = raw.get(..10).unwrap_or(raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
    }

    pub fn has_date(&self) -> bool {
        self.date.as_deref().is_some_and(|d| !d.trim().is_empty())
    }

    pub fn has_type(&self) -> bool {
        self.event_type
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }

    pub fn has_headcount(&self) -> bool {
        self.headcount.is_some_and(|n| n > 0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ItemPriority {
    A,
    #[default]
    B,
    C,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "evento_id", default)]
    pub event_id: Option<String>,
    #[serde(rename = "nome_item")]
    pub name: String,
    #[serde(rename = "quantidade")]
    pub quantity: f64,
    #[serde(rename = "unidade")]
    pub unit: String,
    #[serde(rename = "valor_estimado", default)]
    pub estimated_value: f64,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "prioridade", default)]
    pub priority: ItemPriority,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(rename = "evento_id", default)]
    pub event_id: Option<String>,
    #[serde(rename = "nome_participante")]
    pub name: String,
    #[serde(rename = "contato", default)]
    pub contact: Option<String>,
    #[serde(rename = "status_convite", default = "default_invite_status")]
    pub invite_status: String,
    #[serde(rename = "valor_responsavel", default)]
    pub amount_due: Option<f64>,
}

fn default_invite_status() -> String {
    "pendente".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionRow {
    #[serde(default)]
    pub id: Option<String>,
    pub item_id: String,
    #[serde(rename = "participante_id")]
    pub participant_id: String,
    #[serde(rename = "quantidade_atribuida")]
    pub assigned_quantity: f64,
    #[serde(rename = "valor_rateado")]
    pub shared_value: f64,
    #[serde(rename = "observacoes", default)]
    pub notes: Option<String>,
}

/// Full snapshot returned by `get_event_plan`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPlan {
    #[serde(rename = "evento")]
    pub event: Event,
    #[serde(rename = "itens", default)]
    pub items: Vec<Item>,
    #[serde(rename = "participantes", default)]
    pub participants: Vec<Participant>,
    #[serde(rename = "distribuicao", default)]
    pub distribution: Vec<DistributionRow>,
}

impl EventPlan {
    pub fn has_items(&self) -> bool {
        !self.items.is_empty()
    }

    pub fn has_participants(&self) -> bool {
        !self.participants.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticipantShare {
    #[serde(rename = "participante_id")]
    pub participant_id: String,
    pub total: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionSummary {
    #[serde(rename = "porParticipante", default)]
    pub per_participant: Vec<ParticipantShare>,
    #[serde(rename = "custoTotal", default)]
    pub total_cost: f64,
}

/// Item produced by an estimation profile before it is tied to an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestedItem {
    #[serde(rename = "nome_item")]
    pub name: String,
    #[serde(rename = "quantidade")]
    pub quantity: f64,
    #[serde(rename = "unidade")]
    pub unit: String,
    #[serde(rename = "categoria")]
    pub category: String,
    #[serde(rename = "prioridade")]
    pub priority: ItemPriority,
    #[serde(rename = "valor_estimado")]
    pub estimated_value: f64,
}

impl SuggestedItem {
    pub fn into_item(self, event_id: &str) -> Item {
        Item {
            id: None,
            event_id: Some(event_id.to_string()),
            name: self.name,
            quantity: self.quantity,
            unit: self.unit,
            estimated_value: self.estimated_value,
            category: self.category,
            priority: self.priority,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_deserializes_platform_shape() {
        let json = r#"{
            "id": "42",
            "usuario_id": "u1",
            "nome_evento": "Churras",
            "tipo_evento": "churrasco",
            "data_evento": "2025-12-20T00:00:00+00:00",
            "qtd_pessoas": 20,
            "status": "itens_pendentes_confirmacao"
        }"#;
        let event: Event = serde_json::from_str(json).expect("deserialize");
        assert_eq!(event.headcount, Some(20));
        assert_eq!(event.status, EventStatus::ItemsPendingConfirmation);
        assert_eq!(
            event.calendar_date(),
            NaiveDate::from_ymd_opt(2025, 12, 20)
        );
    }

    #[test]
    fn unknown_status_is_tolerated() {
        let event: Event =
            serde_json::from_str(r#"{"id": "1", "status": "arquivado"}"#).expect("deserialize");
        assert_eq!(event.status, EventStatus::Unknown);
        assert!(!event.has_date());
        assert!(!event.has_headcount());
    }

    #[test]
    fn blank_type_counts_as_missing() {
        let event = Event {
            event_type: Some("  ".to_string()),
            ..Default::default()
        };
        assert!(!event.has_type());
    }
}
