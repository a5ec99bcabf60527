//! Derives unsolicited-message opportunities from the event and the
//! conversation timeline.

use chrono::{DateTime, Duration, Local, TimeZone, Utc};
use serde::Serialize;

use crate::config::ConversationConfig;
use crate::models::{ConversationContext, Event, EventStatus, STATE_AWAITING_ITEMS_CONFIRMATION};

/// Events at most this many days away produce an approaching-event insight.
pub const APPROACHING_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightType {
    IncompleteEvent,
    ApproachingEvent,
    StaleConversation,
    MissingCriticalInfo,
    ReadyForNextStep,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InsightPriority {
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingField {
    #[serde(rename = "data")]
    Date,
    #[serde(rename = "tipo")]
    EventType,
    #[serde(rename = "quantidade_pessoas")]
    Headcount,
    #[serde(rename = "itens")]
    Items,
    #[serde(rename = "participantes")]
    Participants,
}

impl MissingField {
    fn incompletion_message(&self) -> &'static str {
        match self {
            Self::Date => "Ainda preciso saber a data do evento.",
            Self::EventType => "Falta definir o tipo de evento.",
            Self::Headcount => "Quantas pessoas vão participar?",
            Self::Items => "Que tal definirmos a lista de itens agora?",
            Self::Participants => "Podemos adicionar os participantes?",
        }
    }

    fn next_step_suggestion(&self) -> &'static str {
        match self {
            Self::Date => "Me passa a data do evento?",
            Self::EventType => "Que tipo de evento você quer fazer?",
            Self::Headcount => "Me conta quantas pessoas você espera?",
            Self::Items => "Posso gerar uma lista de itens pra você?",
            Self::Participants => "Quer adicionar os participantes agora?",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NextStep {
    GenerateItems,
    ConfirmItems,
    AddParticipants,
}

impl NextStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GenerateItems => "generate_items",
            Self::ConfirmItems => "confirm_items",
            Self::AddParticipants => "add_participants",
        }
    }
}

/// Structured data behind an insight, one shape per insight type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InsightPayload {
    MissingFields { fields: Vec<MissingField> },
    DaysUntil { days: i64 },
    Inactivity { hours: f64 },
    NextStep { step: NextStep },
    Clarification { field: String },
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SituationalInsight {
    #[serde(rename = "type")]
    pub kind: InsightType,
    pub priority: InsightPriority,
    pub message: String,
    pub suggested_action: Option<String>,
    pub payload: InsightPayload,
}

/// Inputs describing where the user stands right now.
#[derive(Debug, Clone, Copy)]
pub struct Situation<'a> {
    pub event: Option<&'a Event>,
    pub context: Option<&'a ConversationContext>,
    pub has_items: bool,
    pub has_participants: bool,
    pub last_interaction: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct SituationalAnalyzer {
    stale_after: Duration,
    cooldown: Duration,
}

impl Default for SituationalAnalyzer {
    fn default() -> Self {
        Self {
            stale_after: Duration::hours(24),
            cooldown: Duration::hours(2),
        }
    }
}

impl SituationalAnalyzer {
    pub fn from_config(config: &ConversationConfig) -> Self {
        Self {
            stale_after: Duration::hours(config.stale_conversation_hours),
            cooldown: Duration::hours(config.proactive_cooldown_hours),
        }
    }

    pub fn analyze_context(&self, situation: &Situation<'_>) -> Vec<SituationalInsight> {
        let mut insights = Vec::new();

        if let Some(event) = situation.event {
            let missing = missing_fields(event, situation.has_items, situation.has_participants);
            if let Some(first) = missing.first() {
                insights.push(SituationalInsight {
                    kind: InsightType::IncompleteEvent,
                    priority: InsightPriority::High,
                    message: first.incompletion_message().to_string(),
                    suggested_action: Some(first.next_step_suggestion().to_string()),
                    payload: InsightPayload::MissingFields { fields: missing },
                });
            }

            if let Some(days) = days_until_event(event, &situation.now.with_timezone(&Local))
                .filter(|d| (0..=APPROACHING_WINDOW_DAYS).contains(d))
            {
                insights.push(SituationalInsight {
                    kind: InsightType::ApproachingEvent,
                    priority: if days <= 1 {
                        InsightPriority::High
                    } else {
                        InsightPriority::Medium
                    },
                    message: approaching_message(days),
                    suggested_action: Some("Quer revisar os detalhes finais?".to_string()),
                    payload: InsightPayload::DaysUntil { days },
                });
            }
        }

        if let (Some(last), Some(event)) = (situation.last_interaction, situation.event) {
            let idle = situation.now - last;
            if idle > self.stale_after && event.status != EventStatus::Finalized {
                insights.push(SituationalInsight {
                    kind: InsightType::StaleConversation,
                    priority: InsightPriority::Low,
                    message:
                        "Percebi que faz um tempo que não conversamos! Quer retomar o planejamento?"
                            .to_string(),
                    suggested_action: None,
                    payload: InsightPayload::Inactivity {
                        hours: idle.num_minutes() as f64 / 60.0,
                    },
                });
            }
        }

        if let (Some(event), Some(context)) = (situation.event, situation.context) {
            if let Some(ready) =
                ready_for_next_step(event, context, situation.has_items, situation.has_participants)
            {
                insights.push(ready);
            }
        }

        insights
    }

    /// Stable sort, high priority first.
    pub fn prioritize_insights(&self, mut insights: Vec<SituationalInsight>) -> Vec<SituationalInsight> {
        insights.sort_by_key(|i| i.priority);
        insights
    }

    /// Only surface high-priority insights, and never twice inside the
    /// cooldown window.
    pub fn should_show_proactive_suggestion(
        &self,
        insights: &[SituationalInsight],
        last_shown: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) -> bool {
        if insights.is_empty() {
            return false;
        }

        if last_shown.is_some_and(|last| now - last < self.cooldown) {
            return false;
        }

        insights
            .iter()
            .any(|i| i.priority == InsightPriority::High)
    }
}

fn missing_fields(event: &Event, has_items: bool, has_participants: bool) -> Vec<MissingField> {
    let mut missing = Vec::new();

    if !event.has_date() {
        missing.push(MissingField::Date);
    }
    if !event.has_type() {
        missing.push(MissingField::EventType);
    }
    if !event.has_headcount() {
        missing.push(MissingField::Headcount);
    }
    if !has_items && event.status != EventStatus::CollectingCore {
        missing.push(MissingField::Items);
    }
    if !has_participants && event.status == EventStatus::DistributionPendingConfirmation {
        missing.push(MissingField::Participants);
    }

    missing
}

/// Calendar days from the date of `now` in its own timezone to the event
/// date. The analyzer passes local time, so days roll over at local midnight.
pub fn days_until_event<Tz: TimeZone>(event: &Event, now: &DateTime<Tz>) -> Option<i64> {
    let date = event.calendar_date()?;
    Some((date - now.date_naive()).num_days())
}

fn approaching_message(days: i64) -> String {
    match days {
        0 => "Seu evento é hoje! 🎉 Tá tudo certo?".to_string(),
        1 => "Seu evento é amanhã! Vamos dar uma revisada nos detalhes?".to_string(),
        2 => "Faltam só 2 dias pro evento! Quer confirmar se está tudo ok?".to_string(),
        n => format!("Faltam {n} dias pro evento. Tá tudo encaminhado?"),
    }
}

fn ready_for_next_step(
    event: &Event,
    context: &ConversationContext,
    has_items: bool,
    has_participants: bool,
) -> Option<SituationalInsight> {
    let (priority, message, action, step) = match event.status {
        EventStatus::CollectingCore
            if event.has_date() && event.has_type() && event.has_headcount() && !has_items =>
        {
            (
                InsightPriority::Medium,
                "Legal! Agora que temos as informações básicas, posso gerar a lista de itens pra você.",
                "Quer que eu monte a lista?",
                NextStep::GenerateItems,
            )
        }
        EventStatus::ItemsPendingConfirmation
            if has_items && context.state == STATE_AWAITING_ITEMS_CONFIRMATION =>
        {
            (
                InsightPriority::Medium,
                "A lista tá pronta! Dá uma olhada e me diz se precisa mudar algo.",
                "Tá bom assim ou quer ajustar?",
                NextStep::ConfirmItems,
            )
        }
        EventStatus::DistributionPendingConfirmation if has_items && !has_participants => (
            InsightPriority::High,
            "Perfeito! Agora vamos adicionar os participantes pra dividir os itens.",
            "Me passa os nomes das pessoas?",
            NextStep::AddParticipants,
        ),
        _ => return None,
    };

    Some(SituationalInsight {
        kind: InsightType::ReadyForNextStep,
        priority,
        message: message.to_string(),
        suggested_action: Some(action.to_string()),
        payload: InsightPayload::NextStep { step },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn event(status: EventStatus) -> Event {
        Event {
            id: "1".to_string(),
            event_type: Some("churrasco".to_string()),
            date: Some("2025-07-01".to_string()),
            headcount: Some(20),
            status,
            ..Default::default()
        }
    }

    fn situation<'a>(event: Option<&'a Event>, context: Option<&'a ConversationContext>) -> Situation<'a> {
        Situation {
            event,
            context,
            has_items: false,
            has_participants: false,
            last_interaction: None,
            now: now(),
        }
    }

    #[test]
    fn incomplete_event_reports_first_missing_field() {
        let analyzer = SituationalAnalyzer::default();
        let mut ev = event(EventStatus::ItemsPendingConfirmation);
        ev.date = None;
        ev.headcount = Some(0);

        let insights = analyzer.analyze_context(&situation(Some(&ev), None));
        let incomplete = &insights[0];
        assert_eq!(incomplete.kind, InsightType::IncompleteEvent);
        assert_eq!(incomplete.message, "Ainda preciso saber a data do evento.");
        assert_eq!(
            incomplete.payload,
            InsightPayload::MissingFields {
                fields: vec![MissingField::Date, MissingField::Headcount, MissingField::Items]
            }
        );
    }

    #[test]
    fn items_not_missing_while_collecting_core() {
        let analyzer = SituationalAnalyzer::default();
        let ev = event(EventStatus::CollectingCore);
        let insights = analyzer.analyze_context(&situation(Some(&ev), None));
        assert!(insights
            .iter()
            .all(|i| i.kind != InsightType::IncompleteEvent));
    }

    #[test]
    fn approaching_event_priority_by_days() {
        let analyzer = SituationalAnalyzer::default();
        let mut ev = event(EventStatus::Finalized);
        ev.date = Some("2025-06-02".to_string());
        let mut s = situation(Some(&ev), None);
        s.has_items = true;

        let insights = analyzer.analyze_context(&s);
        assert_eq!(insights.len(), 1);
        assert_eq!(insights[0].kind, InsightType::ApproachingEvent);
        assert_eq!(insights[0].priority, InsightPriority::High);
        assert_eq!(
            insights[0].message,
            "Seu evento é amanhã! Vamos dar uma revisada nos detalhes?"
        );

        let mut later = ev.clone();
        later.date = Some("2025-06-04T18:00:00Z".to_string());
        let s = Situation {
            event: Some(&later),
            ..s
        };
        let insights = analyzer.analyze_context(&s);
        assert_eq!(insights[0].priority, InsightPriority::Medium);
        assert_eq!(insights[0].payload, InsightPayload::DaysUntil { days: 3 });
        assert_eq!(insights[0].message, "Faltam 3 dias pro evento. Tá tudo encaminhado?");
    }

    #[test]
    fn day_count_follows_the_callers_calendar_day() {
        let mut ev = event(EventStatus::Finalized);
        ev.date = Some("2025-06-02".to_string());

        // 23:30 in Brasília is already 02:30 the next day in UTC.
        let brasilia = chrono::FixedOffset::west_opt(3 * 3600).unwrap();
        let late_evening = brasilia.with_ymd_and_hms(2025, 6, 1, 23, 30, 0).unwrap();
        assert_eq!(days_until_event(&ev, &late_evening), Some(1));
        assert_eq!(days_until_event(&ev, &late_evening.with_timezone(&Utc)), Some(0));
        assert_eq!(
            approaching_message(days_until_event(&ev, &late_evening).unwrap_or_default()),
            "Seu evento é amanhã! Vamos dar uma revisada nos detalhes?"
        );
    }

    #[test]
    fn stale_conversation_needs_open_event() {
        let analyzer = SituationalAnalyzer::default();
        let ev = event(EventStatus::CollectingCore);
        let mut s = situation(Some(&ev), None);
        s.last_interaction = Some(now() - Duration::hours(30));

        let insights = analyzer.analyze_context(&s);
        assert!(insights
            .iter()
            .any(|i| i.kind == InsightType::StaleConversation && i.priority == InsightPriority::Low));

        let done = event(EventStatus::Finalized);
        let s = Situation {
            event: Some(&done),
            has_items: true,
            ..s
        };
        assert!(analyzer
            .analyze_context(&s)
            .iter()
            .all(|i| i.kind != InsightType::StaleConversation));
    }

    #[test]
    fn ready_for_next_step_cases() {
        let analyzer = SituationalAnalyzer::default();
        let mut context = ConversationContext::initial("u1");

        let ev = event(EventStatus::CollectingCore);
        let insights = analyzer.analyze_context(&situation(Some(&ev), Some(&context)));
        assert_eq!(
            insights.last().map(|i| &i.payload),
            Some(&InsightPayload::NextStep {
                step: NextStep::GenerateItems
            })
        );

        context.state = STATE_AWAITING_ITEMS_CONFIRMATION.to_string();
        let ev = event(EventStatus::ItemsPendingConfirmation);
        let mut s = situation(Some(&ev), Some(&context));
        s.has_items = true;
        let insights = analyzer.analyze_context(&s);
        assert_eq!(
            insights.last().map(|i| &i.payload),
            Some(&InsightPayload::NextStep {
                step: NextStep::ConfirmItems
            })
        );

        let ev = event(EventStatus::DistributionPendingConfirmation);
        let s = Situation {
            event: Some(&ev),
            ..s
        };
        let ready = analyzer
            .analyze_context(&s)
            .into_iter()
            .find(|i| i.kind == InsightType::ReadyForNextStep)
            .expect("ready insight");
        assert_eq!(ready.priority, InsightPriority::High);
    }

    #[test]
    fn prioritize_is_stable() {
        let analyzer = SituationalAnalyzer::default();
        let make = |priority, message: &str| SituationalInsight {
            kind: InsightType::ReadyForNextStep,
            priority,
            message: message.to_string(),
            suggested_action: None,
            payload: InsightPayload::Clarification {
                field: String::new(),
            },
        };
        let sorted = analyzer.prioritize_insights(vec![
            make(InsightPriority::Low, "a"),
            make(InsightPriority::High, "b"),
            make(InsightPriority::Medium, "c"),
            make(InsightPriority::High, "d"),
        ]);
        let order: Vec<&str> = sorted.iter().map(|i| i.message.as_str()).collect();
        assert_eq!(order, vec!["b", "d", "c", "a"]);
    }

    #[test]
    fn proactive_rate_limit() {
        let analyzer = SituationalAnalyzer::default();
        let ev = event(EventStatus::ItemsPendingConfirmation);
        let insights = analyzer.analyze_context(&situation(Some(&ev), None));
        assert!(insights.iter().any(|i| i.priority == InsightPriority::High));

        assert!(analyzer.should_show_proactive_suggestion(&insights, None, now()));
        for minutes in [0, 30, 90, 119] {
            let last = now() - Duration::minutes(minutes);
            assert!(!analyzer.should_show_proactive_suggestion(&insights, Some(last), now()));
        }
        let last = now() - Duration::hours(2);
        assert!(analyzer.should_show_proactive_suggestion(&insights, Some(last), now()));
        assert!(!analyzer.should_show_proactive_suggestion(&[], None, now()));
    }
}
