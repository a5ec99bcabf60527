//! One conversation turn, end to end.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use chrono::{Local, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;

use super::analyzer::MessageAnalyzer;
use super::classifier::classify_intent;
use super::context::{contextual_summary, ContextManager};
use super::correction::{
    detect_confusion, detect_correction, generate_correction_response, CorrectionResult,
};
use super::feedback::{generate_clarification_message, FeedbackManager};
use super::proactive::{
    format_proactive_message, generate_proactive_action, should_auto_execute,
    AutomationPreferences, ProactiveAction,
};
use super::situational::{Situation, SituationalAnalyzer};
use super::templates::{random_template, TemplateCategory, TemplateContext};
use crate::config::ConversationConfig;
use crate::error::Result;
use crate::models::{
    AnalysisContext, CollectedData, ConversationContext, EventPlan, EventStatus, Intent,
    InteractionOptions, Item, MessageRole, ResponseType, SuggestedItem,
    STATE_AWAITING_ITEMS_CONFIRMATION, STATE_COLLECTING_CORE, STATE_ITEMS_CONFIRMED,
};
use crate::nlp::{date_as_written, validate_event_date_at};
use crate::planning::estimate_churrasco;
use crate::rpc::EventPlanRpc;

const FAREWELL: &str = "Beleza! Quando quiser planejar outro evento, é só chamar. 👋";

/// Per-user async locks. Turns of one user queue up; other users proceed.
#[derive(Default)]
struct TurnLocks {
    locks: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl TurnLocks {
    /// Waits for the user's previous turn to finish. The entry is dropped from
    /// the registry once the last holder or waiter lets go.
    async fn acquire(&self, user_id: &str) -> TurnGuard<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            locks.entry(user_id.to_string()).or_default().clone()
        };
        TurnGuard {
            registry: self,
            user_id: user_id.to_string(),
            held: Some(lock.lock_owned().await),
        }
    }

    fn len(&self) -> usize {
        self.locks.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}

struct TurnGuard<'a> {
    registry: &'a TurnLocks,
    user_id: String,
    held: Option<tokio::sync::OwnedMutexGuard<()>>,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        // Release first so the registry holds the only reference when idle.
        self.held.take();
        let mut locks = self
            .registry
            .locks
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&self.user_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&self.user_id);
        }
    }
}

/// What produced the assistant reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplyKind {
    Template,
    Correction,
    Clarification,
    DateWarning,
    ItemsGenerated,
    Farewell,
}

#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub reply: String,
    pub reply_kind: ReplyKind,
    pub intent: Intent,
    pub confidence: f32,
    pub needs_clarification: bool,
    pub suggested_replies: Vec<String>,
    pub proactive_action: Option<ProactiveAction>,
    pub proactive_message: Option<String>,
    /// Set when the proactive action may run without asking the user.
    pub auto_execute: bool,
    pub suggested_items: Vec<SuggestedItem>,
    pub analytic_id: Option<String>,
    pub context: ConversationContext,
}

pub struct ChatOrchestrator {
    analyzer: MessageAnalyzer,
    contexts: ContextManager,
    feedback: FeedbackManager,
    situational: SituationalAnalyzer,
    rpc: Arc<dyn EventPlanRpc>,
    config: ConversationConfig,
    locks: TurnLocks,
    rng: Mutex<StdRng>,
}

struct Reply {
    text: String,
    kind: ReplyKind,
    suggested_replies: Option<Vec<String>>,
}

impl Reply {
    fn new(text: impl Into<String>, kind: ReplyKind) -> Self {
        Self {
            text: text.into(),
            kind,
            suggested_replies: None,
        }
    }
}

impl ChatOrchestrator {
    pub fn new(
        analyzer: MessageAnalyzer,
        contexts: ContextManager,
        feedback: FeedbackManager,
        rpc: Arc<dyn EventPlanRpc>,
        config: ConversationConfig,
    ) -> Self {
        Self {
            analyzer,
            contexts,
            feedback,
            situational: SituationalAnalyzer::from_config(&config),
            rpc,
            config,
            locks: TurnLocks::default(),
            rng: Mutex::new(StdRng::from_entropy()),
        }
    }

    /// Replace the phrasing picker's random source.
    pub fn with_rng(mut self, rng: StdRng) -> Self {
        self.rng = Mutex::new(rng);
        self
    }

    pub fn analyzer(&self) -> &MessageAnalyzer {
        &self.analyzer
    }

    pub fn contexts(&self) -> &ContextManager {
        &self.contexts
    }

    pub fn feedback(&self) -> &FeedbackManager {
        &self.feedback
    }

    pub async fn handle_turn(
        &self,
        user_id: &str,
        text: &str,
        event_id: Option<&str>,
    ) -> Result<TurnOutcome> {
        let _turn = self.locks.acquire(user_id).await;

        let started = Instant::now();
        let now = Utc::now();

        let (mut context, history) = self.contexts.load_user_context(user_id).await?;
        if let Some(id) = event_id {
            context.event_id = Some(id.to_string());
        }
        let event_id = context.event_id.clone();

        let plan = self.fetch_plan(event_id.as_deref()).await;
        let analysis_context = analysis_context(plan.as_ref(), &context);
        let chat_history =
            contextual_summary(&history, &context, self.config.summary_recent_messages);

        let mut analysis = self
            .analyzer
            .analyze_in_conversation(text, &analysis_context, &chat_history)
            .await;
        // Nothing collected yet means there is nothing to correct.
        let correction = if context.collected_data.is_empty() {
            CorrectionResult::default()
        } else {
            detect_correction(text, &analysis, &context.collected_data)
        };
        let confused = detect_confusion(text);
        let classification = classify_intent(&analysis, Some(&analysis_context));

        tracing::debug!(
            user_id = %user_id,
            intent = %classification.intent,
            confidence = classification.confidence,
            correction = correction.is_correction,
            confused,
            "Message classified"
        );

        // A past date is never collected; the user gets the warning instead.
        let date_warning = analysis.date.as_deref().and_then(|iso| {
            let today = Local::now().date_naive();
            let written = date_as_written(text, iso, today).unwrap_or(iso);
            let validation = validate_event_date_at(written, today);
            (!validation.valid).then_some(validation)
        });
        if date_warning.is_some() {
            analysis.date = None;
        }

        context.collected_data.merge_from(&analysis);
        context.missing_slots = context.collected_data.missing_slots();
        context.confidence_level = classification.confidence;
        context.last_intent = Some(classification.intent);
        if matches!(
            classification.intent,
            Intent::CreateEvent | Intent::DefineMenu | Intent::EditEvent
        ) && context.state != STATE_AWAITING_ITEMS_CONFIRMATION
        {
            context.state = STATE_COLLECTING_CORE.to_string();
        }

        let template_ctx = TemplateContext::from(&context.collected_data);
        let mut suggested_items = Vec::new();

        let reply = if correction.is_correction {
            let mut reply = Reply::new(
                generate_correction_response(correction.corrected_field),
                ReplyKind::Correction,
            );
            if correction.is_ambiguous() {
                let clarification = generate_clarification_message(classification.intent);
                reply.text = format!("{} {}", reply.text, clarification.message);
                reply.suggested_replies = Some(clarification.suggested_replies);
            }
            reply
        } else if confused {
            self.clarification(classification.intent)
        } else if let Some(validation) = date_warning {
            Reply::new(
                validation.message.unwrap_or_default(),
                ReplyKind::DateWarning,
            )
        } else if classification.intent == Intent::Unknown && history.is_empty() {
            Reply::new(
                self.render(TemplateCategory::Greeting, &template_ctx),
                ReplyKind::Template,
            )
        } else if !classification.intent.is_always_clear()
            && self
                .feedback
                .should_clarify(user_id, classification.intent, classification.confidence)
                .await
                .should_clarify
        {
            self.clarification(classification.intent)
        } else if classification.intent == Intent::ConfirmEvent
            && wants_item_generation(&context)
        {
            match self
                .generate_items(event_id.as_deref(), &context.collected_data)
                .await
            {
                Some(items) => {
                    context.state = STATE_AWAITING_ITEMS_CONFIRMATION.to_string();
                    let reply = format!(
                        "{}\n\n{}",
                        self.render(TemplateCategory::ItemsGenerated, &template_ctx),
                        format_item_list(&items)
                    );
                    suggested_items = items;
                    Reply::new(reply, ReplyKind::ItemsGenerated)
                }
                None => Reply::new(
                    self.render(TemplateCategory::ConfirmEvent, &template_ctx),
                    ReplyKind::Template,
                ),
            }
        } else {
            self.template_reply(classification.intent, &mut context, plan.as_ref(), &template_ctx)
        };

        let needs_clarification =
            classification.needs_clarification || reply.kind == ReplyKind::Clarification;

        // Insights look at the situation before this turn's reply.
        let mut proactive_action = None;
        let mut proactive_message = None;
        let mut auto_execute = false;
        if classification.intent != Intent::EndConversation {
            let situation = Situation {
                event: plan.as_ref().map(|p| &p.event),
                context: Some(&context),
                has_items: plan.as_ref().is_some_and(EventPlan::has_items),
                has_participants: plan.as_ref().is_some_and(EventPlan::has_participants),
                last_interaction: history.last().map(|m| m.created_at),
                now,
            };
            let insights = self
                .situational
                .prioritize_insights(self.situational.analyze_context(&situation));

            if self.situational.should_show_proactive_suggestion(
                &insights,
                context.last_proactive_at,
                now,
            ) {
                if let Some(top) = insights.first() {
                    let action = generate_proactive_action(top);
                    let preferences = AutomationPreferences {
                        disable_auto_actions: !self.config.enable_auto_actions,
                    };
                    auto_execute = should_auto_execute(&action, Some(&preferences));
                    proactive_message = Some(format_proactive_message(&action));
                    proactive_action = Some(action);
                    context.last_proactive_at = Some(now);
                }
            }
        }

        let suggested_replies = reply
            .suggested_replies
            .clone()
            .or_else(|| classification.suggested_replies.clone())
            .unwrap_or_else(|| status_replies(plan.as_ref(), &context.collected_data));

        self.contexts
            .save_message(user_id, MessageRole::User, text, event_id.as_deref())
            .await?;
        let assistant = self
            .contexts
            .save_message(user_id, MessageRole::Assistant, &reply.text, event_id.as_deref())
            .await?;
        self.contexts.update_context(&mut context).await?;

        let response_type = if self.analyzer.uses_model() {
            ResponseType::Hybrid
        } else {
            ResponseType::Template
        };
        let analytic_id = self
            .feedback
            .log_interaction(
                user_id,
                classification.intent,
                classification.confidence,
                response_type,
                InteractionOptions {
                    event_id: event_id.clone(),
                    message_id: Some(assistant.id),
                    clarification_needed: needs_clarification,
                    response_time_ms: Some(started.elapsed().as_millis() as u64),
                    ..Default::default()
                },
            )
            .await;
        if let Some(id) = analytic_id.as_deref() {
            if correction.is_correction {
                self.feedback.record_correction(id).await;
            }
            if confused {
                self.feedback.record_confusion(id).await;
            }
        }

        if classification.intent == Intent::EndConversation {
            self.contexts.clear_user_context(user_id).await?;
            context = ConversationContext::initial(user_id);
        }

        tracing::info!(
            user_id = %user_id,
            intent = %classification.intent,
            reply_kind = ?reply.kind,
            proactive = proactive_action.is_some(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Turn handled"
        );

        Ok(TurnOutcome {
            reply: reply.text,
            reply_kind: reply.kind,
            intent: classification.intent,
            confidence: classification.confidence,
            needs_clarification,
            suggested_replies,
            proactive_action,
            proactive_message,
            auto_execute,
            suggested_items,
            analytic_id,
            context,
        })
    }

    async fn fetch_plan(&self, event_id: Option<&str>) -> Option<EventPlan> {
        let event_id = event_id?;
        if !self.rpc.is_available() {
            return None;
        }
        match self.rpc.get_event_plan(event_id).await {
            Ok(plan) => plan,
            Err(e) => {
                tracing::warn!(event_id = %event_id, error = %e, "Event plan unavailable");
                None
            }
        }
    }

    /// Estimate the churrasco list and store it on the event when there is
    /// one. `None` means the store rejected it.
    async fn generate_items(
        &self,
        event_id: Option<&str>,
        data: &CollectedData,
    ) -> Option<Vec<SuggestedItem>> {
        let headcount = data.headcount?;
        let estimate = estimate_churrasco(headcount);

        let Some(event_id) = event_id.filter(|_| self.rpc.is_available()) else {
            return Some(estimate);
        };

        let items: Vec<Item> = estimate
            .iter()
            .cloned()
            .map(|item| item.into_item(event_id))
            .collect();
        match self.rpc.items_replace_for_event(event_id, &items).await {
            Ok(stored) => {
                tracing::info!(event_id = %event_id, count = stored.len(), "Items generated");
                Some(estimate)
            }
            Err(e) => {
                tracing::warn!(event_id = %event_id, error = %e, "Failed to store generated items");
                None
            }
        }
    }

    fn clarification(&self, intent: Intent) -> Reply {
        let clarification = generate_clarification_message(intent);
        Reply {
            text: clarification.message.to_string(),
            kind: ReplyKind::Clarification,
            suggested_replies: Some(clarification.suggested_replies),
        }
    }

    fn template_reply(
        &self,
        intent: Intent,
        context: &mut ConversationContext,
        plan: Option<&EventPlan>,
        ctx: &TemplateContext,
    ) -> Reply {
        let data = &context.collected_data;
        let category = match intent {
            Intent::CreateEvent => {
                if data.subtype.is_some() && data.category.is_none() {
                    TemplateCategory::AskCategory
                } else {
                    next_core_question(data).unwrap_or(TemplateCategory::ConfirmEvent)
                }
            }
            Intent::DefineMenu => match (&data.menu, &data.date) {
                (None, _) => TemplateCategory::AskMenu,
                (Some(_), None) => TemplateCategory::MenuConfirmed,
                (Some(_), Some(_)) => TemplateCategory::ConfirmEvent,
            },
            Intent::ConfirmEvent => {
                if context.state == STATE_AWAITING_ITEMS_CONFIRMATION
                    || plan.is_some_and(|p| {
                        p.event.status == EventStatus::ItemsPendingConfirmation && p.has_items()
                    })
                {
                    context.state = STATE_ITEMS_CONFIRMED.to_string();
                    TemplateCategory::ItemsConfirmed
                } else {
                    next_core_question(data).unwrap_or(TemplateCategory::EventFinalized)
                }
            }
            Intent::ShowItems => match plan.filter(|p| p.has_items()) {
                Some(plan) => {
                    let text = format!(
                        "{}\n\n{}",
                        self.render(TemplateCategory::ItemsGenerated, ctx),
                        format_stored_items(&plan.items)
                    );
                    return Reply::new(text, ReplyKind::Template);
                }
                None => next_core_question(data).unwrap_or(TemplateCategory::ConfirmEvent),
            },
            Intent::EditEvent => return self.clarification(Intent::EditEvent),
            Intent::AddParticipants => TemplateCategory::ItemsConfirmed,
            Intent::EndConversation => return Reply::new(FAREWELL, ReplyKind::Farewell),
            Intent::OutOfDomain => TemplateCategory::OutOfScope,
            Intent::Unknown => TemplateCategory::Ambiguity,
        };

        Reply::new(self.render(category, ctx), ReplyKind::Template)
    }

    fn render(&self, category: TemplateCategory, ctx: &TemplateContext) -> String {
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        random_template(category, ctx, &mut *rng)
    }
}

fn analysis_context(plan: Option<&EventPlan>, context: &ConversationContext) -> AnalysisContext {
    let data = &context.collected_data;
    match plan {
        Some(plan) => AnalysisContext {
            event_type: plan
                .event
                .event_type
                .clone()
                .or_else(|| data.display_kind().map(str::to_string)),
            headcount: plan.event.headcount.or(data.headcount),
            date: plan.event.date.clone().or_else(|| data.date.clone()),
            menu: plan.event.menu.clone().or_else(|| data.menu.clone()),
            event_status: Some(plan.event.status.as_str().to_string()),
        },
        None => AnalysisContext {
            event_type: data.display_kind().map(str::to_string),
            headcount: data.headcount,
            date: data.date.clone(),
            menu: data.menu.clone(),
            event_status: None,
        },
    }
}

fn next_core_question(data: &CollectedData) -> Option<TemplateCategory> {
    if data.display_kind().is_none() {
        Some(TemplateCategory::AskEventType)
    } else if data.headcount.is_none() {
        Some(TemplateCategory::AskHeadcount)
    } else if data.date.is_none() {
        Some(TemplateCategory::AskDate)
    } else {
        None
    }
}

fn is_churrasco(data: &CollectedData) -> bool {
    [&data.subtype, &data.category, &data.menu]
        .into_iter()
        .flatten()
        .any(|v| v.contains("churrasco"))
}

fn wants_item_generation(context: &ConversationContext) -> bool {
    context.state != STATE_AWAITING_ITEMS_CONFIRMATION
        && is_churrasco(&context.collected_data)
        && context.collected_data.headcount.is_some_and(|n| n > 0)
}

fn item_lines<'a>(lines: impl Iterator<Item = (f64, &'a str, &'a str)>) -> String {
    lines
        .map(|(quantity, unit, name)| format!("• {quantity} {unit} de {name}"))
        .collect::<Vec<_>>()
        .join("\n")
}

fn format_item_list(items: &[SuggestedItem]) -> String {
    item_lines(items.iter().map(|i| (i.quantity, i.unit.as_str(), i.name.as_str())))
}

fn format_stored_items(items: &[Item]) -> String {
    item_lines(items.iter().map(|i| (i.quantity, i.unit.as_str(), i.name.as_str())))
}

fn status_replies(plan: Option<&EventPlan>, data: &CollectedData) -> Vec<String> {
    let options: &[&str] = match plan {
        None => &["Jantar para 10", "Churrasco para 15", "Festa para 20"],
        Some(p) if p.event.status == EventStatus::ItemsPendingConfirmation && p.has_items() => {
            &["Confirmar lista", "Editar itens", "Adicionar participantes"]
        }
        Some(p) if p.event.status == EventStatus::CollectingCore => {
            if !p.event.has_headcount() && data.headcount.is_none() {
                &["10 pessoas", "15 pessoas", "20 pessoas"]
            } else if !p.event.has_date() && data.date.is_none() {
                &["Hoje", "Amanhã", "Próximo fim de semana"]
            } else {
                &[]
            }
        }
        Some(_) => &[],
    };
    options.iter().map(|s| s.to_string()).collect()
}
