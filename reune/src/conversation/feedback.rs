//! Interaction analytics and explicit user feedback.
//!
//! Storage failures never reach the caller: they are logged and a neutral
//! default is returned so a turn is never lost to a bookkeeping error.

use std::sync::Arc;

use chrono::{Duration, Utc};
use nanoid::nanoid;
use serde::Serialize;

use crate::db::{AnalyticsStore, FeedbackStore};
use crate::models::{
    ConversationAnalytic, ConversationMetric, FeedbackOptions, FeedbackStats, FeedbackType,
    FrequentError, Intent, InteractionOptions, ResponseType, UserFeedback,
};

/// Below this the turn always asks for clarification.
pub const CRITICAL_CONFIDENCE: f32 = 0.5;
/// More errors than this for an intent in the last week forces clarification.
pub const FREQUENT_ERROR_THRESHOLD: u32 = 2;
/// Errors per intent in the last week that count as a confusion pattern.
pub const PATTERN_MIN_ERRORS: u32 = 2;

const ERROR_WINDOW_DAYS: i64 = 7;
const METRICS_WINDOW_DAYS: i64 = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClarifyReason {
    LowConfidence,
    FrequentErrors,
    ModerateConfidence,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClarifyDecision {
    pub should_clarify: bool,
    pub reason: Option<ClarifyReason>,
}

impl ClarifyDecision {
    fn clarify(reason: ClarifyReason) -> Self {
        Self {
            should_clarify: true,
            reason: Some(reason),
        }
    }

    fn proceed() -> Self {
        Self {
            should_clarify: false,
            reason: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Clarification {
    pub message: &'static str,
    pub suggested_replies: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceSummary {
    pub total_interactions: u32,
    pub avg_confidence: f32,
    pub success_rate: f32,
    pub clarification_rate: f32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerformanceMetrics {
    pub summary: PerformanceSummary,
    pub feedback: FeedbackStats,
    pub recent_low_confidence: Vec<ConversationAnalytic>,
    pub frequent_errors: Vec<FrequentError>,
    pub daily_metrics: Vec<ConversationMetric>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfusionPattern {
    pub intent: String,
    pub frequency: u32,
    pub suggestion: &'static str,
}

#[derive(Clone)]
pub struct FeedbackManager {
    analytics: Arc<dyn AnalyticsStore>,
    feedback: Arc<dyn FeedbackStore>,
    low_confidence_threshold: f32,
}

impl FeedbackManager {
    pub fn new(
        analytics: Arc<dyn AnalyticsStore>,
        feedback: Arc<dyn FeedbackStore>,
        low_confidence_threshold: f32,
    ) -> Self {
        Self {
            analytics,
            feedback,
            low_confidence_threshold,
        }
    }

    /// Record one handled turn. Returns the record id, or `None` when it
    /// could not be stored.
    pub async fn log_interaction(
        &self,
        user_id: &str,
        intent: Intent,
        confidence: f32,
        response_type: ResponseType,
        options: InteractionOptions,
    ) -> Option<String> {
        let analytic = ConversationAnalytic {
            id: nanoid!(),
            user_id: user_id.to_string(),
            event_id: options.event_id,
            message_id: options.message_id,
            intent: intent.as_str().to_string(),
            confidence_level: confidence,
            response_type,
            user_corrected: options.user_corrected,
            user_confused: options.user_confused,
            clarification_needed: options.clarification_needed
                || confidence < self.low_confidence_threshold,
            response_time_ms: options.response_time_ms,
            tokens_used: options.tokens_used,
            metadata: options.metadata,
            created_at: Utc::now(),
        };

        match self.analytics.insert_analytic(&analytic).await {
            Ok(()) => Some(analytic.id),
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to log interaction");
                None
            }
        }
    }

    pub async fn record_correction(&self, analytic_id: &str) {
        if let Err(e) = self.analytics.mark_corrected(analytic_id).await {
            tracing::error!(analytic_id = %analytic_id, error = %e, "Failed to flag correction");
        }
    }

    pub async fn record_confusion(&self, analytic_id: &str) {
        if let Err(e) = self.analytics.mark_confused(analytic_id).await {
            tracing::error!(analytic_id = %analytic_id, error = %e, "Failed to flag confusion");
        }
    }

    pub async fn should_clarify(&self, user_id: &str, intent: Intent, confidence: f32) -> ClarifyDecision {
        if confidence < CRITICAL_CONFIDENCE {
            return ClarifyDecision::clarify(ClarifyReason::LowConfidence);
        }

        let errors = self.recent_errors(user_id, ERROR_WINDOW_DAYS).await;
        let frequent = errors
            .iter()
            .any(|e| e.intent == intent.as_str() && e.error_count > FREQUENT_ERROR_THRESHOLD);
        if frequent {
            return ClarifyDecision::clarify(ClarifyReason::FrequentErrors);
        }

        if confidence >= self.low_confidence_threshold {
            return ClarifyDecision::proceed();
        }

        ClarifyDecision::clarify(ClarifyReason::ModerateConfidence)
    }

    pub async fn performance_metrics(&self, user_id: &str) -> PerformanceMetrics {
        let since = Utc::now() - Duration::days(METRICS_WINDOW_DAYS);

        let metrics = self
            .analytics
            .daily_metrics(user_id, since)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(user_id = %user_id, error = %e, "Failed to load daily metrics");
                Vec::new()
            });
        let feedback = self.feedback_stats(user_id).await;
        let mut low_confidence = self
            .analytics
            .low_confidence_interactions(user_id, self.low_confidence_threshold, 10)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(user_id = %user_id, error = %e, "Failed to load low-confidence interactions");
                Vec::new()
            });
        let mut errors = self.recent_errors(user_id, METRICS_WINDOW_DAYS).await;

        let total: u32 = metrics.iter().map(|m| m.total_interactions).sum();
        let corrections: u32 = metrics.iter().map(|m| m.correction_count).sum();
        let clarifications: u32 = metrics.iter().map(|m| m.clarification_count).sum();

        let summary = PerformanceSummary {
            total_interactions: total,
            avg_confidence: if metrics.is_empty() {
                0.0
            } else {
                metrics.iter().map(|m| m.avg_confidence).sum::<f32>() / metrics.len() as f32
            },
            success_rate: percentage(total.saturating_sub(corrections), total),
            clarification_rate: percentage(clarifications, total),
        };

        low_confidence.truncate(5);
        errors.truncate(5);

        PerformanceMetrics {
            summary,
            feedback,
            recent_low_confidence: low_confidence,
            frequent_errors: errors,
            daily_metrics: metrics.into_iter().take(7).collect(),
        }
    }

    pub async fn detect_confusion_patterns(&self, user_id: &str) -> Vec<ConfusionPattern> {
        self.recent_errors(user_id, ERROR_WINDOW_DAYS)
            .await
            .into_iter()
            .filter(|e| e.error_count >= PATTERN_MIN_ERRORS)
            .map(|e| ConfusionPattern {
                suggestion: suggestion_for_intent(&e.intent),
                frequency: e.error_count,
                intent: e.intent,
            })
            .collect()
    }

    pub async fn submit_feedback(
        &self,
        user_id: &str,
        feedback_type: FeedbackType,
        options: FeedbackOptions,
    ) -> Option<UserFeedback> {
        let feedback = UserFeedback {
            id: nanoid!(),
            user_id: user_id.to_string(),
            event_id: options.event_id,
            message_id: options.message_id,
            feedback_type,
            rating: options.rating,
            comment: options.comment,
            metadata: options.metadata,
            created_at: Utc::now(),
        };

        match self.feedback.insert_feedback(&feedback).await {
            Ok(()) => Some(feedback),
            Err(e) => {
                tracing::error!(user_id = %user_id, error = %e, "Failed to store feedback");
                None
            }
        }
    }

    pub async fn feedback_stats(&self, user_id: &str) -> FeedbackStats {
        self.feedback
            .feedback_stats(user_id)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(user_id = %user_id, error = %e, "Failed to load feedback stats");
                FeedbackStats::default()
            })
    }

    async fn recent_errors(&self, user_id: &str, days: i64) -> Vec<FrequentError> {
        let since = Utc::now() - Duration::days(days);
        self.analytics
            .frequent_errors(user_id, since)
            .await
            .unwrap_or_else(|e| {
                tracing::error!(user_id = %user_id, error = %e, "Failed to load frequent errors");
                Vec::new()
            })
    }
}

fn percentage(part: u32, total: u32) -> f32 {
    if total == 0 {
        0.0
    } else {
        part as f32 / total as f32 * 100.0
    }
}

/// Canned follow-up question for an unclear turn.
pub fn generate_clarification_message(intent: Intent) -> Clarification {
    let (message, replies): (&'static str, &[&str]) = match intent {
        Intent::CreateEvent => (
            "Só pra confirmar: você quer criar um evento novo?",
            &["Sim, criar novo", "Não, quero editar"],
        ),
        Intent::EditEvent => (
            "Entendi que você quer editar. O que vamos mudar?",
            &["Mudar data", "Mudar quantidade", "Mudar cardápio"],
        ),
        Intent::DefineMenu => (
            "Legal! Só confirmando: qual vai ser o cardápio principal?",
            &["Carne", "Frango", "Massa", "Misto"],
        ),
        Intent::ConfirmEvent => (
            "Perfeito! Posso confirmar e criar o evento?",
            &["Sim, confirmar", "Não, revisar antes"],
        ),
        Intent::Unknown => (
            "Não entendi bem. Pode reformular?",
            &["Criar evento", "Ver eventos", "Ajuda"],
        ),
        _ => (
            "Me explica melhor o que você precisa?",
            &["Criar evento", "Editar evento", "Ver lista"],
        ),
    };

    Clarification {
        message,
        suggested_replies: replies.iter().map(|r| r.to_string()).collect(),
    }
}

fn suggestion_for_intent(intent: &str) -> &'static str {
    match intent {
        "criar_evento" => "Tente ser mais específico sobre tipo e quantidade",
        "editar_evento" => "Especifique claramente o que deseja editar",
        "definir_menu" => "Descreva o cardápio principal com mais detalhes",
        "desconhecida" => "Use comandos mais diretos como \"criar\", \"editar\", \"confirmar\"",
        _ => "Tente reformular sua mensagem de forma mais clara",
    }
}
