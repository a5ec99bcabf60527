//! The conversational pipeline: analysis, classification, insights and replies.

pub mod analyzer;
pub mod classifier;
pub mod context;
pub mod correction;
pub mod feedback;
mod orchestrator;
pub mod proactive;
pub mod situational;
pub mod templates;

pub use analyzer::{fallback_analysis, MessageAnalyzer};
pub use classifier::classify_intent;
pub use context::{contextual_summary, ContextManager};
pub use correction::{detect_confusion, detect_correction, CorrectedField, CorrectionResult};
pub use feedback::{
    generate_clarification_message, ClarifyDecision, ClarifyReason, ConfusionPattern,
    FeedbackManager, PerformanceMetrics,
};
pub use orchestrator::{ChatOrchestrator, ReplyKind, TurnOutcome};
pub use proactive::{ActionType, ProactiveAction};
pub use situational::{InsightPriority, InsightType, SituationalAnalyzer, SituationalInsight};
pub use templates::{TemplateCategory, TemplateContext};
