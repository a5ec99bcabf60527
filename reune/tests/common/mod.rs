// Shared fixtures for integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, Once};

use async_trait::async_trait;

use reune::config::{ConversationConfig, DatabaseConfig};
use reune::conversation::{ChatOrchestrator, ContextManager, FeedbackManager, MessageAnalyzer};
use reune::db::{Database, LibSqlBackend};
use reune::error::{Result, ReuneError};
use reune::llm::{ChatModel, ChatReply, ChatRequest};
use reune::models::{
    DistributionRow, DistributionSummary, Event, EventPlan, EventStatus, Item, Participant,
};
use reune::rpc::{EventPlanRpc, HttpRpcClient};

static INIT: Once = Once::new();

/// Initialize tracing subscriber once for tests
pub fn init_test_logger() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
    });
}

/// File-backed database in a throwaway directory. Keep the `TempDir` alive
/// for as long as the backend is used.
pub async fn temp_backend() -> (Arc<LibSqlBackend>, tempfile::TempDir) {
    let dir = tempfile::tempdir().expect("tempdir");
    let url = format!("file:{}", dir.path().join("reune.db").display());
    let db = Database::new(&DatabaseConfig::local(url))
        .await
        .expect("open database");
    (Arc::new(LibSqlBackend::new(db)), dir)
}

pub async fn orchestrator(
    analyzer: MessageAnalyzer,
    rpc: Arc<dyn EventPlanRpc>,
) -> (ChatOrchestrator, tempfile::TempDir) {
    init_test_logger();
    let (db, dir) = temp_backend().await;
    let config = ConversationConfig::default();
    let contexts = ContextManager::new(db.clone(), db.clone(), config.history_limit);
    let feedback = FeedbackManager::new(db.clone(), db, config.low_confidence_threshold);
    (
        ChatOrchestrator::new(analyzer, contexts, feedback, rpc, config),
        dir,
    )
}

pub async fn heuristic_orchestrator() -> (ChatOrchestrator, tempfile::TempDir) {
    orchestrator(
        MessageAnalyzer::heuristic_only(),
        Arc::new(HttpRpcClient::unavailable()),
    )
    .await
}

/// Chat model that plays back canned replies in order. An exhausted script
/// behaves like a failing provider.
#[derive(Default)]
pub struct ScriptedModel {
    replies: Mutex<VecDeque<Result<String>>>,
    pub requests: Mutex<Vec<ChatRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: impl IntoIterator<Item = &'static str>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().map(|r| Ok(r.to_string())).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            replies: Mutex::new(VecDeque::from([Err(ReuneError::Llm(
                "provider exploded".to_string(),
            ))])),
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChatModel for ScriptedModel {
    async fn chat(&self, request: ChatRequest) -> Result<ChatReply> {
        self.requests.lock().unwrap().push(request);
        let next = self
            .replies
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(ReuneError::Llm("script exhausted".to_string())));
        next.map(|content| ChatReply {
            content: Some(content),
            tool_calls: Vec::new(),
        })
    }
}

/// In-memory stand-in for the hosted platform.
#[derive(Default)]
pub struct StubPlatform {
    pub plan: Mutex<Option<EventPlan>>,
    pub fail_writes: bool,
    pub replaced_items: Mutex<Vec<Item>>,
}

impl StubPlatform {
    pub fn with_event(event: Event) -> Self {
        Self {
            plan: Mutex::new(Some(EventPlan {
                event,
                items: Vec::new(),
                participants: Vec::new(),
                distribution: Vec::new(),
            })),
            ..Default::default()
        }
    }

    pub fn failing_writes(event: Event) -> Self {
        Self {
            fail_writes: true,
            ..Self::with_event(event)
        }
    }
}

pub fn collecting_event(id: &str) -> Event {
    Event {
        id: id.to_string(),
        user_id: "u1".to_string(),
        status: EventStatus::CollectingCore,
        ..Default::default()
    }
}

#[async_trait]
impl EventPlanRpc for StubPlatform {
    async fn get_event_plan(&self, event_id: &str) -> Result<Option<EventPlan>> {
        Ok(self
            .plan
            .lock()
            .unwrap()
            .clone()
            .filter(|plan| plan.event.id == event_id))
    }

    async fn items_replace_for_event(&self, event_id: &str, items: &[Item]) -> Result<Vec<Item>> {
        if self.fail_writes {
            return Err(ReuneError::Rpc {
                procedure: "items_replace_for_event".to_string(),
                message: "500: boom".to_string(),
            });
        }
        *self.replaced_items.lock().unwrap() = items.to_vec();
        if let Some(plan) = self.plan.lock().unwrap().as_mut() {
            if plan.event.id == event_id {
                plan.items = items.to_vec();
                plan.event.status = EventStatus::ItemsPendingConfirmation;
            }
        }
        Ok(items.to_vec())
    }

    async fn participants_bulk_upsert(
        &self,
        _event_id: &str,
        participants: &[Participant],
    ) -> Result<Vec<Participant>> {
        Ok(participants.to_vec())
    }

    async fn distribution_bulk_upsert(
        &self,
        _event_id: &str,
        rows: &[DistributionRow],
    ) -> Result<Vec<DistributionRow>> {
        Ok(rows.to_vec())
    }

    async fn get_distribution_summary(&self, _event_id: &str) -> Result<DistributionSummary> {
        Ok(DistributionSummary {
            per_participant: Vec::new(),
            total_cost: 0.0,
        })
    }
}
