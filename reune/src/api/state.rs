use std::sync::Arc;

use crate::config::Config;
use crate::conversation::{ChatOrchestrator, ContextManager, FeedbackManager, MessageAnalyzer};
use crate::db::DatabaseBackend;
use crate::llm::LlmProvider;
use crate::rpc::EventPlanRpc;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub db: Arc<dyn DatabaseBackend>,
    pub llm: LlmProvider,
    pub rpc: Arc<dyn EventPlanRpc>,
    pub orchestrator: Arc<ChatOrchestrator>,
}

impl AppState {
    /// Wire the conversation pipeline over one storage backend.
    pub fn new<B>(config: Config, db: Arc<B>, llm: LlmProvider, rpc: Arc<dyn EventPlanRpc>) -> Self
    where
        B: DatabaseBackend + 'static,
    {
        let conversation = &config.conversation;

        let analyzer = if conversation.enable_llm_analysis && llm.is_available() {
            MessageAnalyzer::new(Arc::new(llm.clone()))
        } else {
            MessageAnalyzer::heuristic_only()
        };
        let contexts = ContextManager::new(db.clone(), db.clone(), conversation.history_limit);
        let feedback = FeedbackManager::new(
            db.clone(),
            db.clone(),
            conversation.low_confidence_threshold,
        );
        let orchestrator = ChatOrchestrator::new(
            analyzer,
            contexts,
            feedback,
            rpc.clone(),
            conversation.clone(),
        );

        Self {
            config: Arc::new(config),
            db,
            llm,
            rpc,
            orchestrator: Arc::new(orchestrator),
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use super::AppState;
    use crate::config::{Config, ConversationConfig, DatabaseConfig, ServerConfig};
    use crate::db::{Database, LibSqlBackend};
    use crate::llm::LlmProvider;
    use crate::rpc::HttpRpcClient;

    pub(crate) fn test_config(api_keys: Vec<String>, db_url: String) -> Config {
        Config {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 3000,
                api_keys,
                json_logs: false,
            },
            database: DatabaseConfig::local(db_url),
            llm: None,
            rpc: None,
            conversation: ConversationConfig::default(),
        }
    }

    /// Heuristic-only state over a throwaway database file.
    pub(crate) async fn test_state(api_keys: Vec<String>) -> (AppState, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let url = format!("file:{}", dir.path().join("reune.db").display());
        let config = test_config(api_keys, url);

        let db = Database::new(&config.database).await.unwrap();
        let backend = Arc::new(LibSqlBackend::new(db));
        let llm = LlmProvider::new(config.llm.as_ref());
        let rpc = Arc::new(HttpRpcClient::unavailable());

        (AppState::new(config, backend, llm, rpc), dir)
    }
}
