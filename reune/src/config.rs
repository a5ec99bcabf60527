use serde::Deserialize;
use std::env;

fn parse_env_or<T: std::str::FromStr>(var: &str, default: T) -> T
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Using default.", val, var, e);
                default
            }
        },
        Err(_) => default,
    }
}

fn parse_env_opt<T: std::str::FromStr>(var: &str) -> Option<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(var) {
        Ok(val) => match val.parse() {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                tracing::warn!("Invalid value '{}' for {}: {}. Ignoring.", val, var, e);
                None
            }
        },
        Err(_) => None,
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: Option<LlmConfig>,
    pub rpc: Option<RpcConfig>,
    pub conversation: ConversationConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub api_keys: Vec<String>,
    pub json_logs: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub auth_token: Option<String>,
    /// Embedded replica file when `url` points at a remote libSQL server.
    pub local_path: Option<String>,
    pub busy_timeout_ms: u64,
    pub journal_mode: String,
    pub synchronous: String,
}

impl DatabaseConfig {
    /// Local file database with the default pragmas.
    pub fn local(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            auth_token: None,
            local_path: None,
            busy_timeout_ms: 5000,
            journal_mode: "WAL".to_string(),
            synchronous: "NORMAL".to_string(),
        }
    }
}

/// LLM configuration for the chat model used by message analysis
#[derive(Debug, Clone, Deserialize)]
pub struct LlmConfig {
    pub model: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub timeout_secs: u64,
    pub max_retries: u32,
    /// Sampling temperature for extraction prompts.
    pub temperature: f32,
}

/// Hosted event platform reached through named remote procedures.
#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout_secs: u64,
}

/// Tunables for the turn pipeline and the proactive insight engine.
#[derive(Debug, Clone, Deserialize)]
pub struct ConversationConfig {
    /// Minimum gap between two unsolicited suggestions.
    pub proactive_cooldown_hours: i64,
    pub stale_conversation_hours: i64,
    pub history_limit: u32,
    pub summary_recent_messages: usize,
    pub low_confidence_threshold: f32,
    pub enable_llm_analysis: bool,
    pub enable_auto_actions: bool,
}

impl Default for ConversationConfig {
    fn default() -> Self {
        Self {
            proactive_cooldown_hours: 2,
            stale_conversation_hours: 24,
            history_limit: 50,
            summary_recent_messages: 10,
            low_confidence_threshold: 0.6,
            enable_llm_analysis: true,
            enable_auto_actions: true,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        let conversation_defaults = ConversationConfig::default();

        Self {
            server: ServerConfig {
                host: env::var("REUNE_HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
                port: parse_env_or("REUNE_PORT", 3000),
                api_keys: env::var("REUNE_API_KEYS")
                    .map(|keys| {
                        keys.split(',')
                            .map(|s| s.trim().to_string())
                            .filter(|s| !s.is_empty())
                            .collect()
                    })
                    .unwrap_or_default(),
                json_logs: env::var("LOG_FORMAT")
                    .map(|v| v.eq_ignore_ascii_case("json"))
                    .unwrap_or(false),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").unwrap_or_else(|_| "file:reune.db".to_string()),
                auth_token: env::var("DATABASE_AUTH_TOKEN").ok(),
                local_path: env::var("DATABASE_LOCAL_PATH").ok(),
                busy_timeout_ms: parse_env_or("DATABASE_BUSY_TIMEOUT_MS", 5000),
                journal_mode: env::var("DATABASE_JOURNAL_MODE")
                    .unwrap_or_else(|_| "WAL".to_string()),
                synchronous: env::var("DATABASE_SYNCHRONOUS")
                    .unwrap_or_else(|_| "NORMAL".to_string()),
            },
            llm: env::var("LLM_MODEL").ok().map(|model| LlmConfig {
                model,
                api_key: env::var("LLM_API_KEY").ok(),
                base_url: env::var("LLM_BASE_URL").ok(),
                timeout_secs: parse_env_or("LLM_TIMEOUT", 30),
                max_retries: parse_env_or("LLM_MAX_RETRIES", 3),
                temperature: parse_env_or("LLM_TEMPERATURE", 0.3),
            }),
            rpc: env::var("RPC_BASE_URL").ok().map(|base_url| RpcConfig {
                base_url,
                api_key: env::var("RPC_API_KEY").ok(),
                timeout_secs: parse_env_or("RPC_TIMEOUT", 15),
            }),
            conversation: ConversationConfig {
                proactive_cooldown_hours: parse_env_or(
                    "PROACTIVE_COOLDOWN_HOURS",
                    conversation_defaults.proactive_cooldown_hours,
                ),
                stale_conversation_hours: parse_env_or(
                    "STALE_CONVERSATION_HOURS",
                    conversation_defaults.stale_conversation_hours,
                ),
                history_limit: parse_env_or("HISTORY_LIMIT", conversation_defaults.history_limit),
                summary_recent_messages: parse_env_or(
                    "SUMMARY_RECENT_MESSAGES",
                    conversation_defaults.summary_recent_messages,
                ),
                low_confidence_threshold: parse_env_opt("LOW_CONFIDENCE_THRESHOLD")
                    .filter(|v: &f32| (0.0..=1.0).contains(v))
                    .unwrap_or(conversation_defaults.low_confidence_threshold),
                enable_llm_analysis: parse_env_or(
                    "ENABLE_LLM_ANALYSIS",
                    conversation_defaults.enable_llm_analysis,
                ),
                enable_auto_actions: parse_env_or(
                    "ENABLE_AUTO_ACTIONS",
                    conversation_defaults.enable_auto_actions,
                ),
            },
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}

/// Known LLM providers that use OpenAI-compatible APIs
pub const KNOWN_LLM_PROVIDERS: &[&str] = &["openai", "openrouter", "ollama", "lmstudio"];

/// Parse an LLM model name into (provider, model) tuple.
pub fn parse_llm_provider_model(model: &str) -> (&str, &str) {
    if let Some((prefix, rest)) = model.split_once('/') {
        let prefix_lower = prefix.to_lowercase();
        if KNOWN_LLM_PROVIDERS.contains(&prefix_lower.as_str()) {
            return (prefix, rest);
        }
    }
    // Default to treating the whole string as a local model
    ("local", model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_server_config_defaults() {
        std::env::remove_var("REUNE_PORT");
        std::env::remove_var("REUNE_API_KEYS");

        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert!(config.server.api_keys.is_empty());
    }

    #[test]
    #[serial]
    fn test_api_keys_are_trimmed_and_filtered() {
        std::env::set_var("REUNE_API_KEYS", " key-a, ,key-b ");
        let config = Config::default();
        assert_eq!(config.server.api_keys, vec!["key-a", "key-b"]);
        std::env::remove_var("REUNE_API_KEYS");
    }

    #[test]
    #[serial]
    fn test_llm_config_absent_without_model() {
        std::env::remove_var("LLM_MODEL");
        let config = Config::default();
        assert!(config.llm.is_none());
    }

    #[test]
    #[serial]
    fn test_llm_config_from_env() {
        std::env::set_var("LLM_MODEL", "openai/gpt-4o-mini");
        std::env::set_var("LLM_TEMPERATURE", "0.5");

        let config = Config::default();
        let llm = config.llm.expect("llm config");
        assert_eq!(llm.model, "openai/gpt-4o-mini");
        assert_eq!(llm.timeout_secs, 30);
        assert_eq!(llm.max_retries, 3);
        assert_eq!(llm.temperature, 0.5);

        std::env::remove_var("LLM_MODEL");
        std::env::remove_var("LLM_TEMPERATURE");
    }

    #[test]
    #[serial]
    fn test_rpc_config_from_env() {
        std::env::set_var("RPC_BASE_URL", "https://project.example.co");
        std::env::set_var("RPC_TIMEOUT", "7");

        let config = Config::default();
        let rpc = config.rpc.expect("rpc config");
        assert_eq!(rpc.base_url, "https://project.example.co");
        assert_eq!(rpc.timeout_secs, 7);

        std::env::remove_var("RPC_BASE_URL");
        std::env::remove_var("RPC_TIMEOUT");
    }

    #[test]
    #[serial]
    fn test_conversation_config_defaults() {
        std::env::remove_var("PROACTIVE_COOLDOWN_HOURS");
        std::env::remove_var("LOW_CONFIDENCE_THRESHOLD");

        let config = Config::default();
        assert_eq!(config.conversation.proactive_cooldown_hours, 2);
        assert_eq!(config.conversation.stale_conversation_hours, 24);
        assert_eq!(config.conversation.low_confidence_threshold, 0.6);
        assert!(config.conversation.enable_llm_analysis);
    }

    #[test]
    #[serial]
    fn test_out_of_range_threshold_is_ignored() {
        std::env::set_var("LOW_CONFIDENCE_THRESHOLD", "1.7");
        let config = Config::default();
        assert_eq!(config.conversation.low_confidence_threshold, 0.6);
        std::env::remove_var("LOW_CONFIDENCE_THRESHOLD");
    }

    #[test]
    #[serial]
    fn test_database_pragmas_from_env() {
        std::env::set_var("DATABASE_BUSY_TIMEOUT_MS", "250");
        std::env::set_var("DATABASE_JOURNAL_MODE", "delete");
        std::env::remove_var("DATABASE_SYNCHRONOUS");

        let config = Config::default();
        assert_eq!(config.database.busy_timeout_ms, 250);
        assert_eq!(config.database.journal_mode, "delete");
        assert_eq!(config.database.synchronous, "NORMAL");

        std::env::remove_var("DATABASE_BUSY_TIMEOUT_MS");
        std::env::remove_var("DATABASE_JOURNAL_MODE");
    }

    #[test]
    #[serial]
    fn test_parse_env_or_invalid_value_falls_back() {
        std::env::set_var("__TEST_PARSE_PORT", "not-a-port");
        let result: u16 = parse_env_or("__TEST_PARSE_PORT", 3000);
        assert_eq!(result, 3000);
        std::env::remove_var("__TEST_PARSE_PORT");
    }

    #[test]
    fn test_parse_llm_provider_model() {
        assert_eq!(
            parse_llm_provider_model("openrouter/openai/gpt-4o"),
            ("openrouter", "openai/gpt-4o")
        );
        assert_eq!(parse_llm_provider_model("llama3"), ("local", "llama3"));
        assert_eq!(
            parse_llm_provider_model("custom/model"),
            ("local", "custom/model")
        );
    }
}
