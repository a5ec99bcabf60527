use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;

use async_openai::{
    config::OpenAIConfig,
    error::{ApiError, OpenAIError},
    types::{
        ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestMessage,
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        ChatCompletionTool, ChatCompletionToolArgs, ChatCompletionToolType,
        CreateChatCompletionRequest, CreateChatCompletionRequestArgs,
        CreateChatCompletionResponse, FunctionObjectArgs,
    },
    Client,
};

use crate::{
    config::{parse_llm_provider_model, LlmConfig},
    error::{ReuneError, Result},
    llm::chat::{ChatMessage, ChatReply, ChatRequest, ChatRole, ToolCall, ToolDefinition},
    llm::provider::CompletionOptions,
};

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";
const OLLAMA_BASE_URL: &str = "http://localhost:11434/v1";
const LMSTUDIO_BASE_URL: &str = "http://localhost:1234/v1";

const BASE_RETRY_DELAY_MS: u64 = 100;
const MAX_RETRY_DELAY: Duration = Duration::from_secs(10);

/// Delay before retry number `attempt` (1-based): 100ms doubling, capped at 10s.
fn retry_delay(attempt: u32) -> Duration {
    let factor = 1u64
        .checked_shl(attempt.saturating_sub(1))
        .unwrap_or(u64::MAX);
    Duration::from_millis(BASE_RETRY_DELAY_MS.saturating_mul(factor)).min(MAX_RETRY_DELAY)
}

#[derive(Debug, Clone)]
struct ApiConfig {
    base_url: String,
    api_key: Option<String>,
    model: String,
    timeout_secs: u64,
    max_retries: u32,
}

/// OpenAI-compatible chat client with bounded retries.
#[derive(Clone)]
pub struct LlmApiClient {
    client: Client<OpenAIConfig>,
    config: ApiConfig,
}

impl LlmApiClient {
    pub fn new(config: &LlmConfig) -> Result<Self> {
        let api_config = ApiConfig::from_llm_config(config);

        let (provider, _) = parse_llm_provider_model(&config.model);
        let needs_api_key = !matches!(
            provider.to_lowercase().as_str(),
            "ollama" | "local" | "lmstudio"
        );

        if needs_api_key && api_config.api_key.is_none() {
            return Err(ReuneError::Llm(
                "API key required for this provider".to_string(),
            ));
        }

        let openai_config = OpenAIConfig::new()
            .with_api_base(api_config.base_url.clone())
            .with_api_key(api_config.api_key.clone().unwrap_or_default());

        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(api_config.timeout_secs))
            .build()
            .map_err(|error| {
                ReuneError::Llm(format!("Failed to create LLM HTTP client: {error}"))
            })?;

        // async-openai retries server errors on its own for up to 15 minutes
        // unless its backoff is capped; keep it inside the request timeout.
        let backoff = backoff::ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(api_config.timeout_secs)),
            ..Default::default()
        };

        let client = Client::with_config(openai_config)
            .with_http_client(http_client)
            .with_backoff(backoff);

        Ok(Self {
            client,
            config: api_config,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Run one chat completion. Transient failures are retried up to
    /// `max_retries` times with doubling delays starting at 100ms and capped
    /// at 10s; rate limits and credential problems are returned at once.
    pub async fn chat(
        &self,
        chat: &ChatRequest,
        options: Option<&CompletionOptions>,
    ) -> Result<ChatReply> {
        if chat.messages.iter().all(|m| m.content.trim().is_empty()) {
            return Err(ReuneError::Validation(
                "Chat request has no message content".to_string(),
            ));
        }

        let request = self.build_request(chat, options)?;
        let mut attempt = 0;

        loop {
            let error = match self.client.chat().create(request.clone()).await {
                Ok(response) => return Self::extract_reply(response),
                Err(error) => Failure::classify(error),
            };

            match error {
                Failure::Transient(error) if attempt < self.config.max_retries => {
                    attempt += 1;
                    tracing::debug!(attempt, error = %error, "Retrying LLM request");
                    tokio::time::sleep(retry_delay(attempt)).await;
                }
                failure => return Err(failure.into_error()),
            }
        }
    }

    fn build_request(
        &self,
        chat: &ChatRequest,
        options: Option<&CompletionOptions>,
    ) -> Result<CreateChatCompletionRequest> {
        let mut messages = Vec::with_capacity(chat.messages.len() + 1);

        if let Some(system_prompt) = chat
            .system_prompt
            .as_deref()
            .filter(|value| !value.trim().is_empty())
        {
            messages.push(Self::system_message(system_prompt)?);
        }

        for message in &chat.messages {
            messages.push(Self::convert_message(message)?);
        }

        let mut request = CreateChatCompletionRequestArgs::default();
        request.model(self.config.model.clone()).messages(messages);

        if !chat.tools.is_empty() {
            let tools = chat
                .tools
                .iter()
                .map(Self::convert_tool)
                .collect::<Result<Vec<_>>>()?;
            request.tools(tools);
        }

        Self::apply_completion_options(&mut request, options);

        request.build().map_err(|error| {
            ReuneError::Validation(format!("Invalid LLM chat request: {error}"))
        })
    }

    fn system_message(content: &str) -> Result<ChatCompletionRequestMessage> {
        Ok(ChatCompletionRequestSystemMessageArgs::default()
            .content(content)
            .build()
            .map_err(|error| ReuneError::Validation(format!("Invalid system prompt: {error}")))?
            .into())
    }

    fn convert_message(message: &ChatMessage) -> Result<ChatCompletionRequestMessage> {
        match message.role {
            ChatRole::System => Self::system_message(&message.content),
            ChatRole::User => Ok(ChatCompletionRequestUserMessageArgs::default()
                .content(message.content.as_str())
                .build()
                .map_err(|error| ReuneError::Validation(format!("Invalid user message: {error}")))?
                .into()),
            ChatRole::Assistant => Ok(ChatCompletionRequestAssistantMessageArgs::default()
                .content(message.content.as_str())
                .build()
                .map_err(|error| {
                    ReuneError::Validation(format!("Invalid assistant message: {error}"))
                })?
                .into()),
        }
    }

    fn convert_tool(tool: &ToolDefinition) -> Result<ChatCompletionTool> {
        let function = FunctionObjectArgs::default()
            .name(tool.name.clone())
            .description(tool.description.clone())
            .parameters(tool.parameters.clone())
            .build()
            .map_err(|error| ReuneError::Validation(format!("Invalid tool definition: {error}")))?;

        ChatCompletionToolArgs::default()
            .r#type(ChatCompletionToolType::Function)
            .function(function)
            .build()
            .map_err(|error| ReuneError::Validation(format!("Invalid tool definition: {error}")))
    }

    fn apply_completion_options(
        request: &mut CreateChatCompletionRequestArgs,
        options: Option<&CompletionOptions>,
    ) {
        let Some(options) = options else {
            return;
        };

        if let Some(temperature) = options.temperature {
            request.temperature(temperature);
        }

        if let Some(max_tokens) = options.max_tokens {
            request.max_tokens(max_tokens);
        }
    }

    fn extract_reply(response: CreateChatCompletionResponse) -> Result<ChatReply> {
        let message = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ReuneError::Llm("LLM response contained no choices".to_string()))?
            .message;

        let tool_calls: Vec<ToolCall> = message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(|call| ToolCall {
                id: call.id,
                name: call.function.name,
                arguments: serde_json::from_str(&call.function.arguments)
                    .unwrap_or(Value::String(call.function.arguments)),
            })
            .collect();

        let content = message.content.filter(|c| !c.trim().is_empty());

        if content.is_none() && tool_calls.is_empty() {
            return Err(ReuneError::Llm(
                "LLM response contained empty content".to_string(),
            ));
        }

        Ok(ChatReply {
            content,
            tool_calls,
        })
    }
}

/// How a failed completion call should be handled.
enum Failure {
    RateLimited,
    Auth(String),
    Transient(ReuneError),
    Permanent(ReuneError),
}

impl Failure {
    fn classify(error: OpenAIError) -> Self {
        match error {
            OpenAIError::Reqwest(e) => match e.status() {
                Some(StatusCode::TOO_MANY_REQUESTS) => Self::RateLimited,
                Some(StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) => {
                    Self::Auth(e.to_string())
                }
                Some(status) if !status.is_server_error() => {
                    Self::Permanent(ReuneError::Llm(format!("LLM request failed: {e}")))
                }
                // No status means the request never completed (timeout, reset).
                _ => Self::Transient(ReuneError::Llm(format!("LLM request failed: {e}"))),
            },
            OpenAIError::ApiError(api) => {
                match ApiErrorKind::of(&api) {
                    ApiErrorKind::RateLimit => Self::RateLimited,
                    ApiErrorKind::Auth => Self::Auth(api.to_string()),
                    // Errors without a type or code come from upstream crashes.
                    ApiErrorKind::Untyped => {
                        Self::Transient(ReuneError::Llm(format!("LLM API error: {api}")))
                    }
                    ApiErrorKind::Other => {
                        Self::Permanent(ReuneError::Llm(format!("LLM API error: {api}")))
                    }
                }
            }
            OpenAIError::JSONDeserialize(e) => {
                Self::Permanent(ReuneError::Llm(format!("Failed to parse LLM response: {e}")))
            }
            OpenAIError::InvalidArgument(message) => {
                Self::Permanent(ReuneError::Validation(message))
            }
            other => Self::Permanent(ReuneError::Llm(other.to_string())),
        }
    }

    fn into_error(self) -> ReuneError {
        match self {
            Self::RateLimited => ReuneError::LlmRateLimit { retry_after: None },
            Self::Auth(detail) => ReuneError::Llm(format!("LLM authentication failed: {detail}")),
            Self::Transient(error) | Self::Permanent(error) => error,
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum ApiErrorKind {
    RateLimit,
    Auth,
    Untyped,
    Other,
}

impl ApiErrorKind {
    fn of(api: &ApiError) -> Self {
        let message = api.message.to_lowercase();
        let error_type = api.r#type.as_deref().unwrap_or_default().to_lowercase();
        let code = api.code.as_deref().unwrap_or_default().to_lowercase();

        let any = |needles: &[&str]| {
            needles
                .iter()
                .any(|n| message.contains(n) || error_type.contains(n) || code.contains(n))
        };

        if any(&["rate limit", "rate_limit", "too many requests", "insufficient_quota"]) {
            Self::RateLimit
        } else if any(&[
            "unauthorized",
            "forbidden",
            "authentication",
            "invalid api key",
            "invalid_api_key",
        ]) {
            Self::Auth
        } else if api.r#type.is_none() && api.code.is_none() {
            Self::Untyped
        } else {
            Self::Other
        }
    }
}

impl ApiConfig {
    fn from_llm_config(config: &LlmConfig) -> Self {
        let (provider, model) = parse_llm_provider_model(&config.model);

        let base_url = config
            .base_url
            .clone()
            .unwrap_or_else(|| default_base_url(provider).to_string());

        let normalized_model = if provider.eq_ignore_ascii_case("local") {
            config.model.clone()
        } else {
            model.to_string()
        };

        Self {
            base_url,
            api_key: config.api_key.clone(),
            model: normalized_model,
            timeout_secs: config.timeout_secs,
            max_retries: config.max_retries,
        }
    }
}

fn default_base_url(provider: &str) -> &'static str {
    match provider.to_lowercase().as_str() {
        "openai" => OPENAI_BASE_URL,
        "openrouter" => OPENROUTER_BASE_URL,
        "ollama" => OLLAMA_BASE_URL,
        "lmstudio" => LMSTUDIO_BASE_URL,
        _ => OPENAI_BASE_URL,
    }
}
