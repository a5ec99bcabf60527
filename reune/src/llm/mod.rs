mod api;
mod chat;
pub mod prompts;
mod provider;

pub use api::LlmApiClient;
pub use chat::{ChatMessage, ChatModel, ChatReply, ChatRequest, ChatRole, ToolCall, ToolDefinition};
pub use provider::{CompletionOptions, LlmBackend, LlmProvider};
