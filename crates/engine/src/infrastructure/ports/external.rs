//! External service port traits (LLM, speech, assistant threads, blob storage).

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use inkworld_domain::SpeechInput;

use super::error::{AssistantError, BlobError, LlmError, SpeechError};

// =============================================================================
// LLM Types
// =============================================================================

#[derive(Debug, Clone)]
pub struct LlmRequest {
    /// The conversation history
    pub messages: Vec<ChatMessage>,
    /// System prompt / context
    pub system_prompt: Option<String>,
    /// Temperature for response generation (0.0 - 2.0)
    pub temperature: Option<f32>,
    /// Maximum tokens to generate
    pub max_tokens: Option<u32>,
    pub response_format: ResponseFormat,
}

impl LlmRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            system_prompt: None,
            temperature: None,
            max_tokens: None,
            response_format: ResponseFormat::Text,
        }
    }

    pub fn with_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.system_prompt = Some(prompt.into());
        self
    }

    pub fn with_temperature(mut self, temp: f32) -> Self {
        self.temperature = Some(temp);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    /// Ask the provider for a JSON object rather than free text.
    pub fn expecting_json(mut self) -> Self {
        self.response_format = ResponseFormat::JsonObject;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseFormat {
    #[default]
    Text,
    JsonObject,
}

/// A message in the conversation
#[derive(Debug, Clone)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::Assistant,
            content: content.into(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
    System,
}

/// Response from the LLM
#[derive(Debug, Clone)]
pub struct LlmResponse {
    pub content: String,
    pub finish_reason: FinishReason,
    pub usage: Option<TokenUsage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishReason {
    Stop,
    Length,
    ContentFilter,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LlmPort: Send + Sync {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError>;
}

// =============================================================================
// Speech
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpeechPort: Send + Sync {
    /// Returns MPEG audio bytes.
    async fn synthesize(&self, input: SpeechInput) -> Result<Vec<u8>, SpeechError>;
}

// =============================================================================
// Assistant threads
// =============================================================================

/// Provider-side run lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Incomplete,
    Expired,
    #[serde(other)]
    Unknown,
}

impl RunStatus {
    /// A run that ended without producing a reply.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired | RunStatus::Incomplete
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Incomplete => "incomplete",
            RunStatus::Expired => "expired",
            RunStatus::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssistantRun {
    pub id: String,
    pub status: RunStatus,
}

/// One message of a provider thread, newest first as the provider lists them.
#[derive(Debug, Clone, PartialEq)]
pub struct ThreadMessage {
    pub id: String,
    pub role: MessageRole,
    pub run_id: Option<String>,
    pub text_segments: Vec<String>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AssistantPort: Send + Sync {
    async fn create_thread(&self) -> Result<String, AssistantError>;
    async fn add_user_message(&self, thread_id: &str, content: &str)
        -> Result<(), AssistantError>;
    /// Start a run of the configured assistant on the thread.
    async fn start_run(&self, thread_id: &str) -> Result<AssistantRun, AssistantError>;
    async fn get_run(&self, thread_id: &str, run_id: &str)
        -> Result<AssistantRun, AssistantError>;
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, AssistantError>;
}

// =============================================================================
// Blob storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BlobStorePort: Send + Sync {
    /// Store `bytes` under `name`, returning the public URL.
    async fn put(&self, name: &str, bytes: Vec<u8>) -> Result<String, BlobError>;
}
