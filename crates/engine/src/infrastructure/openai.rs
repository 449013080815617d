//! OpenAI-compatible provider client (chat completions, speech, assistant threads)

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use inkworld_domain::SpeechInput;

use crate::infrastructure::ports::{
    AssistantError, AssistantPort, AssistantRun, FinishReason, LlmError, LlmPort, LlmRequest,
    LlmResponse, MessageRole, ResponseFormat, RunStatus, SpeechError, SpeechPort, ThreadMessage,
    TokenUsage,
};

/// Default provider base URL.
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

/// Default chat model.
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";

/// Default text-to-speech model.
pub const DEFAULT_TTS_MODEL: &str = "tts-1";

const ASSISTANTS_BETA_HEADER: (&str, &str) = ("OpenAI-Beta", "assistants=v2");

/// Client for an OpenAI-compatible HTTP API
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    tts_model: String,
    assistant_id: Option<String>,
}

impl OpenAiClient {
    pub fn new(base_url: &str, api_key: &str, model: &str) -> Self {
        // Completions can be slow; speech and assistant calls share the limit
        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            tts_model: DEFAULT_TTS_MODEL.to_string(),
            assistant_id: None,
        }
    }

    pub fn with_tts_model(mut self, tts_model: &str) -> Self {
        self.tts_model = tts_model.to_string();
        self
    }

    /// Assistant used for thread runs. Without one, assistant calls fail
    /// with [`AssistantError::NotConfigured`].
    pub fn with_assistant(mut self, assistant_id: Option<String>) -> Self {
        self.assistant_id = assistant_id.filter(|id| !id.trim().is_empty());
        self
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client
            .post(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client
            .get(format!("{}{}", self.base_url, path))
            .bearer_auth(&self.api_key)
    }

    fn assistant_id(&self) -> Result<&str, AssistantError> {
        self.assistant_id
            .as_deref()
            .ok_or(AssistantError::NotConfigured)
    }

    async fn send_assistant(&self, request: RequestBuilder) -> Result<Response, AssistantError> {
        let response = request
            .header(ASSISTANTS_BETA_HEADER.0, ASSISTANTS_BETA_HEADER.1)
            .send()
            .await
            .map_err(|e| AssistantError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| AssistantError::RequestFailed(e.to_string()))?;
            return Err(AssistantError::RequestFailed(error_text));
        }
        Ok(response)
    }
}

#[async_trait]
impl LlmPort for OpenAiClient {
    async fn generate(&self, request: LlmRequest) -> Result<LlmResponse, LlmError> {
        let api_request = build_chat_request(&self.model, &request);

        let response = self
            .post("/v1/chat/completions")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| LlmError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| LlmError::RequestFailed(e.to_string()))?;
            return Err(LlmError::RequestFailed(error_text));
        }

        let api_response: OpenAIChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        convert_response(api_response)
    }
}

#[async_trait]
impl SpeechPort for OpenAiClient {
    async fn synthesize(&self, input: SpeechInput) -> Result<Vec<u8>, SpeechError> {
        let api_request = OpenAISpeechRequest {
            model: &self.tts_model,
            input: &input.text,
            voice: input.voice.as_str(),
            speed: input.speed,
            response_format: "mp3",
        };

        let response = self
            .post("/v1/audio/speech")
            .json(&api_request)
            .send()
            .await
            .map_err(|e| SpeechError::RequestFailed(e.to_string()))?;

        if !response.status().is_success() {
            let error_text = response
                .text()
                .await
                .map_err(|e| SpeechError::RequestFailed(e.to_string()))?;
            return Err(SpeechError::RequestFailed(error_text));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| SpeechError::RequestFailed(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

#[async_trait]
impl AssistantPort for OpenAiClient {
    async fn create_thread(&self) -> Result<String, AssistantError> {
        self.assistant_id()?;
        let response = self
            .send_assistant(self.post("/v1/threads").json(&serde_json::json!({})))
            .await?;
        let thread: OpenAIObject = response
            .json()
            .await
            .map_err(|e| AssistantError::InvalidResponse(e.to_string()))?;
        Ok(thread.id)
    }

    async fn add_user_message(
        &self,
        thread_id: &str,
        content: &str,
    ) -> Result<(), AssistantError> {
        let body = OpenAIThreadMessageRequest {
            role: "user",
            content,
        };
        self.send_assistant(
            self.post(&format!("/v1/threads/{}/messages", thread_id))
                .json(&body),
        )
        .await?;
        Ok(())
    }

    async fn start_run(&self, thread_id: &str) -> Result<AssistantRun, AssistantError> {
        let body = OpenAIRunRequest {
            assistant_id: self.assistant_id()?,
        };
        let response = self
            .send_assistant(self.post(&format!("/v1/threads/{}/runs", thread_id)).json(&body))
            .await?;
        let run: OpenAIRun = response
            .json()
            .await
            .map_err(|e| AssistantError::InvalidResponse(e.to_string()))?;
        Ok(run.into())
    }

    async fn get_run(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<AssistantRun, AssistantError> {
        let response = self
            .send_assistant(self.get(&format!("/v1/threads/{}/runs/{}", thread_id, run_id)))
            .await?;
        let run: OpenAIRun = response
            .json()
            .await
            .map_err(|e| AssistantError::InvalidResponse(e.to_string()))?;
        Ok(run.into())
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<ThreadMessage>, AssistantError> {
        let response = self
            .send_assistant(self.get(&format!("/v1/threads/{}/messages", thread_id)))
            .await?;
        let list: OpenAIMessageList = response
            .json()
            .await
            .map_err(|e| AssistantError::InvalidResponse(e.to_string()))?;
        Ok(convert_thread_messages(list))
    }
}

fn build_chat_request(model: &str, request: &LlmRequest) -> OpenAIChatRequest {
    OpenAIChatRequest {
        model: model.to_string(),
        messages: build_messages(request),
        temperature: request.temperature,
        max_tokens: request.max_tokens,
        response_format: match request.response_format {
            ResponseFormat::Text => None,
            ResponseFormat::JsonObject => Some(OpenAIResponseFormat {
                r#type: "json_object",
            }),
        },
    }
}

fn build_messages(request: &LlmRequest) -> Vec<OpenAIMessage> {
    let mut messages = Vec::new();

    if let Some(system) = &request.system_prompt {
        messages.push(OpenAIMessage {
            role: "system".to_string(),
            content: Some(system.clone()),
        });
    }

    for msg in &request.messages {
        messages.push(OpenAIMessage {
            role: role_name(msg.role).to_string(),
            content: Some(msg.content.clone()),
        });
    }

    messages
}

fn role_name(role: MessageRole) -> &'static str {
    match role {
        MessageRole::User => "user",
        MessageRole::Assistant => "assistant",
        MessageRole::System => "system",
    }
}

fn convert_response(response: OpenAIChatResponse) -> Result<LlmResponse, LlmError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| LlmError::InvalidResponse("No choices in LLM response".to_string()))?;

    let finish_reason = match choice.finish_reason.as_deref() {
        Some("stop") | None => FinishReason::Stop,
        Some("length") => FinishReason::Length,
        Some("content_filter") => FinishReason::ContentFilter,
        Some(_) => FinishReason::Unknown,
    };

    Ok(LlmResponse {
        content: choice.message.content.unwrap_or_default(),
        finish_reason,
        usage: response.usage.map(|u| TokenUsage {
            prompt_tokens: u.prompt_tokens,
            completion_tokens: u.completion_tokens,
            total_tokens: u.total_tokens,
        }),
    })
}

fn convert_thread_messages(list: OpenAIMessageList) -> Vec<ThreadMessage> {
    list.data
        .into_iter()
        .map(|message| ThreadMessage {
            id: message.id,
            role: match message.role.as_str() {
                "assistant" => MessageRole::Assistant,
                "system" => MessageRole::System,
                _ => MessageRole::User,
            },
            run_id: message.run_id,
            text_segments: message
                .content
                .into_iter()
                .filter_map(|part| part.text.map(|t| t.value))
                .collect(),
        })
        .collect()
}

impl From<OpenAIRun> for AssistantRun {
    fn from(run: OpenAIRun) -> Self {
        Self {
            id: run.id,
            status: run.status,
        }
    }
}

// =============================================================================
// OpenAI API types
// =============================================================================

#[derive(Debug, Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<OpenAIResponseFormat>,
}

#[derive(Debug, Serialize)]
struct OpenAIResponseFormat {
    r#type: &'static str,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct OpenAIMessage {
    role: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIChatResponse {
    choices: Vec<OpenAIChoice>,
    usage: Option<OpenAIUsage>,
}

#[derive(Debug, Deserialize, Default)]
struct OpenAIChoice {
    message: OpenAIMessage,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenAIUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Serialize)]
struct OpenAISpeechRequest<'a> {
    model: &'a str,
    input: &'a str,
    voice: &'a str,
    speed: f32,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAIObject {
    id: String,
}

#[derive(Debug, Serialize)]
struct OpenAIThreadMessageRequest<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct OpenAIRunRequest<'a> {
    assistant_id: &'a str,
}

#[derive(Debug, Deserialize)]
struct OpenAIRun {
    id: String,
    status: RunStatus,
}

#[derive(Debug, Deserialize)]
struct OpenAIMessageList {
    data: Vec<OpenAIThreadMessage>,
}

#[derive(Debug, Deserialize)]
struct OpenAIThreadMessage {
    id: String,
    role: String,
    #[serde(default)]
    run_id: Option<String>,
    #[serde(default)]
    content: Vec<OpenAIContentPart>,
}

#[derive(Debug, Deserialize)]
struct OpenAIContentPart {
    #[serde(default)]
    text: Option<OpenAIText>,
}

#[derive(Debug, Deserialize)]
struct OpenAIText {
    value: String,
}
