//! AI writing assistant use cases.
//!
//! Thin request/response wrappers over the provider ports. Nothing is
//! retried; the assistant run poll is the only loop.

use inkworld_domain::DomainError;

use crate::infrastructure::ports::{AssistantError, LlmError, RepoError, RunStatus, SpeechError};

mod chat;
mod grammar;
mod intervention;
mod speech;

pub use chat::ChatOps;
pub use grammar::GrammarOps;
pub use intervention::InterventionOps;
pub use speech::SpeechOps;

#[derive(Debug, thiserror::Error)]
pub enum AiError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Story not found")]
    StoryNotFound,
    #[error("Assistant run ended with status {}", .0.as_str())]
    RunFailed(RunStatus),
    #[error("Assistant run completed without a reply")]
    NoReply,
    #[error("Unreadable model reply: {0}")]
    InvalidResponse(String),
    #[error(transparent)]
    Assistant(#[from] AssistantError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error(transparent)]
    Speech(#[from] SpeechError),
    #[error("Repository error: {0}")]
    Repo(#[from] RepoError),
}

impl From<DomainError> for AiError {
    fn from(err: DomainError) -> Self {
        AiError::InvalidInput(err.to_string())
    }
}

/// Container for assistant use cases.
pub struct AssistantUseCases {
    pub chat: ChatOps,
    pub grammar: GrammarOps,
    pub speech: SpeechOps,
    pub intervention: InterventionOps,
}

impl AssistantUseCases {
    pub fn new(
        chat: ChatOps,
        grammar: GrammarOps,
        speech: SpeechOps,
        intervention: InterventionOps,
    ) -> Self {
        Self {
            chat,
            grammar,
            speech,
            intervention,
        }
    }
}
