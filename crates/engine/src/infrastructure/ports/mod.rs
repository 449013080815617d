//! Port traits for infrastructure boundaries.
//!
//! These are the ONLY abstractions in the engine. Everything else is concrete types.
//! Ports exist for:
//! - Database access (SQLite today)
//! - LLM, speech and assistant-thread calls (any OpenAI-compatible provider)
//! - Blob storage for uploads
//! - Clock/Random (for testing)

mod error;
mod external;
mod repos;
mod testing;

// =============================================================================
// Repository Ports
// =============================================================================
pub use repos::{
    CharacterRepo, ChoiceRepo, LibraryFilter, NodeRepo, SessionRepo, StoryRepo, StyleProfileRepo,
};

// =============================================================================
// External Service Ports
// =============================================================================
pub use external::{
    AssistantPort, AssistantRun, BlobStorePort, ChatMessage, FinishReason, LlmPort, LlmRequest,
    LlmResponse, MessageRole, ResponseFormat, RunStatus, SpeechPort, ThreadMessage, TokenUsage,
};

pub use error::{AssistantError, BlobError, LlmError, RepoError, SpeechError};

// =============================================================================
// Test-Only Mocks (only available during test builds)
// =============================================================================
#[cfg(test)]
pub use repos::{
    MockCharacterRepo, MockChoiceRepo, MockNodeRepo, MockSessionRepo, MockStoryRepo,
    MockStyleProfileRepo,
};

#[cfg(test)]
pub use external::{MockAssistantPort, MockBlobStorePort, MockLlmPort, MockSpeechPort};

#[cfg(test)]
pub use testing::{MockClockPort, MockRandomPort};

// =============================================================================
// Testing Ports
// =============================================================================
pub use testing::{ClockPort, RandomPort};
