//! Application state and composition.

use std::sync::Arc;
use std::time::Duration;

use crate::infrastructure::ports::{
    AssistantPort, BlobStorePort, CharacterRepo, ChoiceRepo, ClockPort, LlmPort, NodeRepo,
    RandomPort, SessionRepo, SpeechPort, StoryRepo, StyleProfileRepo,
};
use crate::use_cases::{
    assistant::{ChatOps, GrammarOps, InterventionOps, SpeechOps},
    AssistantUseCases, CharacterOps, GraphOps, StoryAccess, StoryOps, StyleOps, UploadOps,
};

/// Main application state.
///
/// Built once at startup and shared with every handler through axum state.
pub struct App {
    pub sessions: Arc<dyn SessionRepo>,
    pub clock: Arc<dyn ClockPort>,
    pub use_cases: UseCases,
}

/// Container for all use cases.
pub struct UseCases {
    pub stories: StoryOps,
    pub graph: GraphOps,
    pub characters: CharacterOps,
    pub assistant: AssistantUseCases,
    pub style: StyleOps,
    pub upload: UploadOps,
}

/// Every port the application needs, already constructed.
pub struct AppPorts {
    pub sessions: Arc<dyn SessionRepo>,
    pub stories: Arc<dyn StoryRepo>,
    pub nodes: Arc<dyn NodeRepo>,
    pub choices: Arc<dyn ChoiceRepo>,
    pub characters: Arc<dyn CharacterRepo>,
    pub style_profiles: Arc<dyn StyleProfileRepo>,
    pub llm: Arc<dyn LlmPort>,
    pub speech: Arc<dyn SpeechPort>,
    pub assistant: Arc<dyn AssistantPort>,
    pub blobs: Arc<dyn BlobStorePort>,
    pub clock: Arc<dyn ClockPort>,
    pub random: Arc<dyn RandomPort>,
}

impl App {
    pub fn new(ports: AppPorts, assistant_poll_interval: Duration) -> Self {
        let access = Arc::new(StoryAccess::new(
            ports.stories.clone(),
            ports.nodes.clone(),
            ports.choices.clone(),
        ));

        let use_cases = UseCases {
            stories: StoryOps::new(ports.stories.clone(), access.clone(), ports.clock.clone()),
            graph: GraphOps::new(
                ports.stories.clone(),
                ports.nodes.clone(),
                ports.choices.clone(),
                access.clone(),
                ports.clock.clone(),
            ),
            characters: CharacterOps::new(
                ports.characters.clone(),
                access.clone(),
                ports.clock.clone(),
            ),
            assistant: AssistantUseCases::new(
                ChatOps::new(ports.assistant.clone(), assistant_poll_interval),
                GrammarOps::new(ports.llm.clone()),
                SpeechOps::new(ports.speech.clone()),
                InterventionOps::new(
                    ports.characters.clone(),
                    access,
                    ports.llm.clone(),
                    ports.clock.clone(),
                    ports.random.clone(),
                ),
            ),
            style: StyleOps::new(
                ports.stories,
                ports.nodes,
                ports.style_profiles,
                ports.llm,
                ports.clock.clone(),
            ),
            upload: UploadOps::new(ports.blobs),
        };

        Self {
            sessions: ports.sessions,
            clock: ports.clock,
            use_cases,
        }
    }
}
