//! World in Ink domain model.
//!
//! Pure types and rules for stories, their branching graphs, characters and
//! writing-style profiles. No I/O lives here.

pub mod aggregates;
pub mod entities;
pub mod error;
pub mod ids;
pub mod value_objects;

pub use aggregates::{GraphStats, NodeWithChoices, StoryGraph, StoryStructure, StructureNode};

pub use entities::{
    Character, Choice, ChoiceWithEndpoints, LibraryEntry, NodeSummary, NodeType, Personality,
    Session, Story, StoryKind, StoryNode, StyleProfile, User, UNTITLED_STORY,
};

pub use error::DomainError;

pub use ids::{CharacterId, ChoiceId, InterventionId, NodeId, StoryId, UserId};

pub use value_objects::{
    chunk_for_speech, clamp_speed, matched_triggers, paragraphs, profile_confidence,
    split_sentences, strip_markup, truncate_chars, word_count, GrammarFocus, GrammarReport,
    GrammarSuggestion, Intervention, InterventionDecision, InterventionFrequency,
    InterventionStyle, SpeechInput, StyleEligibility, StyleMetrics, StyleVoice, TextSpan, Voice,
    DEFAULT_CONFIDENCE_THRESHOLD, MIN_CONFIDENCE_FOR_GENERATION, MIN_STORIES_FOR_ANALYSIS,
    MIN_WORDS_FOR_ANALYSIS, SPEECH_MAX_CHARS, SPEECH_MAX_SPEED, SPEECH_MIN_SPEED,
};
