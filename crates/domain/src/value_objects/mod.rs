//! Value objects - Immutable objects defined by their attributes

mod grammar;
mod intervention;
mod speech;
mod style;
mod text;

pub use grammar::{GrammarFocus, GrammarReport, GrammarSuggestion, TextSpan, DEFAULT_CONFIDENCE_THRESHOLD};
pub use intervention::{
    matched_triggers, Intervention, InterventionDecision, InterventionFrequency,
    InterventionStyle,
};
pub use speech::{clamp_speed, SpeechInput, Voice, SPEECH_MAX_CHARS, SPEECH_MAX_SPEED, SPEECH_MIN_SPEED};
pub use style::{
    profile_confidence, StyleEligibility, StyleMetrics, StyleVoice,
    MIN_CONFIDENCE_FOR_GENERATION, MIN_STORIES_FOR_ANALYSIS, MIN_WORDS_FOR_ANALYSIS,
};
pub use text::{chunk_for_speech, paragraphs, split_sentences, strip_markup, truncate_chars, word_count};
