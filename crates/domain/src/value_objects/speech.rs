//! Text-to-speech request parameters.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::value_objects::text::truncate_chars;

/// Hard cap on characters sent to the speech provider in one request.
pub const SPEECH_MAX_CHARS: usize = 4000;

pub const SPEECH_MIN_SPEED: f32 = 0.25;
pub const SPEECH_MAX_SPEED: f32 = 4.0;

/// Voices the speech provider accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    #[default]
    Alloy,
    Echo,
    Fable,
    Onyx,
    Nova,
    Shimmer,
}

impl Voice {
    pub fn as_str(&self) -> &'static str {
        match self {
            Voice::Alloy => "alloy",
            Voice::Echo => "echo",
            Voice::Fable => "fable",
            Voice::Onyx => "onyx",
            Voice::Nova => "nova",
            Voice::Shimmer => "shimmer",
        }
    }
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Voice {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "alloy" => Ok(Voice::Alloy),
            "echo" => Ok(Voice::Echo),
            "fable" => Ok(Voice::Fable),
            "onyx" => Ok(Voice::Onyx),
            "nova" => Ok(Voice::Nova),
            "shimmer" => Ok(Voice::Shimmer),
            _ => Err(DomainError::parse(format!("Unknown voice: {}", s))),
        }
    }
}

/// Clamp a requested playback speed into the provider's accepted range.
///
/// Non-finite input falls back to normal speed.
pub fn clamp_speed(speed: f32) -> f32 {
    if !speed.is_finite() {
        return 1.0;
    }
    speed.clamp(SPEECH_MIN_SPEED, SPEECH_MAX_SPEED)
}

/// A speech request after normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct SpeechInput {
    pub text: String,
    pub voice: Voice,
    pub speed: f32,
}

impl SpeechInput {
    /// Normalize raw input: clamp speed, cut text at [`SPEECH_MAX_CHARS`].
    ///
    /// Overflow is dropped silently; callers that need full-length narration
    /// chunk with [`crate::chunk_for_speech`] first.
    pub fn new(text: &str, voice: Voice, speed: Option<f32>) -> Self {
        Self {
            text: truncate_chars(text, SPEECH_MAX_CHARS).to_string(),
            voice,
            speed: clamp_speed(speed.unwrap_or(1.0)),
        }
    }

    pub fn was_truncated(original: &str) -> bool {
        original.chars().count() > SPEECH_MAX_CHARS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clamps_speed_into_range() {
        assert_eq!(clamp_speed(10.0), 4.0);
        assert_eq!(clamp_speed(0.0), 0.25);
        assert_eq!(clamp_speed(-3.0), 0.25);
        assert_eq!(clamp_speed(1.5), 1.5);
        assert_eq!(clamp_speed(f32::NAN), 1.0);
    }

    #[test]
    fn truncates_text_to_exactly_the_cap() {
        let text = "x".repeat(SPEECH_MAX_CHARS + 250);
        let input = SpeechInput::new(&text, Voice::Nova, Some(10.0));
        assert_eq!(input.text.chars().count(), SPEECH_MAX_CHARS);
        assert_eq!(input.speed, 4.0);
        assert!(SpeechInput::was_truncated(&text));
    }

    #[test]
    fn parses_voice_names() {
        assert_eq!("Shimmer".parse::<Voice>().ok(), Some(Voice::Shimmer));
        assert!("robot".parse::<Voice>().is_err());
    }
}
