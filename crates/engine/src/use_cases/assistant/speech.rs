//! Text-to-speech.

use std::sync::Arc;

use inkworld_domain::{SpeechInput, Voice};
use inkworld_shared::SpeechRequest;

use crate::infrastructure::ports::SpeechPort;

use super::AiError;

pub struct SpeechOps {
    speech: Arc<dyn SpeechPort>,
}

impl SpeechOps {
    pub fn new(speech: Arc<dyn SpeechPort>) -> Self {
        Self { speech }
    }

    /// MPEG audio for `data.text`, cut at the provider's input limit.
    pub async fn synthesize(&self, data: SpeechRequest) -> Result<Vec<u8>, AiError> {
        let voice = match data.voice.as_deref() {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<Voice>()?,
            _ => Voice::default(),
        };
        if SpeechInput::was_truncated(&data.text) {
            tracing::debug!(chars = data.text.chars().count(), "Truncating speech input");
        }

        let input = SpeechInput::new(&data.text, voice, data.speed);
        Ok(self.speech.synthesize(input).await?)
    }
}
