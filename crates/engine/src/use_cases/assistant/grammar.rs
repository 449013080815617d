//! Grammar and style review through the chat model.

use std::sync::Arc;

use inkworld_domain::{GrammarFocus, GrammarReport, DEFAULT_CONFIDENCE_THRESHOLD};
use inkworld_shared::GrammarRequest;

use crate::infrastructure::ports::{ChatMessage, LlmPort, LlmRequest};
use crate::use_cases::json_reply::parse_json_reply;

use super::AiError;

const SYSTEM_PROMPT: &str = "You are a meticulous fiction editor. You review prose for \
    grammar, spelling, punctuation, style and clarity problems and reply with JSON only.";

pub struct GrammarOps {
    llm: Arc<dyn LlmPort>,
}

impl GrammarOps {
    pub fn new(llm: Arc<dyn LlmPort>) -> Self {
        Self { llm }
    }

    pub async fn review(&self, data: GrammarRequest) -> Result<GrammarReport, AiError> {
        let threshold = data
            .confidence_threshold
            .unwrap_or(DEFAULT_CONFIDENCE_THRESHOLD);
        let prompt = build_prompt(&data);

        let request = LlmRequest::new(vec![ChatMessage::user(prompt)])
            .with_system_prompt(SYSTEM_PROMPT)
            .with_temperature(0.3)
            .expecting_json();
        let response = self.llm.generate(request).await?;

        let report: GrammarReport = parse_json_reply(&response.content)
            .map_err(|e| AiError::InvalidResponse(e.to_string()))?;
        let total = report.suggestions.len();
        let report = report.retain_confident(threshold);

        tracing::debug!(
            suggestions = total,
            kept = report.suggestions.len(),
            threshold,
            "Grammar review finished"
        );
        Ok(report)
    }
}

/// Requested focus areas; unknown names are ignored, none means all.
fn focus_areas(raw: &[String]) -> Vec<GrammarFocus> {
    let picked: Vec<GrammarFocus> = GrammarFocus::ALL
        .into_iter()
        .filter(|focus| raw.iter().any(|r| r.trim().eq_ignore_ascii_case(focus.as_str())))
        .collect();
    if picked.is_empty() {
        GrammarFocus::ALL.to_vec()
    } else {
        picked
    }
}

fn build_prompt(data: &GrammarRequest) -> String {
    let focus: Vec<&str> = focus_areas(&data.focus)
        .iter()
        .map(GrammarFocus::as_str)
        .collect();

    let mut prompt = format!(
        "Review the following text. Focus on: {}.\n",
        focus.join(", ")
    );
    if let Some(context) = data.context.as_deref().filter(|c| !c.trim().is_empty()) {
        prompt.push_str(&format!("Context: {}\n", context));
    }
    if let Some(style) = data.style.as_deref().filter(|s| !s.trim().is_empty()) {
        prompt.push_str(&format!("Desired style: {}\n", style));
    }
    prompt.push_str(
        "\nReply with a JSON object of the form \
         {\"suggestions\": [{\"type\": \"grammar|spelling|punctuation|style|clarity\", \
         \"original\": \"...\", \"suggestion\": \"...\", \"explanation\": \"...\", \
         \"confidence\": 0.0-1.0, \"position\": {\"start\": 0, \"end\": 0}}], \
         \"overallScore\": 0-100, \"summary\": \"...\"}\n\nText:\n",
    );
    prompt.push_str(&data.text);
    prompt
}
