//! Pulling a JSON object out of a model reply.

use serde::de::DeserializeOwned;

/// Extract JSON from a reply that might wrap it in a code fence or prose.
pub fn extract_json(response: &str) -> &str {
    if let Some(start) = response.find("```json") {
        if let Some(end) = response[start + 7..].find("```") {
            return response[start + 7..start + 7 + end].trim();
        }
    }

    if let Some(start) = response.find("```") {
        if let Some(end) = response[start + 3..].find("```") {
            let content = response[start + 3..start + 3 + end].trim();
            // Skip a language tag on the fence line
            if let Some(newline_pos) = content.find('\n') {
                if !content[..newline_pos].starts_with('{') {
                    return content[newline_pos + 1..].trim();
                }
            }
            return content;
        }
    }

    if let (Some(start), Some(end)) = (response.find('{'), response.rfind('}')) {
        if start < end {
            return &response[start..=end];
        }
    }

    response.trim()
}

/// Parse the JSON object in `response` as `T`.
pub fn parse_json_reply<T: DeserializeOwned>(response: &str) -> Result<T, serde_json::Error> {
    serde_json::from_str(extract_json(response))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_fence() {
        let reply = "Here you go:\n```json\n{\"a\": 1}\n```\nDone.";
        assert_eq!(extract_json(reply), "{\"a\": 1}");
    }

    #[test]
    fn strips_plain_fence_with_language_tag() {
        let reply = "```JSON\n{\"a\": 1}\n```";
        assert_eq!(extract_json(reply), "{\"a\": 1}");
    }

    #[test]
    fn finds_bare_object_in_prose() {
        let reply = "Sure! {\"message\": \"hi\"} Hope that helps.";
        assert_eq!(extract_json(reply), "{\"message\": \"hi\"}");
    }

    #[test]
    fn parses_into_target_type() {
        #[derive(serde::Deserialize)]
        struct Line {
            message: String,
        }
        let line: Line = parse_json_reply("```\n{\"message\": \"hello\"}\n```").unwrap();
        assert_eq!(line.message, "hello");
        assert!(parse_json_reply::<Line>("no json here").is_err());
    }
}
