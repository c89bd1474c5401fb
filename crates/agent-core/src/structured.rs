//! Structured Output
//!
//! Pulls a JSON object out of free-form model text and deserializes it.
//! Models wrap JSON in ```` ```json ```` fences, bare fences, or surrounding
//! prose; all three are accepted.

use serde::de::DeserializeOwned;

use crate::error::{AgentError, Result};

/// Locate the JSON object inside model output
pub fn extract_json(content: &str) -> Option<&str> {
    for fence in ["```json", "```"] {
        if let Some(start) = content.find(fence) {
            let body = &content[start + fence.len()..];
            if let Some(end) = body.find("```") {
                let candidate = body[..end].trim();
                if candidate.starts_with('{') {
                    return Some(candidate);
                }
            }
        }
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    (end > start).then(|| &content[start..=end])
}

/// Deserialize the JSON object embedded in `content`
pub fn parse_structured<T: DeserializeOwned>(content: &str) -> Result<T> {
    let json = extract_json(content)
        .ok_or_else(|| AgentError::Parse("answer contains no JSON object".into()))?;

    serde_json::from_str(json).map_err(|e| AgentError::Parse(format!("invalid JSON answer: {e}")))
}
