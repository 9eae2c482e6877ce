//! Wire types for the remote analysis service.

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Serialize)]
pub struct CreateSessionRequest<'a> {
    pub client_id: &'a str,
    pub data_source: &'a str,
}

#[derive(Debug, Serialize)]
pub struct ChatRequest<'a> {
    pub session: &'a str,
    pub message: &'a str,
    pub use_live_cot: bool,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatList {
    #[serde(default)]
    pub results: Vec<ChatMessage>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub result_id: Option<String>,
}

impl ChatList {
    /// Result handle from the most recent message, if it carries a
    /// non-empty one.
    pub fn latest_result_id(&self) -> Option<String> {
        self.results
            .last()
            .and_then(|m| m.result_id.clone())
            .filter(|id| !id.is_empty())
    }
}

/// The fixed message grammar: directive, target sentence in quotes, context
/// paragraph in quotes, persona label.
pub fn build_message(directive: &str, sentence: &str, paragraph: &str, persona: &str) -> String {
    format!(
        "{} $sentence:\"{}\" $paragraph:\"{}\" $author:{}",
        directive, sentence, paragraph, persona
    )
}

/// Pull the revised sentence out of an arbitrary result payload. Absent or
/// empty `content` is a valid outcome, not an error.
pub fn extract_revision(result: &Value) -> Option<String> {
    result
        .get("content")
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
