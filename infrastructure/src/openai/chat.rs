//! Shared chat-completions plumbing.

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub(crate) const CHAT_COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";

/// Per-request timeout for chat completions.
pub(crate) const CHAT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
pub(crate) struct ChatRequest<'a> {
    pub model: &'a str,
    pub temperature: f32,
    pub messages: Vec<ChatMessage<'a>>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ChatMessage<'a> {
    pub role: &'a str,
    pub content: &'a str,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatResponse {
    #[serde(default)]
    pub choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoice {
    pub message: ChatChoiceMessage,
}

#[derive(Debug, Deserialize)]
pub(crate) struct ChatChoiceMessage {
    #[serde(default)]
    pub content: String,
}

/// How a chat call failed; adapters map this onto their port's error.
pub(crate) enum ChatError {
    Request(String),
    Malformed(String),
}

/// POST a chat request and return the first completion's content.
pub(crate) async fn chat_content(
    client: &reqwest::Client,
    api_key: &str,
    request: &ChatRequest<'_>,
) -> Result<String, ChatError> {
    let response = client
        .post(CHAT_COMPLETIONS_URL)
        .timeout(CHAT_TIMEOUT)
        .bearer_auth(api_key)
        .json(request)
        .send()
        .await
        .map_err(|e| ChatError::Request(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ChatError::Request(format!(
            "status {}: {}",
            status.as_u16(),
            body
        )));
    }

    let parsed: ChatResponse = response
        .json()
        .await
        .map_err(|e| ChatError::Malformed(e.to_string()))?;
    parsed
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message.content)
        .ok_or_else(|| ChatError::Malformed("no completion choices".to_string()))
}

/// Slice the outermost JSON object out of a model reply that may wrap it
/// in prose or code fences.
pub(crate) fn extract_json(content: &str) -> &str {
    if let (Some(start), Some(end)) = (content.find('{'), content.rfind('}')) {
        if end > start {
            return &content[start..=end];
        }
    }
    content
}
