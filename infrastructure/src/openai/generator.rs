//! Question generation via chat completions.

use async_trait::async_trait;
use triviad_application::ports::generator::{GeneratorError, QuestionGenerator};
use triviad_domain::Candidate;

use super::chat::{ChatError, ChatMessage, ChatRequest, chat_content, extract_json};

const SYSTEM_PROMPT: &str = "You generate a single factual trivia question as strict JSON. \
The question must be specific, factual, and verifiable (no opinions). Avoid yes/no. \
Question text length ~100-160 chars. Output ONLY strict JSON with fields: \
{\"title\", \"text\", \"topic\", \"choices\"}. The \"choices\" array must contain 1-5 direct \
aliases or exact surface forms for the correct answer. Each choice should be 1-3 words, \
contain no descriptions or roles (e.g., avoid \"first female UK PM\"), and only include \
valid synonyms, alternate spellings, or common epithets. Do not include any prose or Markdown.";

const USER_PROMPT: &str = "Create a novel, accurate trivia question (history, science, \
geography, arts, or technology). Ensure the choices array contains only the explicit \
answer name and its close aliases; if no aliases exist, repeat the canonical name once.";

const TEMPERATURE: f32 = 0.7;

/// Chat-completions adapter for the [`QuestionGenerator`] port.
pub struct OpenAiGenerator {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiGenerator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl QuestionGenerator for OpenAiGenerator {
    async fn generate(&self) -> Result<Candidate, GeneratorError> {
        let request = ChatRequest {
            model: &self.model,
            temperature: TEMPERATURE,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: SYSTEM_PROMPT,
                },
                ChatMessage {
                    role: "user",
                    content: USER_PROMPT,
                },
            ],
        };
        let content = chat_content(&self.client, &self.api_key, &request)
            .await
            .map_err(|err| match err {
                ChatError::Request(message) => GeneratorError::Request(message),
                ChatError::Malformed(message) => GeneratorError::Malformed(message),
            })?;
        serde_json::from_str(extract_json(&content))
            .map_err(|e| GeneratorError::Malformed(e.to_string()))
    }
}
