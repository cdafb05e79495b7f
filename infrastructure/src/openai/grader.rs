//! Semantic answer grading via chat completions.

use async_trait::async_trait;
use serde::Serialize;
use triviad_application::ports::grader::{AnswerGrader, GradeResult, GraderError};

use super::chat::{ChatError, ChatMessage, ChatRequest, chat_content, extract_json};

const SYSTEM_PROMPT: &str = "You verify if a response matches any exact item in a provided \
list of acceptable answers. Only acknowledge exact equivalence, never approximate matches. \
Return strict JSON only.";

const CHOICE_INSTRUCTIONS: &str = "Return match=true only if the answer clearly references \
the same entity as one of the choices (allowing spelling/spacing variants). When match=true, \
set matched_choice to the exact string from the choices array. Reject other entities even if \
similar. Always provide a short reason.";

const OPEN_INSTRUCTIONS: &str = "Return match=true only if the answer is a clearly correct, \
specific response. Leave matched_choice empty. Always provide a short reason.";

/// Grading runs at temperature zero for reproducible verdicts.
const TEMPERATURE: f32 = 0.0;

#[derive(Debug, Serialize)]
struct GradePayload<'a> {
    answer: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    choices: Option<&'a [String]>,
    instructions: &'a str,
    output_format: OutputFormat,
}

/// Echoed in the payload so the model sees the exact shape expected back.
#[derive(Debug, Serialize)]
struct OutputFormat {
    #[serde(rename = "match")]
    matched: bool,
    matched_choice: &'static str,
    reason: &'static str,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self {
            matched: false,
            matched_choice: "",
            reason: "",
        }
    }
}

/// Chat-completions adapter for the [`AnswerGrader`] port.
///
/// Retries belong to the caller: a malformed reply surfaces as
/// [`GraderError::Malformed`] and the grading use case decides whether to
/// re-send.
pub struct OpenAiGrader {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiGrader {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl AnswerGrader for OpenAiGrader {
    async fn grade(
        &self,
        answer: &str,
        choices: Option<&[String]>,
    ) -> Result<GradeResult, GraderError> {
        let payload = GradePayload {
            answer,
            choices,
            instructions: if choices.is_some() {
                CHOICE_INSTRUCTIONS
            } else {
                OPEN_INSTRUCTIONS
            },
            output_format: OutputFormat::default(),
        };
        let user_content =
            serde_json::to_string(&payload).map_err(|e| GraderError::Malformed(e.to_string()))?;

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
                    content: &user_content,
                },
            ],
        };
        let content = chat_content(&self.client, &self.api_key, &request)
            .await
            .map_err(|err| match err {
                ChatError::Request(message) => GraderError::Request(message),
                ChatError::Malformed(message) => GraderError::Malformed(message),
            })?;
        serde_json::from_str(extract_json(&content))
            .map_err(|e| GraderError::Malformed(e.to_string()))
    }
}
