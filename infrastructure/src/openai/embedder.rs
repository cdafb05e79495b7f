//! Text embeddings via the embeddings endpoint.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use triviad_application::ports::embedder::{EmbedError, TextEmbedder};

const EMBEDDINGS_URL: &str = "https://api.openai.com/v1/embeddings";
const EMBED_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, Serialize)]
struct EmbeddingsRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingsResponse {
    #[serde(default)]
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

/// Embeddings adapter for the [`TextEmbedder`] port.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: String,
    model: String,
}

impl OpenAiEmbedder {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key: api_key.into(),
            model: model.into(),
        }
    }
}

#[async_trait]
impl TextEmbedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError> {
        let response = self
            .client
            .post(EMBEDDINGS_URL)
            .timeout(EMBED_TIMEOUT)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingsRequest {
                model: &self.model,
                input: text,
            })
            .send()
            .await
            .map_err(|e| EmbedError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(EmbedError::Request(format!("status {}", status.as_u16())));
        }

        let parsed: EmbeddingsResponse = response
            .json()
            .await
            .map_err(|e| EmbedError::Malformed(e.to_string()))?;
        let embedding = parsed
            .data
            .into_iter()
            .next()
            .map(|entry| entry.embedding)
            .unwrap_or_default();
        if embedding.is_empty() {
            return Err(EmbedError::Empty);
        }
        Ok(embedding)
    }
}
