//! Text embedder port.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the external embedding service.
#[derive(Error, Debug)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Request(String),

    #[error("embedder returned malformed payload: {0}")]
    Malformed(String),

    #[error("embedder returned no vector")]
    Empty,
}

/// External service mapping text to an embedding vector.
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbedError>;
}
