//! Question generator port.

use async_trait::async_trait;
use thiserror::Error;
use triviad_domain::Candidate;

/// Errors from the external question generator.
#[derive(Error, Debug)]
pub enum GeneratorError {
    #[error("generator request failed: {0}")]
    Request(String),

    #[error("generator returned malformed payload: {0}")]
    Malformed(String),
}

/// External service producing fresh trivia candidates.
#[async_trait]
pub trait QuestionGenerator: Send + Sync {
    async fn generate(&self) -> Result<Candidate, GeneratorError>;
}
