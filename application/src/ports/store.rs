//! Question store port.

use async_trait::async_trait;
use thiserror::Error;
use triviad_domain::{NewAnswer, NewQuestion, Question};

/// Errors from the persistence backend.
///
/// `NotFound` is an expected lookup outcome. `Backend` signals
/// infrastructure trouble and always aborts the calling operation — it is
/// never retried.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found")]
    NotFound,

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Persistence operations the core relies on.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    /// Whether any stored question has this content fingerprint.
    async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<bool, StoreError>;

    /// Whether any stored question has this choice-set signature.
    async fn find_by_signature(&self, signature: &str) -> Result<bool, StoreError>;

    /// Whether any stored question shares at least one normalized choice
    /// with the given set.
    async fn has_choice_overlap(&self, normalized: &[String]) -> Result<bool, StoreError>;

    /// Maximum cosine similarity between `embedding` and any stored
    /// question's embedding, in [-1, 1]. 0.0 when the store is empty.
    async fn nearest_similarity(&self, embedding: &[f32]) -> Result<f64, StoreError>;

    /// Persist a question together with its duplicate keys as one atomic
    /// write.
    async fn insert_question(&self, question: NewQuestion) -> Result<Question, StoreError>;

    /// Persist a graded answer.
    async fn insert_answer(&self, answer: NewAnswer) -> Result<(), StoreError>;

    /// The most recently created question.
    async fn latest_question(&self) -> Result<Question, StoreError>;

    /// Look up a question by id.
    async fn question_by_id(&self, id: &str) -> Result<Question, StoreError>;
}
