//! Answer grader port.

use async_trait::async_trait;
use serde::Deserialize;
use thiserror::Error;

/// Verdict returned by the external grader.
///
/// Consumed and re-validated by the grading use case — the grader is
/// never trusted to introduce an answer outside the canonical choice
/// list. Never persisted directly; only the derived score and feedback
/// are.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GradeResult {
    #[serde(rename = "match", default)]
    pub matched: bool,
    #[serde(default)]
    pub reason: String,
    #[serde(rename = "matched_choice", default)]
    pub matched_choice: String,
}

/// Errors from the external grader.
#[derive(Error, Debug)]
pub enum GraderError {
    #[error("grader request failed: {0}")]
    Request(String),

    /// The model replied, but not with parseable JSON. The caller may
    /// re-send the identical payload once.
    #[error("grader returned malformed payload: {0}")]
    Malformed(String),
}

/// External semantic grader for answers with no deterministic match.
#[async_trait]
pub trait AnswerGrader: Send + Sync {
    /// Grade a raw answer, optionally against a list of acceptable
    /// choices (`None` for open-ended questions).
    async fn grade(
        &self,
        answer: &str,
        choices: Option<&[String]>,
    ) -> Result<GradeResult, GraderError>;
}
