//! Answer submission use case.
//!
//! Deterministic choice matching first; the external grader only runs
//! when nothing matches. A grader verdict is re-validated against the
//! canonical choice list before it is trusted — the grader may pick from
//! the list, never add to it.

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, warn};
use triviad_domain::{NewAnswer, matches_choice, normalize_answer};

use crate::ports::grader::{AnswerGrader, GradeResult, GraderError};
use crate::ports::store::{QuestionStore, StoreError};

/// Score awarded for an accepted answer. Scoring is currently binary.
const MATCH_SCORE: u8 = 10;

/// Errors terminating an answer submission.
#[derive(Error, Debug)]
pub enum SubmitAnswerError {
    #[error("question not found")]
    QuestionNotFound,

    #[error("grading failed: {0}")]
    Grading(#[from] GraderError),

    #[error(transparent)]
    Store(StoreError),
}

/// Final verdict for a submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredAnswer {
    pub score: u8,
    pub feedback: String,
}

/// Use case for grading and persisting one submitted answer.
pub struct SubmitAnswerUseCase {
    store: Arc<dyn QuestionStore>,
    grader: Arc<dyn AnswerGrader>,
}

impl SubmitAnswerUseCase {
    pub fn new(store: Arc<dyn QuestionStore>, grader: Arc<dyn AnswerGrader>) -> Self {
        Self { store, grader }
    }

    /// Grade `answer_text` against the referenced question and persist
    /// the result. The answer is written exactly once, after the score
    /// is final; grading failures persist nothing.
    pub async fn execute(
        &self,
        question_id: &str,
        answer_text: &str,
    ) -> Result<ScoredAnswer, SubmitAnswerError> {
        let question = self
            .store
            .question_by_id(question_id)
            .await
            .map_err(|err| match err {
                StoreError::NotFound => SubmitAnswerError::QuestionNotFound,
                other => SubmitAnswerError::Store(other),
            })?;
        let answer_text = answer_text.trim();

        let scored = if question.choices.is_empty() {
            self.grade_open_ended(answer_text).await?
        } else if matches_choice(answer_text, &question.choices) {
            ScoredAnswer {
                score: MATCH_SCORE,
                feedback: "Accepted choice.".to_string(),
            }
        } else {
            self.grade_against_choices(answer_text, &question.choices)
                .await?
        };

        self.store
            .insert_answer(NewAnswer {
                question_id: question.id,
                text: answer_text.to_string(),
                score: scored.score,
                feedback: scored.feedback.clone(),
            })
            .await
            .map_err(SubmitAnswerError::Store)?;
        Ok(scored)
    }

    async fn grade_against_choices(
        &self,
        answer: &str,
        choices: &[String],
    ) -> Result<ScoredAnswer, SubmitAnswerError> {
        let mut grade = self.grade_with_retry(answer, Some(choices)).await?;
        let mut feedback = grade.reason.clone();
        if grade.matched && !claimed_choice_is_canonical(&grade.matched_choice, choices) {
            warn!(
                claimed = %grade.matched_choice,
                "grader claimed a choice outside the canonical list"
            );
            grade.matched = false;
            if feedback.is_empty() {
                feedback = "LLM match rejected: alias not in list.".to_string();
            }
        }
        Ok(finalize(
            grade.matched,
            feedback,
            "Accepted choice.",
            "Answer not recognized as acceptable.",
        ))
    }

    async fn grade_open_ended(&self, answer: &str) -> Result<ScoredAnswer, SubmitAnswerError> {
        let grade = self.grade_with_retry(answer, None).await?;
        Ok(finalize(
            grade.matched,
            grade.reason,
            "Accepted answer.",
            "Answer not recognized.",
        ))
    }

    /// One retry with the identical payload, and only for a malformed
    /// response; transport failures surface immediately.
    async fn grade_with_retry(
        &self,
        answer: &str,
        choices: Option<&[String]>,
    ) -> Result<GradeResult, GraderError> {
        match self.grader.grade(answer, choices).await {
            Err(GraderError::Malformed(err)) => {
                debug!(%err, "grader returned malformed payload, retrying once");
                self.grader.grade(answer, choices).await
            }
            other => other,
        }
    }
}

fn claimed_choice_is_canonical(claimed: &str, choices: &[String]) -> bool {
    let normalized = normalize_answer(claimed);
    !normalized.is_empty() && choices.iter().any(|c| normalize_answer(c) == normalized)
}

fn finalize(
    matched: bool,
    reason: String,
    matched_default: &str,
    unmatched_default: &str,
) -> ScoredAnswer {
    let feedback = if reason.is_empty() {
        let default = if matched {
            matched_default
        } else {
            unmatched_default
        };
        default.to_string()
    } else {
        reason
    };
    ScoredAnswer {
        score: if matched { MATCH_SCORE } else { 0 },
        feedback,
    }
}
