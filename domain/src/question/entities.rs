//! Question and answer entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A persisted trivia question.
///
/// Created once by the generation flow after it clears the novelty gate;
/// immutable afterwards and never deleted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub title: String,
    pub text: String,
    pub topic: String,
    pub created_at: DateTime<Utc>,
    /// Acceptable choices in presentation order.
    pub choices: Vec<String>,
    /// Collision key over the normalized choice set; absent when the
    /// question has no usable choices.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choice_signature: Option<String>,
}

/// Insert payload for a question.
///
/// Carries the derived duplicate keys alongside the content so the store
/// can persist everything in one atomic write.
#[derive(Debug, Clone)]
pub struct NewQuestion {
    pub title: String,
    pub text: String,
    pub topic: String,
    pub fingerprint: String,
    pub embedding: Vec<f32>,
    pub choices: Vec<String>,
    pub normalized_choices: Vec<String>,
    pub signature: Option<String>,
}

/// Insert payload for a graded answer. Written exactly once per
/// submission, after scoring is finalized.
#[derive(Debug, Clone)]
pub struct NewAnswer {
    pub question_id: String,
    pub text: String,
    pub score: u8,
    pub feedback: String,
}

/// A freshly generated question as returned by the external generator.
/// Exists only within one generation attempt; persisted (as a
/// [`Question`]) only on acceptance.
#[derive(Debug, Clone, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub topic: String,
    #[serde(default)]
    pub choices: Vec<String>,
}
