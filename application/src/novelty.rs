//! Novelty gate: layered duplicate detection for candidate questions.
//!
//! The checks run cheapest-first: the three deterministic lookups (choice
//! overlap, choice signature, content fingerprint) only touch the store,
//! while the semantic check needs an embedding from an external service.
//! Callers run [`NoveltyGate::deterministic`] first and only pay for the
//! embedding — and call [`NoveltyGate::semantic`] — when it passes.

use std::sync::Arc;

use tracing::debug;
use triviad_domain::{choice_signature, content_fingerprint, normalized_choices};

use crate::ports::store::{QuestionStore, StoreError};

/// Two questions are considered the same content at or above this cosine
/// similarity. A product constant, not derived from data.
pub const SIMILARITY_THRESHOLD: f64 = 0.6;

/// Why a candidate was rejected as a duplicate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DuplicateReason {
    /// A normalized choice is already accepted by some stored question.
    ChoiceOverlap,
    /// The full choice set collides with a stored question's signature.
    SignatureCollision,
    /// The normalized question text hashes to a stored fingerprint.
    FingerprintCollision,
    /// The nearest stored question is too similar semantically.
    SemanticDuplicate,
}

impl std::fmt::Display for DuplicateReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            DuplicateReason::ChoiceOverlap => "choice-overlap",
            DuplicateReason::SignatureCollision => "signature-collision",
            DuplicateReason::FingerprintCollision => "hash-collision",
            DuplicateReason::SemanticDuplicate => "semantic-duplicate",
        };
        write!(f, "{}", reason)
    }
}

/// Duplicate keys derived from a candidate, computed once per attempt and
/// reused for both the gate checks and the final insert.
#[derive(Debug, Clone)]
pub struct CandidateKeys {
    pub fingerprint: String,
    pub signature: Option<String>,
    pub normalized_choices: Vec<String>,
}

impl CandidateKeys {
    pub fn new(text: &str, choices: &[String]) -> Self {
        Self {
            fingerprint: content_fingerprint(text),
            signature: choice_signature(choices),
            normalized_choices: normalized_choices(choices),
        }
    }
}

/// Outcome of the semantic check.
#[derive(Debug, Clone, Copy)]
pub struct SemanticVerdict {
    /// Highest similarity observed against the store.
    pub max_similarity: f64,
}

impl SemanticVerdict {
    pub fn is_duplicate(&self) -> bool {
        self.max_similarity >= SIMILARITY_THRESHOLD
    }
}

/// Layered duplicate detection against the question store.
pub struct NoveltyGate {
    store: Arc<dyn QuestionStore>,
}

impl NoveltyGate {
    pub fn new(store: Arc<dyn QuestionStore>) -> Self {
        Self { store }
    }

    /// Run the deterministic lookups in order, stopping at the first
    /// collision. `None` means all of them passed.
    pub async fn deterministic(
        &self,
        keys: &CandidateKeys,
    ) -> Result<Option<DuplicateReason>, StoreError> {
        if !keys.normalized_choices.is_empty()
            && self
                .store
                .has_choice_overlap(&keys.normalized_choices)
                .await?
        {
            return Ok(Some(DuplicateReason::ChoiceOverlap));
        }
        if let Some(signature) = &keys.signature {
            if self.store.find_by_signature(signature).await? {
                return Ok(Some(DuplicateReason::SignatureCollision));
            }
        }
        if self.store.find_by_fingerprint(&keys.fingerprint).await? {
            return Ok(Some(DuplicateReason::FingerprintCollision));
        }
        debug!("deterministic novelty checks passed");
        Ok(None)
    }

    /// Compare the candidate's embedding against the nearest stored
    /// question.
    pub async fn semantic(&self, embedding: &[f32]) -> Result<SemanticVerdict, StoreError> {
        let max_similarity = self.store.nearest_similarity(embedding).await?;
        debug!(max_similarity, "semantic novelty check");
        Ok(SemanticVerdict { max_similarity })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;
    use triviad_domain::{NewAnswer, NewQuestion, Question};

    /// Store stub that records which lookups ran, in order.
    struct RecordingStore {
        calls: Mutex<Vec<&'static str>>,
        overlap: bool,
        signature_hit: bool,
        fingerprint_hit: bool,
        similarity: f64,
    }

    impl RecordingStore {
        fn new() -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                overlap: false,
                signature_hit: false,
                fingerprint_hit: false,
                similarity: 0.0,
            }
        }

        fn record(&self, call: &'static str) {
            self.calls.lock().unwrap().push(call);
        }

        fn calls(&self) -> Vec<&'static str> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl QuestionStore for RecordingStore {
        async fn find_by_fingerprint(&self, _fingerprint: &str) -> Result<bool, StoreError> {
            self.record("fingerprint");
            Ok(self.fingerprint_hit)
        }

        async fn find_by_signature(&self, _signature: &str) -> Result<bool, StoreError> {
            self.record("signature");
            Ok(self.signature_hit)
        }

        async fn has_choice_overlap(&self, _normalized: &[String]) -> Result<bool, StoreError> {
            self.record("overlap");
            Ok(self.overlap)
        }

        async fn nearest_similarity(&self, _embedding: &[f32]) -> Result<f64, StoreError> {
            self.record("similarity");
            Ok(self.similarity)
        }

        async fn insert_question(&self, _question: NewQuestion) -> Result<Question, StoreError> {
            unreachable!("gate never inserts")
        }

        async fn insert_answer(&self, _answer: NewAnswer) -> Result<(), StoreError> {
            unreachable!("gate never inserts")
        }

        async fn latest_question(&self) -> Result<Question, StoreError> {
            Err(StoreError::NotFound)
        }

        async fn question_by_id(&self, _id: &str) -> Result<Question, StoreError> {
            Err(StoreError::NotFound)
        }
    }

    fn keys_with_choices() -> CandidateKeys {
        CandidateKeys::new(
            "What is the capital of France?",
            &["Paris".to_string(), "Lutetia".to_string()],
        )
    }

    #[tokio::test]
    async fn test_checks_run_cheapest_first() {
        let store = Arc::new(RecordingStore::new());
        let gate = NoveltyGate::new(store.clone());

        let verdict = gate.deterministic(&keys_with_choices()).await.unwrap();
        assert_eq!(verdict, None);
        assert_eq!(store.calls(), vec!["overlap", "signature", "fingerprint"]);
    }

    #[tokio::test]
    async fn test_overlap_short_circuits() {
        let mut inner = RecordingStore::new();
        inner.overlap = true;
        let store = Arc::new(inner);
        let gate = NoveltyGate::new(store.clone());

        let verdict = gate.deterministic(&keys_with_choices()).await.unwrap();
        assert_eq!(verdict, Some(DuplicateReason::ChoiceOverlap));
        assert_eq!(store.calls(), vec!["overlap"]);
    }

    #[tokio::test]
    async fn test_signature_collision_detected() {
        let mut inner = RecordingStore::new();
        inner.signature_hit = true;
        let store = Arc::new(inner);
        let gate = NoveltyGate::new(store.clone());

        let verdict = gate.deterministic(&keys_with_choices()).await.unwrap();
        assert_eq!(verdict, Some(DuplicateReason::SignatureCollision));
    }

    #[tokio::test]
    async fn test_fingerprint_collision_detected() {
        let mut inner = RecordingStore::new();
        inner.fingerprint_hit = true;
        let store = Arc::new(inner);
        let gate = NoveltyGate::new(store.clone());

        let verdict = gate.deterministic(&keys_with_choices()).await.unwrap();
        assert_eq!(verdict, Some(DuplicateReason::FingerprintCollision));
    }

    #[tokio::test]
    async fn test_choiceless_candidate_skips_choice_lookups() {
        let store = Arc::new(RecordingStore::new());
        let gate = NoveltyGate::new(store.clone());

        let keys = CandidateKeys::new("What year did the Berlin Wall fall?", &[]);
        assert!(keys.signature.is_none());

        let verdict = gate.deterministic(&keys).await.unwrap();
        assert_eq!(verdict, None);
        // Neither the overlap nor the signature lookup has a key to use.
        assert_eq!(store.calls(), vec!["fingerprint"]);
    }

    #[tokio::test]
    async fn test_semantic_threshold() {
        let mut inner = RecordingStore::new();
        inner.similarity = 0.95;
        let gate = NoveltyGate::new(Arc::new(inner));
        assert!(gate.semantic(&[1.0, 0.0]).await.unwrap().is_duplicate());

        let mut inner = RecordingStore::new();
        inner.similarity = 0.3;
        let gate = NoveltyGate::new(Arc::new(inner));
        let verdict = gate.semantic(&[1.0, 0.0]).await.unwrap();
        assert!(!verdict.is_duplicate());
        assert_eq!(verdict.max_similarity, 0.3);
    }

    #[tokio::test]
    async fn test_threshold_is_inclusive() {
        let mut inner = RecordingStore::new();
        inner.similarity = SIMILARITY_THRESHOLD;
        let gate = NoveltyGate::new(Arc::new(inner));
        assert!(gate.semantic(&[0.5, 0.5]).await.unwrap().is_duplicate());
    }
}
