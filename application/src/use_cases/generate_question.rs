//! Question generation use case.
//!
//! Drives a bounded retry loop around the external generator: fetch a
//! candidate, validate its shape, sanitize its choices, run the novelty
//! gate, and persist on first acceptance. Attempts run sequentially —
//! each one depends on the store lookups (and possible insert) of its
//! predecessors, so speculative parallel generation would have to
//! deduplicate against uncommitted candidates, which this design avoids.

use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};
use triviad_domain::{Candidate, NewQuestion, Question, sanitize_choices};

use crate::novelty::{CandidateKeys, DuplicateReason, NoveltyGate};
use crate::ports::embedder::TextEmbedder;
use crate::ports::generator::QuestionGenerator;
use crate::ports::store::{QuestionStore, StoreError};

/// Generation attempts per request.
pub const MAX_ATTEMPTS: u32 = 5;

/// Accepted character range for candidate body text.
const TEXT_LEN_RANGE: std::ops::RangeInclusive<usize> = 20..=400;

/// Errors terminating a generation request.
#[derive(Error, Debug)]
pub enum GenerateQuestionError {
    /// Every attempt was used without an acceptance. An expected terminal
    /// outcome, not an infrastructure failure.
    #[error("could not generate a novel question")]
    Exhausted,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// An accepted question together with the similarity observed during the
/// semantic check.
#[derive(Debug, Clone)]
pub struct GeneratedQuestion {
    pub question: Question,
    pub max_similarity: f64,
}

/// How a single attempt ended. Exactly one of these is logged per
/// iteration, which keeps the retry policy testable without real
/// external calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    GeneratorFailed,
    ValidationFailed,
    NoUsableChoices,
    Duplicate(DuplicateReason),
    EmbedFailed,
    Accepted,
}

enum Attempt {
    Accepted(GeneratedQuestion),
    Retry(AttemptOutcome),
}

/// Use case for generating and persisting one novel question.
pub struct GenerateQuestionUseCase {
    generator: Arc<dyn QuestionGenerator>,
    embedder: Arc<dyn TextEmbedder>,
    store: Arc<dyn QuestionStore>,
    gate: NoveltyGate,
}

impl GenerateQuestionUseCase {
    pub fn new(
        generator: Arc<dyn QuestionGenerator>,
        embedder: Arc<dyn TextEmbedder>,
        store: Arc<dyn QuestionStore>,
    ) -> Self {
        let gate = NoveltyGate::new(Arc::clone(&store));
        Self {
            generator,
            embedder,
            store,
            gate,
        }
    }

    /// Run up to [`MAX_ATTEMPTS`] attempts and persist the first novel
    /// candidate. Store errors abort the whole operation immediately.
    pub async fn execute(&self) -> Result<GeneratedQuestion, GenerateQuestionError> {
        for attempt in 1..=MAX_ATTEMPTS {
            info!(attempt, max = MAX_ATTEMPTS, "generation attempt");
            match self.attempt().await? {
                Attempt::Accepted(result) => {
                    info!(
                        id = %result.question.id,
                        similarity = result.max_similarity,
                        "generated question accepted"
                    );
                    return Ok(result);
                }
                Attempt::Retry(outcome) => {
                    warn!(attempt, ?outcome, "generation attempt rejected");
                }
            }
        }
        Err(GenerateQuestionError::Exhausted)
    }

    async fn attempt(&self) -> Result<Attempt, StoreError> {
        let candidate = match self.generator.generate().await {
            Ok(candidate) => candidate,
            Err(err) => {
                warn!(%err, "generator call failed");
                return Ok(Attempt::Retry(AttemptOutcome::GeneratorFailed));
            }
        };

        if !TEXT_LEN_RANGE.contains(&candidate.text.chars().count()) || candidate.choices.is_empty()
        {
            return Ok(Attempt::Retry(AttemptOutcome::ValidationFailed));
        }

        let choices = sanitize_choices(&candidate.text, &candidate.choices);
        if choices.is_empty() {
            return Ok(Attempt::Retry(AttemptOutcome::NoUsableChoices));
        }

        let keys = CandidateKeys::new(&candidate.text, &choices);
        if let Some(reason) = self.gate.deterministic(&keys).await? {
            return Ok(Attempt::Retry(AttemptOutcome::Duplicate(reason)));
        }

        // Only now is the embedding worth paying for.
        let embedding = match self.embedder.embed(&candidate.text).await {
            Ok(embedding) if !embedding.is_empty() => embedding,
            Ok(_) => return Ok(Attempt::Retry(AttemptOutcome::EmbedFailed)),
            Err(err) => {
                warn!(%err, "embedding call failed");
                return Ok(Attempt::Retry(AttemptOutcome::EmbedFailed));
            }
        };

        let verdict = self.gate.semantic(&embedding).await?;
        if verdict.is_duplicate() {
            return Ok(Attempt::Retry(AttemptOutcome::Duplicate(
                DuplicateReason::SemanticDuplicate,
            )));
        }

        let Candidate {
            title, text, topic, ..
        } = candidate;
        let question = self
            .store
            .insert_question(NewQuestion {
                title,
                text,
                topic,
                fingerprint: keys.fingerprint,
                embedding,
                choices,
                normalized_choices: keys.normalized_choices,
                signature: keys.signature,
            })
            .await?;

        Ok(Attempt::Accepted(GeneratedQuestion {
            question,
            max_similarity: verdict.max_similarity,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::embedder::EmbedError;
    use crate::ports::generator::GeneratorError;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use triviad_domain::{NewAnswer, content_fingerprint};

    // ==================== Test Mocks ====================

    struct ScriptedGenerator {
        responses: Mutex<VecDeque<Result<Candidate, GeneratorError>>>,
        calls: AtomicUsize,
    }

    impl ScriptedGenerator {
        fn new(responses: Vec<Result<Candidate, GeneratorError>>) -> Self {
            Self {
                responses: Mutex::new(VecDeque::from(responses)),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl QuestionGenerator for ScriptedGenerator {
        async fn generate(&self) -> Result<Candidate, GeneratorError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(GeneratorError::Request("script exhausted".to_string())))
        }
    }

    struct FixedEmbedder {
        result: Result<Vec<f32>, &'static str>,
        calls: AtomicUsize,
    }

    impl FixedEmbedder {
        fn ok(vector: Vec<f32>) -> Self {
            Self {
                result: Ok(vector),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                result: Err("embedding backend down"),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl TextEmbedder for FixedEmbedder {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.result {
                Ok(vector) => Ok(vector.clone()),
                Err(message) => Err(EmbedError::Request(message.to_string())),
            }
        }
    }

    #[derive(Default)]
    struct FakeStore {
        fingerprints: Mutex<Vec<String>>,
        similarity: f64,
        fail_overlap: bool,
        inserted: Mutex<Vec<NewQuestion>>,
    }

    #[async_trait]
    impl QuestionStore for FakeStore {
        async fn find_by_fingerprint(&self, fingerprint: &str) -> Result<bool, StoreError> {
            Ok(self
                .fingerprints
                .lock()
                .unwrap()
                .iter()
                .any(|f| f == fingerprint))
        }

        async fn find_by_signature(&self, _signature: &str) -> Result<bool, StoreError> {
            Ok(false)
        }

        async fn has_choice_overlap(&self, _normalized: &[String]) -> Result<bool, StoreError> {
            if self.fail_overlap {
                return Err(StoreError::Backend("connection reset".to_string()));
            }
            Ok(false)
        }

        async fn nearest_similarity(&self, _embedding: &[f32]) -> Result<f64, StoreError> {
            Ok(self.similarity)
        }

        async fn insert_question(&self, question: NewQuestion) -> Result<Question, StoreError> {
            let stored = Question {
                id: format!("q-{}", self.inserted.lock().unwrap().len() + 1),
                title: question.title.clone(),
                text: question.text.clone(),
                topic: question.topic.clone(),
                created_at: chrono::Utc::now(),
                choices: question.choices.clone(),
                choice_signature: question.signature.clone(),
            };
            self.inserted.lock().unwrap().push(question);
            Ok(stored)
        }

        async fn insert_answer(&self, _answer: NewAnswer) -> Result<(), StoreError> {
            Ok(())
        }

        async fn latest_question(&self) -> Result<Question, StoreError> {
            Err(StoreError::NotFound)
        }

        async fn question_by_id(&self, _id: &str) -> Result<Question, StoreError> {
            Err(StoreError::NotFound)
        }
    }

    fn candidate(text: &str, choices: &[&str]) -> Candidate {
        Candidate {
            title: "Daily question".to_string(),
            text: text.to_string(),
            topic: "geography".to_string(),
            choices: choices.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn long_text() -> String {
        "Which mountain, first summited in 1953 by Edmund Hillary and Tenzing Norgay, \
         is the tallest peak above sea level on Earth?"
            .to_string()
    }

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_accepts_on_fifth_attempt_after_shape_failures() {
        let short = candidate("Too short.", &["Everest"]);
        let generator = Arc::new(ScriptedGenerator::new(vec![
            Ok(short.clone()),
            Ok(short.clone()),
            Ok(short.clone()),
            Ok(short),
            Ok(candidate(&long_text(), &["Mount Everest"])),
        ]));
        let embedder = Arc::new(FixedEmbedder::ok(vec![1.0, 0.0, 0.0]));
        let store = Arc::new(FakeStore::default());

        let use_case =
            GenerateQuestionUseCase::new(generator.clone(), embedder, store.clone());
        let result = use_case.execute().await.unwrap();

        assert_eq!(generator.calls.load(Ordering::SeqCst), 5);
        assert_eq!(store.inserted.lock().unwrap().len(), 1);
        assert_eq!(result.question.choices, vec!["Mount Everest".to_string()]);
        assert_eq!(
            store.inserted.lock().unwrap()[0].fingerprint,
            content_fingerprint(&long_text())
        );
    }

    #[tokio::test]
    async fn test_semantic_duplicate_exhausts_attempts() {
        let generator = Arc::new(ScriptedGenerator::new(
            (0..5)
                .map(|_| Ok(candidate(&long_text(), &["Mount Everest"])))
                .collect(),
        ));
        let embedder = Arc::new(FixedEmbedder::ok(vec![1.0, 0.0, 0.0]));
        let store = Arc::new(FakeStore {
            similarity: 0.95,
            ..FakeStore::default()
        });

        let use_case = GenerateQuestionUseCase::new(generator, embedder, store.clone());
        let result = use_case.execute().await;

        assert!(matches!(result, Err(GenerateQuestionError::Exhausted)));
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_low_similarity_is_accepted() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(candidate(
            &long_text(),
            &["Mount Everest"],
        ))]));
        let embedder = Arc::new(FixedEmbedder::ok(vec![1.0, 0.0, 0.0]));
        let store = Arc::new(FakeStore {
            similarity: 0.3,
            ..FakeStore::default()
        });

        let use_case = GenerateQuestionUseCase::new(generator, embedder, store.clone());
        let result = use_case.execute().await.unwrap();

        assert_eq!(result.max_similarity, 0.3);
        assert_eq!(store.inserted.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_is_fatal_and_not_retried() {
        let generator = Arc::new(ScriptedGenerator::new(vec![Ok(candidate(
            &long_text(),
            &["Mount Everest"],
        ))]));
        let embedder = Arc::new(FixedEmbedder::ok(vec![1.0, 0.0, 0.0]));
        let store = Arc::new(FakeStore {
            fail_overlap: true,
            ..FakeStore::default()
        });

        let use_case =
            GenerateQuestionUseCase::new(generator.clone(), embedder, store.clone());
        let result = use_case.execute().await;

        assert!(matches!(
            result,
            Err(GenerateQuestionError::Store(StoreError::Backend(_)))
        ));
        // One attempt only: infrastructure trouble is not generation
        // flakiness.
        assert_eq!(generator.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_embedding_not_fetched_for_deterministic_duplicate() {
        let text = long_text();
        let generator = Arc::new(ScriptedGenerator::new(
            (0..5).map(|_| Ok(candidate(&text, &["Mount Everest"]))).collect(),
        ));
        let embedder = Arc::new(FixedEmbedder::ok(vec![1.0, 0.0, 0.0]));
        let store = Arc::new(FakeStore::default());
        store
            .fingerprints
            .lock()
            .unwrap()
            .push(content_fingerprint(&text));

        let use_case =
            GenerateQuestionUseCase::new(generator, embedder.clone(), store.clone());
        let result = use_case.execute().await;

        assert!(matches!(result, Err(GenerateQuestionError::Exhausted)));
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
        assert!(store.inserted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_embed_failure_retries_until_exhaustion() {
        let generator = Arc::new(ScriptedGenerator::new(
            (0..5)
                .map(|_| Ok(candidate(&long_text(), &["Mount Everest"])))
                .collect(),
        ));
        let embedder = Arc::new(FixedEmbedder::failing());
        let store = Arc::new(FakeStore::default());

        let use_case =
            GenerateQuestionUseCase::new(generator.clone(), embedder.clone(), store);
        let result = use_case.execute().await;

        assert!(matches!(result, Err(GenerateQuestionError::Exhausted)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 5);
        assert_eq!(embedder.calls.load(Ordering::SeqCst), 5);
    }

    #[tokio::test]
    async fn test_generator_errors_count_as_attempts() {
        let generator = Arc::new(ScriptedGenerator::new(
            (0..5)
                .map(|_| Err(GeneratorError::Request("upstream 500".to_string())))
                .collect(),
        ));
        let embedder = Arc::new(FixedEmbedder::ok(vec![1.0]));
        let store = Arc::new(FakeStore::default());

        let use_case = GenerateQuestionUseCase::new(generator.clone(), embedder, store);
        let result = use_case.execute().await;

        assert!(matches!(result, Err(GenerateQuestionError::Exhausted)));
        assert_eq!(generator.calls.load(Ordering::SeqCst), 5);
    }
}
