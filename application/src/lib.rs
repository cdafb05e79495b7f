//! Application layer for triviad
//!
//! This crate contains the use cases, port definitions, and the novelty
//! gate. It depends only on the domain layer; the external collaborators
//! (store, generator, embedder, grader) are reached through ports whose
//! adapters live in the infrastructure layer.

pub mod novelty;
pub mod ports;
pub mod use_cases;

// Re-export commonly used types
pub use novelty::{
    CandidateKeys, DuplicateReason, NoveltyGate, SIMILARITY_THRESHOLD, SemanticVerdict,
};
pub use ports::{
    embedder::{EmbedError, TextEmbedder},
    generator::{GeneratorError, QuestionGenerator},
    grader::{AnswerGrader, GradeResult, GraderError},
    store::{QuestionStore, StoreError},
};
pub use use_cases::generate_question::{
    AttemptOutcome, GenerateQuestionError, GenerateQuestionUseCase, GeneratedQuestion, MAX_ATTEMPTS,
};
pub use use_cases::get_today::{GetTodayError, GetTodayUseCase};
pub use use_cases::submit_answer::{ScoredAnswer, SubmitAnswerError, SubmitAnswerUseCase};
