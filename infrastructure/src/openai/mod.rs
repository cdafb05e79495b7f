//! OpenAI-backed adapters for the generator, embedder, and grader ports.
//!
//! Each adapter is an explicit dependency object holding its own API key
//! and model name, constructed once at startup and injected into the use
//! cases — never shared global state.

mod chat;
mod embedder;
mod generator;
mod grader;

pub use embedder::OpenAiEmbedder;
pub use generator::OpenAiGenerator;
pub use grader::OpenAiGrader;
