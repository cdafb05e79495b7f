//! Infrastructure layer for triviad
//!
//! This crate contains the adapters implementing the ports defined in
//! the application layer: the SQLite question store, the OpenAI-backed
//! generator/embedder/grader, and configuration file loading.

pub mod config;
pub mod openai;
pub mod store;

// Re-export commonly used types
pub use config::{ConfigLoader, DatabaseConfig, OpenAiConfig, ServerConfig, ServiceConfig};
pub use openai::{OpenAiEmbedder, OpenAiGenerator, OpenAiGrader};
pub use store::SqliteStore;
