//! Presentation layer for triviad
//!
//! The HTTP API surface (router, handlers, DTOs, status mapping) and the
//! CLI argument definitions. All decision logic lives in the application
//! layer; this crate only translates between transport and use cases.

pub mod cli;
pub mod http;

// Re-export commonly used types
pub use cli::Cli;
pub use http::{AppState, router};
