//! Service configuration: schema and loading.

mod file_config;
mod loader;

pub use file_config::{DatabaseConfig, OpenAiConfig, ServerConfig, ServiceConfig};
pub use loader::ConfigLoader;
