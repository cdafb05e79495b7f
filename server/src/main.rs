//! Server entrypoint for triviad
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use triviad_application::{GenerateQuestionUseCase, GetTodayUseCase, SubmitAnswerUseCase};
use triviad_infrastructure::{
    ConfigLoader, OpenAiEmbedder, OpenAiGenerator, OpenAiGrader, SqliteStore,
};
use triviad_presentation::{AppState, Cli, router};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    let mut config = ConfigLoader::load(cli.config.as_ref())
        .map_err(|e| anyhow::anyhow!(e))
        .context("loading configuration")?;
    if let Some(addr) = cli.addr {
        config.server.addr = addr;
    }
    if config.openai.api_key.is_empty() {
        warn!("OPENAI_API_KEY not set; generation and grading calls will fail at runtime");
    }
    if config.server.cron_key.is_empty() {
        warn!("cron key not set; the admin generation endpoint is disabled");
    }

    info!("Starting triviad");

    // === Dependency Injection ===
    let store = Arc::new(SqliteStore::open(config.database.path.clone()).await?);
    let generator = Arc::new(OpenAiGenerator::new(
        config.openai.api_key.clone(),
        config.openai.chat_model.clone(),
    ));
    let embedder = Arc::new(OpenAiEmbedder::new(
        config.openai.api_key.clone(),
        config.openai.embed_model.clone(),
    ));
    let grader = Arc::new(OpenAiGrader::new(
        config.openai.api_key.clone(),
        config.openai.chat_model.clone(),
    ));

    let state = AppState {
        today: Arc::new(GetTodayUseCase::new(store.clone())),
        submit: Arc::new(SubmitAnswerUseCase::new(store.clone(), grader)),
        generate: Arc::new(GenerateQuestionUseCase::new(generator, embedder, store)),
        cron_key: config.server.cron_key.clone(),
    };

    let app = router(state);
    let listener = tokio::net::TcpListener::bind(&config.server.addr)
        .await
        .with_context(|| format!("binding {}", config.server.addr))?;
    info!("listening on {}", config.server.addr);
    axum::serve(listener, app).await?;
    Ok(())
}
