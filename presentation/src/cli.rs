//! CLI argument definitions.

use std::path::PathBuf;

use clap::Parser;

/// CLI arguments for the triviad server
#[derive(Parser, Debug)]
#[command(name = "triviad")]
#[command(author, version, about = "Daily trivia service - generation and grading API")]
#[command(long_about = r#"
triviad serves a daily trivia question over HTTP, grades free-text
answers against each question's accepted choices, and generates new
questions through an external language model, admitting them only after
a layered novelty check.

Configuration is read from ./triviad.toml (or .triviad.toml), an
explicit --config path, and the OPENAI_API_KEY / TRIVIAD_CRON_KEY /
TRIVIAD_ADDR environment variables.
"#)]
pub struct Cli {
    /// Bind address override (e.g. 0.0.0.0:8080)
    #[arg(long, value_name = "ADDR")]
    pub addr: Option<String>,

    /// Path to configuration file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}
