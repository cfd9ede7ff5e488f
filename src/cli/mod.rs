//! Command-line surface: one question in, one reply out.

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

/// Ask a weather-aware assistant
#[derive(Parser, Debug)]
#[command(name = "clima", version, about = "Ask a weather-aware OpenAI assistant")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Do not declare or serve the weather tool
    #[arg(long, global = true)]
    pub no_tools: bool,

    /// Give up on a run after this many seconds
    #[arg(long, global = true)]
    pub max_wait: Option<u64>,
}

/// Top-level CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Ask a single question and print the reply
    Ask(AskArgs),
    /// Read questions from stdin, one per line, printing each reply
    Chat,
    /// Declare the tools on the assistant and exit
    Register,
}

/// Arguments for `clima ask`.
#[derive(Parser, Debug)]
pub struct AskArgs {
    /// The question
    pub prompt: String,
}

/// Install the stderr log subscriber (`RUST_LOG`, default `warn`).
pub fn init_logging() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();
}
