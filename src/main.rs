//! clima CLI binary entry point.

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::warn;

use clima::assistant::{AssistantApi, OpenAiAssistantClient};
use clima::cli::{Cli, Commands};
use clima::config::ClimaConfig;
use clima::driver::ConversationDriver;
use clima::error::ClimaError;
use clima::tools::ToolRegistry;
use clima::weather::{weather_tool, WeatherClient};

#[tokio::main]
async fn main() {
    clima::cli::init_logging();
    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), ClimaError> {
    let mut config = ClimaConfig::from_env()?;
    if let Some(secs) = cli.max_wait {
        config.poll.max_wait = Duration::from_secs(secs);
    }
    for name in config.missing_secrets() {
        warn!(variable = name, "secret not set; the remote service will reject requests");
    }

    let api: Arc<dyn AssistantApi> = Arc::new(OpenAiAssistantClient::from_config(&config));
    let mut registry = ToolRegistry::new();
    if !cli.no_tools {
        let weather = Arc::new(WeatherClient::from_config(&config));
        registry.register(Arc::new(weather_tool(weather)));
    }
    let driver = ConversationDriver::from_config(&config, api, registry);

    match cli.command {
        Commands::Register => {
            let count = driver.register_tools().await?;
            println!("Registered {count} tool(s).");
        }
        Commands::Ask(args) => {
            register_or_warn(&driver).await;
            println!("{}", driver.reply(&args.prompt).await);
        }
        Commands::Chat => {
            register_or_warn(&driver).await;
            let mut lines = BufReader::new(tokio::io::stdin()).lines();
            while let Some(line) = lines.next_line().await? {
                let prompt = line.trim();
                if prompt.is_empty() {
                    continue;
                }
                println!("{}", driver.reply(prompt).await);
            }
        }
    }

    Ok(())
}

async fn register_or_warn(driver: &ConversationDriver) {
    if let Err(e) = driver.register_tools().await {
        warn!(error = %e, "tool registration failed; continuing");
    }
}
