//! clima: ask a hosted assistant a question, letting it look up the weather.
//!
//! A [`driver::ConversationDriver`] creates a thread, posts the question,
//! starts a run and polls it. When the run asks for a tool, the
//! [`dispatch::ToolDispatcher`] executes the matching registered tool (the
//! weather lookup) and submits its output. The reply is the newest assistant
//! message once the run completes.
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//! use clima::prelude::*;
//!
//! # async fn example() -> clima::error::Result<()> {
//! let config = ClimaConfig::from_env()?;
//! let api: Arc<dyn AssistantApi> = Arc::new(OpenAiAssistantClient::from_config(&config));
//! let weather = Arc::new(WeatherClient::from_config(&config));
//! let registry = ToolRegistry::new().with(Arc::new(weather_tool(weather)));
//!
//! let driver = ConversationDriver::from_config(&config, api, registry);
//! driver.register_tools().await?;
//! println!("{}", driver.reply("¿Qué tiempo hace en Madrid?").await);
//! # Ok(())
//! # }
//! ```

pub mod assistant;
pub mod config;
pub mod dispatch;
pub mod driver;
pub mod error;
pub mod http;
pub mod prelude;
pub mod tools;
pub mod util;
pub mod weather;

#[cfg(feature = "cli")]
pub mod cli;
