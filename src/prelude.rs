//! Convenience re-exports for common use.

pub use crate::assistant::{AssistantApi, OpenAiAssistantClient, RunStatus};
pub use crate::config::{ClimaConfig, PollSettings};
pub use crate::dispatch::{DispatchReport, ToolDispatcher};
pub use crate::driver::{ConversationDriver, Exchange};
pub use crate::error::{ClimaError, Result};
pub use crate::tools::{FunctionTool, Tool, ToolArguments, ToolParameters, ToolRegistry};
pub use crate::weather::{weather_tool, WeatherClient};
