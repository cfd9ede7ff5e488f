//! Hosted assistant service: the operations the driver and dispatcher need.

pub mod openai;
pub mod types;

pub use openai::OpenAiAssistantClient;
pub use types::{
    latest_assistant_message, FunctionCall, Message, MessageContent, MessageRole,
    RequiredAction, Run, RunError, RunPhase, RunStatus, SubmitToolOutputs, TextContent, Thread,
    ToolCall, ToolOutput,
};

use async_trait::async_trait;

use crate::error::ClimaError;
use crate::tools::ToolDefinition;

/// Operations exposed by a thread/run based assistant service.
///
/// Run status is only ever changed by the service; callers observe it with
/// [`AssistantApi::retrieve_run`] and unblock it with
/// [`AssistantApi::submit_tool_outputs`].
#[async_trait]
pub trait AssistantApi: Send + Sync {
    /// Create an empty conversation thread.
    async fn create_thread(&self) -> Result<Thread, ClimaError>;

    /// Append a message to a thread.
    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, ClimaError>;

    /// Start a run of `assistant_id` over the thread.
    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, ClimaError>;

    /// Fetch the current state of a run.
    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, ClimaError>;

    /// List a thread's messages, newest first.
    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>, ClimaError>;

    /// Answer pending tool calls and resume the run.
    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, ClimaError>;

    /// Replace the assistant's declared tools.
    async fn update_assistant_tools(
        &self,
        assistant_id: &str,
        tools: &[ToolDefinition],
    ) -> Result<(), ClimaError>;
}
