//! Conversation driver: thread → message → run → poll → reply.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::assistant::{latest_assistant_message, AssistantApi, MessageRole, Run, RunPhase};
use crate::config::{ClimaConfig, PollSettings};
use crate::dispatch::{DispatchReport, ToolDispatcher};
use crate::error::ClimaError;
use crate::tools::ToolRegistry;
use crate::util::timeout::with_timeout;

/// Everything one question produced.
#[derive(Debug, Clone)]
pub struct Exchange {
    pub thread_id: String,
    pub run_id: String,
    pub reply: String,
    /// One entry per dispatcher invocation, in order.
    pub dispatches: Vec<DispatchReport>,
}

/// Drives one assistant run per question and returns its reply.
///
/// Holds no per-request state: every call creates its own thread and run.
pub struct ConversationDriver {
    api: Arc<dyn AssistantApi>,
    dispatcher: ToolDispatcher,
    assistant_id: String,
    poll: PollSettings,
}

impl ConversationDriver {
    pub fn new(
        api: Arc<dyn AssistantApi>,
        registry: ToolRegistry,
        assistant_id: impl Into<String>,
        poll: PollSettings,
    ) -> Self {
        Self {
            dispatcher: ToolDispatcher::new(Arc::clone(&api), registry),
            api,
            assistant_id: assistant_id.into(),
            poll,
        }
    }

    /// A missing assistant id is sent as-is and rejected by the service.
    pub fn from_config(config: &ClimaConfig, api: Arc<dyn AssistantApi>, registry: ToolRegistry) -> Self {
        Self::new(
            api,
            registry,
            config.assistant_id.clone().unwrap_or_default(),
            config.poll,
        )
    }

    pub fn registry(&self) -> &ToolRegistry {
        self.dispatcher.registry()
    }

    /// Declare every registered tool on the assistant. Returns how many were
    /// declared; an empty registry makes no call.
    pub async fn register_tools(&self) -> Result<usize, ClimaError> {
        let definitions = self.registry().definitions();
        if definitions.is_empty() {
            debug!("no tools registered; skipping assistant update");
            return Ok(0);
        }
        self.api
            .update_assistant_tools(&self.assistant_id, &definitions)
            .await?;
        info!(
            assistant_id = %self.assistant_id,
            tools = ?self.registry().names().collect::<Vec<_>>(),
            "registered tools"
        );
        Ok(definitions.len())
    }

    /// Ask one question, never failing: errors come back as `"Error: ..."`.
    pub async fn reply(&self, prompt: &str) -> String {
        match self.get_reply(prompt).await {
            Ok(text) => text,
            Err(e) => {
                warn!(
                    error = %e,
                    category = ?e.category(),
                    retryable = e.is_retryable(),
                    recovery = ?e.recovery_suggestion(),
                    "question failed"
                );
                format!("Error: {e}")
            }
        }
    }

    /// Ask one question and return the assistant's reply text.
    pub async fn get_reply(&self, prompt: &str) -> Result<String, ClimaError> {
        self.converse(prompt).await.map(|exchange| exchange.reply)
    }

    /// Ask one question and keep the thread, run and dispatch details.
    pub async fn converse(&self, prompt: &str) -> Result<Exchange, ClimaError> {
        let thread = self.api.create_thread().await?;
        self.api
            .create_message(&thread.id, MessageRole::User, prompt)
            .await?;
        let run = self.api.create_run(&thread.id, &self.assistant_id).await?;
        info!(thread_id = %thread.id, run_id = %run.id, "started run");

        let dispatches = with_timeout(
            self.poll.max_wait,
            self.wait_for_completion(&thread.id, &run.id),
        )
        .await?;

        let messages = self.api.list_messages(&thread.id).await?;
        let reply = latest_assistant_message(&messages)
            .map(|m| m.text())
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                ClimaError::InvalidState(format!(
                    "run {} completed without an assistant reply",
                    run.id
                ))
            })?;

        Ok(Exchange {
            thread_id: thread.id,
            run_id: run.id,
            reply,
            dispatches,
        })
    }

    /// Poll until the run completes, serving tool calls on the way.
    ///
    /// The dispatcher sees each pending call id at most once per run, so a
    /// run stalled on a call nobody can serve just keeps being polled until
    /// `max_wait` runs out.
    async fn wait_for_completion(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Vec<DispatchReport>, ClimaError> {
        let mut dispatches = Vec::new();
        let mut handed_off: HashSet<String> = HashSet::new();

        loop {
            let run = self.api.retrieve_run(thread_id, run_id).await?;
            debug!(run_id, status = %run.status, "polled run");

            match run.status.phase() {
                RunPhase::Completed => return Ok(dispatches),
                RunPhase::Failed => return Err(run_failed(&run)),
                RunPhase::RequiresAction => {
                    let fresh = run
                        .pending_tool_calls()
                        .iter()
                        .any(|call| !handed_off.contains(&call.id));
                    if fresh {
                        let report = self
                            .dispatcher
                            .handle_required_action(thread_id, run_id)
                            .await?;
                        // The dispatcher fetches the run again; record what it saw.
                        handed_off.extend(report.call_ids().map(str::to_string));
                        if !report.is_fully_resolved() {
                            warn!(
                                run_id,
                                unresolved = report.unresolved.len(),
                                "run is waiting on tool calls that cannot be served"
                            );
                        }
                        dispatches.push(report);
                    }
                }
                RunPhase::Pending => {}
            }

            tokio::time::sleep(self.poll.interval).await;
        }
    }
}

fn run_failed(run: &Run) -> ClimaError {
    let message = run
        .last_error
        .as_ref()
        .and_then(|e| e.message.clone().or_else(|| e.code.clone()))
        .unwrap_or_else(|| "no error details".to_string());
    ClimaError::RunFailed {
        run_id: run.id.clone(),
        status: run.status.to_string(),
        message,
    }
}
