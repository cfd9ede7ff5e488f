//! Serves the tool calls a run is waiting on.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::assistant::{AssistantApi, ToolCall, ToolOutput};
use crate::error::ClimaError;
use crate::tools::{
    output_text, validate_arguments, Tool, ToolArguments, ToolExecutionContext, ToolRegistry,
};

/// Why a pending call got no output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// No registered tool has this function name.
    UnknownTool,
    /// Arguments failed schema validation (e.g. missing `city`).
    InvalidArguments(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnresolvedCall {
    pub call_id: String,
    pub function_name: String,
    pub reason: UnresolvedReason,
}

/// What one dispatch pass did.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DispatchReport {
    /// Outputs sent back to the run, one per pending call id.
    pub submitted: Vec<ToolOutput>,
    /// Calls nobody can answer. While any remain the run cannot complete.
    pub unresolved: Vec<UnresolvedCall>,
    /// Servable calls left unexecuted because another call in the same
    /// pass is unresolved.
    pub held: Vec<String>,
}

impl DispatchReport {
    pub fn is_fully_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Every call id this pass looked at.
    pub fn call_ids(&self) -> impl Iterator<Item = &str> {
        self.submitted
            .iter()
            .map(|o| o.tool_call_id.as_str())
            .chain(self.unresolved.iter().map(|u| u.call_id.as_str()))
            .chain(self.held.iter().map(String::as_str))
    }
}

/// Executes pending tool calls against a [`ToolRegistry`].
pub struct ToolDispatcher {
    api: Arc<dyn AssistantApi>,
    registry: ToolRegistry,
}

impl ToolDispatcher {
    pub fn new(api: Arc<dyn AssistantApi>, registry: ToolRegistry) -> Self {
        Self { api, registry }
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Fetch the run, execute every pending call, and submit the outputs in
    /// one request.
    ///
    /// The service only accepts outputs for all pending calls at once, so if
    /// any call has no matching tool or invalid arguments nothing is executed
    /// or submitted and the run stays in `requires_action`. A tool that fails
    /// while executing aborts the pass with [`ClimaError::ToolExecution`].
    pub async fn handle_required_action(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<DispatchReport, ClimaError> {
        let run = self.api.retrieve_run(thread_id, run_id).await?;
        let calls = run.pending_tool_calls();
        debug!(run_id, status = %run.status, pending = calls.len(), "dispatching tool calls");

        let mut report = DispatchReport::default();
        let mut servable = Vec::with_capacity(calls.len());
        for call in calls {
            match self.resolve(call) {
                Ok((tool, args)) => servable.push((call, tool, args)),
                Err(unresolved) => {
                    warn!(
                        run_id,
                        call_id = %unresolved.call_id,
                        function = %unresolved.function_name,
                        reason = ?unresolved.reason,
                        "tool call left unresolved"
                    );
                    report.unresolved.push(unresolved);
                }
            }
        }

        if !report.unresolved.is_empty() {
            report.held = servable.iter().map(|(call, _, _)| call.id.clone()).collect();
            return Ok(report);
        }

        for (call, tool, args) in servable {
            report
                .submitted
                .push(execute(thread_id, run_id, call, tool, &args).await?);
        }

        if !report.submitted.is_empty() {
            self.api
                .submit_tool_outputs(thread_id, run_id, &report.submitted)
                .await?;
            info!(run_id, count = report.submitted.len(), "submitted tool outputs");
        }

        Ok(report)
    }

    fn resolve(&self, call: &ToolCall) -> Result<(&Arc<dyn Tool>, ToolArguments), UnresolvedCall> {
        let unresolved = |reason| UnresolvedCall {
            call_id: call.id.clone(),
            function_name: call.function.name.clone(),
            reason,
        };

        let tool = self
            .registry
            .get(&call.function.name)
            .ok_or_else(|| unresolved(UnresolvedReason::UnknownTool))?;

        let args = ToolArguments::from_wire(&call.function.arguments);
        validate_arguments(args.raw(), &tool.parameters().schema)
            .map_err(|message| unresolved(UnresolvedReason::InvalidArguments(message)))?;

        Ok((tool, args))
    }
}

async fn execute(
    thread_id: &str,
    run_id: &str,
    call: &ToolCall,
    tool: &Arc<dyn Tool>,
    args: &ToolArguments,
) -> Result<ToolOutput, ClimaError> {
    let ctx = ToolExecutionContext {
        thread_id: thread_id.to_string(),
        run_id: run_id.to_string(),
        call_id: call.id.clone(),
    };
    let value = tool
        .execute(args, &ctx)
        .await
        .map_err(|e| ClimaError::ToolExecution {
            call_id: call.id.clone(),
            tool_name: call.function.name.clone(),
            message: e.to_string(),
        })?;

    Ok(ToolOutput {
        tool_call_id: call.id.clone(),
        output: output_text(value),
    })
}
