//! Shared test helpers: a scripted in-memory assistant service.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use chrono::DateTime;

use clima::assistant::*;
use clima::config::PollSettings;
use clima::error::ClimaError;
use clima::tools::{FunctionTool, ToolDefinition, ToolParameters};

/// Poll fast and give up quickly so stalled runs fail in milliseconds.
pub fn fast_poll() -> PollSettings {
    PollSettings::builder()
        .interval(Duration::from_millis(1))
        .max_wait(Duration::from_millis(200))
        .build()
}

/// An assistant service whose runs walk through a fixed status script.
///
/// Each run advances one step per `retrieve_run`, except that a run sitting
/// in `requires_action` stays there until outputs are submitted, like the
/// real service. Past the end of the script the last status repeats.
pub struct ScriptedAssistant {
    script: Vec<RunStatus>,
    tool_calls: Vec<ToolCall>,
    late_calls: Option<(usize, Vec<ToolCall>)>,
    last_error: Option<RunError>,
    reply: String,
    interim: Option<String>,
    create_run_error: Option<(u16, String)>,
    state: Mutex<State>,
}

#[derive(Default)]
struct State {
    next_id: usize,
    cursors: HashMap<String, usize>,
    prompts: HashMap<String, String>,
    threads: Vec<String>,
    runs: Vec<Run>,
    posted: Vec<(String, MessageRole, String)>,
    submissions: Vec<(String, String, Vec<ToolOutput>)>,
    registrations: Vec<(String, Vec<ToolDefinition>)>,
    retrievals: usize,
}

impl ScriptedAssistant {
    pub fn new(script: &[RunStatus]) -> Self {
        Self {
            script: script.to_vec(),
            tool_calls: Vec::new(),
            late_calls: None,
            last_error: None,
            reply: "Respuesta del asistente".to_string(),
            interim: None,
            create_run_error: None,
            state: Mutex::new(State::default()),
        }
    }

    pub fn with_tool_calls(mut self, calls: Vec<ToolCall>) -> Self {
        self.tool_calls = calls;
        self
    }

    /// Extra calls that show up from the `from`-th `retrieve_run` onwards
    /// (counting from 1 across all runs).
    pub fn with_late_tool_calls(mut self, from: usize, calls: Vec<ToolCall>) -> Self {
        self.late_calls = Some((from, calls));
        self
    }

    pub fn with_reply(mut self, reply: &str) -> Self {
        self.reply = reply.to_string();
        self
    }

    /// An earlier assistant message that must not be returned as the reply.
    pub fn with_interim_message(mut self, text: &str) -> Self {
        self.interim = Some(text.to_string());
        self
    }

    pub fn with_last_error(mut self, code: &str, message: &str) -> Self {
        self.last_error = Some(RunError {
            code: Some(code.to_string()),
            message: Some(message.to_string()),
        });
        self
    }

    pub fn failing_create_run(mut self, status: u16, message: &str) -> Self {
        self.create_run_error = Some((status, message.to_string()));
        self
    }

    pub fn threads(&self) -> Vec<String> {
        self.state.lock().unwrap().threads.clone()
    }

    pub fn run_ids(&self) -> Vec<String> {
        self.state.lock().unwrap().runs.iter().map(|r| r.id.clone()).collect()
    }

    pub fn posted(&self) -> Vec<(String, MessageRole, String)> {
        self.state.lock().unwrap().posted.clone()
    }

    pub fn submissions(&self) -> Vec<(String, String, Vec<ToolOutput>)> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn registrations(&self) -> Vec<(String, Vec<ToolDefinition>)> {
        self.state.lock().unwrap().registrations.clone()
    }

    pub fn retrievals(&self) -> usize {
        self.state.lock().unwrap().retrievals
    }

    /// Current status of a run without advancing it.
    pub fn status_of(&self, run_id: &str) -> RunStatus {
        let state = self.state.lock().unwrap();
        let cursor = state.cursors.get(run_id).copied().unwrap_or(0);
        self.status_at(cursor)
    }

    fn status_at(&self, cursor: usize) -> RunStatus {
        self.script
            .get(cursor)
            .or_else(|| self.script.last())
            .copied()
            .unwrap_or(RunStatus::Queued)
    }

    fn run_at(&self, thread_id: &str, run_id: &str, status: RunStatus, retrieval: usize) -> Run {
        let required_action = (status == RunStatus::RequiresAction).then(|| {
            let mut tool_calls = self.tool_calls.clone();
            if let Some((from, late)) = &self.late_calls {
                if retrieval >= *from {
                    tool_calls.extend(late.iter().cloned());
                }
            }
            RequiredAction {
                kind: "submit_tool_outputs".to_string(),
                submit_tool_outputs: Some(SubmitToolOutputs { tool_calls }),
            }
        });
        let last_error = (status.phase() == RunPhase::Failed)
            .then(|| self.last_error.clone())
            .flatten();
        Run {
            id: run_id.to_string(),
            thread_id: thread_id.to_string(),
            assistant_id: Some("asst_test".to_string()),
            status,
            required_action,
            last_error,
        }
    }
}

fn text_message(id: &str, role: MessageRole, created_at: i64, text: &str) -> Message {
    Message {
        id: id.to_string(),
        role,
        created_at: DateTime::from_timestamp(created_at, 0),
        content: vec![MessageContent::Text {
            text: TextContent {
                value: text.to_string(),
            },
        }],
    }
}

#[async_trait]
impl AssistantApi for ScriptedAssistant {
    async fn create_thread(&self) -> Result<Thread, ClimaError> {
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let id = format!("thread_{}", state.next_id);
        state.threads.push(id.clone());
        Ok(Thread {
            id,
            created_at: None,
        })
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, ClimaError> {
        let mut state = self.state.lock().unwrap();
        state
            .posted
            .push((thread_id.to_string(), role, content.to_string()));
        state
            .prompts
            .insert(thread_id.to_string(), content.to_string());
        Ok(text_message("msg_user", role, 100, content))
    }

    async fn create_run(&self, thread_id: &str, _assistant_id: &str) -> Result<Run, ClimaError> {
        if let Some((status, message)) = &self.create_run_error {
            return Err(ClimaError::api(*status, message.clone()));
        }
        let mut state = self.state.lock().unwrap();
        state.next_id += 1;
        let run_id = format!("run_{}", state.next_id);
        state.cursors.insert(run_id.clone(), 0);
        let run = self.run_at(thread_id, &run_id, self.status_at(0), 0);
        state.runs.push(run.clone());
        Ok(run)
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, ClimaError> {
        let mut state = self.state.lock().unwrap();
        state.retrievals += 1;
        let cursor = state
            .cursors
            .get(run_id)
            .copied()
            .ok_or_else(|| ClimaError::api(404, format!("No run found with id '{run_id}'")))?;
        let status = self.status_at(cursor);
        if status != RunStatus::RequiresAction {
            state.cursors.insert(run_id.to_string(), cursor + 1);
        }
        Ok(self.run_at(thread_id, run_id, status, state.retrievals))
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>, ClimaError> {
        let state = self.state.lock().unwrap();
        let prompt = state.prompts.get(thread_id).cloned().unwrap_or_default();
        let mut messages = vec![text_message("msg_reply", MessageRole::Assistant, 300, &self.reply)];
        if let Some(interim) = &self.interim {
            messages.push(text_message("msg_interim", MessageRole::Assistant, 200, interim));
        }
        messages.push(text_message("msg_user", MessageRole::User, 100, &prompt));
        Ok(messages)
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, ClimaError> {
        let mut state = self.state.lock().unwrap();
        state
            .submissions
            .push((thread_id.to_string(), run_id.to_string(), outputs.to_vec()));
        let cursor = state.cursors.get(run_id).copied().unwrap_or(0);
        if self.status_at(cursor) == RunStatus::RequiresAction {
            state.cursors.insert(run_id.to_string(), cursor + 1);
        }
        let next = self.status_at(cursor + 1);
        Ok(self.run_at(thread_id, run_id, next, state.retrievals))
    }

    async fn update_assistant_tools(
        &self,
        assistant_id: &str,
        tools: &[ToolDefinition],
    ) -> Result<(), ClimaError> {
        self.state
            .lock()
            .unwrap()
            .registrations
            .push((assistant_id.to_string(), tools.to_vec()));
        Ok(())
    }
}

/// A `city` tool that counts executions and answers with a fixed sentence.
pub fn counting_weather_tool(name: &str, counter: Arc<AtomicUsize>) -> FunctionTool {
    FunctionTool::new(
        name,
        "Obtiene el clima actual de una ciudad específica.",
        ToolParameters::object().string("city", "", true).build(),
        move |args, _ctx| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let city = args.get_str("city")?;
                Ok(serde_json::json!(format!("Soleado en {city}")))
            }
        },
    )
}

/// A tool whose handler always fails.
pub fn failing_tool(name: &str) -> FunctionTool {
    FunctionTool::new(
        name,
        "always fails",
        ToolParameters::object().string("city", "", true).build(),
        |_args, _ctx| async { Err(ClimaError::api(503, "provider down")) },
    )
}
