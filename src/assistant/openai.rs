//! OpenAI Assistants API (v2) client.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use super::types::{Message, MessageList, MessageRole, Run, Thread, ToolOutput};
use super::AssistantApi;
use crate::config::ClimaConfig;
use crate::error::ClimaError;
use crate::http::{assistant_headers, shared_client, status_to_error};
use crate::tools::ToolDefinition;

/// How many messages to fetch when looking for the reply.
const MESSAGE_PAGE_SIZE: u32 = 20;

pub struct OpenAiAssistantClient {
    api_key: String,
    base_url: String,
    client: reqwest::Client,
}

impl OpenAiAssistantClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: shared_client().clone(),
        }
    }

    /// A missing key is sent as an empty bearer token.
    pub fn from_config(config: &ClimaConfig) -> Self {
        Self::new(
            config.assistant_api_key.clone().unwrap_or_default(),
            config.assistant_base_url.clone(),
        )
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post<B, T>(&self, path: &str, body: &B) -> Result<T, ClimaError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        debug!(path, "Assistants POST");
        let resp = self
            .client
            .post(self.url(path))
            .headers(assistant_headers(&self.api_key))
            .json(body)
            .send()
            .await?;
        decode(resp).await
    }

    async fn get<T>(&self, path: &str, query: &[(&str, String)]) -> Result<T, ClimaError>
    where
        T: DeserializeOwned,
    {
        debug!(path, "Assistants GET");
        let resp = self
            .client
            .get(self.url(path))
            .headers(assistant_headers(&self.api_key))
            .query(query)
            .send()
            .await?;
        decode(resp).await
    }
}

async fn decode<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ClimaError> {
    let status = resp.status().as_u16();
    let body = resp.text().await?;
    if !(200..300).contains(&status) {
        return Err(status_to_error(status, &body));
    }
    Ok(serde_json::from_str(&body)?)
}

#[async_trait]
impl AssistantApi for OpenAiAssistantClient {
    async fn create_thread(&self) -> Result<Thread, ClimaError> {
        self.post("/threads", &serde_json::json!({})).await
    }

    async fn create_message(
        &self,
        thread_id: &str,
        role: MessageRole,
        content: &str,
    ) -> Result<Message, ClimaError> {
        let body = serde_json::json!({
            "role": role,
            "content": content,
        });
        self.post(&format!("/threads/{thread_id}/messages"), &body)
            .await
    }

    async fn create_run(&self, thread_id: &str, assistant_id: &str) -> Result<Run, ClimaError> {
        let body = serde_json::json!({ "assistant_id": assistant_id });
        self.post(&format!("/threads/{thread_id}/runs"), &body).await
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, ClimaError> {
        self.get(&format!("/threads/{thread_id}/runs/{run_id}"), &[])
            .await
    }

    async fn list_messages(&self, thread_id: &str) -> Result<Vec<Message>, ClimaError> {
        let list: MessageList = self
            .get(
                &format!("/threads/{thread_id}/messages"),
                &[
                    ("order", "desc".to_string()),
                    ("limit", MESSAGE_PAGE_SIZE.to_string()),
                ],
            )
            .await?;
        Ok(list.data)
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<Run, ClimaError> {
        let body = serde_json::json!({ "tool_outputs": outputs });
        self.post(
            &format!("/threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
            &body,
        )
        .await
    }

    async fn update_assistant_tools(
        &self,
        assistant_id: &str,
        tools: &[ToolDefinition],
    ) -> Result<(), ClimaError> {
        let body = serde_json::json!({ "tools": tools });
        let _: serde_json::Value = self
            .post(&format!("/assistants/{assistant_id}"), &body)
            .await?;
        Ok(())
    }
}

impl std::fmt::Debug for OpenAiAssistantClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiAssistantClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}
