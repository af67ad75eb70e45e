//! 托管服务的 HTTP 客户端（OpenAI Assistants 协议，threads / runs）
//!
//! 统一的 request builder 附带 Bearer 认证和 assistants beta 头；
//! 非 2xx 响应映射为 HostedApi 错误，连接层问题映射为 HostedTransport。

use async_trait::async_trait;
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde_json::json;

use crate::error::StudioError;
use crate::hosted::types::{Run, RunSpec, RunStep, ToolOutput, WireRun};

/// 托管智能体服务的操作面：线程、run 生命周期、诊断
#[async_trait]
pub trait HostedAgentApi: Send + Sync {
    async fn create_thread(&self) -> Result<String, StudioError>;

    async fn append_message(
        &self,
        thread_id: &str,
        role: &str,
        content: &str,
    ) -> Result<(), StudioError>;

    async fn create_run(&self, thread_id: &str, spec: &RunSpec) -> Result<Run, StudioError>;

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, StudioError>;

    /// 尽力取消；对已结束的 run 返回错误是正常的，调用方应忽略
    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<(), StudioError>;

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<(), StudioError>;

    /// 诊断：run 的执行步骤
    async fn list_run_steps(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Vec<RunStep>, StudioError>;

    /// 线程里最新的 assistant 文本消息
    async fn latest_assistant_message(&self, thread_id: &str) -> Result<String, StudioError>;
}

/// reqwest 实现
pub struct HttpHostedApi {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    /// run-create 用的 assistant 标识
    assistant_id: String,
}

#[derive(Debug, Deserialize)]
struct IdOnly {
    id: String,
}

#[derive(Debug, Deserialize)]
struct MessageList {
    data: Vec<WireMessage>,
}

#[derive(Debug, Deserialize)]
struct WireMessage {
    role: String,
    content: Vec<WireContent>,
}

#[derive(Debug, Deserialize)]
struct WireContent {
    #[serde(rename = "type")]
    content_type: String,
    text: Option<WireText>,
}

#[derive(Debug, Deserialize)]
struct WireText {
    value: String,
}

#[derive(Debug, Deserialize)]
struct StepList {
    data: Vec<RunStep>,
}

impl HttpHostedApi {
    pub fn new(base_url: &str, api_key: &str, assistant_id: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            assistant_id: assistant_id.to_string(),
        }
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        self.client
            .request(method, format!("{}/{}", self.base_url, path.trim_start_matches('/')))
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Content-Type", "application/json")
            .header("OpenAI-Beta", "assistants=v2")
    }

    async fn send<T: serde::de::DeserializeOwned>(
        &self,
        builder: RequestBuilder,
    ) -> Result<T, StudioError> {
        let response = builder
            .send()
            .await
            .map_err(|e| StudioError::HostedTransport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| StudioError::HostedTransport(e.to_string()))?;

        if !status.is_success() {
            return Err(StudioError::HostedApi {
                status: status.as_u16(),
                message: body,
            });
        }

        serde_json::from_str(&body).map_err(|e| StudioError::HostedParse(e.to_string()))
    }
}

#[async_trait]
impl HostedAgentApi for HttpHostedApi {
    async fn create_thread(&self) -> Result<String, StudioError> {
        let thread: IdOnly = self
            .send(self.request(Method::POST, "threads").json(&json!({})))
            .await?;
        Ok(thread.id)
    }

    async fn append_message(
        &self,
        thread_id: &str,
        role: &str,
        content: &str,
    ) -> Result<(), StudioError> {
        let _: IdOnly = self
            .send(
                self.request(Method::POST, &format!("threads/{thread_id}/messages"))
                    .json(&json!({ "role": role, "content": content })),
            )
            .await?;
        Ok(())
    }

    async fn create_run(&self, thread_id: &str, spec: &RunSpec) -> Result<Run, StudioError> {
        let wire: WireRun = self
            .send(
                self.request(Method::POST, &format!("threads/{thread_id}/runs"))
                    .json(&json!({
                        "assistant_id": self.assistant_id,
                        "model": spec.model,
                        "instructions": spec.instructions,
                        "tools": spec.tools,
                    })),
            )
            .await?;
        Ok(wire.into())
    }

    async fn retrieve_run(&self, thread_id: &str, run_id: &str) -> Result<Run, StudioError> {
        let wire: WireRun = self
            .send(self.request(Method::GET, &format!("threads/{thread_id}/runs/{run_id}")))
            .await?;
        Ok(wire.into())
    }

    async fn cancel_run(&self, thread_id: &str, run_id: &str) -> Result<(), StudioError> {
        let _: IdOnly = self
            .send(self.request(
                Method::POST,
                &format!("threads/{thread_id}/runs/{run_id}/cancel"),
            ))
            .await?;
        Ok(())
    }

    async fn submit_tool_outputs(
        &self,
        thread_id: &str,
        run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<(), StudioError> {
        let _: WireRun = self
            .send(
                self.request(
                    Method::POST,
                    &format!("threads/{thread_id}/runs/{run_id}/submit_tool_outputs"),
                )
                .json(&json!({ "tool_outputs": outputs })),
            )
            .await?;
        Ok(())
    }

    async fn list_run_steps(
        &self,
        thread_id: &str,
        run_id: &str,
    ) -> Result<Vec<RunStep>, StudioError> {
        let steps: StepList = self
            .send(self.request(
                Method::GET,
                &format!("threads/{thread_id}/runs/{run_id}/steps"),
            ))
            .await?;
        Ok(steps.data)
    }

    async fn latest_assistant_message(&self, thread_id: &str) -> Result<String, StudioError> {
        let list: MessageList = self
            .send(self.request(
                Method::GET,
                &format!("threads/{thread_id}/messages?order=desc&limit=10"),
            ))
            .await?;

        for message in list.data {
            if message.role != "assistant" {
                continue;
            }
            let text = message
                .content
                .iter()
                .filter(|c| c.content_type == "text")
                .filter_map(|c| c.text.as_ref().map(|t| t.value.clone()))
                .collect::<Vec<_>>()
                .join("\n");
            if !text.is_empty() {
                return Ok(text);
            }
        }
        Ok(String::new())
    }
}
