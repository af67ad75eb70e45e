//! Mock LLM 客户端（用于测试，无需 API）
//!
//! 按入队顺序返回预设回复；队列空了之后回显请求内容。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StudioError;
use crate::llm::{CompletionRequest, LlmClient};

/// Mock 客户端：预设回复队列，记录收到的请求便于断言
#[derive(Debug, Default)]
pub struct MockLlmClient {
    responses: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<(String, String)>>,
}

impl MockLlmClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_responses(responses: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(Into::into).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// 已收到的 (system, user) 请求对
    pub fn seen_requests(&self) -> Vec<(String, String)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LlmClient for MockLlmClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, StudioError> {
        self.requests
            .lock()
            .unwrap()
            .push((request.system.clone(), request.user.clone()));

        let next = self.responses.lock().unwrap().pop_front();
        Ok(next.unwrap_or_else(|| format!("Echo from Mock: {}", request.user)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::GenerationParams;

    #[tokio::test]
    async fn test_mock_returns_queued_then_echoes() {
        let mock = MockLlmClient::with_responses(["erste Antwort"]);
        let req = CompletionRequest {
            model: "gpt-4o".into(),
            system: "sys".into(),
            user: "Hallo".into(),
            params: GenerationParams::default(),
        };
        assert_eq!(mock.complete(&req).await.unwrap(), "erste Antwort");
        assert_eq!(mock.complete(&req).await.unwrap(), "Echo from Mock: Hallo");
        assert_eq!(mock.seen_requests().len(), 2);
    }
}
