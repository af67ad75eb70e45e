//! LLM 层：子智能体直连的客户端抽象与实现（OpenAI 兼容 / Mock）

pub mod mock;
pub mod openai;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::StudioError;

/// 单次补全的生成参数；None 表示使用服务端默认值
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenerationParams {
    #[serde(default)]
    pub temperature: Option<f32>,
    #[serde(default)]
    pub top_p: Option<f32>,
    #[serde(default)]
    pub max_tokens: Option<u32>,
    #[serde(default)]
    pub frequency_penalty: Option<f32>,
    #[serde(default)]
    pub presence_penalty: Option<f32>,
}

/// 一次 system + user 的补全请求
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub model: String,
    pub system: String,
    pub user: String,
    pub params: GenerationParams,
}

/// LLM 客户端 trait：子智能体调用的唯一入口
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, StudioError>;
}

pub use mock::MockLlmClient;
pub use openai::OpenAiClient;
