//! OpenAI 兼容 API 客户端
//!
//! 通过 async_openai 调用任意 OpenAI 兼容端点（可配置 base_url）；
//! 子智能体的生成参数（temperature 等）逐项透传。

use async_openai::config::OpenAIConfig;
use async_openai::types::chat::{
    ChatCompletionRequestMessage, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs,
};
use async_openai::Client;
use async_trait::async_trait;

use crate::error::StudioError;
use crate::llm::{CompletionRequest, LlmClient};

/// OpenAI 兼容客户端：持有 Client，model 由每次请求决定
pub struct OpenAiClient {
    client: Client<OpenAIConfig>,
}

impl OpenAiClient {
    pub fn new(base_url: Option<&str>, api_key: Option<&str>) -> Self {
        let api_key = api_key
            .map(String::from)
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .unwrap_or_else(|| "sk-placeholder".to_string());

        let config = if let Some(url) = base_url {
            OpenAIConfig::new().with_api_base(url).with_api_key(api_key)
        } else {
            OpenAIConfig::new().with_api_key(api_key)
        };

        Self {
            client: Client::with_config(config),
        }
    }

    fn to_messages(request: &CompletionRequest) -> Result<Vec<ChatCompletionRequestMessage>, StudioError> {
        Ok(vec![
            ChatCompletionRequestMessage::System(
                ChatCompletionRequestSystemMessageArgs::default()
                    .content(request.system.clone())
                    .build()
                    .map_err(|e| StudioError::Llm(e.to_string()))?,
            ),
            ChatCompletionRequestMessage::User(
                ChatCompletionRequestUserMessageArgs::default()
                    .content(request.user.clone())
                    .build()
                    .map_err(|e| StudioError::Llm(e.to_string()))?,
            ),
        ])
    }
}

#[async_trait]
impl LlmClient for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, StudioError> {
        let mut args = CreateChatCompletionRequestArgs::default();
        args.model(&request.model)
            .messages(Self::to_messages(request)?);

        let p = &request.params;
        if let Some(t) = p.temperature {
            args.temperature(t);
        }
        if let Some(t) = p.top_p {
            args.top_p(t);
        }
        if let Some(m) = p.max_tokens {
            args.max_tokens(m);
        }
        if let Some(f) = p.frequency_penalty {
            args.frequency_penalty(f);
        }
        if let Some(pr) = p.presence_penalty {
            args.presence_penalty(pr);
        }

        let built = args.build().map_err(|e| StudioError::Llm(e.to_string()))?;

        let response = self
            .client
            .chat()
            .create(built)
            .await
            .map_err(|e| StudioError::Llm(e.to_string()))?;

        let content = response
            .choices
            .first()
            .and_then(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(content)
    }
}
