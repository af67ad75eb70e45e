//! 子智能体调用器：按角色发起一次无状态的补全调用
//!
//! 角色未配置时回落到内嵌默认表；传输错误转成含显示名的用户可读消息，
//! 永不上抛，保证分发层的非阻塞约定。

use std::sync::Arc;

use crate::agents::defaults::default_agents;
use crate::agents::{AgentConfig, AgentRole, ConfigStore};
use crate::events::{preview, Notifier, StudioEvent};
use crate::llm::{CompletionRequest, LlmClient};

/// 渲染提示词 → 一次补全调用 → 文本结果
pub struct SubAgentInvoker {
    llm: Arc<dyn LlmClient>,
    store: Arc<dyn ConfigStore>,
    notifier: Notifier,
}

impl SubAgentInvoker {
    pub fn new(llm: Arc<dyn LlmClient>, store: Arc<dyn ConfigStore>, notifier: Notifier) -> Self {
        Self {
            llm,
            store,
            notifier,
        }
    }

    /// 仓库缺角色时回落到默认表
    fn resolve(&self, role: AgentRole) -> AgentConfig {
        if let Some(cfg) = self.store.get(role) {
            return cfg;
        }
        tracing::warn!(role = role.as_str(), "角色未配置，使用内嵌默认配置");
        default_agents()
            .into_iter()
            .find(|a| a.role == role)
            .expect("default table covers every role")
    }

    /// 调用一个角色；任何错误都转成用户可读的文本而非 Err
    pub async fn invoke(&self, session_id: &str, role: AgentRole, task_prompt: String) -> String {
        let config = self.resolve(role);

        self.notifier.emit(
            session_id,
            StudioEvent::AgentStart {
                agent: config.display_name.clone(),
                role: role.as_str().to_string(),
                model: config.model.clone(),
            },
        );
        self.notifier.emit(
            session_id,
            StudioEvent::AgentPrompt {
                agent: config.display_name.clone(),
                preview: preview(&task_prompt, 200),
            },
        );

        let request = CompletionRequest {
            model: config.model.clone(),
            system: config.instructions.clone(),
            user: task_prompt,
            params: config.params.clone(),
        };

        match self.llm.complete(&request).await {
            Ok(text) => {
                self.notifier.emit(
                    session_id,
                    StudioEvent::AgentResponse {
                        agent: config.display_name.clone(),
                        preview: preview(&text, 300),
                    },
                );
                self.notifier
                    .status(session_id, format!("✅ {} abgeschlossen", config.display_name));
                text
            }
            Err(e) => {
                tracing::warn!(role = role.as_str(), error = %e, "子智能体调用失败");
                self.notifier
                    .error(session_id, format!("⚠️ {} Fehler: {e}", config.display_name));
                format!(
                    "{} ist momentan nicht verfügbar. Bitte versuchen Sie es später erneut.",
                    config.display_name
                )
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::InMemoryConfigStore;
    use crate::error::StudioError;
    use crate::llm::MockLlmClient;
    use async_trait::async_trait;

    struct FailingLlm;

    #[async_trait]
    impl LlmClient for FailingLlm {
        async fn complete(&self, _request: &CompletionRequest) -> Result<String, StudioError> {
            Err(StudioError::Llm("connection refused".into()))
        }
    }

    #[tokio::test]
    async fn test_invoke_returns_text() {
        let invoker = SubAgentInvoker::new(
            Arc::new(MockLlmClient::with_responses(["## Outline"])),
            Arc::new(InMemoryConfigStore::seeded()),
            Notifier::disabled(),
        );
        let out = invoker
            .invoke("s1", AgentRole::ContentCreator, "Erstelle Outline".into())
            .await;
        assert_eq!(out, "## Outline");
    }

    #[tokio::test]
    async fn test_llm_error_becomes_user_safe_message() {
        let invoker = SubAgentInvoker::new(
            Arc::new(FailingLlm),
            Arc::new(InMemoryConfigStore::seeded()),
            Notifier::disabled(),
        );
        let out = invoker
            .invoke("s1", AgentRole::DidacticExpert, "Optimiere".into())
            .await;
        assert!(out.contains("Der Pädagoge"));
        assert!(out.contains("momentan nicht verfügbar"));
    }

    #[tokio::test]
    async fn test_missing_role_falls_back_to_default_table() {
        let invoker = SubAgentInvoker::new(
            Arc::new(MockLlmClient::with_responses(["ok"])),
            Arc::new(InMemoryConfigStore::empty()),
            Notifier::disabled(),
        );
        let out = invoker
            .invoke("s1", AgentRole::QualityChecker, "Prüfe".into())
            .await;
        assert_eq!(out, "ok");
    }
}
