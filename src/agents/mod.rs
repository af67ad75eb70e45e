//! 智能体配置层：角色、生成参数、工作流参数与配置仓库
//!
//! 配置仓库不可用时回落到内嵌默认表（同一张表既做种子数据也做运行时兜底）。

pub mod defaults;
pub mod invoker;
pub mod prompts;
pub mod store;

use serde::{Deserialize, Serialize};

use crate::llm::GenerationParams;

pub use invoker::SubAgentInvoker;
pub use store::{ConfigStore, InMemoryConfigStore};

/// 工作流中的固定角色
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    Supervisor,
    ContentCreator,
    DidacticExpert,
    QualityChecker,
}

impl AgentRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Supervisor => "supervisor",
            AgentRole::ContentCreator => "content_creator",
            AgentRole::DidacticExpert => "didactic_expert",
            AgentRole::QualityChecker => "quality_checker",
        }
    }

    pub const ALL: [AgentRole; 4] = [
        AgentRole::Supervisor,
        AgentRole::ContentCreator,
        AgentRole::DidacticExpert,
        AgentRole::QualityChecker,
    ];
}

/// 错误处理策略：决定超时 / 卡死时的升级方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ErrorPolicy {
    /// 向用户道歉并优雅结束本轮
    #[default]
    Graceful,
    /// 取消卡死的 run 并自动重建
    Retry,
    /// 直接中止并上报错误
    Strict,
}

/// 工作流参数：重试次数、超时、错误策略
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowParams {
    pub retry_attempts: u32,
    pub timeout_secs: u64,
    pub error_policy: ErrorPolicy,
}

impl Default for WorkflowParams {
    fn default() -> Self {
        Self {
            retry_attempts: 3,
            timeout_secs: 300,
            error_policy: ErrorPolicy::Graceful,
        }
    }
}

impl WorkflowParams {
    /// 单轮允许的最大轮询次数
    pub fn max_polls(&self) -> u32 {
        self.retry_attempts * 15
    }
}

/// 单个智能体的完整配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub role: AgentRole,
    /// 事件和用户可见消息中的显示名
    pub display_name: String,
    pub description: String,
    pub model: String,
    /// system prompt
    pub instructions: String,
    pub params: GenerationParams,
    pub workflow: WorkflowParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_max_polls_derives_from_retry_attempts() {
        let wf = WorkflowParams {
            retry_attempts: 3,
            ..Default::default()
        };
        assert_eq!(wf.max_polls(), 45);
        let wf = WorkflowParams {
            retry_attempts: 1,
            ..Default::default()
        };
        assert_eq!(wf.max_polls(), 15);
    }

    #[test]
    fn test_role_names_are_stable() {
        assert_eq!(AgentRole::ContentCreator.as_str(), "content_creator");
        assert_eq!(AgentRole::ALL.len(), 4);
    }
}
