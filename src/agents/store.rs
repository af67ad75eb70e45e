//! 配置仓库：按角色读取激活的智能体配置
//!
//! 仓库为空或某个角色缺失时，调用方回落到内嵌默认表，绝不让一轮对话失败。

use std::collections::HashMap;
use std::sync::RwLock;

use crate::agents::defaults::default_agents;
use crate::agents::{AgentConfig, AgentRole};

/// 只读配置来源；实现方可以是数据库、文件或内存表
pub trait ConfigStore: Send + Sync {
    /// 按角色取激活配置；缺失时返回 None（由调用方兜底）
    fn get(&self, role: AgentRole) -> Option<AgentConfig>;

    fn all(&self) -> Vec<AgentConfig>;
}

/// 内存实现：以默认表为种子，可在运行时覆盖单个角色
pub struct InMemoryConfigStore {
    agents: RwLock<HashMap<AgentRole, AgentConfig>>,
}

impl InMemoryConfigStore {
    /// 以内嵌默认表为种子
    pub fn seeded() -> Self {
        let agents = default_agents()
            .into_iter()
            .map(|a| (a.role, a))
            .collect();
        Self {
            agents: RwLock::new(agents),
        }
    }

    /// 空仓库（用于测试兜底路径）
    pub fn empty() -> Self {
        Self {
            agents: RwLock::new(HashMap::new()),
        }
    }

    pub fn upsert(&self, config: AgentConfig) {
        self.agents.write().unwrap().insert(config.role, config);
    }
}

impl ConfigStore for InMemoryConfigStore {
    fn get(&self, role: AgentRole) -> Option<AgentConfig> {
        self.agents.read().unwrap().get(&role).cloned()
    }

    fn all(&self) -> Vec<AgentConfig> {
        self.agents.read().unwrap().values().cloned().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seeded_store_has_all_roles() {
        let store = InMemoryConfigStore::seeded();
        for role in AgentRole::ALL {
            assert!(store.get(role).is_some());
        }
    }

    #[test]
    fn test_upsert_overrides_seed() {
        let store = InMemoryConfigStore::seeded();
        let mut cfg = store.get(AgentRole::ContentCreator).unwrap();
        cfg.model = "gpt-4o-mini".to_string();
        store.upsert(cfg);
        assert_eq!(
            store.get(AgentRole::ContentCreator).unwrap().model,
            "gpt-4o-mini"
        );
    }
}
