//! 对外门面：submit / shutdown 两个入口 + 后台清扫任务
//!
//! 组装注册表、编排器与协作方；宿主只跟这里打交道。

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::agents::{ConfigStore, InMemoryConfigStore, SubAgentInvoker};
use crate::clock::{Clock, SystemClock};
use crate::config::AppConfig;
use crate::error::StudioError;
use crate::events::Notifier;
use crate::hosted::HostedAgentApi;
use crate::knowledge::{KnowledgeBase, NoopKnowledgeBase};
use crate::llm::LlmClient;
use crate::orchestrator::{Orchestrator, TurnOutcome};
use crate::persist::{CourseSink, NoopCourseSink};
use crate::quality::QualityScorer;
use crate::session::SessionRegistry;
use crate::tools::{validate_dispatch_table, ToolDispatcher};

/// 课程工作室：每会话一个状态机，注册表统一治理
pub struct Studio {
    registry: SessionRegistry,
    orchestrator: Orchestrator,
    api: Arc<dyn HostedAgentApi>,
    sweep_interval: Duration,
}

/// 可替换的协作方集合；None 使用空实现
pub struct Collaborators {
    pub api: Arc<dyn HostedAgentApi>,
    pub llm: Arc<dyn LlmClient>,
    pub store: Option<Arc<dyn ConfigStore>>,
    pub knowledge: Option<Arc<dyn KnowledgeBase>>,
    pub sink: Option<Arc<dyn CourseSink>>,
    pub clock: Option<Arc<dyn Clock>>,
}

impl Studio {
    pub fn new(
        config: &AppConfig,
        collaborators: Collaborators,
        notifier: Notifier,
    ) -> Result<Self, StudioError> {
        validate_dispatch_table().map_err(StudioError::Config)?;

        let store = collaborators
            .store
            .unwrap_or_else(|| Arc::new(InMemoryConfigStore::seeded()));
        let knowledge = collaborators
            .knowledge
            .unwrap_or_else(|| Arc::new(NoopKnowledgeBase));
        let sink = collaborators
            .sink
            .unwrap_or_else(|| Arc::new(NoopCourseSink));
        let clock = collaborators
            .clock
            .unwrap_or_else(|| Arc::new(SystemClock));

        let invoker = Arc::new(SubAgentInvoker::new(
            collaborators.llm,
            store.clone(),
            notifier.clone(),
        ));
        let dispatcher = ToolDispatcher::new(
            invoker,
            QualityScorer::new(config.quality.threshold),
            knowledge,
            notifier.clone(),
            config.tools.max_output_chars,
            config.tools.preview_chars,
        );
        let orchestrator = Orchestrator::new(
            collaborators.api.clone(),
            dispatcher,
            store,
            sink,
            notifier,
            clock.clone(),
            config.hosted.clone(),
        );
        let registry = SessionRegistry::new(
            Duration::from_secs(config.registry.session_ttl_secs),
            config.registry.max_sessions,
            clock,
        );

        Ok(Self {
            registry,
            orchestrator,
            api: collaborators.api,
            sweep_interval: Duration::from_secs(config.registry.sweep_interval_secs),
        })
    }

    /// 处理一轮用户输入
    pub async fn submit(&self, session_key: &str, text: &str) -> Result<TurnOutcome, StudioError> {
        let session = self.registry.get_or_create(session_key).await;
        self.orchestrator.run_turn(&session, text).await
    }

    /// 结束一个会话：取消在途 run 并移除
    pub async fn shutdown(&self, session_key: &str) -> bool {
        self.registry.remove(session_key, self.api.as_ref()).await
    }

    pub async fn active_sessions(&self) -> usize {
        self.registry.active_count().await
    }

    /// 手动触发一次清扫（后台任务也会周期调用）
    pub async fn sweep(&self) -> usize {
        self.registry.sweep(self.api.as_ref()).await
    }

    /// 周期清扫任务，独立于请求处理
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let studio = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(studio.sweep_interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                let evicted = studio.sweep().await;
                if evicted > 0 {
                    tracing::info!(evicted, "会话清扫完成");
                }
            }
        })
    }
}
