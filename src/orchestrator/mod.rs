//! 编排器：驱动一轮对话从提交到终态的完整生命周期
//!
//! 单轮内同步推进：追加消息 → 创建 run → 轮询 → 工具分发 → 回传输出 → 终态。
//! 卡死由状态机检测并最多恢复一次；超时按会话的错误策略升级。
//! processing 标志在任何出口都会被清除。

pub mod monitor;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::time::sleep;

use crate::agents::defaults::default_agents;
use crate::agents::{AgentConfig, AgentRole, ConfigStore, ErrorPolicy};
use crate::clock::Clock;
use crate::config::HostedSection;
use crate::error::StudioError;
use crate::events::{Notifier, StudioEvent};
use crate::hosted::{HostedAgentApi, Run, RunSpec, RunStatus};
use crate::persist::{extract_document, looks_complete, CourseSink};
use crate::session::Session;
use crate::tools::{advertised_tools, DispatchEffects, ToolDispatcher};

pub use monitor::{MonitorState, StuckMonitor};

/// 一轮对话的结局
#[derive(Debug)]
pub enum TurnOutcome {
    /// 正常回复
    Reply(String),
    /// 会话正在处理另一条消息，本次提交被拒绝
    Busy,
    /// 超时后按 graceful 策略结束，附用户可读消息
    TimedOut(String),
    /// run 进入失败终态
    Failed { status: String, detail: String },
}

pub struct Orchestrator {
    api: Arc<dyn HostedAgentApi>,
    dispatcher: ToolDispatcher,
    store: Arc<dyn ConfigStore>,
    sink: Arc<dyn CourseSink>,
    notifier: Notifier,
    clock: Arc<dyn Clock>,
    cfg: HostedSection,
}

impl Orchestrator {
    pub fn new(
        api: Arc<dyn HostedAgentApi>,
        dispatcher: ToolDispatcher,
        store: Arc<dyn ConfigStore>,
        sink: Arc<dyn CourseSink>,
        notifier: Notifier,
        clock: Arc<dyn Clock>,
        cfg: HostedSection,
    ) -> Self {
        Self {
            api,
            dispatcher,
            store,
            sink,
            notifier,
            clock,
            cfg,
        }
    }

    /// 处理一轮用户输入；同一会话的并发提交只有一个会继续
    pub async fn run_turn(
        &self,
        session: &Session,
        text: &str,
    ) -> Result<TurnOutcome, StudioError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(TurnOutcome::Reply(
                "Bitte geben Sie eine Nachricht ein.".to_string(),
            ));
        }

        if !session.try_begin_processing() {
            self.notifier.status(
                &session.key,
                "⏳ Eine Anfrage wird bereits verarbeitet, bitte warten...",
            );
            return Ok(TurnOutcome::Busy);
        }

        let result = self.process_turn(session, text).await;
        session.touch(self.clock.now());
        session.end_processing();
        result
    }

    fn supervisor_config(&self) -> AgentConfig {
        self.store.get(AgentRole::Supervisor).unwrap_or_else(|| {
            default_agents()
                .into_iter()
                .find(|a| a.role == AgentRole::Supervisor)
                .expect("default table covers every role")
        })
    }

    async fn process_turn(
        &self,
        session: &Session,
        text: &str,
    ) -> Result<TurnOutcome, StudioError> {
        let supervisor = self.supervisor_config();
        let workflow = supervisor.workflow.clone();

        let thread_id = {
            let mut state = session.state.lock().await;
            match &state.thread_id {
                Some(id) => id.clone(),
                None => {
                    let id = self.with_retries(|| self.api.create_thread()).await?;
                    state.thread_id = Some(id.clone());
                    id
                }
            }
        };

        self.with_retries(|| self.api.append_message(&thread_id, "user", text))
            .await?;

        let spec = RunSpec {
            model: supervisor.model.clone(),
            instructions: supervisor.instructions.clone(),
            tools: advertised_tools(),
        };
        let mut run = self.with_retries(|| self.api.create_run(&thread_id, &spec)).await?;
        session.state.lock().await.run_id = Some(run.id.clone());
        self.notifier
            .status(&session.key, "🚀 Verarbeitung gestartet...");

        let mut monitor = StuckMonitor::new(self.cfg.queued_stuck_polls, self.cfg.general_stuck_polls);
        let mut started = self.clock.now();
        let mut polls: u32 = 0;
        let max_polls = workflow.max_polls();
        let timeout = Duration::from_secs(workflow.timeout_secs);

        loop {
            match run.status {
                RunStatus::Completed => {
                    return self.finish_completed(session, &thread_id).await;
                }
                RunStatus::RequiresAction => {
                    let batch = self
                        .dispatcher
                        .dispatch_batch(&session.key, &run.pending_tool_calls)
                        .await;
                    self.with_retries(|| {
                        self.api
                            .submit_tool_outputs(&thread_id, &run.id, &batch.outputs)
                    })
                    .await?;
                    self.merge_effects(session, batch.effects).await;
                    session.touch(self.clock.now());
                    monitor.note_progress();
                }
                RunStatus::Failed | RunStatus::Cancelled | RunStatus::Expired => {
                    return self.finish_failed(session, &thread_id, &run).await;
                }
                RunStatus::Queued | RunStatus::InProgress | RunStatus::Cancelling => {
                    if monitor.observe(run.status) == MonitorState::StuckWarn {
                        if monitor.begin_recovery() {
                            run = self
                                .recover(session, &thread_id, &run.id, &spec, &mut monitor)
                                .await?;
                            continue;
                        }
                        return self
                            .escalate_timeout(session, &thread_id, &run.id, workflow.error_policy, polls)
                            .await;
                    }
                }
            }

            let elapsed = self.clock.now().saturating_duration_since(started);
            if elapsed > timeout || polls >= max_polls {
                if workflow.error_policy == ErrorPolicy::Retry && monitor.begin_recovery() {
                    run = self
                        .recover(session, &thread_id, &run.id, &spec, &mut monitor)
                        .await?;
                    started = self.clock.now();
                    polls = 0;
                    continue;
                }
                return self
                    .escalate_timeout(session, &thread_id, &run.id, workflow.error_policy, polls)
                    .await;
            }

            sleep(Duration::from_millis(self.cfg.poll_interval_ms)).await;
            polls += 1;
            run = self
                .with_retries(|| self.api.retrieve_run(&thread_id, &run.id))
                .await?;
        }
    }

    /// 取消卡死的 run，清空句柄并重建；返回新 run
    async fn recover(
        &self,
        session: &Session,
        thread_id: &str,
        run_id: &str,
        spec: &RunSpec,
        monitor: &mut StuckMonitor,
    ) -> Result<Run, StudioError> {
        tracing::warn!(session = %session.key, run = run_id, "run 卡死，取消并重建");
        self.notifier.emit(
            &session.key,
            StudioEvent::Recovery {
                detail: format!("Run {run_id} reagiert nicht mehr, starte neu..."),
            },
        );

        if let Err(e) = self.api.cancel_run(thread_id, run_id).await {
            tracing::debug!(run = run_id, error = %e, "取消失败（run 可能已结束），忽略");
        }
        session.state.lock().await.run_id = None;

        let spec = spec.clone();
        let run = self
            .with_retries(|| self.api.create_run(thread_id, &spec))
            .await?;
        session.state.lock().await.run_id = Some(run.id.clone());
        monitor.recovery_done();
        Ok(run)
    }

    async fn finish_completed(
        &self,
        session: &Session,
        thread_id: &str,
    ) -> Result<TurnOutcome, StudioError> {
        let reply = self
            .with_retries(|| self.api.latest_assistant_message(thread_id))
            .await?;
        session.state.lock().await.run_id = None;

        if looks_complete(&reply) {
            let content = {
                let state = session.state.lock().await;
                state.final_candidate.clone().unwrap_or_else(|| reply.clone())
            };
            let document = extract_document(&content);
            if let Err(e) = self.sink.save(&session.key, &document).await {
                tracing::warn!(session = %session.key, error = %e, "课程落库失败");
                self.notifier
                    .error(&session.key, format!("Kurs konnte nicht gespeichert werden: {e}"));
            } else {
                self.notifier.status(
                    &session.key,
                    format!("💾 Kurs gespeichert: '{}'", document.title),
                );
            }
        }

        self.notifier.message(&session.key, "assistant", reply.clone());
        Ok(TurnOutcome::Reply(reply))
    }

    async fn finish_failed(
        &self,
        session: &Session,
        thread_id: &str,
        run: &Run,
    ) -> Result<TurnOutcome, StudioError> {
        session.state.lock().await.run_id = None;

        let mut detail = run
            .last_error
            .as_ref()
            .map(|e| format!("{}: {}", e.code, e.message))
            .unwrap_or_else(|| "keine Fehlerdetails".to_string());

        // 诊断补充：失败的 run steps
        if let Ok(steps) = self.api.list_run_steps(thread_id, &run.id).await {
            let failed: Vec<String> = steps
                .iter()
                .filter(|s| s.status == "failed")
                .map(|s| format!("{} ({})", s.id, s.step_type))
                .collect();
            if !failed.is_empty() {
                detail = format!("{detail}; fehlgeschlagene Schritte: {}", failed.join(", "));
            }
        }

        let status = run.status.as_str().to_string();
        self.notifier.error(
            &session.key,
            format!("❌ Run beendet mit Status '{status}': {detail}"),
        );
        Ok(TurnOutcome::Failed { status, detail })
    }

    /// 超时升级：graceful 道歉 / strict 报错；retry 在调用方处理
    async fn escalate_timeout(
        &self,
        session: &Session,
        thread_id: &str,
        run_id: &str,
        policy: ErrorPolicy,
        polls: u32,
    ) -> Result<TurnOutcome, StudioError> {
        if let Err(e) = self.api.cancel_run(thread_id, run_id).await {
            tracing::debug!(run = run_id, error = %e, "超时取消失败，忽略");
        }
        session.state.lock().await.run_id = None;

        match policy {
            ErrorPolicy::Strict => Err(StudioError::RunTimeout { polls }),
            _ => {
                let message = "Die Verarbeitung dauert leider länger als erwartet und wurde \
                               abgebrochen. Bitte versuchen Sie es erneut."
                    .to_string();
                self.notifier.error(&session.key, message.clone());
                Ok(TurnOutcome::TimedOut(message))
            }
        }
    }

    async fn merge_effects(&self, session: &Session, effects: DispatchEffects) {
        if effects.awaiting_user {
            tracing::debug!(session = %session.key, "Workflow wartet auf Nutzerentscheidung");
        }
        let mut state = session.state.lock().await;
        for (stage, content) in effects.stages {
            state.stages.insert(stage, content);
        }
        if effects.finalize_requested {
            state.final_candidate = effects.final_candidate;
        }
    }

    /// 瞬时错误按退避重试，其余直接上抛
    async fn with_retries<T, F, Fut>(&self, mut op: F) -> Result<T, StudioError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StudioError>>,
    {
        let mut attempt: u32 = 0;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.cfg.transient_retries => {
                    attempt += 1;
                    tracing::warn!(error = %e, attempt, "瞬时 API 错误，退避后重试");
                    sleep(Duration::from_millis(
                        self.cfg.transient_backoff_ms * attempt as u64,
                    ))
                    .await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}
