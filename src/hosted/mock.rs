//! 脚本化的托管服务 Mock（测试用，无网络）
//!
//! 按脚本顺序吐出 run 快照；脚本耗尽后重复最后一个快照，正好用来模拟卡死的 run。

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::StudioError;
use crate::hosted::client::HostedAgentApi;
use crate::hosted::types::{PendingToolCall, Run, RunSpec, RunStatus, RunStep, ToolOutput};

#[derive(Default)]
struct ScriptState {
    snapshots: VecDeque<Run>,
    last: Option<Run>,
    assistant_messages: VecDeque<String>,
    submitted: Vec<Vec<ToolOutput>>,
    appended: Vec<(String, String)>,
    threads_created: u32,
    runs_created: u32,
    cancelled: u32,
}

/// 脚本化 Mock：记录全部交互，便于断言
#[derive(Default)]
pub struct ScriptedHostedApi {
    state: Mutex<ScriptState>,
}

impl ScriptedHostedApi {
    pub fn new() -> Self {
        Self::default()
    }

    /// 追加一个将按顺序返回的 run 快照
    pub fn push_snapshot(&self, run: Run) {
        self.state.lock().unwrap().snapshots.push_back(run);
    }

    /// 追加 latest_assistant_message 将返回的文本
    pub fn push_assistant_message(&self, text: impl Into<String>) {
        self.state
            .lock()
            .unwrap()
            .assistant_messages
            .push_back(text.into());
    }

    pub fn submitted_outputs(&self) -> Vec<Vec<ToolOutput>> {
        self.state.lock().unwrap().submitted.clone()
    }

    pub fn cancel_count(&self) -> u32 {
        self.state.lock().unwrap().cancelled
    }

    pub fn runs_created(&self) -> u32 {
        self.state.lock().unwrap().runs_created
    }

    pub fn appended_messages(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().appended.clone()
    }

    fn next_snapshot(&self) -> Run {
        let mut state = self.state.lock().unwrap();
        if let Some(run) = state.snapshots.pop_front() {
            state.last = Some(run.clone());
            return run;
        }
        state
            .last
            .clone()
            .unwrap_or_else(|| run("run_empty", RunStatus::Completed))
    }
}

/// 构造一个无工具调用的 run 快照
pub fn run(id: &str, status: RunStatus) -> Run {
    Run {
        id: id.to_string(),
        status,
        pending_tool_calls: Vec::new(),
        last_error: None,
    }
}

/// 构造一个 requires_action 快照
pub fn requires_action(id: &str, calls: Vec<(&str, &str, serde_json::Value)>) -> Run {
    Run {
        id: id.to_string(),
        status: RunStatus::RequiresAction,
        pending_tool_calls: calls
            .into_iter()
            .map(|(call_id, name, args)| PendingToolCall {
                id: call_id.to_string(),
                name: name.to_string(),
                arguments: args.to_string(),
            })
            .collect(),
        last_error: None,
    }
}

#[async_trait]
impl HostedAgentApi for ScriptedHostedApi {
    async fn create_thread(&self) -> Result<String, StudioError> {
        let mut state = self.state.lock().unwrap();
        state.threads_created += 1;
        Ok(format!("thread_{}", state.threads_created))
    }

    async fn append_message(
        &self,
        _thread_id: &str,
        role: &str,
        content: &str,
    ) -> Result<(), StudioError> {
        self.state
            .lock()
            .unwrap()
            .appended
            .push((role.to_string(), content.to_string()));
        Ok(())
    }

    async fn create_run(&self, _thread_id: &str, _spec: &RunSpec) -> Result<Run, StudioError> {
        self.state.lock().unwrap().runs_created += 1;
        Ok(self.next_snapshot())
    }

    async fn retrieve_run(&self, _thread_id: &str, _run_id: &str) -> Result<Run, StudioError> {
        Ok(self.next_snapshot())
    }

    async fn cancel_run(&self, _thread_id: &str, _run_id: &str) -> Result<(), StudioError> {
        self.state.lock().unwrap().cancelled += 1;
        Ok(())
    }

    async fn submit_tool_outputs(
        &self,
        _thread_id: &str,
        _run_id: &str,
        outputs: &[ToolOutput],
    ) -> Result<(), StudioError> {
        self.state.lock().unwrap().submitted.push(outputs.to_vec());
        Ok(())
    }

    async fn list_run_steps(
        &self,
        _thread_id: &str,
        _run_id: &str,
    ) -> Result<Vec<RunStep>, StudioError> {
        Ok(Vec::new())
    }

    async fn latest_assistant_message(&self, _thread_id: &str) -> Result<String, StudioError> {
        Ok(self
            .state
            .lock()
            .unwrap()
            .assistant_messages
            .pop_front()
            .unwrap_or_default())
    }
}
