//! 托管服务的线上数据类型（run、状态、工具调用、诊断步骤）

use serde::{Deserialize, Serialize};

/// run 的生命周期状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Queued,
    InProgress,
    RequiresAction,
    Cancelling,
    Cancelled,
    Failed,
    Completed,
    Expired,
}

impl RunStatus {
    /// 终态：轮询到此即结束
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            RunStatus::Completed | RunStatus::Cancelled | RunStatus::Failed | RunStatus::Expired
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RunStatus::Queued => "queued",
            RunStatus::InProgress => "in_progress",
            RunStatus::RequiresAction => "requires_action",
            RunStatus::Cancelling => "cancelling",
            RunStatus::Cancelled => "cancelled",
            RunStatus::Failed => "failed",
            RunStatus::Completed => "completed",
            RunStatus::Expired => "expired",
        }
    }
}

/// run 携带的错误诊断
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastError {
    pub code: String,
    pub message: String,
}

/// run 请求执行的一个工具调用（已展平）
#[derive(Debug, Clone)]
pub struct PendingToolCall {
    pub id: String,
    pub name: String,
    /// 原始 JSON 参数串，由分发层解析
    pub arguments: String,
}

/// 回传给服务的单个工具结果
#[derive(Debug, Clone, Serialize)]
pub struct ToolOutput {
    pub tool_call_id: String,
    pub output: String,
}

/// 轮询看到的 run 快照
#[derive(Debug, Clone)]
pub struct Run {
    pub id: String,
    pub status: RunStatus,
    /// status == RequiresAction 时的待执行调用
    pub pending_tool_calls: Vec<PendingToolCall>,
    pub last_error: Option<LastError>,
}

/// 创建 run 时的参数：模型、指令与公布的工具 schema
#[derive(Debug, Clone)]
pub struct RunSpec {
    pub model: String,
    pub instructions: String,
    /// OpenAI function-tool schema 列表
    pub tools: Vec<serde_json::Value>,
}

/// 诊断用 run step
#[derive(Debug, Clone, Deserialize)]
pub struct RunStep {
    pub id: String,
    #[serde(rename = "type")]
    pub step_type: String,
    pub status: String,
}

// ---- 线上格式（仅 HTTP 客户端内部使用） ----

#[derive(Debug, Deserialize)]
pub(crate) struct WireRun {
    pub id: String,
    pub status: RunStatus,
    #[serde(default)]
    pub required_action: Option<WireRequiredAction>,
    #[serde(default)]
    pub last_error: Option<LastError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireRequiredAction {
    pub submit_tool_outputs: WireSubmitToolOutputs,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireSubmitToolOutputs {
    pub tool_calls: Vec<WireToolCall>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireToolCall {
    pub id: String,
    pub function: WireFunction,
}

#[derive(Debug, Deserialize)]
pub(crate) struct WireFunction {
    pub name: String,
    pub arguments: String,
}

impl From<WireRun> for Run {
    fn from(wire: WireRun) -> Self {
        let pending_tool_calls = wire
            .required_action
            .map(|ra| {
                ra.submit_tool_outputs
                    .tool_calls
                    .into_iter()
                    .map(|tc| PendingToolCall {
                        id: tc.id,
                        name: tc.function.name,
                        arguments: tc.function.arguments,
                    })
                    .collect()
            })
            .unwrap_or_default();

        Run {
            id: wire.id,
            status: wire.status,
            pending_tool_calls,
            last_error: wire.last_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_terminal_statuses() {
        assert!(RunStatus::Completed.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(RunStatus::Expired.is_terminal());
        assert!(RunStatus::Cancelled.is_terminal());
        assert!(!RunStatus::Queued.is_terminal());
        assert!(!RunStatus::RequiresAction.is_terminal());
        assert!(!RunStatus::Cancelling.is_terminal());
    }

    #[test]
    fn test_wire_run_flattens_tool_calls() {
        let json = serde_json::json!({
            "id": "run_1",
            "status": "requires_action",
            "required_action": {
                "type": "submit_tool_outputs",
                "submit_tool_outputs": {
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {"name": "content-draft", "arguments": "{\"topic\":\"X\"}"}
                    }]
                }
            }
        });
        let wire: WireRun = serde_json::from_value(json).unwrap();
        let run: Run = wire.into();
        assert_eq!(run.status, RunStatus::RequiresAction);
        assert_eq!(run.pending_tool_calls.len(), 1);
        assert_eq!(run.pending_tool_calls[0].name, "content-draft");
    }
}
