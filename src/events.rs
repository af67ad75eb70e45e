//! 工作流事件流：编排引擎向前端推送的实时进度
//!
//! 事件通过 unbounded channel 发出；接收端掉线时静默丢弃，绝不影响工作流。

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// 推送给前端的事件类型
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StudioEvent {
    /// 状态栏文本
    Status { text: String },
    /// 对话消息（助手回复等）
    Message { sender: String, text: String },
    Error { text: String },
    ToolCallStart {
        function: String,
        arguments: serde_json::Value,
    },
    ToolCallResult { function: String, preview: String },
    ToolCallError { function: String, error: String },
    /// 子智能体开始执行
    AgentStart {
        agent: String,
        role: String,
        model: String,
    },
    AgentPrompt { agent: String, preview: String },
    AgentResponse { agent: String, preview: String },
    /// Quality Gate 结果
    QualityGate {
        score: f64,
        threshold: f64,
        passed: bool,
    },
    /// 等待用户确认（大纲批准 / 最终反馈）
    ApprovalRequest { stage: String, prompt: String },
    /// 某阶段的课程内容已更新
    CourseContentUpdate { stage: String, preview: String },
    /// 恢复机制介入（卡死 run 被取消重建）
    Recovery { detail: String },
}

/// 带会话标识和时间戳的事件信封
#[derive(Debug, Clone, Serialize)]
pub struct EventEnvelope {
    pub session_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub event: StudioEvent,
}

/// 事件发送器：可空（disabled 模式用于测试和无前端场景）
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: Option<UnboundedSender<EventEnvelope>>,
}

impl Notifier {
    /// 创建一对发送器 / 接收器
    pub fn channel() -> (Self, UnboundedReceiver<EventEnvelope>) {
        let (tx, rx) = unbounded_channel();
        (Self { tx: Some(tx) }, rx)
    }

    /// 不发送任何事件
    pub fn disabled() -> Self {
        Self { tx: None }
    }

    /// 发送事件；接收端已关闭时丢弃
    pub fn emit(&self, session_id: &str, event: StudioEvent) {
        if let Some(tx) = &self.tx {
            let envelope = EventEnvelope {
                session_id: session_id.to_string(),
                timestamp: Utc::now(),
                event,
            };
            if tx.send(envelope).is_err() {
                tracing::debug!("事件接收端已关闭，丢弃事件");
            }
        }
    }

    pub fn status(&self, session_id: &str, text: impl Into<String>) {
        self.emit(session_id, StudioEvent::Status { text: text.into() });
    }

    pub fn message(&self, session_id: &str, sender: impl Into<String>, text: impl Into<String>) {
        self.emit(
            session_id,
            StudioEvent::Message {
                sender: sender.into(),
                text: text.into(),
            },
        );
    }

    pub fn error(&self, session_id: &str, text: impl Into<String>) {
        self.emit(session_id, StudioEvent::Error { text: text.into() });
    }
}

/// 截断到 max_chars 个字符（按字符边界），超出部分以 "..." 结尾
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emit_after_receiver_dropped_is_silent() {
        let (notifier, rx) = Notifier::channel();
        drop(rx);
        notifier.status("s1", "noch da");
    }

    #[tokio::test]
    async fn test_envelope_carries_session_id() {
        let (notifier, mut rx) = Notifier::channel();
        notifier.error("session-42", "kaputt");
        let envelope = rx.recv().await.unwrap();
        assert_eq!(envelope.session_id, "session-42");
        match envelope.event {
            StudioEvent::Error { text } => assert_eq!(text, "kaputt"),
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn test_envelope_serializes_flat_with_timestamp() {
        let envelope = EventEnvelope {
            session_id: "s1".to_string(),
            timestamp: Utc::now(),
            event: StudioEvent::QualityGate {
                score: 72.5,
                threshold: 70.0,
                passed: true,
            },
        };
        let json = serde_json::to_value(&envelope).unwrap();
        assert_eq!(json["type"], "quality_gate");
        assert_eq!(json["session_id"], "s1");
        assert_eq!(json["score"], 72.5);
        assert!(json["timestamp"].is_string());
    }

    #[test]
    fn test_preview_truncates_on_char_boundary() {
        assert_eq!(preview("kurz", 10), "kurz");
        assert_eq!(preview("äöü äöü äöü", 5), "äöü ä...");
        assert_eq!(preview("abcdef", 3), "abc...");
    }
}
