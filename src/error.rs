//! 编排引擎的错误类型
//!
//! 区分瞬时错误（网络抖动、5xx，可重试）与永久错误（认证、参数，直接上抛）。

use thiserror::Error;

/// 编排引擎各层可能出现的错误
#[derive(Error, Debug)]
pub enum StudioError {
    #[error("Config error: {0}")]
    Config(String),

    /// 托管智能体服务的传输层错误（连接失败、超时），可重试
    #[error("Hosted API transport error: {0}")]
    HostedTransport(String),

    /// 托管智能体服务返回的 API 错误
    #[error("Hosted API error (status {status}): {message}")]
    HostedApi { status: u16, message: String },

    #[error("Hosted API response parse error: {0}")]
    HostedParse(String),

    #[error("LLM error: {0}")]
    Llm(String),

    /// 工作流在限定轮询次数内未到达终态
    #[error("Run timed out after {polls} polls")]
    RunTimeout { polls: u32 },
}

impl StudioError {
    /// 是否值得按退避策略重试
    pub fn is_transient(&self) -> bool {
        match self {
            StudioError::HostedTransport(_) => true,
            StudioError::HostedApi { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(StudioError::HostedTransport("conn reset".into()).is_transient());
        assert!(StudioError::HostedApi {
            status: 503,
            message: "overloaded".into()
        }
        .is_transient());
        assert!(StudioError::HostedApi {
            status: 429,
            message: "rate limited".into()
        }
        .is_transient());
        assert!(!StudioError::HostedApi {
            status: 401,
            message: "bad key".into()
        }
        .is_transient());
        assert!(!StudioError::Llm("bad prompt".into()).is_transient());
        assert!(!StudioError::RunTimeout { polls: 45 }.is_transient());
    }
}
