//! 托管智能体服务层：thread / run 生命周期的抽象与实现
//!
//! HTTP 实现走 OpenAI Assistants 协议；测试用脚本化 Mock。

pub mod client;
pub mod mock;
pub mod types;

pub use client::{HostedAgentApi, HttpHostedApi};
pub use mock::ScriptedHostedApi;
pub use types::{
    LastError, PendingToolCall, Run, RunSpec, RunStatus, RunStep, ToolOutput,
};
