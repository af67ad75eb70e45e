//! Kursstudio - 多智能体课程生成的编排引擎
//!
//! 模块划分：
//! - **agents**: 角色配置、内嵌默认表、子智能体调用器
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **events**: 工作流事件流（fire-and-forget）
//! - **hosted**: 托管智能体服务（threads / runs）的客户端与 Mock
//! - **llm**: 无状态补全客户端（OpenAI 兼容 / Mock）
//! - **orchestrator**: 单轮生命周期驱动、卡死恢复状态机
//! - **persist**: 完成检测与课程落库协作方
//! - **quality**: 确定性质量评分（可读性 / 结构 / 一致性）
//! - **session**: 会话、处理锁、TTL 注册表
//! - **studio**: 对外门面（submit / shutdown / 清扫）
//! - **tools**: 固定工具集的 schema 与分发器

pub mod agents;
pub mod clock;
pub mod config;
pub mod error;
pub mod events;
pub mod hosted;
pub mod knowledge;
pub mod llm;
pub mod observability;
pub mod orchestrator;
pub mod persist;
pub mod quality;
pub mod session;
pub mod studio;
pub mod tools;

pub use error::StudioError;
pub use orchestrator::TurnOutcome;
pub use studio::{Collaborators, Studio};
