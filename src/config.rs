//! 配置加载：TOML 文件 + `STUDIO__` 前缀环境变量覆盖
//!
//! 所有字段都有默认值，没有配置文件也能启动。

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::StudioError;

/// 顶层应用配置
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub hosted: HostedSection,
    #[serde(default)]
    pub llm: LlmSection,
    #[serde(default)]
    pub registry: RegistrySection,
    #[serde(default)]
    pub quality: QualitySection,
    #[serde(default)]
    pub tools: ToolsSection,
}

/// 托管智能体服务（threads / runs API）
#[derive(Debug, Clone, Deserialize)]
pub struct HostedSection {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// 轮询间隔（毫秒）
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// 瞬时 API 错误的重试次数
    #[serde(default = "default_transient_retries")]
    pub transient_retries: u32,
    #[serde(default = "default_transient_backoff_ms")]
    pub transient_backoff_ms: u64,
    /// queued 状态连续多少次轮询后判定卡死
    #[serde(default = "default_queued_stuck_polls")]
    pub queued_stuck_polls: u32,
    /// 任意非终态连续多少次无进展后判定卡死
    #[serde(default = "default_general_stuck_polls")]
    pub general_stuck_polls: u32,
}

impl Default for HostedSection {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            poll_interval_ms: default_poll_interval_ms(),
            transient_retries: default_transient_retries(),
            transient_backoff_ms: default_transient_backoff_ms(),
            queued_stuck_polls: default_queued_stuck_polls(),
            general_stuck_polls: default_general_stuck_polls(),
        }
    }
}

/// 子智能体直连 LLM 的设置
#[derive(Debug, Clone, Deserialize)]
pub struct LlmSection {
    #[serde(default = "default_model")]
    pub model: String,
    /// 兼容 OpenAI 协议的自定义端点
    #[serde(default)]
    pub base_url: Option<String>,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: default_model(),
            base_url: None,
        }
    }
}

/// 会话注册表治理
#[derive(Debug, Clone, Deserialize)]
pub struct RegistrySection {
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            session_ttl_secs: default_session_ttl_secs(),
            max_sessions: default_max_sessions(),
            sweep_interval_secs: default_sweep_interval_secs(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QualitySection {
    /// Quality Gate 阈值，0-100 刻度
    #[serde(default = "default_quality_threshold")]
    pub threshold: f64,
}

impl Default for QualitySection {
    fn default() -> Self {
        Self {
            threshold: default_quality_threshold(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ToolsSection {
    /// 回传给托管服务的工具输出上限（字符数）
    #[serde(default = "default_max_output_chars")]
    pub max_output_chars: usize,
    /// 事件推送中的内容预览长度
    #[serde(default = "default_preview_chars")]
    pub preview_chars: usize,
}

impl Default for ToolsSection {
    fn default() -> Self {
        Self {
            max_output_chars: default_max_output_chars(),
            preview_chars: default_preview_chars(),
        }
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_transient_retries() -> u32 {
    3
}

fn default_transient_backoff_ms() -> u64 {
    1000
}

fn default_queued_stuck_polls() -> u32 {
    15
}

fn default_general_stuck_polls() -> u32 {
    6
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_session_ttl_secs() -> u64 {
    1800
}

fn default_max_sessions() -> usize {
    50
}

fn default_sweep_interval_secs() -> u64 {
    600
}

fn default_quality_threshold() -> f64 {
    70.0
}

fn default_max_output_chars() -> usize {
    3000
}

fn default_preview_chars() -> usize {
    300
}

/// 加载配置：默认路径上的 TOML（可选）→ 显式路径（可选）→ 环境变量覆盖
pub fn load_config(explicit: Option<PathBuf>) -> Result<AppConfig, StudioError> {
    let mut builder = config::Config::builder();

    for candidate in ["config/default", "../config/default", "default"] {
        builder = builder.add_source(config::File::with_name(candidate).required(false));
    }

    if let Some(path) = explicit {
        builder = builder.add_source(config::File::from(path));
    }

    builder = builder.add_source(
        config::Environment::with_prefix("STUDIO")
            .separator("__")
            .try_parsing(true),
    );

    let settings = builder
        .build()
        .map_err(|e| StudioError::Config(e.to_string()))?;
    settings
        .try_deserialize()
        .map_err(|e| StudioError::Config(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_sane() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.hosted.poll_interval_ms, 2000);
        assert_eq!(cfg.hosted.queued_stuck_polls, 15);
        assert_eq!(cfg.hosted.general_stuck_polls, 6);
        assert_eq!(cfg.registry.session_ttl_secs, 1800);
        assert_eq!(cfg.registry.max_sessions, 50);
        assert_eq!(cfg.registry.sweep_interval_secs, 600);
        assert_eq!(cfg.quality.threshold, 70.0);
        assert_eq!(cfg.tools.max_output_chars, 3000);
    }
}
