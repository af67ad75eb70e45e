//! 外部知识库协作方
//!
//! 查询失败时由分发层降级为占位提示，不在这里处理。

use async_trait::async_trait;

use crate::error::StudioError;

/// 知识库查询接口
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// 返回格式化文本；无结果时返回 None
    async fn query(&self, text: &str, context: &str) -> Result<Option<String>, StudioError>;
}

/// 无知识库部署时的空实现：永远无结果
#[derive(Debug, Default)]
pub struct NoopKnowledgeBase;

#[async_trait]
impl KnowledgeBase for NoopKnowledgeBase {
    async fn query(&self, _text: &str, _context: &str) -> Result<Option<String>, StudioError> {
        Ok(None)
    }
}
