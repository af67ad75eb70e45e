//! 课程落库协作方：完成检测与元数据提取
//!
//! 编排器只决定「什么时候算完成」并移交原始文本，不持有任何存储 schema。
//! 完成检测优先用显式 final 标记；短语匹配只是兜底启发式。

use async_trait::async_trait;
use chrono::Utc;

use crate::error::StudioError;

/// 完成短语兜底启发式（大小写敏感，与模型输出一致）
const COMPLETION_PHRASES: [&str; 5] = [
    "Kurs wurde erfolgreich erstellt",
    "Der Kurs ist jetzt bereit",
    "Kurserstellung abgeschlossen",
    "Ihr Kurs ist fertig",
    "Der komplette Kurs",
];

/// 提交给落库方的成品文档
#[derive(Debug, Clone)]
pub struct CourseDocument {
    pub title: String,
    pub description: String,
    /// 二级标题的章节名
    pub sections: Vec<String>,
    pub raw: String,
}

/// 落库协作方
#[async_trait]
pub trait CourseSink: Send + Sync {
    async fn save(&self, session_id: &str, document: &CourseDocument) -> Result<(), StudioError>;
}

/// 仅记录日志的空实现
#[derive(Debug, Default)]
pub struct NoopCourseSink;

#[async_trait]
impl CourseSink for NoopCourseSink {
    async fn save(&self, session_id: &str, document: &CourseDocument) -> Result<(), StudioError> {
        tracing::info!(
            session = session_id,
            title = %document.title,
            sections = document.sections.len(),
            "课程完成（无落库方配置，仅记录）"
        );
        Ok(())
    }
}

/// 兜底启发式：最终回复里包含完成短语
pub fn looks_complete(text: &str) -> bool {
    COMPLETION_PHRASES.iter().any(|p| text.contains(p))
}

/// 从原始 Markdown 提取标题、描述与章节名
pub fn extract_document(raw: &str) -> CourseDocument {
    let mut title = None;
    for line in raw.lines().take(10) {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("# ") {
            title = Some(rest.trim().to_string());
            break;
        }
        if line.len() > 4 && line.starts_with("**") && line.ends_with("**") {
            title = Some(line[2..line.len() - 2].trim().to_string());
            break;
        }
    }
    let title = title
        .unwrap_or_else(|| format!("KI-Kurs erstellt am {}", Utc::now().format("%Y-%m-%d %H:%M")));

    // 标题后的前两行正文作为描述
    let mut description_lines = Vec::new();
    let mut found_title = false;
    for line in raw.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !found_title && (line.starts_with('#') || line.starts_with("**")) {
            found_title = true;
            continue;
        }
        if found_title {
            if line.starts_with('#') || line.starts_with("**") {
                break;
            }
            description_lines.push(line);
            if description_lines.len() == 2 {
                break;
            }
        }
    }
    let description = if description_lines.is_empty() {
        "KI-generierter Kurs".to_string()
    } else {
        let joined = description_lines.join(" ");
        joined.chars().take(500).collect()
    };

    let sections = raw
        .lines()
        .filter_map(|l| l.trim().strip_prefix("## "))
        .map(|s| s.trim().to_string())
        .collect();

    CourseDocument {
        title,
        description,
        sections,
        raw: raw.to_string(),
    }
}
