//! 工具分发表：固定的六个抽象工具名与其参数类型
//!
//! 路由用带标签的枚举而非字符串分支；启动时校验公布的 schema 与枚举一一对应，
//! 新增工具 = 一个枚举成员 + 一个 handler。

pub mod dispatcher;

use serde::Deserialize;
use serde_json::{json, Value};

pub use dispatcher::{BatchResult, DispatchEffects, ToolDispatcher};

/// 六个固定工具
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    ContentDraft,
    DidacticOptimize,
    QualityReview,
    RequestOutlineApproval,
    RequestUserFeedback,
    KnowledgeLookup,
}

impl ToolName {
    pub const ALL: [ToolName; 6] = [
        ToolName::ContentDraft,
        ToolName::DidacticOptimize,
        ToolName::QualityReview,
        ToolName::RequestOutlineApproval,
        ToolName::RequestUserFeedback,
        ToolName::KnowledgeLookup,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ContentDraft => "content-draft",
            ToolName::DidacticOptimize => "didactic-optimize",
            ToolName::QualityReview => "quality-review",
            ToolName::RequestOutlineApproval => "request-outline-approval",
            ToolName::RequestUserFeedback => "request-user-feedback",
            ToolName::KnowledgeLookup => "knowledge-lookup",
        }
    }

    pub fn parse(name: &str) -> Option<ToolName> {
        ToolName::ALL.iter().copied().find(|t| t.as_str() == name)
    }
}

/// content-draft 的两个阶段
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Outline,
    Full,
}

impl ContentType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ContentType::Outline => "outline",
            ContentType::Full => "full",
        }
    }
}

/// quality-review 的两个模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewType {
    Outline,
    Full,
}

impl ReviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReviewType::Outline => "outline",
            ReviewType::Full => "full",
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ContentDraftArgs {
    pub topic: String,
    #[serde(default)]
    pub instructions: String,
    pub content_type: ContentType,
}

#[derive(Debug, Deserialize)]
pub struct DidacticOptimizeArgs {
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct QualityReviewArgs {
    pub content: String,
    pub review_type: ReviewType,
    #[serde(default)]
    pub feedback: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct OutlineApprovalArgs {
    pub outline: String,
    #[serde(default)]
    pub feedback: String,
    pub topic: String,
}

#[derive(Debug, Deserialize)]
pub struct UserFeedbackArgs {
    pub content: String,
    pub question: String,
    pub stage: String,
}

#[derive(Debug, Deserialize)]
pub struct KnowledgeLookupArgs {
    pub query: String,
    #[serde(default)]
    pub context: String,
}

fn function_schema(name: ToolName, description: &str, parameters: Value) -> Value {
    json!({
        "type": "function",
        "function": {
            "name": name.as_str(),
            "description": description,
            "parameters": parameters,
        }
    })
}

/// 向托管服务公布的完整工具 schema
pub fn advertised_tools() -> Vec<Value> {
    vec![
        function_schema(
            ToolName::ContentDraft,
            "Erstellt einen Kursentwurf (Outline oder Volltext) über den Content Creator",
            json!({
                "type": "object",
                "properties": {
                    "topic": {"type": "string", "description": "Kursthema"},
                    "instructions": {"type": "string", "description": "Zusätzliche Anweisungen"},
                    "content_type": {"type": "string", "enum": ["outline", "full"]}
                },
                "required": ["topic", "content_type"]
            }),
        ),
        function_schema(
            ToolName::DidacticOptimize,
            "Reichert einen Kursentwurf didaktisch an (Lernziele, Beispiele, Zusammenfassungen)",
            json!({
                "type": "object",
                "properties": {
                    "content": {"type": "string", "description": "Der zu optimierende Kursinhalt"}
                },
                "required": ["content"]
            }),
        ),
        function_schema(
            ToolName::QualityReview,
            "Prüft Kursinhalt über den Quality Checker und hängt den maschinellen Quality Score an",
            json!({
                "type": "object",
                "properties": {
                    "content": {"type": "string"},
                    "review_type": {"type": "string", "enum": ["outline", "full"]},
                    "feedback": {"type": "string", "description": "Optionales Korrektur-Feedback"}
                },
                "required": ["content", "review_type"]
            }),
        ),
        function_schema(
            ToolName::RequestOutlineApproval,
            "Zeigt dem Nutzer das geprüfte Inhaltsverzeichnis und wartet auf Freigabe",
            json!({
                "type": "object",
                "properties": {
                    "outline": {"type": "string"},
                    "feedback": {"type": "string", "description": "Feedback vom Quality Checker"},
                    "topic": {"type": "string"}
                },
                "required": ["outline", "topic"]
            }),
        ),
        function_schema(
            ToolName::RequestUserFeedback,
            "Bittet den Nutzer um Feedback oder finale Freigabe",
            json!({
                "type": "object",
                "properties": {
                    "content": {"type": "string"},
                    "question": {"type": "string"},
                    "stage": {"type": "string", "description": "Workflow-Stadium, z.B. 'final'"}
                },
                "required": ["content", "question", "stage"]
            }),
        ),
        function_schema(
            ToolName::KnowledgeLookup,
            "Durchsucht die projektspezifische Wissensbasis",
            json!({
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "context": {"type": "string"}
                },
                "required": ["query"]
            }),
        ),
    ]
}

/// 启动时校验：公布的 schema 与分发枚举一一对应
pub fn validate_dispatch_table() -> Result<(), String> {
    let tools = advertised_tools();
    if tools.len() != ToolName::ALL.len() {
        return Err(format!(
            "advertised {} tools but dispatch table has {}",
            tools.len(),
            ToolName::ALL.len()
        ));
    }
    for tool in &tools {
        let name = tool["function"]["name"]
            .as_str()
            .ok_or_else(|| "tool schema without function.name".to_string())?;
        if ToolName::parse(name).is_none() {
            return Err(format!("advertised tool '{name}' has no dispatch entry"));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_matches_dispatch_table() {
        validate_dispatch_table().unwrap();
    }

    #[test]
    fn test_parse_roundtrip() {
        for tool in ToolName::ALL {
            assert_eq!(ToolName::parse(tool.as_str()), Some(tool));
        }
        assert_eq!(ToolName::parse("create_content"), None);
    }

    #[test]
    fn test_args_deserialize_with_defaults() {
        let args: ContentDraftArgs =
            serde_json::from_str(r#"{"topic":"Rust","content_type":"outline"}"#).unwrap();
        assert_eq!(args.content_type, ContentType::Outline);
        assert!(args.instructions.is_empty());

        let args: QualityReviewArgs =
            serde_json::from_str(r#"{"content":"Text","review_type":"full"}"#).unwrap();
        assert_eq!(args.review_type, ReviewType::Full);
        assert!(args.feedback.is_none());
    }
}
