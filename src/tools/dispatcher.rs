//! 工具执行器：把 run 发出的工具调用翻译成具体动作和有界字符串结果
//!
//! 约定：严格顺序执行；单个调用出错只影响它自己的输出，整批照常回传；
//! 未知工具名返回带标签的错误串而非 panic。

use std::sync::Arc;

use crate::agents::prompts;
use crate::agents::{AgentRole, SubAgentInvoker};
use crate::events::{preview, Notifier, StudioEvent};
use crate::hosted::{PendingToolCall, ToolOutput};
use crate::knowledge::KnowledgeBase;
use crate::quality::QualityScorer;
use crate::tools::{
    ContentDraftArgs, DidacticOptimizeArgs, KnowledgeLookupArgs, OutlineApprovalArgs,
    QualityReviewArgs, ToolName, UserFeedbackArgs,
};

const TRUNCATION_SUFFIX: &str = "... [Inhalt gekürzt für Tool-Output]";

/// 一批工具调用执行后对会话状态的影响
#[derive(Debug, Default)]
pub struct DispatchEffects {
    /// (阶段名, 内容快照)
    pub stages: Vec<(String, String)>,
    /// request-user-feedback 显式标记了 final 阶段
    pub finalize_requested: bool,
    /// 最后一次明确标记为 final 的内容
    pub final_candidate: Option<String>,
    /// 本批包含等待用户决策的工具
    pub awaiting_user: bool,
}

/// 一批调用的输出与副作用
#[derive(Debug)]
pub struct BatchResult {
    pub outputs: Vec<ToolOutput>,
    pub effects: DispatchEffects,
}

pub struct ToolDispatcher {
    invoker: Arc<SubAgentInvoker>,
    scorer: QualityScorer,
    knowledge: Arc<dyn KnowledgeBase>,
    notifier: Notifier,
    max_output_chars: usize,
    preview_chars: usize,
}

impl ToolDispatcher {
    pub fn new(
        invoker: Arc<SubAgentInvoker>,
        scorer: QualityScorer,
        knowledge: Arc<dyn KnowledgeBase>,
        notifier: Notifier,
        max_output_chars: usize,
        preview_chars: usize,
    ) -> Self {
        Self {
            invoker,
            scorer,
            knowledge,
            notifier,
            max_output_chars,
            preview_chars,
        }
    }

    /// 顺序执行一批调用；每个调用都产生一个输出，永不中断整批
    pub async fn dispatch_batch(
        &self,
        session_id: &str,
        calls: &[PendingToolCall],
    ) -> BatchResult {
        let mut outputs = Vec::with_capacity(calls.len());
        let mut effects = DispatchEffects::default();

        for call in calls {
            let arguments: serde_json::Value = serde_json::from_str(&call.arguments)
                .unwrap_or_else(|_| serde_json::Value::String(call.arguments.clone()));
            self.notifier.emit(
                session_id,
                StudioEvent::ToolCallStart {
                    function: call.name.clone(),
                    arguments,
                },
            );

            let result = self.dispatch_one(session_id, call, &mut effects).await;

            let output = match result {
                Ok(text) => {
                    self.notifier.emit(
                        session_id,
                        StudioEvent::ToolCallResult {
                            function: call.name.clone(),
                            preview: preview(&text, self.preview_chars),
                        },
                    );
                    text
                }
                Err(error_msg) => {
                    self.notifier.emit(
                        session_id,
                        StudioEvent::ToolCallError {
                            function: call.name.clone(),
                            error: error_msg.clone(),
                        },
                    );
                    error_msg
                }
            };

            outputs.push(ToolOutput {
                tool_call_id: call.id.clone(),
                output: self.cap(&output),
            });
        }

        BatchResult { outputs, effects }
    }

    /// 单个调用；Err 里是将作为工具输出回传的错误串
    async fn dispatch_one(
        &self,
        session_id: &str,
        call: &PendingToolCall,
        effects: &mut DispatchEffects,
    ) -> Result<String, String> {
        let Some(tool) = ToolName::parse(&call.name) else {
            return Err(format!("Unbekannte Tool-Funktion: {}", call.name));
        };

        match tool {
            ToolName::ContentDraft => {
                let args: ContentDraftArgs = self.parse_args(tool, &call.arguments)?;
                self.notifier.status(
                    session_id,
                    format!("✍️ Erstelle {} für '{}'...", args.content_type.as_str(), args.topic),
                );
                let prompt =
                    prompts::content_prompt(&args.topic, &args.instructions, args.content_type);
                let text = self
                    .invoker
                    .invoke(session_id, AgentRole::ContentCreator, prompt)
                    .await;
                self.record_stage(session_id, effects, args.content_type.as_str(), &text);
                Ok(text)
            }
            ToolName::DidacticOptimize => {
                let args: DidacticOptimizeArgs = self.parse_args(tool, &call.arguments)?;
                let prompt = prompts::didactic_prompt(&args.content);
                let text = self
                    .invoker
                    .invoke(session_id, AgentRole::DidacticExpert, prompt)
                    .await;
                self.record_stage(session_id, effects, "optimized", &text);
                Ok(text)
            }
            ToolName::QualityReview => {
                let args: QualityReviewArgs = self.parse_args(tool, &call.arguments)?;
                self.notifier.status(
                    session_id,
                    format!("🔍 Qualitätsprüfung ({})...", args.review_type.as_str()),
                );
                let prompt = prompts::quality_prompt(&args.content, args.feedback.as_deref());
                let review = self
                    .invoker
                    .invoke(session_id, AgentRole::QualityChecker, prompt)
                    .await;

                let report = self.scorer.assess(&review);
                self.notifier.emit(
                    session_id,
                    StudioEvent::QualityGate {
                        score: report.overall_score,
                        threshold: report.threshold,
                        passed: report.passed,
                    },
                );
                Ok(format!(
                    "{review}\n\n📊 Quality Score: {:.1}/100 ({})",
                    report.overall_score,
                    if report.passed { "bestanden" } else { "unter Schwellwert" }
                ))
            }
            ToolName::RequestOutlineApproval => {
                let args: OutlineApprovalArgs = self.parse_args(tool, &call.arguments)?;
                let prompt = format!(
                    "## 🤔 Ihre Freigabe ist gefragt!\n\n\
                     **Thema:** {}\n\
                     **Inhaltsverzeichnis:**\n{}\n\n\
                     **Feedback vom Quality Checker:**\n{}\n\n\
                     Bitte geben Sie Ihre Freigabe oder schlagen Sie Änderungen vor.",
                    args.topic, args.outline, args.feedback
                );
                self.notifier.emit(
                    session_id,
                    StudioEvent::ApprovalRequest {
                        stage: "outline_approval".to_string(),
                        prompt,
                    },
                );
                effects.awaiting_user = true;
                self.record_stage(session_id, effects, "outline", &args.outline);
                Ok("Warte auf User-Freigabe im Chat...".to_string())
            }
            ToolName::RequestUserFeedback => {
                let args: UserFeedbackArgs = self.parse_args(tool, &call.arguments)?;
                let prompt = format!(
                    "## 🤔 Ihr Feedback ist gefragt!\n\n\
                     **Stadium:** {}\n\
                     **Frage:** {}\n\n{}\n\n\
                     Bitte geben Sie Ihr Feedback oder bestätigen Sie die Freigabe.",
                    args.stage,
                    args.question,
                    preview(&args.content, 500)
                );
                self.notifier.emit(
                    session_id,
                    StudioEvent::ApprovalRequest {
                        stage: args.stage.clone(),
                        prompt,
                    },
                );
                effects.awaiting_user = true;
                if args.stage.to_lowercase().contains("final") {
                    effects.finalize_requested = true;
                    effects.final_candidate = Some(args.content.clone());
                }
                self.record_stage(session_id, effects, &args.stage, &args.content);
                Ok("Warte auf User-Feedback im Chat...".to_string())
            }
            ToolName::KnowledgeLookup => {
                let args: KnowledgeLookupArgs = self.parse_args(tool, &call.arguments)?;
                self.notifier.status(
                    session_id,
                    format!("📚 Durchsuche Wissensbasis nach: '{}'...", args.query),
                );
                match self.knowledge.query(&args.query, &args.context).await {
                    Ok(Some(text)) => Ok(text),
                    Ok(None) => Ok(format!(
                        "Keine Ergebnisse in der Wissensbasis für '{}' gefunden.",
                        args.query
                    )),
                    Err(e) => {
                        tracing::warn!(error = %e, "知识库查询失败，降级为占位提示");
                        Ok(format!(
                            "Die Wissensbasis für '{}' ist momentan nicht verfügbar. \
                             Ich erstelle den Inhalt basierend auf allgemeinem Wissen.",
                            args.query
                        ))
                    }
                }
            }
        }
    }

    fn parse_args<T: serde::de::DeserializeOwned>(
        &self,
        tool: ToolName,
        raw: &str,
    ) -> Result<T, String> {
        serde_json::from_str(raw)
            .map_err(|e| format!("Tool-Fehler in {}: ungültige Argumente: {e}", tool.as_str()))
    }

    fn record_stage(
        &self,
        session_id: &str,
        effects: &mut DispatchEffects,
        stage: &str,
        content: &str,
    ) {
        self.notifier.emit(
            session_id,
            StudioEvent::CourseContentUpdate {
                stage: stage.to_string(),
                preview: preview(content, self.preview_chars),
            },
        );
        effects.stages.push((stage.to_string(), content.to_string()));
    }

    fn cap(&self, output: &str) -> String {
        if output.chars().count() <= self.max_output_chars {
            return output.to_string();
        }
        let truncated: String = output.chars().take(self.max_output_chars).collect();
        format!("{truncated}{TRUNCATION_SUFFIX}")
    }
}
