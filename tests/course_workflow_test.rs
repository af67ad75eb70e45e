//! 端到端工作流测试：脚本化托管服务 + Mock LLM，无网络

use std::sync::Arc;

use kursstudio::config::AppConfig;
use kursstudio::events::{EventEnvelope, Notifier, StudioEvent};
use kursstudio::hosted::mock::{requires_action, run, ScriptedHostedApi};
use kursstudio::hosted::RunStatus;
use kursstudio::llm::MockLlmClient;
use kursstudio::quality::QualityScorer;
use kursstudio::{Collaborators, Studio, TurnOutcome};
use tokio::sync::mpsc::UnboundedReceiver;

fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    // 测试里不等真实时间
    config.hosted.poll_interval_ms = 0;
    config.hosted.transient_backoff_ms = 0;
    config
}

fn studio_with(
    api: Arc<ScriptedHostedApi>,
    llm: MockLlmClient,
) -> (Arc<Studio>, UnboundedReceiver<EventEnvelope>) {
    let (notifier, rx) = Notifier::channel();
    let studio = Studio::new(
        &test_config(),
        Collaborators {
            api,
            llm: Arc::new(llm),
            store: None,
            knowledge: None,
            sink: None,
            clock: None,
        },
        notifier,
    )
    .unwrap();
    (Arc::new(studio), rx)
}

fn drain_tool_starts(rx: &mut UnboundedReceiver<EventEnvelope>) -> Vec<String> {
    let mut names = Vec::new();
    while let Ok(envelope) = rx.try_recv() {
        if let StudioEvent::ToolCallStart { function, .. } = envelope.event {
            names.push(function);
        }
    }
    names
}

#[tokio::test]
async fn test_greeting_replies_directly_without_tool_dispatch() {
    let api = Arc::new(ScriptedHostedApi::new());
    api.push_snapshot(run("run_1", RunStatus::Completed));
    api.push_assistant_message("Hallo! Wie kann ich Ihnen helfen?");

    let (studio, mut rx) = studio_with(api.clone(), MockLlmClient::new());
    let outcome = studio.submit("user_a", "Hallo").await.unwrap();

    match outcome {
        TurnOutcome::Reply(text) => assert_eq!(text, "Hallo! Wie kann ich Ihnen helfen?"),
        other => panic!("expected reply, got {other:?}"),
    }
    assert!(drain_tool_starts(&mut rx).is_empty());
    assert!(api.submitted_outputs().is_empty());
}

#[tokio::test]
async fn test_course_request_dispatches_workflow_in_order() {
    let api = Arc::new(ScriptedHostedApi::new());
    let outline_args = serde_json::json!({"topic": "X", "content_type": "outline"});
    let full_args = serde_json::json!({"topic": "X", "content_type": "full"});

    api.push_snapshot(requires_action("run_1", vec![("c1", "content-draft", outline_args)]));
    api.push_snapshot(requires_action(
        "run_1",
        vec![("c2", "quality-review", serde_json::json!({"content": "Outline", "review_type": "outline"}))],
    ));
    api.push_snapshot(requires_action(
        "run_1",
        vec![("c3", "request-outline-approval", serde_json::json!({"outline": "Outline", "topic": "X"}))],
    ));
    api.push_snapshot(requires_action("run_1", vec![("c4", "content-draft", full_args)]));
    api.push_snapshot(requires_action(
        "run_1",
        vec![("c5", "didactic-optimize", serde_json::json!({"content": "Volltext"}))],
    ));
    api.push_snapshot(requires_action(
        "run_1",
        vec![("c6", "quality-review", serde_json::json!({"content": "Volltext", "review_type": "full"}))],
    ));
    api.push_snapshot(run("run_1", RunStatus::Completed));
    api.push_assistant_message("Hier ist Ihr Kursentwurf.");

    let llm = MockLlmClient::with_responses([
        "## Outline",
        "Outline geprüft",
        "## Volltext",
        "## Volltext optimiert",
        "Volltext geprüft",
    ]);
    let (studio, mut rx) = studio_with(api.clone(), llm);

    let outcome = studio
        .submit("user_b", "Erstelle einen Kurs über X")
        .await
        .unwrap();
    assert!(matches!(outcome, TurnOutcome::Reply(_)));

    assert_eq!(
        drain_tool_starts(&mut rx),
        vec![
            "content-draft",
            "quality-review",
            "request-outline-approval",
            "content-draft",
            "didactic-optimize",
            "quality-review",
        ]
    );
    // 六批输出，每批一个
    assert_eq!(api.submitted_outputs().len(), 6);
    assert!(api.submitted_outputs().iter().all(|batch| batch.len() == 1));
}

#[tokio::test]
async fn test_concurrent_submits_only_one_proceeds() {
    let api = Arc::new(ScriptedHostedApi::new());
    // 第一轮要经过几次轮询，保证第二个 submit 在处理期间到达
    for _ in 0..3 {
        api.push_snapshot(run("run_1", RunStatus::InProgress));
    }
    api.push_snapshot(run("run_1", RunStatus::Completed));
    api.push_assistant_message("Erledigt.");

    let (notifier, _rx) = Notifier::channel();
    let mut config = test_config();
    config.hosted.poll_interval_ms = 10;
    let studio = Arc::new(
        Studio::new(
            &config,
            Collaborators {
                api: api.clone(),
                llm: Arc::new(MockLlmClient::new()),
                store: None,
                knowledge: None,
                sink: None,
                clock: None,
            },
            notifier,
        )
        .unwrap(),
    );

    let background = Arc::clone(&studio);
    let first = tokio::spawn(async move { background.submit("user_c", "Erstelle einen Kurs").await });

    // 等第一轮真正开始处理（run 已创建、正在轮询间隔里挂起）
    while api.runs_created() == 0 {
        tokio::task::yield_now().await;
    }

    let second = studio.submit("user_c", "Und noch einer").await.unwrap();
    assert!(matches!(second, TurnOutcome::Busy));

    let first = first.await.unwrap().unwrap();
    assert!(matches!(first, TurnOutcome::Reply(_)));
}

#[tokio::test]
async fn test_stuck_run_is_recovered_exactly_once() {
    let api = Arc::new(ScriptedHostedApi::new());
    // create_run 返回 queued；脚本耗尽后一直重复 queued → 卡死
    api.push_snapshot(run("run_stuck", RunStatus::Queued));

    let (studio, mut rx) = studio_with(api.clone(), MockLlmClient::new());
    let outcome = studio.submit("user_d", "Erstelle einen Kurs").await.unwrap();

    // 恢复一次后新 run 仍卡死 → 默认 graceful 策略收尾
    assert!(matches!(outcome, TurnOutcome::TimedOut(_)));
    assert_eq!(api.runs_created(), 2);
    // 一次恢复取消 + 一次超时取消
    assert_eq!(api.cancel_count(), 2);

    let recoveries = {
        let mut n = 0;
        while let Ok(envelope) = rx.try_recv() {
            if matches!(envelope.event, StudioEvent::Recovery { .. }) {
                n += 1;
            }
        }
        n
    };
    assert_eq!(recoveries, 1);
}

#[tokio::test]
async fn test_failed_run_reports_diagnostics_and_session_stays_usable() {
    let api = Arc::new(ScriptedHostedApi::new());
    let mut failed = run("run_f", RunStatus::Failed);
    failed.last_error = Some(kursstudio::hosted::LastError {
        code: "rate_limit_exceeded".to_string(),
        message: "Too many requests".to_string(),
    });
    api.push_snapshot(failed);
    // 第二轮正常完成
    api.push_snapshot(run("run_g", RunStatus::Completed));
    api.push_assistant_message("Zweiter Versuch klappt.");

    let (studio, _rx) = studio_with(api, MockLlmClient::new());

    match studio.submit("user_e", "Erstelle einen Kurs").await.unwrap() {
        TurnOutcome::Failed { status, detail } => {
            assert_eq!(status, "failed");
            assert!(detail.contains("rate_limit_exceeded"));
        }
        other => panic!("expected failure, got {other:?}"),
    }

    match studio.submit("user_e", "Nochmal bitte").await.unwrap() {
        TurnOutcome::Reply(text) => assert_eq!(text, "Zweiter Versuch klappt."),
        other => panic!("expected reply, got {other:?}"),
    }
}

#[tokio::test]
async fn test_final_approval_persists_explicit_candidate() {
    let api = Arc::new(ScriptedHostedApi::new());
    let course = "# Rust für Einsteiger\n\nEin kompakter Kurs.\n\n## Grundlagen\nText.";
    api.push_snapshot(requires_action(
        "run_1",
        vec![(
            "c1",
            "request-user-feedback",
            serde_json::json!({"content": course, "question": "Zufrieden?", "stage": "final"}),
        )],
    ));
    api.push_snapshot(run("run_1", RunStatus::Completed));
    api.push_assistant_message("Bitte bestätigen Sie die Freigabe.");
    // 第二轮：用户确认，模型报告完成
    api.push_snapshot(run("run_2", RunStatus::Completed));
    api.push_assistant_message("Kurs wurde erfolgreich erstellt!");

    let (studio, mut rx) = studio_with(api, MockLlmClient::new());

    studio.submit("user_f", "Erstelle einen Kurs über Rust").await.unwrap();
    studio.submit("user_f", "Ja, freigeben!").await.unwrap();

    let mut saved_status = None;
    while let Ok(envelope) = rx.try_recv() {
        if let StudioEvent::Status { text } = &envelope.event {
            if text.contains("Kurs gespeichert") {
                saved_status = Some(text.clone());
            }
        }
    }
    let saved = saved_status.expect("course should be handed off to the sink");
    assert!(saved.contains("Rust für Einsteiger"));
}

#[tokio::test]
async fn test_empty_input_short_circuits() {
    let api = Arc::new(ScriptedHostedApi::new());
    let (studio, _rx) = studio_with(api.clone(), MockLlmClient::new());

    match studio.submit("user_g", "   ").await.unwrap() {
        TurnOutcome::Reply(text) => assert!(text.contains("Nachricht")),
        other => panic!("expected reply, got {other:?}"),
    }
    assert_eq!(api.runs_created(), 0);
}

#[tokio::test]
async fn test_poor_text_fails_quality_gate_with_objective_recommendation() {
    // 场景 C：短小、无标题、无学习目标的文本低于阈值
    let poor = "Dies ist ein Text. Er hat keine Struktur und keine Ziele. Er ist einfach nur da und redet über nichts Bestimmtes.";
    let report = QualityScorer::default().assess(poor);

    assert!(report.overall_score < report.threshold);
    assert!(!report.passed);
    assert!(report
        .structure
        .recommendations
        .iter()
        .any(|r| r.contains("Lernziele")));
}
