//! Kursstudio - 多智能体课程生成编排引擎
//!
//! 入口：初始化日志、装配 Studio，并跑一个简单的 stdin 会话循环。

use std::sync::Arc;

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};

use kursstudio::config::load_config;
use kursstudio::events::Notifier;
use kursstudio::hosted::HttpHostedApi;
use kursstudio::llm::OpenAiClient;
use kursstudio::{Collaborators, Studio, TurnOutcome};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    kursstudio::observability::init();

    let config = load_config(None).context("Failed to load config")?;

    let api_key = std::env::var("OPENAI_API_KEY").context("OPENAI_API_KEY not set")?;
    let assistant_id =
        std::env::var("STUDIO_ASSISTANT_ID").unwrap_or_else(|_| "asst_default".to_string());

    let api = Arc::new(HttpHostedApi::new(
        &config.hosted.base_url,
        &api_key,
        &assistant_id,
    ));
    let llm = Arc::new(OpenAiClient::new(
        config.llm.base_url.as_deref(),
        Some(&api_key),
    ));

    let (notifier, mut events) = Notifier::channel();
    let studio = Arc::new(
        Studio::new(
            &config,
            Collaborators {
                api,
                llm,
                store: None,
                knowledge: None,
                sink: None,
                clock: None,
            },
            notifier,
        )
        .context("Failed to assemble studio")?,
    );

    let _sweeper = studio.spawn_sweeper();

    // 事件流打到日志
    tokio::spawn(async move {
        while let Some(envelope) = events.recv().await {
            tracing::info!(session = %envelope.session_id, event = ?envelope.event, "workflow event");
        }
    });

    println!("KI-Kursstudio bereit. Nachricht eingeben (Ctrl-D zum Beenden):");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let session_key = format!("cli_{}", uuid::Uuid::new_v4());

    while let Some(line) = lines.next_line().await? {
        match studio.submit(&session_key, &line).await {
            Ok(TurnOutcome::Reply(text)) => println!("\n{text}\n"),
            Ok(TurnOutcome::Busy) => println!("(Anfrage läuft bereits)"),
            Ok(TurnOutcome::TimedOut(msg)) => println!("\n{msg}\n"),
            Ok(TurnOutcome::Failed { status, detail }) => {
                println!("\nRun fehlgeschlagen ({status}): {detail}\n")
            }
            Err(e) => tracing::error!(error = %e, "turn failed"),
        }
    }

    studio.shutdown(&session_key).await;
    Ok(())
}
