#[cfg(test)]
#[path = "actions_test.rs"]
mod tests;

use std::sync::Arc;

use anyhow::Result;
use tokio::sync::mpsc;

use super::SubmissionController;
use crate::domain::models::Action;
use crate::domain::models::EngineStatus;
use crate::domain::models::Event;

pub fn help_text() -> String {
    let text = r#"
HOTKEYS:
- Enter - Send your question to the engine. Ignored while an answer is pending.
- Up arrow - Scroll up
- Down arrow - Scroll down
- CTRL+U - Page up
- CTRL+D - Page down
- CTRL+C - Exit.

ANSWERS:
Every answer is preceded by the steps the engine reported: how many documents were retrieved for the question, and the result of the hallucination check. Only one question can be asked at a time, and each question is sent without the earlier conversation.
        "#;

    return text.trim().to_string();
}

async fn health_check(
    controller: &SubmissionController,
    tx: &mpsc::UnboundedSender<Event>,
) -> Result<()> {
    let status = match controller.gateway().health_check().await {
        Ok(health) => EngineStatus::Online(health),
        Err(err) => {
            tracing::warn!(error = ?err, "engine health check failed");
            EngineStatus::Offline(err.to_string())
        }
    };

    tx.send(Event::EngineStatusChanged(status))?;

    return Ok(());
}

pub struct ActionsService {}

impl ActionsService {
    pub async fn start(
        controller: Arc<SubmissionController>,
        tx: mpsc::UnboundedSender<Event>,
        rx: &mut mpsc::UnboundedReceiver<Action>,
    ) -> Result<()> {
        while let Some(action) = rx.recv().await {
            match action {
                Action::HealthCheck() => {
                    let worker_controller = controller.clone();
                    let worker_tx = tx.clone();
                    tokio::spawn(async move {
                        return health_check(&worker_controller, &worker_tx).await;
                    });
                }
                Action::Submit(question) => {
                    // Appends happen here so they are visible before the engine
                    // is contacted. Only the wait runs in the background.
                    if let Some(pending) = controller.begin(&question) {
                        tokio::spawn(pending.settle());
                    }
                }
            }
        }

        return Ok(());
    }
}
