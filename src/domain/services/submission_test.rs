use std::sync::atomic::AtomicUsize;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::sync::Mutex;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::oneshot;

use super::SubmissionController;
use crate::domain::models::ControllerState;
use crate::domain::models::EngineAnswer;
use crate::domain::models::EngineHealth;
use crate::domain::models::Gateway;
use crate::domain::models::GatewayError;
use crate::domain::models::Message;
use crate::domain::models::MessageStatus;
use crate::domain::models::ReasoningStep;
use crate::domain::models::Role;
use crate::domain::models::FAILED_ANSWER_TEXT;

fn answer(generation: &str, documents: usize) -> EngineAnswer {
    return EngineAnswer {
        generation: generation.to_string(),
        documents: Some(
            (0..documents)
                .map(|idx| return serde_json::json!(format!("doc-{idx}")))
                .collect(),
        ),
    };
}

/// Replies from a queue of canned outcomes and records every question.
#[derive(Default)]
struct StubGateway {
    replies: Mutex<Vec<Result<EngineAnswer, GatewayError>>>,
    questions: Arc<Mutex<Vec<String>>>,
}

impl StubGateway {
    fn replying(replies: Vec<Result<EngineAnswer, GatewayError>>) -> StubGateway {
        return StubGateway {
            replies: Mutex::new(replies.into_iter().rev().collect()),
            questions: Arc::new(Mutex::new(vec![])),
        };
    }
}

#[async_trait]
impl Gateway for StubGateway {
    async fn health_check(&self) -> Result<EngineHealth> {
        return Ok(EngineHealth::default());
    }

    async fn ask(&self, question: &str) -> Result<EngineAnswer, GatewayError> {
        self.questions.lock().unwrap().push(question.to_string());
        return self
            .replies
            .lock()
            .unwrap()
            .pop()
            .expect("no reply queued for question");
    }
}

/// Holds every request open until the test releases it.
struct GatedGateway {
    release: Mutex<Option<oneshot::Receiver<Result<EngineAnswer, GatewayError>>>>,
}

#[async_trait]
impl Gateway for GatedGateway {
    async fn health_check(&self) -> Result<EngineHealth> {
        return Ok(EngineHealth::default());
    }

    async fn ask(&self, _question: &str) -> Result<EngineAnswer, GatewayError> {
        let rx = self.release.lock().unwrap().take().unwrap();
        return rx.await.unwrap();
    }
}

struct PanickingGateway {}

#[async_trait]
impl Gateway for PanickingGateway {
    async fn health_check(&self) -> Result<EngineHealth> {
        return Ok(EngineHealth::default());
    }

    async fn ask(&self, _question: &str) -> Result<EngineAnswer, GatewayError> {
        panic!("engine exploded");
    }
}

fn controller(gateway: impl Gateway + Send + Sync + 'static) -> Arc<SubmissionController> {
    return Arc::new(SubmissionController::new(Box::new(gateway)));
}

fn server_error() -> GatewayError {
    return GatewayError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR);
}

fn pending_count(messages: &[Message]) -> usize {
    return messages.iter().filter(|m| return m.is_pending()).count();
}

#[tokio::test]
async fn it_resolves_the_answer() {
    let controller = controller(StubGateway::replying(vec![Ok(answer("42", 0))]));

    let id = controller.submit("What is the answer?").await;
    let snapshot = controller.snapshot();

    assert!(id.is_some());
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].role, Role::User);
    assert_eq!(snapshot[0].content, "What is the answer?");
    assert_eq!(snapshot[0].status, MessageStatus::Complete);
    assert_eq!(snapshot[1].id(), id.unwrap());
    assert_eq!(snapshot[1].role, Role::Assistant);
    assert_eq!(snapshot[1].status, MessageStatus::Complete);
    assert_eq!(snapshot[1].content, "42");
    assert_eq!(
        snapshot[1].reasoning,
        vec![
            ReasoningStep::new("Retrieval", "Found 0 documents."),
            ReasoningStep::new("Hallucination Check", "Verified: Grounded in context."),
        ]
    );
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[tokio::test]
async fn it_reports_retrieved_document_count() {
    let controller = controller(StubGateway::replying(vec![Ok(answer("42", 3))]));

    controller.submit("What is the answer?").await;
    let snapshot = controller.snapshot();

    assert_eq!(snapshot[1].content, "42");
    assert_eq!(snapshot[1].reasoning[0].title, "Retrieval");
    assert_eq!(snapshot[1].reasoning[0].content, "Found 3 documents.");
}

#[tokio::test]
async fn it_counts_absent_documents_as_zero() {
    let controller = controller(StubGateway::replying(vec![Ok(EngineAnswer {
        generation: "42".to_string(),
        documents: None,
    })]));

    controller.submit("What is the answer?").await;

    assert_eq!(
        controller.snapshot()[1].reasoning[0].content,
        "Found 0 documents."
    );
}

#[tokio::test]
async fn it_ignores_blank_questions() {
    let controller = controller(StubGateway::default());

    assert!(controller.submit("").await.is_none());
    assert!(controller.submit("   ").await.is_none());
    assert!(controller.submit("\n\t").await.is_none());

    assert!(controller.snapshot().is_empty());
    assert_eq!(controller.state(), ControllerState::Idle);
}

#[tokio::test]
async fn it_trims_the_user_message_but_sends_the_original_question() {
    let gateway = StubGateway::replying(vec![Ok(answer("42", 0))]);
    let questions = gateway.questions.clone();
    let controller = controller(gateway);

    controller.submit("  What is the answer?  ").await;

    assert_eq!(controller.snapshot()[0].content, "What is the answer?");
    assert_eq!(
        *questions.lock().unwrap(),
        vec!["  What is the answer?  ".to_string()]
    );
}

#[tokio::test]
async fn it_stores_question_and_answer_text_unchanged() {
    let gateway = StubGateway::replying(vec![Ok(answer("a\tb", 0))]);
    let questions = gateway.questions.clone();
    let controller = controller(gateway);

    controller.submit("col1\tcol2").await;

    let messages = controller.snapshot();
    assert_eq!(messages[0].content, "col1\tcol2");
    assert_eq!(messages[1].content, "a\tb");
    assert_eq!(*questions.lock().unwrap(), vec!["col1\tcol2".to_string()]);
}

#[test]
fn it_appends_question_and_placeholder_before_the_gateway_resolves() {
    let controller = controller(StubGateway::default());

    let pending = controller.begin("What is the answer?").unwrap();
    let snapshot = controller.snapshot();

    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].role, Role::User);
    assert_eq!(snapshot[1].role, Role::Assistant);
    assert_eq!(snapshot[1].id(), pending.assistant_id());
    assert!(snapshot[1].is_pending());
    assert!(snapshot[1].content.is_empty());
    assert!(snapshot[1].reasoning.is_empty());
    assert_eq!(pending.query(), "What is the answer?");
    assert_eq!(controller.state(), ControllerState::InFlight);
}

#[test]
fn it_ignores_questions_while_in_flight() {
    let controller = controller(StubGateway::default());

    let _pending = controller.begin("What is the answer?").unwrap();

    assert!(controller.begin("Another question").is_none());
    assert_eq!(controller.snapshot().len(), 2);
    assert_eq!(pending_count(&controller.snapshot()), 1);
    assert_eq!(controller.state(), ControllerState::InFlight);
}

#[tokio::test]
async fn it_marks_failures_and_recovers() {
    let controller = controller(StubGateway::replying(vec![
        Err(server_error()),
        Ok(answer("42", 1)),
    ]));

    controller.submit("What is the answer?").await;
    let snapshot = controller.snapshot();

    assert_eq!(snapshot[1].status, MessageStatus::Failed);
    assert_eq!(snapshot[1].content, FAILED_ANSWER_TEXT);
    assert!(snapshot[1].reasoning.is_empty());
    assert_eq!(controller.state(), ControllerState::Idle);

    controller.submit("Try again").await;
    let snapshot = controller.snapshot();

    assert_eq!(snapshot.len(), 4);
    assert_eq!(snapshot[1].status, MessageStatus::Failed);
    assert_eq!(snapshot[3].status, MessageStatus::Complete);
    assert_eq!(snapshot[3].content, "42");
}

#[tokio::test]
async fn it_treats_decode_errors_like_any_other_failure() {
    let decode_err = serde_json::from_str::<EngineAnswer>("{}").unwrap_err();
    let controller = controller(StubGateway::replying(vec![Err(decode_err.into())]));

    controller.submit("What is the answer?").await;

    assert_eq!(controller.snapshot()[1].content, FAILED_ANSWER_TEXT);
}

#[tokio::test]
async fn it_settles_failures_exactly_once() {
    let controller = controller(StubGateway::replying(vec![Err(server_error())]));
    let mut transcript_rx = controller.subscribe_transcript();
    let mut state_rx = controller.subscribe_state();
    let transitions = Arc::new(AtomicUsize::new(0));

    let watcher_transitions = transitions.clone();
    let watcher = tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            if *state_rx.borrow() == ControllerState::Idle {
                watcher_transitions.fetch_add(1, Ordering::SeqCst);
            }
        }
    });

    controller.submit("What is the answer?").await;

    // Two appends and a single update.
    let mut updates = vec![];
    while let Ok(snapshot) = transcript_rx.try_recv() {
        updates.push(snapshot);
    }
    assert_eq!(updates.len(), 3);
    assert!(updates[2][1].is_failed());

    drop(controller);
    watcher.await.unwrap();
    assert_eq!(transitions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn it_never_exposes_more_than_one_pending_answer() {
    let controller = controller(StubGateway::replying(vec![
        Ok(answer("1", 0)),
        Err(server_error()),
        Ok(answer("3", 2)),
    ]));
    let mut rx = controller.subscribe_transcript();

    controller.submit("one").await;
    controller.submit("two").await;
    controller.submit("three").await;

    let mut seen = 0;
    while let Ok(snapshot) = rx.try_recv() {
        assert!(pending_count(&snapshot) <= 1);
        seen += 1;
    }
    assert_eq!(seen, 9);
    assert_eq!(pending_count(&controller.snapshot()), 0);
}

#[tokio::test]
async fn it_rejects_overlapping_submissions() -> Result<()> {
    let (release_tx, release_rx) = oneshot::channel();
    let controller = controller(GatedGateway {
        release: Mutex::new(Some(release_rx)),
    });

    let pending = controller.begin("What is the answer?").unwrap();
    let worker = tokio::spawn(pending.settle());

    assert!(controller.submit("Second question").await.is_none());
    assert_eq!(controller.snapshot().len(), 2);
    assert_eq!(controller.state(), ControllerState::InFlight);

    release_tx.send(Ok(answer("42", 0))).unwrap();
    worker.await?;

    assert_eq!(controller.state(), ControllerState::Idle);
    assert_eq!(controller.snapshot()[1].content, "42");

    return Ok(());
}

#[tokio::test]
async fn it_releases_the_slot_when_the_gateway_panics() -> Result<()> {
    let controller = controller(PanickingGateway {});

    let worker_controller = controller.clone();
    let res = tokio::spawn(async move {
        return worker_controller.submit("What is the answer?").await;
    })
    .await;

    assert!(res.is_err());
    let snapshot = controller.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert!(snapshot[1].is_failed());
    assert_eq!(snapshot[1].content, FAILED_ANSWER_TEXT);
    assert_eq!(controller.state(), ControllerState::Idle);

    return Ok(());
}

#[test]
fn it_fails_answers_that_are_dropped_before_settling() {
    let controller = controller(StubGateway::default());

    let pending = controller.begin("What is the answer?").unwrap();
    drop(pending);

    let snapshot = controller.snapshot();
    assert!(snapshot[1].is_failed());
    assert_eq!(controller.state(), ControllerState::Idle);
    assert!(controller.begin("Next question").is_some());
}

#[test]
fn it_keeps_separate_guards_per_controller() {
    let first = controller(StubGateway::default());
    let second = controller(StubGateway::default());

    let _pending = first.begin("What is the answer?").unwrap();

    assert!(second.begin("What is the answer?").is_some());
}
