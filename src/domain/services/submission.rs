#[cfg(test)]
#[path = "submission_test.rs"]
mod tests;

use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use tokio::sync::mpsc;
use tokio::sync::watch;

use super::reasoning::derive_reasoning;
use super::TranscriptStore;
use crate::domain::models::ControllerState;
use crate::domain::models::GatewayBox;
use crate::domain::models::Message;
use crate::domain::models::MessageId;
use crate::domain::models::MessagePatch;

/// Drives one question at a time through the transcript: the question and a
/// pending answer are appended up front, and the answer is resolved once the
/// gateway settles. One controller exists per conversation.
pub struct SubmissionController {
    gateway: GatewayBox,
    state: watch::Sender<ControllerState>,
    transcript: Mutex<TranscriptStore>,
}

/// Owned handle for the request currently in flight. Holding it keeps the
/// controller in `InFlight`. It is consumed by `settle`; if it is dropped
/// before that (panic, aborted task) the pending answer is marked failed and
/// the controller goes back to `Idle`.
pub struct PendingSubmission {
    controller: Arc<SubmissionController>,
    assistant_id: MessageId,
    query: String,
    settled: bool,
}

impl SubmissionController {
    pub fn new(gateway: GatewayBox) -> SubmissionController {
        let (state, _) = watch::channel(ControllerState::Idle);

        return SubmissionController {
            gateway,
            state,
            transcript: Mutex::new(TranscriptStore::default()),
        };
    }

    pub fn gateway(&self) -> &GatewayBox {
        return &self.gateway;
    }

    pub fn state(&self) -> ControllerState {
        return *self.state.borrow();
    }

    pub fn subscribe_state(&self) -> watch::Receiver<ControllerState> {
        return self.state.subscribe();
    }

    pub fn subscribe_transcript(&self) -> mpsc::UnboundedReceiver<Vec<Message>> {
        return self.transcript().subscribe();
    }

    pub fn snapshot(&self) -> Vec<Message> {
        return self.transcript().snapshot();
    }

    /// Runs a full question and answer cycle. Returns the id of the answer
    /// message, or `None` when the question was blank or another one is still
    /// in flight.
    pub async fn submit(self: &Arc<Self>, question: &str) -> Option<MessageId> {
        let pending = self.begin(question)?;
        let id = pending.assistant_id();
        pending.settle().await;

        return Some(id);
    }

    /// Appends the question and a pending answer, then claims the in-flight
    /// slot. Nothing is touched when the question is blank or the slot is
    /// taken.
    pub fn begin(self: &Arc<Self>, question: &str) -> Option<PendingSubmission> {
        let trimmed = question.trim();
        if trimmed.is_empty() {
            tracing::debug!("ignoring blank question");
            return None;
        }

        // The claim and the appends happen under the transcript lock so two
        // callers can't both see `Idle`. `InFlight` is published to state
        // watchers before the two messages are appended.
        let mut transcript = self.transcript();
        let claimed = self.state.send_if_modified(|state| {
            if !state.accepts_submissions() {
                return false;
            }
            *state = ControllerState::InFlight;
            return true;
        });

        if !claimed {
            tracing::debug!("ignoring question while another is in flight");
            return None;
        }

        transcript.append(Message::user(trimmed));
        let assistant_id = transcript.append(Message::pending_assistant());
        tracing::debug!(id = %assistant_id, "question submitted");

        return Some(PendingSubmission {
            controller: Arc::clone(self),
            assistant_id,
            query: question.to_string(),
            settled: false,
        });
    }

    fn transcript(&self) -> MutexGuard<'_, TranscriptStore> {
        return self
            .transcript
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
    }
}

impl PendingSubmission {
    pub fn assistant_id(&self) -> MessageId {
        return self.assistant_id;
    }

    pub fn query(&self) -> &str {
        return &self.query;
    }

    /// Waits for the gateway and writes the outcome into the pending answer.
    pub async fn settle(mut self) {
        let res = self.controller.gateway.ask(&self.query).await;

        let patch = match res {
            Ok(answer) => {
                tracing::debug!(
                    id = %self.assistant_id,
                    documents = answer.document_count(),
                    "question answered"
                );
                MessagePatch::complete(&answer.generation, derive_reasoning(&answer))
            }
            Err(err) => {
                tracing::error!(id = %self.assistant_id, error = %err, "question failed");
                MessagePatch::failed()
            }
        };

        self.controller
            .transcript()
            .update_by_id(self.assistant_id, patch);
        self.settled = true;
    }
}

impl Drop for PendingSubmission {
    fn drop(&mut self) {
        if !self.settled {
            tracing::warn!(id = %self.assistant_id, "question dropped before it settled");
            self.controller
                .transcript()
                .update_by_id(self.assistant_id, MessagePatch::failed());
        }

        self.controller.state.send_replace(ControllerState::Idle);
    }
}
