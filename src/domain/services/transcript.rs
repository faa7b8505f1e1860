#[cfg(test)]
#[path = "transcript_test.rs"]
mod tests;

use tokio::sync::mpsc;

use crate::domain::models::Message;
use crate::domain::models::MessageId;
use crate::domain::models::MessagePatch;

/// Ordered conversation log. Messages can be appended and patched in place,
/// never removed or reordered. Every mutation pushes a fresh snapshot to all
/// subscribers.
#[derive(Default)]
pub struct TranscriptStore {
    last_id: MessageId,
    messages: Vec<Message>,
    subscribers: Vec<mpsc::UnboundedSender<Vec<Message>>>,
}

impl TranscriptStore {
    pub fn append(&mut self, mut message: Message) -> MessageId {
        self.last_id = self.last_id.next();
        message.id = self.last_id;
        self.messages.push(message);
        self.notify();

        return self.last_id;
    }

    /// Applies `patch` to the message with `id`. Unknown ids are ignored.
    pub fn update_by_id(&mut self, id: MessageId, patch: MessagePatch) {
        let Some(message) = self.messages.iter_mut().find(|m| return m.id() == id) else {
            tracing::warn!(id = %id, "update for unknown message ignored");
            return;
        };

        message.apply(patch);
        self.notify();
    }

    pub fn snapshot(&self) -> Vec<Message> {
        return self.messages.clone();
    }

    pub fn len(&self) -> usize {
        return self.messages.len();
    }

    pub fn is_empty(&self) -> bool {
        return self.messages.is_empty();
    }

    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<Vec<Message>> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.subscribers.push(tx);

        return rx;
    }

    fn notify(&mut self) {
        if self.subscribers.is_empty() {
            return;
        }

        let snapshot = self.snapshot();
        self.subscribers
            .retain(|subscriber| return subscriber.send(snapshot.clone()).is_ok());
    }
}
