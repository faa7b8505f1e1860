#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use std::fmt;

use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Role;

/// Content written into an assistant message whose request failed.
pub const FAILED_ANSWER_TEXT: &str = "Error connecting to Agentic Engine.";

/// Identifier handed out by the transcript when a message is appended.
/// Values only ever increase within a transcript.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct MessageId(u64);

impl MessageId {
    pub fn new(value: u64) -> MessageId {
        return MessageId(value);
    }

    pub fn next(&self) -> MessageId {
        return MessageId(self.0 + 1);
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        return write!(f, "{}", self.0);
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Complete,
    Failed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasoningStep {
    pub title: String,
    pub content: String,
}

impl ReasoningStep {
    pub fn new(title: &str, content: &str) -> ReasoningStep {
        return ReasoningStep {
            title: title.to_string(),
            content: content.to_string(),
        };
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub(crate) id: MessageId,
    pub role: Role,
    pub content: String,
    pub reasoning: Vec<ReasoningStep>,
    pub status: MessageStatus,
}

impl Message {
    /// A finished user question. The identifier is assigned once the message
    /// is appended to a transcript.
    pub fn user(text: &str) -> Message {
        return Message {
            id: MessageId::default(),
            role: Role::User,
            content: text.to_string(),
            reasoning: vec![],
            status: MessageStatus::Complete,
        };
    }

    /// Placeholder for an answer that hasn't arrived yet.
    pub fn pending_assistant() -> Message {
        return Message {
            id: MessageId::default(),
            role: Role::Assistant,
            content: "".to_string(),
            reasoning: vec![],
            status: MessageStatus::Pending,
        };
    }

    pub fn id(&self) -> MessageId {
        return self.id;
    }

    pub fn is_pending(&self) -> bool {
        return self.status == MessageStatus::Pending;
    }

    pub fn is_failed(&self) -> bool {
        return self.status == MessageStatus::Failed;
    }

    pub fn apply(&mut self, patch: MessagePatch) {
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(reasoning) = patch.reasoning {
            self.reasoning = reasoning;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
    }
}

/// Partial update for a message already in a transcript. Fields left as
/// `None` keep their current value.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MessagePatch {
    pub content: Option<String>,
    pub reasoning: Option<Vec<ReasoningStep>>,
    pub status: Option<MessageStatus>,
}

impl MessagePatch {
    pub fn complete(content: &str, reasoning: Vec<ReasoningStep>) -> MessagePatch {
        return MessagePatch {
            content: Some(content.to_string()),
            reasoning: Some(reasoning),
            status: Some(MessageStatus::Complete),
        };
    }

    pub fn failed() -> MessagePatch {
        return MessagePatch {
            content: Some(FAILED_ANSWER_TEXT.to_string()),
            reasoning: Some(vec![]),
            status: Some(MessageStatus::Failed),
        };
    }
}
