use serde_derive::Deserialize;
use serde_derive::Serialize;

pub const ASSISTANT_NAME: &str = "Agentic Engine";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    /// Name written on a message's bubble. Users are shown under their
    /// configured username.
    pub fn display_name(&self, username: &str) -> String {
        match self {
            Role::User => return username.to_string(),
            Role::Assistant => return ASSISTANT_NAME.to_string(),
        }
    }
}
