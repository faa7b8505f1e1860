#[cfg(test)]
#[path = "gateway_test.rs"]
mod tests;

use std::fmt;

use anyhow::Result;
use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

/// Successful body of an `/invoke` call. The engine returns its whole graph
/// state, of which only the final generation and the retrieved documents
/// are consumed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineAnswer {
    pub generation: String,
    #[serde(default)]
    pub documents: Option<Vec<serde_json::Value>>,
}

impl EngineAnswer {
    pub fn document_count(&self) -> usize {
        return self.documents.as_ref().map_or(0, Vec::len);
    }
}

/// Body of the engine's `/health` route.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineHealth {
    pub status: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineStatus {
    Checking,
    Online(EngineHealth),
    Offline(String),
}

impl fmt::Display for EngineStatus {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EngineStatus::Checking => return write!(f, "Checking engine..."),
            EngineStatus::Online(health) => {
                if health.version.is_empty() {
                    return write!(f, "Active");
                }
                return write!(f, "Active (v{})", health.version);
            }
            EngineStatus::Offline(reason) => return write!(f, "Offline: {reason}"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("engine is unreachable: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("engine responded with status {0}")]
    Status(reqwest::StatusCode),
    #[error("engine response could not be decoded: {0}")]
    Decode(#[from] serde_json::Error),
}

#[async_trait]
pub trait Gateway {
    /// Used at startup to report whether the engine is reachable, and which
    /// version it runs.
    async fn health_check(&self) -> Result<EngineHealth>;

    /// Sends a single question to the engine and waits for the full answer.
    /// No retries or timeouts are applied; any transport, status or decoding
    /// problem is returned as a `GatewayError`.
    async fn ask(&self, question: &str) -> Result<EngineAnswer, GatewayError>;
}

pub type GatewayBox = Box<dyn Gateway + Send + Sync>;
