#[cfg(test)]
#[path = "engine_test.rs"]
mod tests;

use std::time::Duration;

use anyhow::bail;
use anyhow::Result;
use async_trait::async_trait;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::EngineAnswer;
use crate::domain::models::EngineHealth;
use crate::domain::models::Gateway;
use crate::domain::models::GatewayError;

/// Route the engine serves questions on. The question travels as a query
/// parameter, the request body is empty.
const INVOKE_PATH: &str = "invoke";
const HEALTH_PATH: &str = "health";

pub struct AgenticEngine {
    client: reqwest::Client,
    url: String,
    timeout: String,
}

impl Default for AgenticEngine {
    fn default() -> AgenticEngine {
        return AgenticEngine {
            client: reqwest::Client::new(),
            url: Config::get(ConfigKey::EngineURL),
            timeout: Config::get(ConfigKey::EngineHealthCheckTimeout),
        };
    }
}

impl AgenticEngine {
    fn endpoint(&self, path: &str) -> String {
        return format!("{url}/{path}", url = self.url.trim_end_matches('/'));
    }
}

#[async_trait]
impl Gateway for AgenticEngine {
    #[allow(clippy::implicit_return)]
    async fn health_check(&self) -> Result<EngineHealth> {
        if self.url.is_empty() {
            bail!("Agentic Engine URL is not defined");
        }

        let res = self
            .client
            .get(self.endpoint(HEALTH_PATH))
            .timeout(Duration::from_millis(self.timeout.parse::<u64>()?))
            .send()
            .await;

        let res = match res {
            Ok(res) => res,
            Err(err) => {
                tracing::error!(error = ?err, "Agentic Engine is not reachable");
                bail!("Agentic Engine is not reachable");
            }
        };

        let status = res.status().as_u16();
        if status >= 400 {
            tracing::error!(status = status, "Agentic Engine health check failed");
            bail!("Agentic Engine health check failed with status {status}");
        }

        let health = res.json::<EngineHealth>().await?;
        return Ok(health);
    }

    #[allow(clippy::implicit_return)]
    async fn ask(&self, question: &str) -> Result<EngineAnswer, GatewayError> {
        tracing::debug!(question = question, "asking Agentic Engine");

        let res = self
            .client
            .post(self.endpoint(INVOKE_PATH))
            .query(&[("question", question)])
            .send()
            .await?;

        let status = res.status();
        if !status.is_success() {
            tracing::error!(
                status = status.as_u16(),
                "Failed to make invoke request to Agentic Engine"
            );
            return Err(GatewayError::Status(status));
        }

        let body = res.bytes().await?;
        let answer = serde_json::from_slice::<EngineAnswer>(&body)?;

        return Ok(answer);
    }
}
