pub mod engine;

use anyhow::bail;
use anyhow::Result;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::GatewayBox;

pub struct GatewayManager {}

impl GatewayManager {
    pub fn get() -> Result<GatewayBox> {
        if Config::get(ConfigKey::EngineURL).is_empty() {
            bail!("No engine URL configured. Set it with --engine-url or in the config file.");
        }

        return Ok(Box::<engine::AgenticEngine>::default());
    }
}
