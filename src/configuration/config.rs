#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Debug, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    ConfigFile,
    #[strum(serialize = "engine-url")]
    EngineURL,
    EngineHealthCheckTimeout,
    Username,
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        match key {
            ConfigKey::ConfigFile => {
                return dirs::config_dir()
                    .unwrap_or_default()
                    .join("reasoner/config.toml")
                    .to_string_lossy()
                    .to_string();
            }
            ConfigKey::EngineURL => return "http://localhost:8000".to_string(),
            ConfigKey::EngineHealthCheckTimeout => return "1000".to_string(),
            ConfigKey::Username => {
                let user = env::var("USER").unwrap_or_default();
                if user.is_empty() {
                    return "User".to_string();
                }
                return user;
            }
        }
    }

    /// Defaults first, then the TOML config file, then flags and environment
    /// variables.
    pub async fn load(clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key))
        }

        let mut config_file = Config::default(ConfigKey::ConfigFile);
        for matches in clap_arg_matches.as_slice() {
            if let Ok(Some(arg_config_file)) =
                matches.try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
            {
                config_file = arg_config_file.to_string();
            }
        }

        let config_path = path::PathBuf::from(config_file);
        if config_path.exists() {
            let toml_str = fs::read_to_string(&config_path).await?;
            let doc = toml_str.parse::<toml_edit::Document>()?;

            for (name, val) in doc.iter() {
                let Some(key) = ConfigKey::iter().find(|key| return key.to_string() == name)
                else {
                    bail!(
                        "{} has an unknown key '{name}'\nKnown keys are: {}",
                        config_path.display(),
                        Config::file_keys().join(", ")
                    );
                };

                if key == ConfigKey::ConfigFile {
                    bail!("{} cannot set '{key}'", config_path.display());
                }

                if let Some(val_int) = val.as_integer() {
                    if val_int < 0 {
                        bail!("config.toml has a negative value for key '{key}': {val_int}");
                    }
                    Config::set(key, &val_int.to_string());
                } else if let Some(val_str) = val.as_str() {
                    if val_str.is_empty() {
                        continue;
                    }
                    if key == ConfigKey::EngineHealthCheckTimeout
                        && val_str.parse::<u64>().is_err()
                    {
                        bail!("config.toml has an invalid value for key '{key}': {val_str}");
                    }
                    Config::set(key, val_str);
                } else {
                    bail!("config.toml has an invalid value for key '{key}'");
                }
            }
        }

        for key in ConfigKey::iter() {
            for matches in clap_arg_matches.as_slice() {
                if let Ok(Some(val)) = matches.try_get_one::<String>(&key.to_string()) {
                    if val.is_empty() {
                        continue;
                    }
                    Config::set(key, val)
                }
            }
        }

        if Config::get(ConfigKey::EngineHealthCheckTimeout)
            .parse::<u64>()
            .is_err()
        {
            bail!(
                "'{}' must be a number of milliseconds",
                ConfigKey::EngineHealthCheckTimeout
            );
        }

        tracing::debug!(
            username = Config::get(ConfigKey::Username),
            engine_url = Config::get(ConfigKey::EngineURL),
            engine_health_check_timeout = Config::get(ConfigKey::EngineHealthCheckTimeout),
            "config"
        );

        return Ok(());
    }

    fn file_keys() -> Vec<String> {
        return ConfigKey::iter()
            .filter(|key| return *key != ConfigKey::ConfigFile)
            .map(|key| return key.to_string())
            .collect();
    }

    pub fn serialize_default(cmd: Command) -> String {
        let toml_str = ConfigKey::iter()
            .filter_map(|key| {
                if key == ConfigKey::ConfigFile {
                    return None;
                }

                if key == ConfigKey::Username {
                    return Some(
                        "# Your user name displayed in all chat bubbles. [default: $USER]\n# username = \"\""
                            .to_string(),
                    );
                }

                let arg = cmd
                    .get_arguments()
                    .find(|e| return e.get_long() == Some(key.to_string().as_str()))?;

                let description = arg
                    .get_help()
                    .map(|help| return help.to_string())
                    .unwrap_or_default()
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();

                let val = Config::default(key);
                if val.parse::<u64>().is_ok() {
                    return Some(format!("# {description}\n{key} = {val}"));
                }

                return Some(format!("# {description}\n{key} = \"{val}\""));
            })
            .collect::<Vec<String>>()
            .join("\n\n");

        return toml_str;
    }
}
