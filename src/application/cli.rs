#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;
use std::sync::Arc;

use anyhow::bail;
use anyhow::Result;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::GatewayBox;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::services::actions::help_text;
use crate::domain::services::SubmissionController;
use crate::infrastructure::gateways::GatewayManager;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
}

pub fn log_path() -> path::PathBuf {
    return dirs::cache_dir()
        .unwrap_or_default()
        .join("reasoner/debug.log");
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!(
        "Created default config file at {}",
        config_file_path.display()
    );
    return Ok(());
}

/// Renders the settled assistant message of a headless `ask` for a terminal.
pub fn format_answer(message: &Message) -> String {
    let mut lines = message
        .reasoning
        .iter()
        .map(|step| {
            return format!(
                "{} {}",
                Paint::cyan(format!("▸ {}:", step.title)).bold(),
                Paint::new(&step.content).dimmed()
            );
        })
        .collect::<Vec<String>>();

    if !lines.is_empty() {
        lines.push("".to_string());
    }

    if message.is_failed() {
        lines.push(Paint::red(&message.content).to_string());
    } else {
        lines.push(message.content.to_string());
    }

    return lines.join("\n");
}

/// Runs one question without the terminal UI. Returns `false` when the
/// engine could not answer.
async fn ask(gateway: GatewayBox, matches: &ArgMatches) -> Result<bool> {
    let question = matches
        .get_many::<String>("question")
        .map(|words| return words.cloned().collect::<Vec<String>>().join(" "))
        .unwrap_or_default();

    let controller = Arc::new(SubmissionController::new(gateway));
    if controller.submit(&question).await.is_none() {
        bail!("A question is required.");
    }

    let messages = controller.snapshot();
    let Some(answer) = messages
        .iter()
        .rev()
        .find(|message| return message.role == Role::Assistant)
    else {
        bail!("The engine did not produce an answer.");
    };

    if matches.get_flag("json") {
        println!("{}", serde_json::to_string_pretty(&messages)?);
    } else {
        println!("{}", format_answer(answer));
    }

    return Ok(!answer.is_failed());
}

async fn health() -> Result<()> {
    let url = Config::get(ConfigKey::EngineURL);
    let health = GatewayManager::get()?.health_check().await?;

    println!("Engine: {url}");
    println!("Status: {}", health.status);
    if !health.version.is_empty() {
        println!("Version: {}", health.version);
    }

    return Ok(());
}

fn subcommand_ask() -> Command {
    return Command::new("ask")
        .about("Ask the engine a single question and print the answer, without starting the terminal UI.")
        .arg(
            Arg::new("question")
                .help("The question to ask.")
                .num_args(1..)
                .required(true),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .help("Print the whole transcript as JSON.")
                .action(ArgAction::SetTrue),
        );
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_debug() -> Command {
    return Command::new("debug")
        .about("Debug helpers for Reasoner")
        .hide(true)
        .subcommand(
            Command::new("log-path").about("Output path to debug log file generated when running Reasoner with environment variable RUST_LOG=reasoner")
        )
        .subcommand(
            Command::new("enum-config").about("List all config keys as strings.")
        );
}

fn arg_engine_url() -> Arg {
    return Arg::new(ConfigKey::EngineURL.to_string())
        .short('u')
        .long(ConfigKey::EngineURL.to_string())
        .env("REASONER_ENGINE_URL")
        .num_args(1)
        .help(format!(
            "Agentic Engine API URL. [default: {}]",
            Config::default(ConfigKey::EngineURL)
        ))
        .global(true);
}

fn arg_engine_health_check_timeout() -> Arg {
    return Arg::new(ConfigKey::EngineHealthCheckTimeout.to_string())
        .long(ConfigKey::EngineHealthCheckTimeout.to_string())
        .env("REASONER_ENGINE_HEALTH_CHECK_TIMEOUT")
        .num_args(1)
        .help(format!(
            "Time to wait in milliseconds before timing out when doing a health check against the Agentic Engine. [default: {}]",
            Config::default(ConfigKey::EngineHealthCheckTimeout)
        ))
        .global(true);
}

fn arg_config_file() -> Arg {
    return Arg::new(ConfigKey::ConfigFile.to_string())
        .short('c')
        .long(ConfigKey::ConfigFile.to_string())
        .env("REASONER_CONFIG_FILE")
        .num_args(1)
        .help(format!(
            "Path to configuration file [default: {}]",
            Config::default(ConfigKey::ConfigFile)
        ))
        .global(true);
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("HOTKEYS:") || line.starts_with("ANSWERS:") {
                return Paint::new(format!("CHAT {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
    );

    return Command::new("reasoner")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(Command::new("chat").about("Start a new chat session."))
        .subcommand(subcommand_ask())
        .subcommand(
            Command::new("health").about("Check whether the Agentic Engine is reachable."),
        )
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_debug())
        .arg(arg_config_file())
        .arg(arg_engine_url())
        .arg(arg_engine_health_check_timeout());
}

pub enum Startup {
    Chat,
    Exit(i32),
}

/// Handles every subcommand that does not need the terminal UI.
pub async fn parse() -> Result<Startup> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("debug", debug_matches)) => {
            match debug_matches.subcommand() {
                Some(("log-path", _)) => {
                    println!("{}", log_path().display());
                }
                Some(("enum-config", _)) => {
                    let res = ConfigKey::VARIANTS.join("\n");
                    println!("{}", res);
                }
                _ => {
                    subcommand_debug().print_long_help()?;
                }
            }

            return Ok(Startup::Exit(0));
        }
        Some(("chat", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
        }
        Some(("ask", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            if ask(GatewayManager::get()?, subcmd_matches).await? {
                return Ok(Startup::Exit(0));
            }
            return Ok(Startup::Exit(1));
        }
        Some(("health", subcmd_matches)) => {
            Config::load(vec![&matches, subcmd_matches]).await?;
            health().await?;
            return Ok(Startup::Exit(0));
        }
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(Startup::Exit(0));
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(Startup::Exit(0));
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(Startup::Exit(0));
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(Startup::Exit(0));
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(Startup::Exit(0));
            }
        },
        _ => {
            Config::load(vec![&matches]).await?;
        }
    }

    return Ok(Startup::Chat);
}
