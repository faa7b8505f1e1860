#![deny(clippy::implicit_return)]
#![allow(clippy::needless_return)]

mod application;
mod configuration;
mod domain;
mod infrastructure;

use std::env;
use std::process;
use std::sync::Arc;

use anyhow::Error;
use anyhow::Result;
use domain::models::Action;
use domain::models::Event;
use domain::services::events::EventsService;
use domain::services::SubmissionController;
use infrastructure::gateways::GatewayManager;
use tokio::sync::mpsc;
use tokio::task;
use yansi::Paint;

use crate::application::cli;
use crate::application::cli::Startup;
use crate::application::ui;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::services::actions::ActionsService;

fn report_error(err: Error) {
    eprintln!(
        "{}",
        Paint::red(format!(
            "Oh no! Reasoner has failed with the following app version and error.\n\nVersion: {}\nError: {}",
            env!("CARGO_PKG_VERSION"),
            err
        ))
    );

    let backtrace = err.backtrace();
    if backtrace.to_string() == "disabled backtrace" {
        let args = env::args().collect::<Vec<String>>().join(" ");
        eprintln!("\nRunning the following can help explain further what the issue is:");
        eprintln!("\nRUST_BACKTRACE=1 {args}");
    } else {
        eprintln!("\n{}", backtrace);
    }
}

async fn run() -> Result<()> {
    let controller = Arc::new(SubmissionController::new(GatewayManager::get()?));
    let transcript_rx = controller.subscribe_transcript();
    let state_rx = controller.subscribe_state();

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();
    let (event_tx, event_rx) = mpsc::unbounded_channel::<Event>();

    let mut background_futures = task::JoinSet::new();
    let worker_controller = controller.clone();
    background_futures.spawn(async move {
        return ActionsService::start(worker_controller, event_tx, &mut action_rx).await;
    });

    action_tx.send(Action::HealthCheck())?;

    let events = EventsService::new(event_rx, transcript_rx, state_rx);
    let username = Config::get(ConfigKey::Username);
    let ui_future = ui::start(action_tx, events, &username);

    return tokio::select!(
        res = background_futures.join_next() => match res {
            Some(Ok(res)) => res,
            Some(Err(err)) => Err(err.into()),
            None => Ok(()),
        },
        res = ui_future => res,
    );
}

async fn start() -> i32 {
    match cli::parse().await {
        Ok(Startup::Exit(code)) => return code,
        Ok(Startup::Chat) => {}
        Err(err) => {
            report_error(err);
            return 1;
        }
    }

    if let Err(err) = run().await {
        ui::destruct_terminal_for_panic();
        report_error(err);
        return 1;
    }

    return 0;
}

#[tokio::main]
async fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        ui::destruct_terminal_for_panic();
        better_panic::Settings::auto().create_panic_handler()(panic_info);
    }));

    let debug_log_dir = env::var("REASONER_LOG_DIR").unwrap_or_else(|_| {
        return cli::log_path()
            .parent()
            .map(|dir| return dir.to_string_lossy().to_string())
            .unwrap_or_default();
    });

    let file_appender = tracing_appender::rolling::never(debug_log_dir, "debug.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);
    if env::var("RUST_LOG")
        .unwrap_or_else(|_| return "".to_string())
        .contains("reasoner")
    {
        tracing_subscriber::fmt()
            .json()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(writer)
            .init();
    }

    let code = start().await;

    // Flush buffered log lines before exiting.
    drop(guard);
    process::exit(code);
}
