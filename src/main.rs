mod cli;

use std::{process::ExitCode, sync::Arc};

use anyhow::{Context, Result};
use clap::Parser;
use eventdesk::{
    App, AppError, Config,
    terminal::{TerminalNavigator, TerminalNotifier},
};
use eventdesk_session::WsTransport;
use url::Url;

use crate::cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        // Already shown to the user as a notice or a redirect.
        Err(err) if err.downcast_ref::<AppError>().is_some_and(AppError::is_notified) => {
            tracing::debug!(err = %err, "command ended early");
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = Config::load(cli.config.clone())?;
    config.validate().map_err(|e| anyhow::anyhow!(e))?;

    eventdesk::observability::init_observability(
        &config.observability.log_level,
        &config.observability.log_format,
    )?;

    let realtime_url = Url::parse(&config.api.realtime_url)
        .with_context(|| format!("invalid realtime url {}", config.api.realtime_url))?;
    let transport = Arc::new(WsTransport::new(realtime_url));

    let app = App::from_config(
        config,
        transport.clone(),
        Arc::new(TerminalNotifier),
        Arc::new(TerminalNavigator),
    )?;

    let state = app.initialize();
    tracing::debug!(state = %state, "session initialized");

    cli::run(&app, &transport, cli.command).await
}
