//! timetable CLI entry point.

use std::process::ExitCode;

use clap::Parser;

use timetable_client::cli::{Cli, Command, ConfigAction};
use timetable_client::commands;
use timetable_client::config::ClientConfig;
use timetable_client::error::ClientResult;
use timetable_core::{TracingConfig, init_tracing};
use timetable_sync::OutcomeKind;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> ClientResult<ExitCode> {
    let config = match cli.config {
        Some(ref path) => ClientConfig::load_from(path)?,
        None => ClientConfig::load()?,
    };

    let tracing_config = if cli.debug || config.debug {
        TracingConfig::cli_debug()
    } else {
        TracingConfig::default()
    };
    init_tracing(tracing_config)?;

    match cli.command {
        Command::Auth(args) => {
            let kind = commands::auth::run(args, &config).await?;
            Ok(if kind == OutcomeKind::Success {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            })
        }
        Command::Config { action } => {
            match action {
                ConfigAction::Dump => commands::config::dump(&config)?,
                ConfigAction::Validate => commands::config::validate(&config)?,
                ConfigAction::Path => commands::config::path()?,
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}
