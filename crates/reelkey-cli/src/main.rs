mod cli;
mod commands;
mod terminal;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use reelkey_core::config::AppConfig;
use reelkey_runtime::{Launcher, RecordingLauncher, Runtime, SystemLauncher};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    // Must outlive every log call so the file writer flushes.
    let _guard = init_logging(cli.log_dir.as_deref())?;

    let config_path = commands::config_path(cli.config);
    let editing = matches!(cli.command, Commands::Config { .. });
    let mut config = commands::load_config(&config_path, editing)?;

    // A one-off key must never be written back by a settings change.
    if let Some(key) = cli.api_key {
        if !editing {
            config.omdb.api_key = key;
        }
    }

    if cli.dry_run {
        let runtime = Runtime::new(config.clone(), RecordingLauncher::default())?
            .with_config_path(config_path.clone());
        run(cli.command, config, &config_path, runtime).await
    } else {
        let runtime =
            Runtime::new(config.clone(), SystemLauncher)?.with_config_path(config_path.clone());
        run(cli.command, config, &config_path, runtime).await
    }
}

async fn run<L: Launcher>(
    command: Commands,
    config: AppConfig,
    config_path: &Path,
    runtime: Runtime<L>,
) -> Result<()> {
    let timeout = config.relay_timeout();
    let runtime = Arc::new(runtime);

    match command {
        Commands::Search { query, kind } => commands::search(&runtime, &query, kind).await,
        Commands::Lookup { id } => commands::lookup(&runtime, &id).await,
        Commands::Resolve { id, page } => {
            let kind = commands::resolve(runtime, timeout, &id, page.as_deref()).await?;
            println!("{kind}");
            Ok(())
        }
        Commands::Open { id, kind } => commands::open(runtime, timeout, &id, kind).await,
        Commands::Page { path, page, click } => {
            commands::page(runtime, &config, &path, page.as_deref(), click).await
        }
        Commands::Overlay => commands::overlay(runtime, &config).await,
        Commands::Config { command } => commands::config(&runtime, config_path, command).await,
    }
}

/// Log to stderr, or to a daily rolling file when `log_dir` is set.
fn init_logging(log_dir: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("reelkey=info"));

    match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("creating log directory {}", dir.display()))?;
            let appender = tracing_appender::rolling::daily(dir, "reelkey.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .init();
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(std::io::stderr)
                .init();
            Ok(None)
        }
    }
}
