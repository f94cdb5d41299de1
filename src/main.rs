//! dbvault - scheduled full-database backups.
//!
//! Main entry point for the dbvault CLI and backup service.

mod adapters;
mod cli;
mod cmd_inspect;
mod cmd_run;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use tracing::warn;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use dbvault_config::{Config, ConfigLoader, ConfigValidator, LoggingConfig};

use cli::{Cli, Commands};

/// Initialize tracing from the `[logging]` section.
///
/// `RUST_LOG` wins over `logging.level`. With `logging.dir` set, diagnostics are
/// also written to daily-rolling files there.
fn init_tracing(logging: &LoggingConfig) -> anyhow::Result<()> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let console = if logging.json {
        fmt::layer().json().with_target(true).boxed()
    } else {
        fmt::layer().with_target(true).with_ansi(true).boxed()
    };

    let file = match &logging.dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory {}", dir.display()))?;
            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .filename_prefix("dbvault")
                .filename_suffix("log")
                .max_log_files(30)
                .build(dir)?;
            let (non_blocking, guard) = tracing_appender::non_blocking(appender);

            // Flushes buffered lines on exit.
            static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
                std::sync::OnceLock::new();
            let _ = GUARD.set(guard);

            Some(fmt::layer().with_writer(non_blocking).with_ansi(false))
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .with(env_filter)
        .init();

    Ok(())
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let path = cli.config_path();
    let config = if cli.config.is_some() {
        ConfigLoader::load(&path)
    } else {
        ConfigLoader::load_or_default(&path)
    };
    config.with_context(|| format!("Failed to load configuration from {}", path.display()))
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // A missing .env is fine; the process environment is used as is.
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    let config = load_config(&cli)?;

    if let Some(Commands::CheckConfig { upcoming }) = cli.command {
        return cmd_inspect::check_config(&config, &cli.config_path(), upcoming);
    }

    init_tracing(&config.logging)?;

    let warnings = ConfigValidator::validate(&config).into_result()?;
    for warning in warnings {
        warn!("Config {}: {}", warning.path, warning.message);
    }

    match cli.command {
        None => cmd_run::run_service(config, None, false).await,
        Some(Commands::Run {
            pid_file,
            no_startup_run,
        }) => cmd_run::run_service(config, pid_file, no_startup_run).await,
        Some(Commands::Once { json }) => cmd_run::run_once(config, json).await,
        Some(Commands::Collections) => cmd_inspect::list_collections(&config).await,
        Some(Commands::CheckConfig { .. }) => Ok(ExitCode::SUCCESS),
    }
}
