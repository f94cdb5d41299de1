//! `run` and `once` subcommand handlers.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};

use dbvault_config::Config;
use dbvault_daemon::{InstanceLock, ShutdownSignal};
use dbvault_protocols::FireReason;
use dbvault_scheduler::RunScheduler;

use crate::adapters::build_orchestrator;

/// Run the backup service until SIGINT/SIGTERM.
pub(crate) async fn run_service(
    config: Config,
    pid_file: Option<PathBuf>,
    no_startup_run: bool,
) -> anyhow::Result<ExitCode> {
    let pid_path = pid_file.unwrap_or_else(|| config.daemon.pid_file());
    let lock = InstanceLock::acquire(&pid_path)?;

    let orchestrator = Arc::new(build_orchestrator(&config));
    orchestrator
        .prepare_directories()
        .await
        .context("Failed to create backup directories")?;

    let mut schedule = config.schedule.clone();
    if no_startup_run {
        schedule.run_on_start = false;
    }
    let scheduler = Arc::new(RunScheduler::from_config(orchestrator, &schedule)?);

    let shutdown = ShutdownSignal::new();
    shutdown.install_os_handlers()?;

    info!(
        "dbvault started (PID {}): {} '{}' -> {}",
        lock.pid(),
        config.database.driver,
        config.database.name,
        config.paths.backup_dir.display()
    );

    scheduler.clone().run(shutdown.subscribe()).await;

    let stats = scheduler.stats();
    info!(
        "dbvault stopped: {} fired, {} skipped, {} succeeded, {} failed",
        stats.fired(),
        stats.skipped(),
        stats.succeeded(),
        stats.failed()
    );

    lock.release()?;
    Ok(ExitCode::SUCCESS)
}

/// Run one backup and report its outcome through the exit code.
pub(crate) async fn run_once(config: Config, json: bool) -> anyhow::Result<ExitCode> {
    let orchestrator = build_orchestrator(&config);
    orchestrator
        .prepare_directories()
        .await
        .context("Failed to create backup directories")?;

    let run = orchestrator.run_backup(FireReason::Manual).await;

    if json {
        println!("{}", serde_json::to_string_pretty(&run)?);
    } else if let Some(path) = &run.archive_path {
        println!("{}", path.display());
    }

    if run.succeeded() {
        Ok(ExitCode::SUCCESS)
    } else {
        error!("Backup run {} failed", run.id);
        Ok(ExitCode::FAILURE)
    }
}
