//! `collections` and `check-config` subcommand handlers.

use std::path::Path;
use std::process::ExitCode;

use chrono::Utc;

use dbvault_config::{Config, ConfigValidator};
use dbvault_scheduler::CronTrigger;

use crate::adapters::build_connector;

/// Print every collection of the configured database, one per line.
pub(crate) async fn list_collections(config: &Config) -> anyhow::Result<ExitCode> {
    let source = build_connector(&config.database).connect().await?;
    for name in source.list_collections().await? {
        println!("{}", name);
    }
    Ok(ExitCode::SUCCESS)
}

/// Validate the configuration and print the effective schedule.
pub(crate) fn check_config(
    config: &Config,
    path: &Path,
    upcoming: usize,
) -> anyhow::Result<ExitCode> {
    let result = ConfigValidator::validate(config);

    for warning in &result.warnings {
        println!("warning: {}: {}", warning.path, warning.message);
    }
    for error in &result.errors {
        println!("error: {}: {}", error.path, error.message);
    }
    if !result.is_valid() {
        println!("{}: invalid", path.display());
        return Ok(ExitCode::FAILURE);
    }

    let trigger = CronTrigger::from_config(&config.schedule)?;
    println!("{}: ok", path.display());
    println!("driver:    {}", config.database.driver);
    println!("backups:   {}", config.paths.backup_dir.display());
    println!("workspace: {}", config.paths.workspace_dir.display());
    println!("log:       {}", config.paths.log_file.display());
    println!(
        "schedule:  {} (overlap: {}, startup run: {})",
        trigger.expression(),
        config.schedule.overlap,
        config.schedule.run_on_start
    );
    for at in trigger.upcoming_after(Utc::now(), upcoming) {
        println!("  next:    {}", at.to_rfc3339());
    }
    Ok(ExitCode::SUCCESS)
}
