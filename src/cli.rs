//! CLI definitions for dbvault.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Config file used when `--config` is not given.
pub(crate) const DEFAULT_CONFIG: &str = "config/dbvault.toml";

/// dbvault CLI.
#[derive(Parser)]
#[command(name = "dbvault")]
#[command(about = "Scheduled full-database backups to dated ZIP archives")]
#[command(version)]
pub(crate) struct Cli {
    /// Configuration file path. Defaults and environment variables are used
    /// when the default file is absent.
    #[arg(short, long, global = true, env = "DBVAULT_CONFIG")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    pub fn config_path(&self) -> PathBuf {
        self.config
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG))
    }
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Back up at startup and then on schedule until SIGINT/SIGTERM (default)
    Run {
        /// PID file path (overrides `daemon.pid_file`)
        #[arg(long)]
        pid_file: Option<PathBuf>,

        /// Skip the immediate startup backup
        #[arg(long)]
        no_startup_run: bool,
    },

    /// Run a single backup now and exit non-zero if it fails
    Once {
        /// Print the run record as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the collections a backup would export
    Collections,

    /// Validate the configuration and show upcoming fire times
    CheckConfig {
        /// Number of upcoming fire times to print
        #[arg(long, default_value_t = 3)]
        upcoming: usize,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_command_is_none() {
        let cli = Cli::try_parse_from(["dbvault"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn test_run_flags() {
        let cli =
            Cli::try_parse_from(["dbvault", "run", "--pid-file", "/run/x.pid", "--no-startup-run"])
                .unwrap();
        match cli.command {
            Some(Commands::Run {
                pid_file,
                no_startup_run,
            }) => {
                assert_eq!(pid_file, Some(PathBuf::from("/run/x.pid")));
                assert!(no_startup_run);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn test_global_config_flag() {
        let cli = Cli::try_parse_from(["dbvault", "once", "--config", "/etc/dbvault.toml"]).unwrap();
        assert_eq!(cli.config_path(), PathBuf::from("/etc/dbvault.toml"));
    }

    #[test]
    fn test_check_config_default_upcoming() {
        let cli = Cli::try_parse_from(["dbvault", "check-config"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::CheckConfig { upcoming: 3 })
        ));
    }
}
