//! Configuration loader.

use std::fs;
use std::path::{Path, PathBuf};

use regex::Regex;

use crate::error::ConfigError;
use crate::schema::Config;

/// Environment variables that override file values, in the order applied.
pub const ENV_OVERRIDES: &[&str] = &[
    "DB_URI",
    "DB_NAME",
    "DBVAULT_BACKUP_DIR",
    "DBVAULT_WORKSPACE_DIR",
    "DBVAULT_LOG_FILE",
];

/// Configuration loader with environment variable substitution.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Config, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        Self::load_str(&content)
    }

    /// Load configuration from a string, then apply environment overrides.
    pub fn load_str(content: &str) -> Result<Config, ConfigError> {
        let expanded = Self::expand_env_vars(content)?;
        let mut config: Config = toml::from_str(&expanded)?;
        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        Self::expand_paths(&mut config);
        Ok(config)
    }

    /// Load the file if it exists, otherwise start from defaults.
    ///
    /// Allows running from environment variables alone.
    pub fn load_or_default(path: &Path) -> Result<Config, ConfigError> {
        if path.exists() {
            return Self::load(path);
        }
        let mut config = Config::default();
        Self::apply_env_overrides(&mut config, |key| std::env::var(key).ok());
        Self::expand_paths(&mut config);
        Ok(config)
    }

    /// Overlay values from the environment (see [`ENV_OVERRIDES`]).
    pub fn apply_env_overrides<F>(config: &mut Config, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(uri) = get("DB_URI") {
            config.database.uri = uri;
        }
        if let Some(name) = get("DB_NAME") {
            config.database.name = name;
        }
        if let Some(dir) = get("DBVAULT_BACKUP_DIR") {
            config.paths.backup_dir = PathBuf::from(dir);
        }
        if let Some(dir) = get("DBVAULT_WORKSPACE_DIR") {
            config.paths.workspace_dir = PathBuf::from(dir);
        }
        if let Some(file) = get("DBVAULT_LOG_FILE") {
            config.paths.log_file = PathBuf::from(file);
        }
    }

    /// Expand environment variables in the format `${VAR}`.
    fn expand_env_vars(content: &str) -> Result<String, ConfigError> {
        let re = Regex::new(r"\$\{([^}]+)\}")
            .map_err(|e| ConfigError::InvalidFormat(e.to_string()))?;
        let mut result = content.to_string();

        for cap in re.captures_iter(content) {
            let var_name = &cap[1];
            let var_value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotSet(var_name.to_string()))?;
            result = result.replace(&cap[0], &var_value);
        }

        Ok(result)
    }

    fn expand_paths(config: &mut Config) {
        let paths = &mut config.paths;
        paths.backup_dir = Self::expand_path_buf(&paths.backup_dir);
        paths.workspace_dir = Self::expand_path_buf(&paths.workspace_dir);
        paths.log_file = Self::expand_path_buf(&paths.log_file);
        if let Some(dir) = config.logging.dir.as_ref() {
            config.logging.dir = Some(Self::expand_path_buf(dir));
        }
        if let Some(pid) = config.daemon.pid_file.as_ref() {
            config.daemon.pid_file = Some(Self::expand_path_buf(pid));
        }
    }

    fn expand_path_buf(path: &Path) -> PathBuf {
        PathBuf::from(Self::expand_path(&path.to_string_lossy()))
    }

    /// Expand shell-style paths (e.g., `~/backups`).
    pub fn expand_path(path: &str) -> String {
        shellexpand::tilde(path).to_string()
    }
}
