//! Configuration validation.

use std::str::FromStr;

use crate::error::ConfigError;
use crate::schema::{Config, OverlapPolicy, SourceDriver};

/// Validation result.
#[derive(Debug, Default)]
pub struct ValidationResult {
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Collapse errors into a single [`ConfigError`], if any.
    pub fn into_result(self) -> Result<Vec<ValidationWarning>, ConfigError> {
        if self.errors.is_empty() {
            return Ok(self.warnings);
        }
        let joined = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.path, e.message))
            .collect::<Vec<_>>()
            .join("; ");
        Err(ConfigError::Invalid(joined))
    }
}

/// A validation error.
#[derive(Debug)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// A validation warning.
#[derive(Debug)]
pub struct ValidationWarning {
    pub path: String,
    pub message: String,
}

impl ValidationWarning {
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Configuration validator.
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate the configuration.
    pub fn validate(config: &Config) -> ValidationResult {
        let mut result = ValidationResult::default();

        Self::validate_database(config, &mut result);
        Self::validate_paths(config, &mut result);
        Self::validate_schedule(config, &mut result);
        Self::validate_backup(config, &mut result);

        result
    }

    fn validate_database(config: &Config, result: &mut ValidationResult) {
        let db = &config.database;
        if db.uri.trim().is_empty() {
            result.add_error(ValidationError::new(
                "database.uri",
                "Connection string is empty (set it in the file or via DB_URI)",
            ));
        }

        match db.driver {
            SourceDriver::Mongodb => {
                if db.name.trim().is_empty() {
                    result.add_error(ValidationError::new(
                        "database.name",
                        "Database name is empty (set it in the file or via DB_NAME)",
                    ));
                }
                if !db.uri.is_empty()
                    && !db.uri.starts_with("mongodb://")
                    && !db.uri.starts_with("mongodb+srv://")
                {
                    result.add_error(ValidationError::new(
                        "database.uri",
                        "MongoDB URI must start with mongodb:// or mongodb+srv://",
                    ));
                }
            }
            SourceDriver::Sqlite => {
                if db.name.trim().is_empty() {
                    result.add_warning(ValidationWarning::new(
                        "database.name",
                        "Database name not set, using the file stem",
                    ));
                }
            }
        }

        if db.batch_size == Some(0) {
            result.add_error(ValidationError::new(
                "database.batch_size",
                "batch_size must be greater than 0",
            ));
        }
    }

    fn validate_paths(config: &Config, result: &mut ValidationResult) {
        let paths = &config.paths;
        if paths.backup_dir.starts_with(&paths.workspace_dir) {
            result.add_error(ValidationError::new(
                "paths.backup_dir",
                "Backup directory cannot live inside the workspace; it is emptied on every run",
            ));
        }
        if paths.log_file.starts_with(&paths.workspace_dir) {
            result.add_error(ValidationError::new(
                "paths.log_file",
                "Log file cannot live inside the workspace; it is emptied on every run",
            ));
        }
    }

    fn validate_schedule(config: &Config, result: &mut ValidationResult) {
        let schedule = &config.schedule;

        if schedule.cron.is_none() {
            if schedule.hour > 23 {
                result.add_error(ValidationError::new(
                    "schedule.hour",
                    "hour must be between 0 and 23",
                ));
            }
            if schedule.minute > 59 {
                result.add_error(ValidationError::new(
                    "schedule.minute",
                    "minute must be between 0 and 59",
                ));
            }
        }

        let expr = schedule.cron_expression();
        if let Err(e) = cron::Schedule::from_str(&expr) {
            result.add_error(ValidationError::new(
                "schedule.cron",
                format!("Invalid cron expression '{}': {}", expr, e),
            ));
        }

        if schedule.overlap == OverlapPolicy::Overlap {
            result.add_warning(ValidationWarning::new(
                "schedule.overlap",
                "Overlapping runs share the workspace and may corrupt each other's output",
            ));
        }
    }

    fn validate_backup(config: &Config, result: &mut ValidationResult) {
        let backup = &config.backup;

        if backup.export_concurrency == 0 {
            result.add_error(ValidationError::new(
                "backup.export_concurrency",
                "export_concurrency must be greater than 0",
            ));
        }

        let ext = backup.archive_extension.as_str();
        if ext.is_empty() || ext.contains(['/', '\\', '.']) {
            result.add_error(ValidationError::new(
                "backup.archive_extension",
                "archive_extension must be a bare extension such as 'zip'",
            ));
        }

        if let Some(level) = backup.compression_level {
            if !(0..=9).contains(&level) {
                result.add_error(ValidationError::new(
                    "backup.compression_level",
                    "compression_level must be between 0 and 9",
                ));
            }
        }
    }
}

#[cfg(test)]
#[path = "validator_tests.rs"]
mod tests;
