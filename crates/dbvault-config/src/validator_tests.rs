use super::*;
use crate::schema::{DatabaseConfig, SourceDriver};
use std::path::PathBuf;

fn valid_config() -> Config {
    Config {
        database: DatabaseConfig {
            driver: SourceDriver::Mongodb,
            uri: "mongodb://localhost:27017".to_string(),
            name: "popcard".to_string(),
            batch_size: None,
        },
        ..Config::default()
    }
}

#[test]
fn test_validate_valid_config() {
    let result = ConfigValidator::validate(&valid_config());
    assert!(result.is_valid(), "{:?}", result.errors);
    assert!(result.warnings.is_empty());
}

#[test]
fn test_validate_default_config_needs_connection() {
    let result = ConfigValidator::validate(&Config::default());
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "database.uri"));
    assert!(result.errors.iter().any(|e| e.path == "database.name"));
}

#[test]
fn test_validate_bad_mongo_scheme() {
    let mut config = valid_config();
    config.database.uri = "postgres://localhost".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "database.uri"));
}

#[test]
fn test_validate_sqlite_without_name_warns() {
    let mut config = valid_config();
    config.database.driver = SourceDriver::Sqlite;
    config.database.uri = "/var/lib/app.db".to_string();
    config.database.name.clear();

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(
        result
            .warnings
            .iter()
            .any(|w| w.path == "database.name" && w.message.contains("file stem"))
    );
}

#[test]
fn test_validate_hour_out_of_range() {
    let mut config = valid_config();
    config.schedule.hour = 24;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "schedule.hour"));
}

#[test]
fn test_validate_invalid_cron() {
    let mut config = valid_config();
    config.schedule.cron = Some("every day at noon".to_string());

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "schedule.cron"));
}

#[test]
fn test_validate_five_field_cron_accepted() {
    let mut config = valid_config();
    config.schedule.cron = Some("00 23 * * *".to_string());

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid(), "{:?}", result.errors);
}

#[test]
fn test_validate_overlap_policy_warns() {
    let mut config = valid_config();
    config.schedule.overlap = OverlapPolicy::Overlap;

    let result = ConfigValidator::validate(&config);
    assert!(result.is_valid());
    assert!(result.warnings.iter().any(|w| w.path == "schedule.overlap"));
}

#[test]
fn test_validate_zero_concurrency() {
    let mut config = valid_config();
    config.backup.export_concurrency = 0;

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "backup.export_concurrency"));
}

#[test]
fn test_validate_dotted_extension() {
    let mut config = valid_config();
    config.backup.archive_extension = ".zip".to_string();

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "backup.archive_extension"));
}

#[test]
fn test_validate_log_file_inside_workspace() {
    let mut config = valid_config();
    config.paths.workspace_dir = PathBuf::from("/srv/tmp");
    config.paths.log_file = PathBuf::from("/srv/tmp/backup_log.txt");

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "paths.log_file"));
}

#[test]
fn test_validate_workspace_equals_backup_dir() {
    let mut config = valid_config();
    config.paths.workspace_dir = PathBuf::from("/srv/backups");
    config.paths.backup_dir = PathBuf::from("/srv/backups");

    let result = ConfigValidator::validate(&config);
    assert!(result.errors.iter().any(|e| e.path == "paths.backup_dir"));
}

#[test]
fn test_validate_backup_dir_inside_workspace() {
    let mut config = valid_config();
    config.paths.workspace_dir = PathBuf::from("/srv/work");
    config.paths.backup_dir = PathBuf::from("/srv/work/backups");

    let result = ConfigValidator::validate(&config);
    assert!(!result.is_valid());
    assert!(result.errors.iter().any(|e| e.path == "paths.backup_dir"));
}

#[test]
fn test_validate_workspace_inside_backup_dir_allowed() {
    let mut config = valid_config();
    config.paths.backup_dir = PathBuf::from("/srv/backups");
    config.paths.workspace_dir = PathBuf::from("/srv/backups/tmp");
    config.paths.log_file = PathBuf::from("/srv/backup_log.txt");

    let result = ConfigValidator::validate(&config);
    assert!(!result.errors.iter().any(|e| e.path.starts_with("paths.")));
}

#[test]
fn test_into_result() {
    assert!(ConfigValidator::validate(&valid_config()).into_result().is_ok());

    let err = ConfigValidator::validate(&Config::default())
        .into_result()
        .unwrap_err();
    assert!(err.to_string().contains("database.uri"));
}
