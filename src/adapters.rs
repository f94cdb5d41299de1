//! Wiring from configuration to pipeline components.

use std::sync::Arc;

use dbvault_config::{Config, DatabaseConfig, SourceDriver};
use dbvault_core::{BackupOrchestrator, BackupSettings, ZipCodec};
use dbvault_protocols::SourceConnector;
use dbvault_source_mongodb::MongoConnector;
use dbvault_source_sqlite::SqliteConnector;

/// Connector for the configured driver.
pub(crate) fn build_connector(database: &DatabaseConfig) -> Arc<dyn SourceConnector> {
    match database.driver {
        SourceDriver::Mongodb => Arc::new(
            MongoConnector::new(&database.uri, &database.name)
                .with_batch_size(database.batch_size),
        ),
        SourceDriver::Sqlite => {
            let mut connector = SqliteConnector::new(&database.uri, &database.name);
            if let Some(rows) = database.batch_size {
                connector = connector.with_row_buffer(rows as usize);
            }
            Arc::new(connector)
        }
    }
}

/// Orchestrator for the whole config.
pub(crate) fn build_orchestrator(config: &Config) -> BackupOrchestrator {
    let codec = ZipCodec::new()
        .with_extension(config.backup.archive_extension.clone())
        .with_compression_level(config.backup.compression_level);

    BackupOrchestrator::new(
        build_connector(&config.database),
        Arc::new(codec),
        BackupSettings::from_config(config),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_connector_by_driver() {
        let mut database = DatabaseConfig {
            uri: "mongodb://localhost:27017".to_string(),
            name: "popcard".to_string(),
            ..DatabaseConfig::default()
        };
        assert_eq!(build_connector(&database).driver(), "mongodb");

        database.driver = SourceDriver::Sqlite;
        database.uri = "/var/lib/app.db".to_string();
        assert_eq!(build_connector(&database).driver(), "sqlite");
    }

    #[test]
    fn test_archive_path_uses_configured_extension() {
        let mut config = Config::default();
        config.paths.backup_dir = "/srv/backups".into();
        config.backup.archive_extension = "bak".to_string();

        let orchestrator = build_orchestrator(&config);
        let started = chrono::DateTime::parse_from_rfc3339("2024-03-07T23:00:00Z")
            .unwrap()
            .with_timezone(&chrono::Utc);
        assert_eq!(
            orchestrator.archive_path(started),
            std::path::PathBuf::from("/srv/backups/2024-03-07.bak")
        );
    }
}
