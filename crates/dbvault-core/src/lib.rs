//! # dbvault Core
//!
//! The backup pipeline.
//!
//! ## Components
//!
//! - [`TempWorkspace`] - scratch directory, cleared best-effort around each run
//! - [`CollectionStreamer`] - writes one collection to a JSON array file in bounded memory
//! - [`ZipArchiveBuilder`] / [`ZipCodec`] - bundles exported files into a dated ZIP
//! - [`CompletionLog`] - append-only `[timestamp] message` outcome log
//! - [`BackupOrchestrator`] - drives one [`BackupRun`] end to end
//! - [`MemorySource`] - in-memory database used by the pipeline tests

pub mod archive;
pub mod completion_log;
pub mod error;
pub mod memory_source;
pub mod orchestrator;
pub mod run;
pub mod streamer;
pub mod workspace;

pub use archive::{ZipArchiveBuilder, ZipCodec};
pub use completion_log::CompletionLog;
pub use error::{BackupError, ExportError};
pub use memory_source::{MemoryConnector, MemorySource};
pub use orchestrator::{BackupOrchestrator, BackupSettings};
pub use run::{BackupRun, CollectionFile, RunOutcome, RunStage};
pub use streamer::{CollectionStreamer, ExportSummary};
pub use workspace::{ClearReport, TempWorkspace};
