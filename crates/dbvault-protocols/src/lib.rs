//! # dbvault Protocols
//!
//! Interface definitions for the dbvault backup pipeline.
//! Contains only traits and shared value types - no implementations.
//!
//! ## Core Traits
//!
//! - [`SourceConnector`] - Opens a connection to the database being backed up
//! - [`DocumentSource`] - Lists collections and streams their documents
//! - [`ArchiveCodec`] - Bundles exported files into a single archive
//! - [`ScheduledJob`] - Unit of work fired by the run scheduler

pub mod archive;
pub mod error;
pub mod job;
pub mod source;

pub use archive::{ArchiveCodec, ArchiveSummary};
pub use error::{ArchiveError, SourceError};
pub use job::{FireReason, JobOutcome, ScheduledJob};
pub use source::{Document, DocumentSource, DocumentStream, SourceConnector};
