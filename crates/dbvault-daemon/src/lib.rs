//! # dbvault Daemon
//!
//! Process-level plumbing for the long-running backup service.
//!
//! - [`InstanceLock`] - PID file that keeps a second daemon from starting
//! - [`ShutdownSignal`] - SIGTERM/SIGINT fan-out to the scheduler

pub mod error;
pub mod lock;
pub mod shutdown;

pub use error::DaemonError;
pub use lock::InstanceLock;
pub use shutdown::ShutdownSignal;
