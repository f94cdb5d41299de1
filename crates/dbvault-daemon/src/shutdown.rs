//! Shutdown signalling.
//!
//! SIGTERM and SIGINT flip a shared `watch` flag. The scheduler stops firing
//! when it changes and waits for runs already in progress.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::error::DaemonError;

/// Cloneable shutdown flag.
#[derive(Clone)]
pub struct ShutdownSignal {
    sender: Arc<watch::Sender<bool>>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Receiver that changes once shutdown is requested.
    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.sender.subscribe()
    }

    pub fn trigger(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_triggered(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolve once shutdown has been requested.
    pub async fn wait(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so this only ends on a value change.
        let _ = rx.wait_for(|triggered| *triggered).await;
    }

    /// Route SIGTERM and SIGINT to [`trigger`](Self::trigger).
    ///
    /// A second signal while shutting down is logged; runs are still awaited.
    #[cfg(unix)]
    pub fn install_os_handlers(&self) -> Result<(), DaemonError> {
        use tokio::signal::unix::{SignalKind, signal};

        for (kind, name) in [
            (SignalKind::terminate(), "SIGTERM"),
            (SignalKind::interrupt(), "SIGINT"),
        ] {
            let mut stream = signal(kind).map_err(|e| DaemonError::SignalSetup(e.to_string()))?;
            let handle = self.clone();
            tokio::spawn(async move {
                while stream.recv().await.is_some() {
                    if handle.is_triggered() {
                        warn!("Received {} again; still waiting for in-flight runs", name);
                    } else {
                        info!("Received {}, shutting down", name);
                        handle.trigger();
                    }
                }
            });
        }

        info!("OS signal handlers installed (SIGTERM, SIGINT)");
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn install_os_handlers(&self) -> Result<(), DaemonError> {
        let handle = self.clone();
        tokio::spawn(async move {
            if let Ok(()) = tokio::signal::ctrl_c().await {
                info!("Received Ctrl+C, shutting down");
                handle.trigger();
            }
        });

        info!("OS signal handlers installed (Ctrl+C only)");
        Ok(())
    }
}

impl Default for ShutdownSignal {
    fn default() -> Self {
        Self::new()
    }
}
