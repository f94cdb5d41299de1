//! Single-instance lock backed by a PID file.

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::error::DaemonError;

/// Held for the life of the daemon; removes its PID file on drop.
///
/// A PID file whose process is gone is treated as stale and replaced.
#[derive(Debug)]
pub struct InstanceLock {
    path: PathBuf,
    pid: u32,
    held: bool,
}

impl InstanceLock {
    /// Take the lock for the current process.
    pub fn acquire(path: impl AsRef<Path>) -> Result<Self, DaemonError> {
        Self::acquire_for(path, std::process::id())
    }

    /// Take the lock on behalf of `pid`.
    pub fn acquire_for(path: impl AsRef<Path>, pid: u32) -> Result<Self, DaemonError> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| DaemonError::LockCreation {
                path: path.clone(),
                reason: format!("Failed to create parent directory: {}", e),
            })?;
        }

        // Two attempts: the second follows removal of a stale file.
        for _ in 0..2 {
            match Self::create_exclusive(&path, pid) {
                Ok(()) => {
                    info!("PID file created: {} (PID: {})", path.display(), pid);
                    return Ok(Self {
                        path,
                        pid,
                        held: true,
                    });
                }
                Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                    let existing = read_pid(&path)?;
                    match existing {
                        Some(other) if other != pid && is_process_running(other) => {
                            return Err(DaemonError::AlreadyRunning { path, pid: other });
                        }
                        _ => {
                            warn!("Removing stale PID file: {}", path.display());
                            remove(&path)?;
                        }
                    }
                }
                Err(e) => {
                    return Err(DaemonError::LockCreation {
                        path,
                        reason: e.to_string(),
                    });
                }
            }
        }

        Err(DaemonError::LockCreation {
            path,
            reason: "PID file reappeared while replacing a stale one".to_string(),
        })
    }

    fn create_exclusive(path: &Path, pid: u32) -> std::io::Result<()> {
        let mut file = OpenOptions::new().write(true).create_new(true).open(path)?;
        write!(file, "{}", pid)?;
        file.sync_all()
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pid(&self) -> u32 {
        self.pid
    }

    /// Remove the PID file now instead of on drop.
    pub fn release(mut self) -> Result<(), DaemonError> {
        self.held = false;
        remove(&self.path)?;
        info!("PID file removed: {}", self.path.display());
        Ok(())
    }
}

impl Drop for InstanceLock {
    fn drop(&mut self) {
        if self.held {
            if let Err(e) = remove(&self.path) {
                warn!("Failed to remove PID file on drop: {}", e);
            }
        }
    }
}

/// PID recorded in `path`, if the file exists.
pub fn read_pid(path: &Path) -> Result<Option<u32>, DaemonError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(DaemonError::LockRead {
                path: path.to_path_buf(),
                reason: e.to_string(),
            });
        }
    };

    let trimmed = contents.trim();
    if trimmed.is_empty() {
        // Writer died between create and write.
        return Ok(None);
    }
    trimmed
        .parse::<u32>()
        .map(Some)
        .map_err(|e| DaemonError::LockRead {
            path: path.to_path_buf(),
            reason: format!("Invalid PID format: {}", e),
        })
}

fn remove(path: &Path) -> Result<(), DaemonError> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(DaemonError::LockRemoval {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }),
    }
}

/// Whether a process with `pid` exists.
#[cfg(unix)]
pub fn is_process_running(pid: u32) -> bool {
    use nix::errno::Errno;
    use nix::sys::signal::kill;
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return false;
    };
    // Signal 0 only checks existence; EPERM means it exists under another user.
    match kill(Pid::from_raw(raw), None) {
        Ok(()) => true,
        Err(Errno::EPERM) => true,
        Err(_) => false,
    }
}

#[cfg(not(unix))]
pub fn is_process_running(_pid: u32) -> bool {
    true
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;
