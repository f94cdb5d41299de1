use super::*;
use tempfile::TempDir;

fn pid_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dbvault.pid");
    (dir, path)
}

#[test]
fn test_acquire_writes_current_pid() {
    let (_dir, path) = pid_path();
    let lock = InstanceLock::acquire(&path).unwrap();

    assert_eq!(lock.pid(), std::process::id());
    assert_eq!(read_pid(&path).unwrap(), Some(std::process::id()));
}

#[test]
fn test_drop_removes_pid_file() {
    let (_dir, path) = pid_path();
    {
        let _lock = InstanceLock::acquire(&path).unwrap();
        assert!(path.exists());
    }
    assert!(!path.exists());
}

#[test]
fn test_release_removes_pid_file() {
    let (_dir, path) = pid_path();
    let lock = InstanceLock::acquire(&path).unwrap();
    lock.release().unwrap();
    assert!(!path.exists());
}

#[cfg(unix)]
#[test]
fn test_live_holder_blocks_second_instance() {
    let (_dir, path) = pid_path();
    // PID 1 always exists on unix.
    std::fs::write(&path, "1").unwrap();

    let result = InstanceLock::acquire(&path);
    assert!(matches!(
        result,
        Err(DaemonError::AlreadyRunning { pid: 1, .. })
    ));
    // The other instance's file is left alone.
    assert_eq!(read_pid(&path).unwrap(), Some(1));
}

#[test]
fn test_stale_pid_file_is_replaced() {
    let (_dir, path) = pid_path();
    // Above the default pid_max, so never a live process.
    std::fs::write(&path, "4194304").unwrap();

    let lock = InstanceLock::acquire(&path).unwrap();
    assert_eq!(read_pid(&path).unwrap(), Some(lock.pid()));
}

#[test]
fn test_empty_pid_file_is_stale() {
    let (_dir, path) = pid_path();
    std::fs::write(&path, "").unwrap();
    assert!(InstanceLock::acquire(&path).is_ok());
}

#[test]
fn test_garbage_pid_file_is_an_error() {
    let (_dir, path) = pid_path();
    std::fs::write(&path, "not-a-pid").unwrap();
    assert!(matches!(
        InstanceLock::acquire(&path),
        Err(DaemonError::LockRead { .. })
    ));
}

#[test]
fn test_creates_parent_directory() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join(".dbvault").join("run").join("dbvault.pid");
    let _lock = InstanceLock::acquire(&path).unwrap();
    assert!(path.exists());
}

#[test]
fn test_read_pid_missing_file() {
    let (_dir, path) = pid_path();
    assert_eq!(read_pid(&path).unwrap(), None);
}

#[cfg(unix)]
#[test]
fn test_is_process_running_self() {
    assert!(is_process_running(std::process::id()));
}
