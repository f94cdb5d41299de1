use super::*;
use tempfile::TempDir;

#[test]
fn test_export_file_name() {
    assert_eq!(export_file_name("users"), "users.json");
    assert_eq!(export_file_name("system.views"), "system.views.json");
}

#[test]
fn test_export_file_name_sanitizes_separators() {
    assert_eq!(export_file_name("a/b"), "a_b.json");
    assert_eq!(export_file_name("..\\etc"), ".._etc.json");
    assert_eq!(export_file_name(".."), "_...json");
    assert_eq!(export_file_name(""), "_.json");
}

fn names(collections: &[&str]) -> Vec<String> {
    collections.iter().map(|c| c.to_string()).collect()
}

#[test]
fn test_files_for_stays_inside_root() {
    let ws = TempWorkspace::new("/srv/tmp");
    let files = ws.files_for(&names(&["orders", "../orders"]));
    assert_eq!(files[0], PathBuf::from("/srv/tmp/orders.json"));
    assert_eq!(files[1].parent(), Some(Path::new("/srv/tmp")));
}

#[test]
fn test_files_for_disambiguates_collisions() {
    let ws = TempWorkspace::new("/srv/tmp");
    let files = ws.files_for(&names(&["a/b", "a_b", "a\\b", "a_b-2"]));
    assert_eq!(
        files,
        vec![
            PathBuf::from("/srv/tmp/a_b.json"),
            PathBuf::from("/srv/tmp/a_b-2.json"),
            PathBuf::from("/srv/tmp/a_b-3.json"),
            PathBuf::from("/srv/tmp/a_b-2-2.json"),
        ]
    );
}

#[tokio::test]
async fn test_ensure_creates_nested_directory() {
    let dir = TempDir::new().unwrap();
    let ws = TempWorkspace::new(dir.path().join("a").join("b"));
    ws.ensure().await.unwrap();
    assert!(ws.root().is_dir());
}

#[tokio::test]
async fn test_clear_removes_files_and_leaves_directories() {
    let dir = TempDir::new().unwrap();
    let ws = TempWorkspace::new(dir.path());

    std::fs::write(dir.path().join("users.json"), "[]").unwrap();
    std::fs::write(dir.path().join("orders.json"), "[{}]").unwrap();
    std::fs::create_dir(dir.path().join("stray")).unwrap();
    std::fs::write(dir.path().join("stray").join("x"), "x").unwrap();

    let report = ws.clear().await;
    assert_eq!(report.removed, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.skipped, 1);
    assert_eq!(ws.entries().await.unwrap(), vec![dir.path().join("stray")]);
    assert!(dir.path().join("stray").join("x").exists());
}

#[tokio::test]
async fn test_clear_keeps_nested_backup_directory() {
    let dir = TempDir::new().unwrap();
    let ws = TempWorkspace::new(dir.path());
    let backups = dir.path().join("backups");
    std::fs::create_dir(&backups).unwrap();
    std::fs::write(backups.join("2024-03-07.zip"), "zip").unwrap();

    ws.clear().await;
    assert!(backups.join("2024-03-07.zip").exists());
}

#[tokio::test]
async fn test_clear_missing_directory_is_noop() {
    let dir = TempDir::new().unwrap();
    let ws = TempWorkspace::new(dir.path().join("missing"));
    assert_eq!(ws.clear().await, ClearReport::default());
    assert!(ws.entries().await.unwrap().is_empty());
}

// procfs refuses unlink for every uid, so each file entry fails to remove.
#[cfg(target_os = "linux")]
#[tokio::test]
async fn test_clear_swallows_per_entry_failures() {
    let proc_self = Path::new("/proc/self");
    if !proc_self.join("status").exists() {
        return;
    }
    let ws = TempWorkspace::new(proc_self);

    let report = ws.clear().await;
    assert_eq!(report.removed, 0);
    assert!(report.failed > 0);
    assert!(report.skipped > 0);
    assert!(proc_self.join("status").exists());
}

#[tokio::test]
async fn test_entries_sorted() {
    let dir = TempDir::new().unwrap();
    let ws = TempWorkspace::new(dir.path());
    std::fs::write(dir.path().join("b.json"), "[]").unwrap();
    std::fs::write(dir.path().join("a.json"), "[]").unwrap();

    let entries = ws.entries().await.unwrap();
    assert_eq!(entries, vec![dir.path().join("a.json"), dir.path().join("b.json")]);
}
