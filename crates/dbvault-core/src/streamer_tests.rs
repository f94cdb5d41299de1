use super::*;
use crate::memory_source::MemorySource;
use serde_json::json;
use tempfile::TempDir;

fn read_array(path: &Path) -> Vec<serde_json::Value> {
    let content = std::fs::read_to_string(path).unwrap();
    serde_json::from_str(&content).unwrap()
}

#[tokio::test]
async fn test_export_n_documents_in_cursor_order() {
    let dir = TempDir::new().unwrap();
    let docs: Vec<_> = (0..250).map(|i| json!({"_id": i, "name": format!("user-{}", i)})).collect();
    let source = MemorySource::new("db").with_collection("users", docs.clone());
    let dest = dir.path().join("users.json");

    let summary = CollectionStreamer::new()
        .export(&source, "users", &dest)
        .await
        .unwrap();

    assert_eq!(summary.documents, 250);
    assert_eq!(summary.collection, "users");
    assert_eq!(summary.bytes, std::fs::metadata(&dest).unwrap().len());
    assert_eq!(read_array(&dest), docs);
}

#[tokio::test]
async fn test_export_empty_collection_is_exactly_brackets() {
    let dir = TempDir::new().unwrap();
    let source = MemorySource::new("db").with_collection("empty", vec![]);
    let dest = dir.path().join("empty.json");

    let summary = CollectionStreamer::new()
        .export(&source, "empty", &dest)
        .await
        .unwrap();

    assert_eq!(summary.documents, 0);
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "[]");
}

#[tokio::test]
async fn test_export_single_document_has_no_separator() {
    let dir = TempDir::new().unwrap();
    let source = MemorySource::new("db").with_collection("one", vec![json!({"a": 1})]);
    let dest = dir.path().join("one.json");

    CollectionStreamer::new()
        .export(&source, "one", &dest)
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), r#"[{"a":1}]"#);
}

#[tokio::test]
async fn test_export_small_buffer() {
    let dir = TempDir::new().unwrap();
    let docs: Vec<_> = (0..50).map(|i| json!({"i": i, "pad": "x".repeat(100)})).collect();
    let source = MemorySource::new("db").with_collection("big", docs.clone());
    let dest = dir.path().join("big.json");

    CollectionStreamer::new()
        .with_buffer_capacity(16)
        .export(&source, "big", &dest)
        .await
        .unwrap();

    assert_eq!(read_array(&dest), docs);
}

#[tokio::test]
async fn test_export_truncates_existing_file() {
    let dir = TempDir::new().unwrap();
    let dest = dir.path().join("users.json");
    std::fs::write(&dest, "x".repeat(4096)).unwrap();
    let source = MemorySource::new("db").with_collection("users", vec![json!(1)]);

    CollectionStreamer::new()
        .export(&source, "users", &dest)
        .await
        .unwrap();

    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "[1]");
}

#[tokio::test]
async fn test_cursor_error_leaves_unterminated_file() {
    let dir = TempDir::new().unwrap();
    let source = MemorySource::new("db")
        .with_collection("orders", vec![json!({"n": 1}), json!({"n": 2}), json!({"n": 3})])
        .with_cursor_failure("orders", 2);
    let dest = dir.path().join("orders.json");

    let err = CollectionStreamer::new()
        .export(&source, "orders", &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Cursor(_)));
    let content = std::fs::read_to_string(&dest).unwrap();
    assert_eq!(content, r#"[{"n":1},{"n":2}"#);
    assert!(!content.ends_with(']'));
    assert!(serde_json::from_str::<serde_json::Value>(&content).is_err());
}

#[tokio::test]
async fn test_open_cursor_failure_surfaces_error() {
    let dir = TempDir::new().unwrap();
    let source = MemorySource::new("db");
    let dest = dir.path().join("ghost.json");

    let err = CollectionStreamer::new()
        .export(&source, "ghost", &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Cursor(_)));
    assert_eq!(std::fs::read_to_string(&dest).unwrap(), "[");
}

#[tokio::test]
async fn test_unwritable_destination() {
    let dir = TempDir::new().unwrap();
    let source = MemorySource::new("db").with_collection("users", vec![]);
    let dest = dir.path().join("missing").join("users.json");

    let err = CollectionStreamer::new()
        .export(&source, "users", &dest)
        .await
        .unwrap_err();

    assert!(matches!(err, ExportError::Io(_)));
}
