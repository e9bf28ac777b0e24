//! Snapshot files through the backend factory

use drilldown::backend::{BackendConfig, BackendFactory, BackendKind, InventoryBackend};
use drilldown::{BackendError, HierarchyResolver, QueryError, ResolverConfig, Severity};
use tempfile::TempDir;

fn snapshot_config(path: std::path::PathBuf) -> BackendConfig {
    BackendConfig {
        kind: BackendKind::Snapshot,
        snapshot_path: Some(path),
        ..BackendConfig::default()
    }
}

#[tokio::test]
async fn test_toml_snapshot_browses_like_json() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inventory.toml");
    std::fs::write(
        &path,
        r#"
[[views]]
id = -1
name = "Root"
parent_id = -1

[[views]]
id = 4
name = "Studio"
parent_id = -1
severity = "Warning"

[[elements]]
id = "8/1"
name = "Mixer"
views = [4]
severity = "Error"

[[elements.parameters]]
id = 300
name = "Gain"
has_trending_average = true
severity = "Suggestion"
positions = [{ page = "Main", row = 2, column = 1 }]

[[elements.parameters]]
id = 301
name = "Channels"
is_table = true
has_trending_average = true
positions = [{ page = "Main", row = 3, column = 1 }]
"#,
    )
    .unwrap();

    let backend = BackendFactory::create(&snapshot_config(path)).unwrap();
    let resolver = HierarchyResolver::new(backend, ResolverConfig::default());

    let rows = resolver.resolve_filter(Some("View:4")).await.unwrap();
    assert_eq!(rows[0].key(), Some("View:-1"));
    assert_eq!(rows[2].key(), Some("Element:8/1"));
    assert_eq!(rows[2].severity(), Severity::Error);

    let rows = resolver.resolve_filter(Some("Element:8/1")).await.unwrap();
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].severity(), Severity::Warning);
    assert_eq!(rows[2].key(), Some("Parameter:8/1/300"));
    assert_eq!(rows[2].severity(), Severity::Suggestion);
}

#[test]
fn test_unrecognized_severity_code_maps_to_undefined() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inventory.json");
    std::fs::write(
        &path,
        r#"{ "views": [ { "id": -1, "name": "Root", "parent_id": -1, "severity": "Apocalyptic" } ] }"#,
    )
    .unwrap();

    let backend = BackendFactory::create(&snapshot_config(path)).unwrap();
    let rt = tokio::runtime::Runtime::new().unwrap();
    let native = rt.block_on(backend.view_state(-1)).unwrap();
    assert_eq!(Severity::from(native), Severity::Undefined);
}

#[test]
fn test_malformed_snapshot_is_a_backend_error() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("inventory.json");
    std::fs::write(&path, "{ \"views\": [ { \"id\": \"not a number\" } ] }").unwrap();

    match BackendFactory::create(&snapshot_config(path)) {
        Err(QueryError::Backend(BackendError::Snapshot(msg))) => {
            assert!(msg.contains("Invalid JSON snapshot"))
        }
        Err(other) => panic!("expected snapshot error, got {:?}", other),
        Ok(_) => panic!("expected snapshot error"),
    }
}

#[test]
fn test_missing_snapshot_path_rejected_before_loading() {
    let result = BackendFactory::create(&BackendConfig::default());
    assert!(matches!(result, Err(QueryError::ConfigError(_))));
}
