//! Data-source protocol and severity fan-out

use crate::integration::test_utils::{fixture_backend, keys, ScriptedBackend};
use drilldown::backend::InventoryBackend;
use drilldown::source::COLUMNS;
use drilldown::{
    BackendError, CompoundId, DataSource, InventoryDataSource, QueryError, ResolverConfig,
};
use std::sync::Arc;
use std::time::Duration;

fn slow_view_20(concurrency: usize) -> (Arc<ScriptedBackend>, InventoryDataSource) {
    // Earlier elements in name order answer last
    let backend = Arc::new(
        ScriptedBackend::new(fixture_backend())
            .with_element_delay(CompoundId::new(1, 21), Duration::from_millis(60))
            .with_element_delay(CompoundId::new(1, 33), Duration::from_millis(40))
            .with_element_delay(CompoundId::new(1, 31), Duration::from_millis(20)),
    );
    let source = InventoryDataSource::new(
        backend.clone() as Arc<dyn InventoryBackend>,
        ResolverConfig {
            severity_concurrency: concurrency,
        },
    );
    (backend, source)
}

#[tokio::test]
async fn test_host_protocol_single_page() {
    let mut source: Box<dyn DataSource> = Box::new(InventoryDataSource::new(
        fixture_backend(),
        ResolverConfig::default(),
    ));
    assert_eq!(source.columns(), &COLUMNS);
    assert_eq!(source.input_arguments().len(), 1);

    source.on_arguments_processed(Some("View:5".to_string()));
    let page = source.next_page().await.unwrap();
    assert!(!page.has_next_page);
    assert_eq!(page.rows.len(), 6);

    // Arguments are replaced, not accumulated
    source.on_arguments_processed(None);
    let page = source.next_page().await.unwrap();
    assert_eq!(page.rows[0].key(), None);
}

#[tokio::test]
async fn test_concurrent_lookups_rejoin_in_sorted_order() {
    let (backend, mut source) = slow_view_20(4);
    source.on_arguments_processed(Some("View:20".to_string()));
    let page = source.next_page().await.unwrap();

    assert_eq!(
        keys(&page.rows[2..6]),
        vec![
            Some("Element:1/21"),
            Some("Element:1/33"),
            Some("Element:1/31"),
            Some("Element:1/32"),
        ]
    );
    assert_eq!(backend.max_in_flight(), 4);
}

#[tokio::test]
async fn test_concurrency_of_one_is_sequential() {
    let (backend, mut source) = slow_view_20(1);
    source.on_arguments_processed(Some("View:20".to_string()));
    let concurrent = source.next_page().await.unwrap();
    assert_eq!(backend.max_in_flight(), 1);

    let (_, mut reference) = slow_view_20(8);
    reference.on_arguments_processed(Some("View:20".to_string()));
    assert_eq!(concurrent, reference.next_page().await.unwrap());
}

#[tokio::test]
async fn test_backend_failure_fails_whole_page() {
    let backend = Arc::new(
        ScriptedBackend::new(fixture_backend()).failing_element_state(CompoundId::new(1, 20)),
    );
    let mut source = InventoryDataSource::new(backend, ResolverConfig::default());
    source.on_arguments_processed(Some("View:5".to_string()));

    match source.next_page().await {
        Err(QueryError::Backend(BackendError::Status { status, .. })) => assert_eq!(status, 503),
        other => panic!("expected backend status error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_every_row_looks_up_severity_once() {
    let backend = Arc::new(ScriptedBackend::new(fixture_backend()));
    let mut source = InventoryDataSource::new(
        backend.clone() as Arc<dyn InventoryBackend>,
        ResolverConfig::default(),
    );
    source.on_arguments_processed(Some("View:5".to_string()));
    let page = source.next_page().await.unwrap();

    let data_rows = page.rows.iter().filter(|r| !r.is_separator()).count();
    assert_eq!(backend.state_calls(), data_rows);
}
