//! Service-level resolution

use crate::integration::test_utils::{fixture_backend, keys, resolver};
use drilldown::{CompoundId, QueryError, RowType, Severity};

#[tokio::test]
async fn test_service_members_in_definition_order() {
    let rows = resolver(fixture_backend())
        .resolve_filter(Some("Service:2/7"))
        .await
        .unwrap();

    // Containing views keep backend order, members keep definition order,
    // excluded members are dropped
    assert_eq!(
        keys(&rows),
        vec![
            Some("View:5"),
            Some("View:1"),
            Some("Service:2/7"),
            Some("Service:2/8"),
            Some("Element:1/20"),
        ]
    );
    assert!(rows[2].is_separator());
    assert_eq!(rows[3].row_type(), RowType::Service);
    assert_eq!(rows[3].name(), Some("Svc2"));
    assert_eq!(rows[3].severity(), Severity::Information);
    assert_eq!(rows[4].row_type(), RowType::Element);
    assert_eq!(rows[4].severity(), Severity::Normal);
    assert_eq!(rows[0].severity(), Severity::Major);
    assert_eq!(rows[1].severity(), Severity::Minor);
}

#[tokio::test]
async fn test_service_with_no_members_or_views() {
    let rows = resolver(fixture_backend())
        .resolve_filter(Some("Service:2/8"))
        .await
        .unwrap();
    assert_eq!(keys(&rows), vec![Some("View:20"), Some("Service:2/8")]);
}

#[tokio::test]
async fn test_unknown_service_fails() {
    let result = resolver(fixture_backend())
        .resolve_filter(Some("Service:9/9"))
        .await;
    match result {
        Err(QueryError::ServiceNotFound(id)) => assert_eq!(id, CompoundId::new(9, 9)),
        other => panic!("expected ServiceNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_missing_member_fails_whole_query() {
    let result = resolver(fixture_backend())
        .resolve_filter(Some("Service:2/9"))
        .await;
    match result {
        Err(e @ QueryError::ElementNotFound(_)) => {
            assert!(e.is_not_found());
            assert!(e.to_string().contains("9/99"));
        }
        other => panic!("expected ElementNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_service_token_requires_compound_id() {
    let result = resolver(fixture_backend())
        .resolve_filter(Some("Service:7"))
        .await;
    assert!(matches!(result, Err(QueryError::UnknownFilter(_))));
}
