//! Element- and parameter-level resolution

use crate::integration::test_utils::{fixture_backend, keys, resolver};
use drilldown::{parse_filter, CompoundId, QueryError, RowType, Severity};

#[tokio::test]
async fn test_element_scenario_lists_displayable_parameters_only() {
    let rows = resolver(fixture_backend())
        .resolve_filter(Some("Element:1/20"))
        .await
        .unwrap();

    assert_eq!(
        keys(&rows),
        vec![
            Some("View:5"),
            Some("Element:1/20"),
            Some("Parameter:1/20/2"),
        ]
    );
    assert!(rows[1].is_separator());

    let parameter = &rows[2];
    assert_eq!(parameter.row_type(), RowType::Parameter);
    assert_eq!(parameter.id(), Some("1/20/2"));
    assert_eq!(parameter.name(), Some("P2"));
    assert_eq!(parameter.severity(), Severity::Major);
}

#[tokio::test]
async fn test_parameter_token_resolves_like_its_element() {
    let resolver = resolver(fixture_backend());
    let element_rows = resolver.resolve_filter(Some("Element:1/20")).await.unwrap();

    for token in ["Parameter:1/20/999", "Parameter:1/20", "Parameter:1/20/2"] {
        let rows = resolver.resolve_filter(Some(token)).await.unwrap();
        assert_eq!(rows.len(), element_rows.len());
        assert_eq!(rows[1].key(), Some(token));
        assert_eq!(rows[0], element_rows[0]);
        assert_eq!(rows[2], element_rows[2]);
    }
}

#[tokio::test]
async fn test_element_in_several_views_without_parameters() {
    let rows = resolver(fixture_backend())
        .resolve_filter(Some("Element:1/21"))
        .await
        .unwrap();
    assert_eq!(
        keys(&rows),
        vec![Some("View:12"), Some("View:20"), Some("Element:1/21")]
    );
    assert_eq!(rows[0].severity(), Severity::Normal);
    assert_eq!(rows[1].severity(), Severity::Undefined);
}

#[tokio::test]
async fn test_unknown_element_fails() {
    let result = resolver(fixture_backend())
        .resolve_filter(Some("Element:7/7"))
        .await;
    match result {
        Err(QueryError::ElementNotFound(id)) => assert_eq!(id, CompoundId::new(7, 7)),
        other => panic!("expected ElementNotFound, got {:?}", other),
    }
}

#[tokio::test]
async fn test_row_keys_drill_down() {
    let resolver = resolver(fixture_backend());
    let rows = resolver.resolve_filter(Some("View:5")).await.unwrap();

    // Every data-row key is itself a valid token that renders back unchanged
    for row in rows.iter().filter(|r| !r.is_separator()) {
        let key = row.key().unwrap();
        let target = parse_filter(Some(key)).unwrap();
        assert_eq!(target.to_string(), key);
        let drilled = resolver.resolve(&target, Some(key)).await.unwrap();
        assert!(drilled.iter().any(|r| r.is_separator() && r.key() == Some(key)));
    }
}
