//! End-to-end tests for node aggregate materialization.
//!
//! Rows are built the way the projection emits them: one row per
//! (origin, covered) pairing, unsorted, with the dimension space spanning
//! language × market.

use std::sync::Arc;

use contentgraph::row::columns;
use contentgraph::{
    DimensionSpacePoint, Error, InMemoryNodeTypeManager, NodeAggregateClassification, NodeFactory,
    OriginDimensionSpacePoint, Row, Value, VisibilityConstraints,
};
use pretty_assertions::assert_eq;

// ============================================================================
// Helpers
// ============================================================================

const NODE_TYPES: &str = r#"{
    "Acme:Document": { "abstract": true, "properties": { "title": { "type": "string" } } },
    "Acme:Page": { "superTypes": { "Acme:Document": true }, "properties": { "published": { "type": "DateTime" } } },
    "Acme:Root": {}
}"#;

fn factory() -> NodeFactory {
    let types = InMemoryNodeTypeManager::from_json_str(NODE_TYPES).unwrap();
    NodeFactory::with_node_type_manager(Arc::new(types))
}

fn point(language: &str, market: &str) -> DimensionSpacePoint {
    DimensionSpacePoint::from_pairs([("language", language), ("market", market)])
}

fn origin(language: &str, market: &str) -> OriginDimensionSpacePoint {
    point(language, market).into()
}

fn page_row(aggregate: &str, origin: (&str, &str), covered: (&str, &str), title: &str) -> Row {
    Row::new()
        .with(columns::CONTENT_STREAM_ID, "live")
        .with(columns::NODE_AGGREGATE_ID, aggregate)
        .with(columns::ORIGIN_DIMENSION_SPACE_POINT, point(origin.0, origin.1).to_json())
        .with(columns::DIMENSION_SPACE_POINT, point(covered.0, covered.1).to_json())
        .with(columns::CLASSIFICATION, "regular")
        .with(columns::NODE_TYPE_NAME, "Acme:Page")
        .with(
            columns::PROPERTIES,
            format!(r#"{{"title":{{"value":"{title}","type":"string"}},"published":{{"value":"2021-03-04T10:00:00+00:00","type":"DateTime"}}}}"#),
        )
        .with(columns::NODE_NAME, "home")
}

/// de/ch authored at de/de and inherited by de/ch and de/at; en/uk authored
/// on its own; de/at disabled.
fn home_rows() -> Vec<Row> {
    let disabled_at = point("de", "at").hash().to_owned();
    vec![
        page_row("home", ("de", "de"), ("de", "ch"), "Startseite"),
        page_row("home", ("en", "uk"), ("en", "uk"), "Home"),
        page_row("home", ("de", "de"), ("de", "de"), "Startseite"),
        page_row("home", ("de", "de"), ("de", "at"), "Startseite")
            .with(columns::DISABLED_DIMENSION_SPACE_POINT_HASH, disabled_at),
    ]
}

// ============================================================================
// 1. Occupation and coverage
// ============================================================================

#[test]
fn test_occupation_and_coverage() {
    let aggregate = factory()
        .map_node_rows_to_node_aggregate(&home_rows(), VisibilityConstraints::without_restrictions())
        .unwrap()
        .expect("non-empty rows yield an aggregate");

    assert_eq!(aggregate.node_aggregate_id.as_str(), "home");
    assert_eq!(aggregate.content_stream_id.as_str(), "live");
    assert_eq!(aggregate.classification, NodeAggregateClassification::Regular);
    assert_eq!(aggregate.node_type_name.as_str(), "Acme:Page");
    assert_eq!(aggregate.node_name.as_ref().map(|n| n.as_str()), Some("home"));

    let occupied: Vec<_> = aggregate.occupied_dimension_space_points.iter().cloned().collect();
    assert_eq!(occupied, vec![origin("de", "de"), origin("en", "uk")]);

    assert_eq!(aggregate.covered_dimension_space_points.len(), 4);
    for covered in [point("de", "ch"), point("de", "de"), point("de", "at")] {
        assert_eq!(aggregate.occupation_by_covered(&covered), Some(&origin("de", "de")));
    }
    assert_eq!(aggregate.occupation_by_covered(&point("en", "uk")), Some(&origin("en", "uk")));
    assert_eq!(
        aggregate.coverage_by_occupant(&origin("de", "de")).map(|s| s.len()),
        Some(3)
    );
}

// ============================================================================
// 2. Nodes are viewed through the covered point
// ============================================================================

#[test]
fn test_nodes_by_covered_are_viewed_there() {
    let aggregate = factory()
        .map_node_rows_to_node_aggregate(&home_rows(), VisibilityConstraints::frontend())
        .unwrap()
        .unwrap();

    let swiss = aggregate.node_by_covered(&point("de", "ch")).unwrap();
    assert_eq!(swiss.origin_dimension_space_point, origin("de", "de"));
    assert_eq!(swiss.dimension_space_point(), &point("de", "ch"));
    assert_eq!(swiss.property("title").unwrap(), Some(Value::from("Startseite")));
    assert!(swiss.node_type.is_of_type("Acme:Document"));

    let english = aggregate.node_by_occupied(&origin("en", "uk")).unwrap();
    assert_eq!(english.property("title").unwrap(), Some(Value::from("Home")));
    assert!(matches!(english.property("published").unwrap(), Some(Value::DateTime(_))));

    assert_eq!(aggregate.nodes().count(), 2);
}

// ============================================================================
// 3. Disabled points
// ============================================================================

#[test]
fn test_disabled_points_are_subset_of_covered() {
    let aggregate = factory()
        .map_node_rows_to_node_aggregate(&home_rows(), VisibilityConstraints::without_restrictions())
        .unwrap()
        .unwrap();

    assert!(aggregate.disables(&point("de", "at")));
    assert!(!aggregate.disables(&point("de", "ch")));
    assert_eq!(aggregate.disabled_dimension_space_points.len(), 1);
    assert!(aggregate
        .disabled_dimension_space_points
        .is_subset_of(&aggregate.covered_dimension_space_points));
}

// ============================================================================
// 4. Row order does not change the result
// ============================================================================

#[test]
fn test_row_order_is_irrelevant_for_sets() {
    let mut reversed = home_rows();
    reversed.reverse();
    let factory = factory();
    let forward = factory
        .map_node_rows_to_node_aggregate(&home_rows(), VisibilityConstraints::frontend())
        .unwrap()
        .unwrap();
    let backward = factory
        .map_node_rows_to_node_aggregate(&reversed, VisibilityConstraints::frontend())
        .unwrap()
        .unwrap();

    assert_eq!(forward.occupied_dimension_space_points, backward.occupied_dimension_space_points);
    assert_eq!(forward.covered_dimension_space_points, backward.covered_dimension_space_points);
    assert_eq!(forward.origin_by_coverage, backward.origin_by_coverage);
    assert_eq!(forward.disabled_dimension_space_points, backward.disabled_dimension_space_points);
}

// ============================================================================
// 5. Root aggregates in a dimensionless space
// ============================================================================

#[test]
fn test_root_aggregate_without_dimensions() {
    let row = Row::new()
        .with(columns::CONTENT_STREAM_ID, "live")
        .with(columns::NODE_AGGREGATE_ID, "sites")
        .with(columns::ORIGIN_DIMENSION_SPACE_POINT, "{}")
        .with(columns::DIMENSION_SPACE_POINT, "{}")
        .with(columns::CLASSIFICATION, "root")
        .with(columns::NODE_TYPE_NAME, "Acme:Root")
        .with(columns::PROPERTIES, "[]")
        .with_null(columns::NODE_NAME);
    let aggregate = factory()
        .map_node_rows_to_node_aggregate([&row], VisibilityConstraints::frontend())
        .unwrap()
        .unwrap();

    assert!(aggregate.is_root());
    assert_eq!(aggregate.node_name, None);
    assert!(aggregate.covers(&DimensionSpacePoint::empty()));
    assert!(aggregate.node_by_covered(&DimensionSpacePoint::empty()).unwrap().properties.is_empty());
}

// ============================================================================
// 6. Malformed rows abort the whole materialization
// ============================================================================

#[test]
fn test_malformed_covered_point_aborts() {
    let mut rows = home_rows();
    rows.push(page_row("home", ("de", "de"), ("de", "li"), "x").with(columns::DIMENSION_SPACE_POINT, "{oops"));
    assert!(matches!(
        factory().map_node_rows_to_node_aggregate(&rows, VisibilityConstraints::frontend()),
        Err(Error::MalformedCoordinate { .. })
    ));
}

#[test]
fn test_unknown_type_aborts() {
    let mut rows = home_rows();
    rows.push(page_row("home", ("fr", "fr"), ("fr", "fr"), "x").with(columns::NODE_TYPE_NAME, "Acme:Gone"));
    assert!(matches!(
        factory().map_node_rows_to_node_aggregate(&rows, VisibilityConstraints::frontend()),
        Err(Error::UnknownNodeType(name)) if name == "Acme:Gone"
    ));
}

#[test]
fn test_invalid_classification_aborts() {
    let rows = vec![page_row("home", ("de", "de"), ("de", "de"), "x").with(columns::CLASSIFICATION, "orphan")];
    assert!(matches!(
        factory().map_node_rows_to_node_aggregate(&rows, VisibilityConstraints::frontend()),
        Err(Error::InvalidClassification(c)) if c == "orphan"
    ));
}
