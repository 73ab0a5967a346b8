//! Folding the rows of one node aggregate into a [`NodeAggregate`].

use std::sync::Arc;

use crate::config::DisabledCoordinatePolicy;
use crate::model::*;
use crate::row::{Row, columns};
use crate::{Error, Result};
use super::NodeFactory;

/// Accumulation state of one aggregate during a single fold.
///
/// Each row contributes exactly one (origin, covered) pairing. Scalars are
/// first-seen-wins; the point maps are keyed by content hash.
pub(super) struct AggregateAccumulator<'f> {
    factory: &'f NodeFactory,
    visibility_constraints: VisibilityConstraints,
    content_stream_id: Option<ContentStreamId>,
    node_aggregate_id: Option<NodeAggregateId>,
    classification: Option<NodeAggregateClassification>,
    node_type_name: Option<NodeTypeName>,
    node_name: Option<NodeName>,
    occupied: OriginDimensionSpacePointSet,
    nodes_by_occupied: PointMap<OriginDimensionSpacePoint, Arc<Node>>,
    coverage_by_origin: CoverageByOrigin,
    covered: DimensionSpacePointSet,
    nodes_by_covered: PointMap<DimensionSpacePoint, Arc<Node>>,
    origin_by_coverage: OriginByCoverage,
    disabled: DimensionSpacePointSet,
}

impl<'f> AggregateAccumulator<'f> {
    /// `content_stream_id` pins the stream for every row; `None` pins it to
    /// the first accumulated row's column.
    pub(super) fn new(
        factory: &'f NodeFactory,
        visibility_constraints: VisibilityConstraints,
        content_stream_id: Option<ContentStreamId>,
    ) -> Self {
        Self {
            factory,
            visibility_constraints,
            content_stream_id,
            node_aggregate_id: None,
            classification: None,
            node_type_name: None,
            node_name: None,
            occupied: PointSet::new(),
            nodes_by_occupied: PointMap::new(),
            coverage_by_origin: CoverageByOrigin::new(),
            covered: PointSet::new(),
            nodes_by_covered: PointMap::new(),
            origin_by_coverage: OriginByCoverage::new(),
            disabled: PointSet::new(),
        }
    }

    pub(super) fn accumulate(&mut self, row: &Row) -> Result<()> {
        let content_stream_id = match &self.content_stream_id {
            Some(id) => id.clone(),
            None => {
                let id = ContentStreamId::from_string(row.require(columns::CONTENT_STREAM_ID)?)?;
                self.content_stream_id = Some(id.clone());
                id
            }
        };
        // The node is viewed through the point this row covers.
        let covered = DimensionSpacePoint::from_json_str(row.require(columns::DIMENSION_SPACE_POINT)?)?;
        let node = Arc::new(self.factory.map_node_row_to_node(
            row,
            self.visibility_constraints,
            Some(&covered),
            Some(&content_stream_id),
        )?);

        if self.node_aggregate_id.is_none() {
            self.node_aggregate_id = Some(node.node_aggregate_id.clone());
        }
        if self.classification.is_none() {
            self.classification = Some(node.classification);
        }
        if self.node_type_name.is_none() {
            self.node_type_name = Some(node.node_type_name.clone());
        }
        if self.node_name.is_none() {
            self.node_name = node.node_name.clone();
        }

        let origin = node.origin_dimension_space_point.clone();
        self.occupied.insert(origin.clone());
        self.nodes_by_occupied.insert(origin.clone(), Arc::clone(&node));

        self.coverage_by_origin.add(origin.clone(), covered.clone());
        self.covered.insert(covered.clone());
        self.nodes_by_covered.insert(covered.clone(), node);
        self.origin_by_coverage.assign(covered.clone(), origin);

        if let Some(hash) = row.non_empty(columns::DISABLED_DIMENSION_SPACE_POINT_HASH) {
            let disabled = self.resolve_disabled(hash, &covered)?;
            self.disabled.insert(disabled);
        }
        Ok(())
    }

    fn resolve_disabled(&self, hash: &str, covered: &DimensionSpacePoint) -> Result<DimensionSpacePoint> {
        let resolved = match self.factory.config().disabled_coordinates {
            DisabledCoordinatePolicy::Strict => (covered.hash() == hash).then(|| covered.clone()),
            DisabledCoordinatePolicy::Lenient => self.covered.get_by_hash(hash).cloned(),
        };
        resolved.ok_or_else(|| Error::UnresolvedDisabledCoordinate {
            node_aggregate_id: self
                .node_aggregate_id
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            hash: hash.to_owned(),
        })
    }

    /// `None` if no row was accumulated.
    pub(super) fn finish(self) -> Option<NodeAggregate> {
        let (Some(content_stream_id), Some(node_aggregate_id), Some(classification), Some(node_type_name)) = (
            self.content_stream_id,
            self.node_aggregate_id,
            self.classification,
            self.node_type_name,
        ) else {
            return None;
        };
        Some(NodeAggregate {
            content_stream_id,
            node_aggregate_id,
            classification,
            node_type_name,
            node_name: self.node_name,
            occupied_dimension_space_points: self.occupied,
            nodes_by_occupied_dimension_space_point: self.nodes_by_occupied,
            coverage_by_origin: self.coverage_by_origin,
            covered_dimension_space_points: self.covered,
            nodes_by_covered_dimension_space_point: self.nodes_by_covered,
            origin_by_coverage: self.origin_by_coverage,
            disabled_dimension_space_points: self.disabled,
        })
    }
}

impl NodeFactory {
    /// Fold the rows of a single node aggregate.
    ///
    /// All rows must belong to the same aggregate and content stream; this
    /// is assumed, not checked. Empty input means "no such aggregate" and
    /// yields `Ok(None)`.
    pub fn map_node_rows_to_node_aggregate<'r>(
        &self,
        rows: impl IntoIterator<Item = &'r Row>,
        visibility_constraints: VisibilityConstraints,
    ) -> Result<Option<NodeAggregate>> {
        let mut accumulator = AggregateAccumulator::new(self, visibility_constraints, None);
        let mut count = 0usize;
        for row in rows {
            accumulator.accumulate(row)?;
            count += 1;
        }
        let aggregate = accumulator.finish();
        tracing::debug!(
            rows = count,
            node_aggregate_id = aggregate.as_ref().map(|a| a.node_aggregate_id.as_str()),
            "mapped node aggregate"
        );
        Ok(aggregate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FactoryConfig;
    use crate::factory::tests::{factory, row};

    fn dsp(lang: &str) -> DimensionSpacePoint {
        DimensionSpacePoint::from_pairs([("language", lang)])
    }

    fn origin(lang: &str) -> OriginDimensionSpacePoint {
        OriginDimensionSpacePoint::from_pairs([("language", lang)])
    }

    #[test]
    fn test_empty_is_none() {
        let rows: Vec<Row> = Vec::new();
        assert!(factory()
            .map_node_rows_to_node_aggregate(&rows, VisibilityConstraints::frontend())
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_origin_and_coverage() {
        let rows = vec![row("a", "de", "de"), row("a", "de", "gsw"), row("a", "en", "en")];
        let aggregate = factory()
            .map_node_rows_to_node_aggregate(&rows, VisibilityConstraints::frontend())
            .unwrap()
            .unwrap();

        assert_eq!(aggregate.occupied_dimension_space_points.len(), 2);
        assert_eq!(aggregate.covered_dimension_space_points.len(), 3);
        assert_eq!(aggregate.coverage_by_occupant(&origin("de")).map(PointSet::len), Some(2));
        assert_eq!(aggregate.occupation_by_covered(&dsp("gsw")), Some(&origin("de")));
        let gsw = aggregate.node_by_covered(&dsp("gsw")).unwrap();
        assert_eq!(gsw.origin_dimension_space_point, origin("de"));
        assert_eq!(gsw.dimension_space_point(), &dsp("gsw"));
        assert!(aggregate.disabled_dimension_space_points.is_empty());
    }

    #[test]
    fn test_first_non_empty_name_wins() {
        let rows = vec![
            row("a", "de", "de"),
            row("a", "en", "en").with(columns::NODE_NAME, "main"),
            row("a", "fr", "fr").with(columns::NODE_NAME, "other"),
        ];
        let aggregate = factory()
            .map_node_rows_to_node_aggregate(&rows, VisibilityConstraints::frontend())
            .unwrap()
            .unwrap();
        assert_eq!(aggregate.node_name.as_ref().map(NodeName::as_str), Some("main"));
    }

    #[test]
    fn test_disabled_strict() {
        let hash = dsp("gsw").hash().to_owned();
        let rows = vec![
            row("a", "de", "de"),
            row("a", "de", "gsw").with(columns::DISABLED_DIMENSION_SPACE_POINT_HASH, hash),
        ];
        let aggregate = factory()
            .map_node_rows_to_node_aggregate(&rows, VisibilityConstraints::without_restrictions())
            .unwrap()
            .unwrap();
        assert!(aggregate.disables(&dsp("gsw")));
        assert!(!aggregate.disables(&dsp("de")));
    }

    #[test]
    fn test_disabled_foreign_hash_rejected_when_strict() {
        let hash = dsp("de").hash().to_owned();
        let rows = vec![
            row("a", "de", "de"),
            row("a", "de", "gsw").with(columns::DISABLED_DIMENSION_SPACE_POINT_HASH, hash),
        ];
        assert!(matches!(
            factory().map_node_rows_to_node_aggregate(&rows, VisibilityConstraints::frontend()),
            Err(Error::UnresolvedDisabledCoordinate { .. })
        ));
    }

    #[test]
    fn test_disabled_lenient_resolves_earlier_point() {
        let lenient = NodeFactory {
            config: FactoryConfig::default().with_disabled_coordinates(DisabledCoordinatePolicy::Lenient),
            ..factory()
        };
        let rows = vec![
            row("a", "de", "de"),
            row("a", "de", "gsw").with(columns::DISABLED_DIMENSION_SPACE_POINT_HASH, dsp("de").hash()),
        ];
        let aggregate = lenient
            .map_node_rows_to_node_aggregate(&rows, VisibilityConstraints::frontend())
            .unwrap()
            .unwrap();
        assert!(aggregate.disables(&dsp("de")));

        let unseen = vec![row("a", "de", "de").with(columns::DISABLED_DIMENSION_SPACE_POINT_HASH, "ffff")];
        assert!(lenient
            .map_node_rows_to_node_aggregate(&unseen, VisibilityConstraints::frontend())
            .is_err());
    }

    #[test]
    fn test_conflicting_origin_later_wins() {
        let rows = vec![row("a", "de", "gsw"), row("a", "en", "gsw")];
        let aggregate = factory()
            .map_node_rows_to_node_aggregate(&rows, VisibilityConstraints::frontend())
            .unwrap()
            .unwrap();
        assert_eq!(aggregate.occupation_by_covered(&dsp("gsw")), Some(&origin("en")));
        assert_eq!(
            aggregate.node_by_covered(&dsp("gsw")).unwrap().origin_dimension_space_point,
            origin("en")
        );
    }
}
