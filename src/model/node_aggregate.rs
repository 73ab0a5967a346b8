//! NodeAggregate: one logical node across the whole dimension space.

use std::sync::Arc;

use super::{
    ContentStreamId, CoverageByOrigin, DimensionSpacePoint, DimensionSpacePointSet, Node,
    NodeAggregateClassification, NodeAggregateId, NodeName, NodeTypeName,
    OriginByCoverage, OriginDimensionSpacePoint, OriginDimensionSpacePointSet, PointMap,
};

/// All variants of one aggregate in one content stream.
///
/// * `occupied_dimension_space_points`: origins with their own variant
/// * `covered_dimension_space_points`: points where some variant is visible
/// * `coverage_by_origin` / `origin_by_coverage`: the fan-out and fan-in
///   between the two; `origin_by_coverage` is total over the covered set
/// * `disabled_dimension_space_points`: covered points where the aggregate
///   is disabled; always a subset of the covered set
#[derive(Debug, Clone, PartialEq)]
pub struct NodeAggregate {
    pub content_stream_id: ContentStreamId,
    pub node_aggregate_id: NodeAggregateId,
    pub classification: NodeAggregateClassification,
    pub node_type_name: NodeTypeName,
    pub node_name: Option<NodeName>,
    pub occupied_dimension_space_points: OriginDimensionSpacePointSet,
    pub nodes_by_occupied_dimension_space_point: PointMap<OriginDimensionSpacePoint, Arc<Node>>,
    pub coverage_by_origin: CoverageByOrigin,
    pub covered_dimension_space_points: DimensionSpacePointSet,
    pub nodes_by_covered_dimension_space_point: PointMap<DimensionSpacePoint, Arc<Node>>,
    pub origin_by_coverage: OriginByCoverage,
    pub disabled_dimension_space_points: DimensionSpacePointSet,
}

impl NodeAggregate {
    pub fn is_root(&self) -> bool {
        self.classification.is_root()
    }

    pub fn is_tethered(&self) -> bool {
        self.classification.is_tethered()
    }

    pub fn occupies(&self, origin: &OriginDimensionSpacePoint) -> bool {
        self.occupied_dimension_space_points.contains(origin)
    }

    pub fn covers(&self, point: &DimensionSpacePoint) -> bool {
        self.covered_dimension_space_points.contains(point)
    }

    pub fn disables(&self, point: &DimensionSpacePoint) -> bool {
        self.disabled_dimension_space_points.contains(point)
    }

    /// One node per occupied origin, in first-seen order.
    pub fn nodes(&self) -> impl Iterator<Item = &Arc<Node>> {
        self.nodes_by_occupied_dimension_space_point.values()
    }

    pub fn node_by_occupied(&self, origin: &OriginDimensionSpacePoint) -> Option<&Arc<Node>> {
        self.nodes_by_occupied_dimension_space_point.get(origin)
    }

    pub fn node_by_covered(&self, point: &DimensionSpacePoint) -> Option<&Arc<Node>> {
        self.nodes_by_covered_dimension_space_point.get(point)
    }

    /// Points served by the variant authored at `origin`.
    pub fn coverage_by_occupant(&self, origin: &OriginDimensionSpacePoint) -> Option<&DimensionSpacePointSet> {
        self.coverage_by_origin.coverage(origin)
    }

    /// The origin whose variant is visible at `point`.
    pub fn occupation_by_covered(&self, point: &DimensionSpacePoint) -> Option<&OriginDimensionSpacePoint> {
        self.origin_by_coverage.origin(point)
    }
}
