//! Node: one materialized content variant, viewed through a subgraph.

use std::sync::Arc;

use crate::schema::NodeType;
use crate::Result;
use super::{
    ContentSubgraphIdentity, DimensionSpacePoint, NodeAggregateClassification, NodeAggregateId,
    NodeName, NodeTypeName, OriginDimensionSpacePoint, PropertyCollection, PropertyMap, Value,
};

/// A node: the variant of an aggregate authored at one origin point, as
/// seen from the subgraph in [`Node::subgraph_identity`].
///
/// The origin point and the viewed point differ whenever the variant is
/// visible somewhere through inheritance rather than authorship.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub subgraph_identity: ContentSubgraphIdentity,
    pub node_aggregate_id: NodeAggregateId,
    pub origin_dimension_space_point: OriginDimensionSpacePoint,
    pub classification: NodeAggregateClassification,
    pub node_type_name: NodeTypeName,
    pub node_type: Arc<NodeType>,
    pub properties: PropertyCollection,
    pub node_name: Option<NodeName>,
}

/// Ordered node list.
pub type Nodes = Vec<Node>;

impl Node {
    /// The point this instance is being viewed through.
    pub fn dimension_space_point(&self) -> &DimensionSpacePoint {
        &self.subgraph_identity.dimension_space_point
    }

    pub fn is_root(&self) -> bool {
        self.classification.is_root()
    }

    pub fn is_tethered(&self) -> bool {
        self.classification.is_tethered()
    }

    pub fn has_property(&self, name: &str) -> bool {
        self.properties.contains(name)
    }

    /// Converted property value; conversion happens on first access.
    pub fn property(&self, name: &str) -> Result<Option<Value>> {
        self.properties.get(name)
    }

    /// All properties, converted. Fails on the first value that does not convert.
    pub fn property_map(&self) -> Result<PropertyMap> {
        self.properties.to_map()
    }

    /// Same aggregate, seen from the same subgraph.
    pub fn equals(&self, other: &Node) -> bool {
        self.subgraph_identity == other.subgraph_identity
            && self.node_aggregate_id == other.node_aggregate_id
    }
}
