//! # Content Graph Model
//!
//! Read models rebuilt from projection rows: nodes, node aggregates,
//! subtrees and references, plus the value types they are made of.
//!
//! Design rule: everything here is immutable once built. No I/O, no
//! state, no async.

pub mod dimension;
pub mod ids;
pub mod node;
pub mod node_aggregate;
pub mod point_set;
pub mod property;
pub mod reference;
pub mod subgraph;
pub mod subtree;
pub mod value;

pub use dimension::{ContentHash, DimensionSpacePoint, OriginDimensionSpacePoint};
pub use ids::{
    ContentRepositoryId, ContentStreamId, NodeAggregateClassification, NodeAggregateId,
    NodeName, NodeTypeName, PropertyName,
};
pub use node::{Node, Nodes};
pub use node_aggregate::NodeAggregate;
pub use point_set::{
    CoverageByOrigin, DimensionSpacePointSet, OriginByCoverage, OriginDimensionSpacePointSet,
    PointMap, PointSet,
};
pub use property::{
    PropertyCollection, PropertyMap, SerializedPropertyValue, SerializedPropertyValues,
};
pub use reference::{Reference, References};
pub use subgraph::{ContentSubgraphIdentity, VisibilityConstraints};
pub use subtree::{ParentKey, Subtree, SubtreeIter};
pub use value::Value;
