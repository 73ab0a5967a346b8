//! # Node Factory
//!
//! Maps flat projection rows to read models. Every entry point is a pure
//! function of its rows plus the shared, read-only collaborators:
//!
//! ```text
//! rows ─▶ map_node_row_to_node ─▶ Node
//!                 │
//!                 ├─▶ map_node_rows_to_nodes            ─▶ Nodes
//!                 ├─▶ map_node_rows_to_node_aggregate   ─▶ Option<NodeAggregate>
//!                 ├─▶ map_node_rows_to_node_aggregates  ─▶ NodeAggregates (lazy)
//!                 ├─▶ map_node_rows_to_subtree          ─▶ Subtree
//!                 └─▶ map_reference_rows_to_references  ─▶ References
//! ```
//!
//! A malformed row aborts the whole call; nothing is partially returned.

mod aggregate;
mod aggregates;
mod reference;
mod subtree;

use std::sync::Arc;

use crate::config::FactoryConfig;
use crate::convert::{DefaultPropertyConverter, PropertyConverter};
use crate::model::*;
use crate::row::{Row, columns};
use crate::schema::NodeTypeManager;
use crate::Result;

pub use aggregates::NodeAggregates;

/// Builds nodes and node aggregates from projection rows.
///
/// Cheap to share: all collaborators sit behind `Arc`, and no call mutates
/// the factory, so one instance can serve any number of threads.
#[derive(Clone)]
pub struct NodeFactory {
    config: FactoryConfig,
    node_type_manager: Arc<dyn NodeTypeManager>,
    property_converter: Arc<dyn PropertyConverter>,
}

impl NodeFactory {
    pub fn new(
        config: FactoryConfig,
        node_type_manager: Arc<dyn NodeTypeManager>,
        property_converter: Arc<dyn PropertyConverter>,
    ) -> Self {
        Self { config, node_type_manager, property_converter }
    }

    /// Default configuration and the built-in property converter.
    pub fn with_node_type_manager(node_type_manager: Arc<dyn NodeTypeManager>) -> Self {
        Self::new(FactoryConfig::default(), node_type_manager, Arc::new(DefaultPropertyConverter))
    }

    pub fn config(&self) -> &FactoryConfig {
        &self.config
    }

    /// Map one row to one node.
    ///
    /// `dimension_space_point` and `content_stream_id` override the row's
    /// own columns; callers that already know the subgraph pass them in.
    pub fn map_node_row_to_node(
        &self,
        row: &Row,
        visibility_constraints: VisibilityConstraints,
        dimension_space_point: Option<&DimensionSpacePoint>,
        content_stream_id: Option<&ContentStreamId>,
    ) -> Result<Node> {
        let node_type_name = NodeTypeName::from_string(row.require(columns::NODE_TYPE_NAME)?)?;
        let node_type = self.node_type_manager.get_node_type(&node_type_name)?;

        let content_stream_id = match content_stream_id {
            Some(id) => id.clone(),
            None => ContentStreamId::from_string(row.require(columns::CONTENT_STREAM_ID)?)?,
        };
        let dimension_space_point = match dimension_space_point {
            Some(point) => point.clone(),
            None => DimensionSpacePoint::from_json_str(row.require(columns::DIMENSION_SPACE_POINT)?)?,
        };

        let node_aggregate_id = NodeAggregateId::from_string(row.require(columns::NODE_AGGREGATE_ID)?)?;
        let origin_dimension_space_point =
            OriginDimensionSpacePoint::from_json_str(row.require(columns::ORIGIN_DIMENSION_SPACE_POINT)?)?;
        let classification: NodeAggregateClassification = row.require(columns::CLASSIFICATION)?.parse()?;
        let properties = self.property_collection(row.require(columns::PROPERTIES)?)?;
        let node_name = row
            .non_empty(columns::NODE_NAME)
            .map(NodeName::from_string)
            .transpose()?;

        Ok(Node {
            subgraph_identity: ContentSubgraphIdentity::new(
                self.config.content_repository_id.clone(),
                content_stream_id,
                dimension_space_point,
                visibility_constraints,
            ),
            node_aggregate_id,
            origin_dimension_space_point,
            classification,
            node_type_name,
            node_type,
            properties,
            node_name,
        })
    }

    /// Map plain node rows to nodes, keeping row order.
    pub fn map_node_rows_to_nodes<'r>(
        &self,
        rows: impl IntoIterator<Item = &'r Row>,
        visibility_constraints: VisibilityConstraints,
        content_stream_id: Option<&ContentStreamId>,
    ) -> Result<Nodes> {
        let nodes = rows
            .into_iter()
            .map(|row| self.map_node_row_to_node(row, visibility_constraints, None, content_stream_id))
            .collect::<Result<Nodes>>()?;
        tracing::trace!(nodes = nodes.len(), "mapped node rows");
        Ok(nodes)
    }

    /// Wrap a serialized property bag; values convert on first access.
    fn property_collection(&self, serialized: &str) -> Result<PropertyCollection> {
        Ok(PropertyCollection::new(
            SerializedPropertyValues::from_json_str(serialized)?,
            Arc::clone(&self.property_converter),
        ))
    }
}
