//! # contentgraph: Content Graph Node Factory
//!
//! Rebuilds content graph read models from the flat rows of a relational
//! projection. One row pairs a node variant's *origin* dimension space point
//! with one point the variant *covers*; the factory recovers nodes, whole
//! node aggregates (with their origin/coverage relations), subtrees and
//! references from an unordered stream of such rows.
//!
//! ## Design Principles
//!
//! 1. **Rows in, read models out**: no I/O, no query building, no caching
//! 2. **Collaborators are traits**: `NodeTypeManager` and `PropertyConverter`
//!    are shared read-only behind `Arc`
//! 3. **Fail the whole call**: a malformed row is an upstream bug and aborts
//!    the materialization that contains it
//! 4. **Lazy where it pays**: multi-aggregate results are a pull iterator,
//!    property values convert on first read
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use contentgraph::{InMemoryNodeTypeManager, NodeFactory, Row, VisibilityConstraints};
//!
//! # fn example(rows: Vec<Row>) -> contentgraph::Result<()> {
//! let types = InMemoryNodeTypeManager::from_json_str(r#"{"Acme:Page": {}}"#)?;
//! let factory = NodeFactory::with_node_type_manager(Arc::new(types));
//!
//! for aggregate in factory.map_node_rows_to_node_aggregates(&rows, VisibilityConstraints::frontend())? {
//!     let aggregate = aggregate?;
//!     println!("{} covers {} points", aggregate.node_aggregate_id, aggregate.covered_dimension_space_points.len());
//! }
//! # Ok(())
//! # }
//! ```

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod convert;
pub mod factory;
pub mod model;
pub mod row;
pub mod schema;

// ============================================================================
// Re-exports: Model (the read models)
// ============================================================================

pub use model::{
    ContentRepositoryId, ContentStreamId, ContentSubgraphIdentity, CoverageByOrigin,
    DimensionSpacePoint, DimensionSpacePointSet, Node, NodeAggregate,
    NodeAggregateClassification, NodeAggregateId, NodeName, NodeTypeName, Nodes,
    OriginByCoverage, OriginDimensionSpacePoint, OriginDimensionSpacePointSet, ParentKey,
    PropertyCollection, PropertyMap, PropertyName, Reference, References, Subtree, Value,
    VisibilityConstraints,
};

// ============================================================================
// Re-exports: Factory, rows, collaborators
// ============================================================================

pub use config::{DisabledCoordinatePolicy, FactoryConfig};
pub use convert::{DefaultPropertyConverter, PropertyConverter};
pub use factory::{NodeAggregates, NodeFactory};
pub use row::Row;
pub use schema::{InMemoryNodeTypeManager, NodeType, NodeTypeManager};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Unknown node type: {0}")]
    UnknownNodeType(String),

    #[error("Malformed dimension space point {input:?}: {reason}")]
    MalformedCoordinate { input: String, reason: String },

    #[error("Missing column: {0}")]
    MissingColumn(&'static str),

    #[error("Invalid value in column {column}: {message}")]
    InvalidColumn { column: String, message: String },

    #[error("Invalid {kind}: {value:?}")]
    InvalidIdentifier { kind: &'static str, value: String },

    #[error("Invalid node aggregate classification: {0:?}")]
    InvalidClassification(String),

    #[error("Malformed serialized properties: {0}")]
    MalformedProperties(String),

    #[error("Cannot convert property {property}: {message}")]
    PropertyConversion { property: String, message: String },

    #[error("Reference row to {0:?} has no reference name")]
    MissingEdgeName(String),

    #[error("Subtree rows contain no node below the root")]
    MissingRoot,

    #[error("Disabled dimension space point {hash} of node aggregate {node_aggregate_id} is not covered")]
    UnresolvedDisabledCoordinate { node_aggregate_id: String, hash: String },

    #[error("Invalid definition of node type {node_type}: {message}")]
    InvalidNodeTypeDefinition { node_type: String, message: String },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
