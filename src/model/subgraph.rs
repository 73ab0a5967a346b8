//! Subgraph identity: the context a node is viewed through.

use serde::{Deserialize, Serialize};

use super::{ContentRepositoryId, ContentStreamId, DimensionSpacePoint};

/// Which restrictions apply when reading a subgraph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct VisibilityConstraints {
    /// Whether disabled (hidden) nodes are included.
    pub disabled_content_shown: bool,
}

impl VisibilityConstraints {
    /// The restricted, public view: disabled nodes are hidden.
    pub fn frontend() -> Self {
        Self { disabled_content_shown: false }
    }

    /// Everything, including disabled nodes.
    pub fn without_restrictions() -> Self {
        Self { disabled_content_shown: true }
    }

    pub fn is_disabled_content_shown(&self) -> bool {
        self.disabled_content_shown
    }
}

/// Identifies the subgraph a node instance belongs to.
///
/// The same authored node (one origin point) shows up in many subgraphs;
/// this is what tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentSubgraphIdentity {
    pub content_repository_id: ContentRepositoryId,
    pub content_stream_id: ContentStreamId,
    pub dimension_space_point: DimensionSpacePoint,
    pub visibility_constraints: VisibilityConstraints,
}

impl ContentSubgraphIdentity {
    pub fn new(
        content_repository_id: ContentRepositoryId,
        content_stream_id: ContentStreamId,
        dimension_space_point: DimensionSpacePoint,
        visibility_constraints: VisibilityConstraints,
    ) -> Self {
        Self {
            content_repository_id,
            content_stream_id,
            dimension_space_point,
            visibility_constraints,
        }
    }
}
