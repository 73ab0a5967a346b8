//! Assembling a [`Subtree`] from leveled rows.
//!
//! Rows must come children-first: when a row is processed, everything
//! already filed under its own aggregate id becomes its children. The
//! assembler never sorts.

use hashbrown::HashMap;

use crate::model::*;
use crate::row::{Row, columns};
use crate::{Error, Result};
use super::NodeFactory;

impl NodeFactory {
    /// Rebuild the tree rooted at the first row filed under the root sentinel.
    ///
    /// Fails with [`Error::MissingRoot`] if no row hangs below the root.
    pub fn map_node_rows_to_subtree<'r>(
        &self,
        rows: impl IntoIterator<Item = &'r Row>,
        visibility_constraints: VisibilityConstraints,
    ) -> Result<Subtree> {
        let mut by_parent: HashMap<ParentKey, Vec<Subtree>> = HashMap::new();
        for row in rows {
            let node = self.map_node_row_to_node(row, visibility_constraints, None, None)?;
            let level = parse_level(row)?;
            let parent = self.parent_key(row)?;
            let children = by_parent
                .remove(&ParentKey::Aggregate(node.node_aggregate_id.clone()))
                .unwrap_or_default();
            by_parent.entry(parent).or_default().push(Subtree::new(level, node, children));
        }

        let root = by_parent
            .remove(&ParentKey::Root)
            .and_then(|subtrees| subtrees.into_iter().next())
            .ok_or(Error::MissingRoot)?;
        tracing::debug!(
            root = %root.node.node_aggregate_id,
            nodes = root.len(),
            "assembled subtree"
        );
        Ok(root)
    }

    fn parent_key(&self, row: &Row) -> Result<ParentKey> {
        let parent = row.require(columns::PARENT_NODE_AGGREGATE_ID)?;
        if parent == self.config().root_sentinel {
            Ok(ParentKey::Root)
        } else {
            NodeAggregateId::from_string(parent).map(ParentKey::Aggregate)
        }
    }
}

fn parse_level(row: &Row) -> Result<usize> {
    let raw = row.require(columns::LEVEL)?;
    raw.trim().parse().map_err(|e: std::num::ParseIntError| Error::InvalidColumn {
        column: columns::LEVEL.into(),
        message: format!("{raw:?} is not a level: {e}"),
    })
}
