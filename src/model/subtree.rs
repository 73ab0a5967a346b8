//! Subtree: a leveled parent/child reconstruction.

use super::{Node, NodeAggregateId};

/// Where a subtree row hangs: under the synthetic root or under a real parent.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentKey {
    Root,
    Aggregate(NodeAggregateId),
}

/// A node, its depth below the root, and its children in row order.
#[derive(Debug, Clone, PartialEq)]
pub struct Subtree {
    pub level: usize,
    pub node: Node,
    pub children: Vec<Subtree>,
}

impl Subtree {
    pub fn new(level: usize, node: Node, children: Vec<Subtree>) -> Self {
        Self { level, node, children }
    }

    pub fn children(&self) -> &[Subtree] {
        &self.children
    }

    /// Number of subtrees including this one.
    pub fn len(&self) -> usize {
        1 + self.children.iter().map(Subtree::len).sum::<usize>()
    }

    /// Never empty: a subtree always holds at least its own node.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Depth-first, pre-order walk.
    pub fn iter(&self) -> SubtreeIter<'_> {
        SubtreeIter { stack: vec![self] }
    }
}

pub struct SubtreeIter<'a> {
    stack: Vec<&'a Subtree>,
}

impl<'a> Iterator for SubtreeIter<'a> {
    type Item = &'a Subtree;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.stack.pop()?;
        self.stack.extend(current.children.iter().rev());
        Some(current)
    }
}
