//! Reference (named edge) to a target node.

use super::{Node, PropertyCollection, PropertyName};

/// An edge to `node`. The source is implied by the query that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub node: Node,
    pub name: PropertyName,
    pub properties: Option<PropertyCollection>,
}

/// Ordered references; duplicates are meaningful and kept.
pub type References = Vec<Reference>;

impl Reference {
    pub fn new(node: Node, name: PropertyName, properties: Option<PropertyCollection>) -> Self {
        Self { node, name, properties }
    }
}
