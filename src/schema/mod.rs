//! # Node Type Schema
//!
//! The contract between the node factory and whatever knows the node type
//! definitions. The factory only ever asks one question: "give me the type
//! called X", and fails closed when the answer is "there is none".
//!
//! ## Implementations
//!
//! | Manager | Module | Description |
//! |---------|--------|-------------|
//! | `InMemoryNodeTypeManager` | `memory` | Definitions loaded from JSON or registered in code |

pub mod memory;

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::convert::{DefaultPropertyConverter, PropertyConverter};
use crate::model::{NodeTypeName, PropertyMap, SerializedPropertyValue};
use crate::Result;

pub use memory::InMemoryNodeTypeManager;

// ============================================================================
// NodeTypeManager trait
// ============================================================================

/// Resolves node type names to definitions.
///
/// Shared by every concurrent materialization; implementations must be
/// safe for concurrent reads.
pub trait NodeTypeManager: Send + Sync {
    /// Fails with [`Error::UnknownNodeType`](crate::Error::UnknownNodeType)
    /// if no such type is defined.
    fn get_node_type(&self, name: &NodeTypeName) -> Result<Arc<NodeType>>;

    fn has_node_type(&self, name: &NodeTypeName) -> bool;
}

// ============================================================================
// NodeType
// ============================================================================

/// Declared type and default of one property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyDeclaration {
    #[serde(rename = "type", default = "default_property_type")]
    pub type_name: String,
    #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<serde_json::Value>,
}

fn default_property_type() -> String {
    "string".to_owned()
}

/// A resolved node type: its own declaration merged over its super types.
pub struct NodeType {
    name: NodeTypeName,
    is_abstract: bool,
    declared_super_types: SmallVec<[Arc<NodeType>; 2]>,
    /// Every ancestor with its effective switch. Inherited entries come
    /// first; the type's own `superTypes` declarations override them.
    super_types: SmallVec<[(NodeTypeName, bool); 4]>,
    /// The type's own declaration, without `superTypes` and `abstract`.
    own_configuration: serde_json::Value,
    properties: BTreeMap<String, PropertyDeclaration>,
    configuration: serde_json::Value,
}

impl NodeType {
    pub(crate) fn new(
        name: NodeTypeName,
        is_abstract: bool,
        declared_super_types: SmallVec<[Arc<NodeType>; 2]>,
        super_types: SmallVec<[(NodeTypeName, bool); 4]>,
        own_configuration: serde_json::Value,
        configuration: serde_json::Value,
    ) -> Result<Self> {
        let properties = match configuration.get("properties") {
            Some(props) => serde_json::from_value(props.clone())?,
            None => BTreeMap::new(),
        };
        Ok(Self {
            name,
            is_abstract,
            declared_super_types,
            super_types,
            own_configuration,
            properties,
            configuration,
        })
    }

    pub fn name(&self) -> &NodeTypeName {
        &self.name
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Directly declared, enabled super types, in declaration order.
    pub fn declared_super_types(&self) -> &[Arc<NodeType>] {
        &self.declared_super_types
    }

    /// Enabled ancestors, nearest declarations last.
    pub fn super_type_names(&self) -> impl Iterator<Item = &NodeTypeName> {
        self.super_types.iter().filter(|(_, enabled)| *enabled).map(|(name, _)| name)
    }

    pub(crate) fn super_type_switches(&self) -> &[(NodeTypeName, bool)] {
        &self.super_types
    }

    pub(crate) fn own_configuration(&self) -> &serde_json::Value {
        &self.own_configuration
    }

    /// True for the type itself and every enabled ancestor. An ancestor
    /// switched off anywhere on the way down stays off unless a later
    /// declaration switches it back on.
    pub fn is_of_type(&self, name: &str) -> bool {
        self.name.as_str() == name
            || self
                .super_types
                .iter()
                .any(|(super_type, enabled)| *enabled && super_type.as_str() == name)
    }

    pub fn properties(&self) -> &BTreeMap<String, PropertyDeclaration> {
        &self.properties
    }

    pub fn property_type(&self, property: &str) -> Option<&str> {
        self.properties.get(property).map(|p| p.type_name.as_str())
    }

    /// Default values converted according to each property's declared type.
    pub fn default_values_for_properties(&self) -> Result<PropertyMap> {
        let mut defaults = PropertyMap::new();
        for (name, declaration) in &self.properties {
            if let Some(default) = &declaration.default_value {
                let serialized = SerializedPropertyValue::new(default.clone(), &declaration.type_name);
                defaults.insert(
                    name.clone(),
                    DefaultPropertyConverter.deserialize_property_value(name, &serialized)?,
                );
            }
        }
        Ok(defaults)
    }

    /// Whether a dot-separated configuration path exists, e.g. `ui.label`.
    pub fn has_configuration(&self, path: &str) -> bool {
        self.configuration(path).is_some()
    }

    pub fn configuration(&self, path: &str) -> Option<&serde_json::Value> {
        path.split('.')
            .try_fold(&self.configuration, |node, key| node.get(key))
    }

    pub fn full_configuration(&self) -> &serde_json::Value {
        &self.configuration
    }
}

impl PartialEq for NodeType {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl fmt::Debug for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeType")
            .field("name", &self.name)
            .field("abstract", &self.is_abstract)
            .field(
                "super_types",
                &self.super_type_names().map(NodeTypeName::as_str).collect::<Vec<_>>(),
            )
            .finish()
    }
}
