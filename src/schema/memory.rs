//! In-memory node type manager.
//!
//! Definitions are stored raw and resolved on first lookup: super types are
//! resolved recursively, their configuration deep-merged underneath the
//! type's own. Resolved types are cached until the next registration.
//!
//! ## Definition format
//!
//! ```json
//! {
//!   "Acme:Document": { "abstract": true, "properties": { "title": { "type": "string" } } },
//!   "Acme:Page": {
//!     "superTypes": { "Acme:Document": true, "Acme:Hideable": false },
//!     "properties": { "date": { "type": "DateTime", "defaultValue": "2014-09-23" } }
//!   }
//! }
//! ```

use std::sync::Arc;

use hashbrown::HashMap;
use parking_lot::RwLock;
use smallvec::SmallVec;

use crate::model::NodeTypeName;
use crate::{Error, Result};
use super::{NodeType, NodeTypeManager};

const SUPER_TYPES_KEY: &str = "superTypes";
const ABSTRACT_KEY: &str = "abstract";

/// Node type registry backed by a map of raw JSON definitions.
#[derive(Default)]
pub struct InMemoryNodeTypeManager {
    definitions: RwLock<HashMap<NodeTypeName, serde_json::Value>>,
    resolved: RwLock<HashMap<NodeTypeName, Arc<NodeType>>>,
}

impl InMemoryNodeTypeManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON object of `type name → definition`.
    pub fn from_json_str(input: &str) -> Result<Self> {
        let definitions: serde_json::Map<String, serde_json::Value> = serde_json::from_str(input)?;
        let manager = Self::new();
        for (name, definition) in definitions {
            manager.register(NodeTypeName::from_string(name)?, definition)?;
        }
        Ok(manager)
    }

    /// Add or replace a definition. Super types may be registered later.
    pub fn register(&self, name: NodeTypeName, definition: serde_json::Value) -> Result<()> {
        if !definition.is_object() && !definition.is_null() {
            return Err(Error::InvalidNodeTypeDefinition {
                node_type: name.to_string(),
                message: "definition must be a JSON object".into(),
            });
        }
        let definition = if definition.is_null() { serde_json::json!({}) } else { definition };
        self.definitions.write().insert(name, definition);
        self.resolved.write().clear();
        Ok(())
    }

    pub fn node_type_names(&self) -> Vec<NodeTypeName> {
        let mut names: Vec<_> = self.definitions.read().keys().cloned().collect();
        names.sort();
        names
    }

    fn resolve(&self, name: &NodeTypeName, stack: &mut Vec<NodeTypeName>) -> Result<Arc<NodeType>> {
        if let Some(resolved) = self.resolved.read().get(name) {
            return Ok(Arc::clone(resolved));
        }
        if stack.contains(name) {
            return Err(Error::InvalidNodeTypeDefinition {
                node_type: name.to_string(),
                message: format!("circular super type chain via {}", stack.last().map(|n| n.as_str()).unwrap_or("")),
            });
        }
        let definition = self
            .definitions
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownNodeType(name.to_string()))?;

        let mut own = definition.as_object().cloned().unwrap_or_default();
        let super_types = own.remove(SUPER_TYPES_KEY).unwrap_or(serde_json::Value::Null);
        let is_abstract = own
            .remove(ABSTRACT_KEY)
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let declared: Vec<(NodeTypeName, bool)> = match super_types {
            serde_json::Value::Null => Vec::new(),
            serde_json::Value::Object(declared) => declared
                .into_iter()
                .map(|(super_name, flag)| {
                    Ok((NodeTypeName::from_string(super_name)?, flag.as_bool().unwrap_or(false)))
                })
                .collect::<Result<_>>()?,
            _ => {
                return Err(Error::InvalidNodeTypeDefinition {
                    node_type: name.to_string(),
                    message: "superTypes must map type names to booleans".into(),
                });
            }
        };

        // Inherited switches first, then the type's own declarations on top.
        let mut enabled: SmallVec<[Arc<NodeType>; 2]> = SmallVec::new();
        let mut switches: SmallVec<[(NodeTypeName, bool); 4]> = SmallVec::new();
        stack.push(name.clone());
        for (super_name, flag) in &declared {
            if *flag {
                let super_type = self.resolve(super_name, stack)?;
                for (inherited, on) in super_type.super_type_switches() {
                    set_switch(&mut switches, inherited, *on);
                }
                set_switch(&mut switches, super_name, true);
                enabled.push(super_type);
            }
        }
        for (super_name, flag) in &declared {
            set_switch(&mut switches, super_name, *flag);
        }

        // Only switched-on ancestors contribute configuration.
        let mut merged = serde_json::Value::Object(serde_json::Map::new());
        for (super_name, on) in &switches {
            if *on {
                let super_type = self.resolve(super_name, stack)?;
                deep_merge(&mut merged, super_type.own_configuration());
            }
        }
        stack.pop();

        let own = serde_json::Value::Object(own);
        deep_merge(&mut merged, &own);
        let node_type = Arc::new(NodeType::new(name.clone(), is_abstract, enabled, switches, own, merged)?);
        self.resolved.write().insert(name.clone(), Arc::clone(&node_type));
        tracing::trace!(node_type = %name, "resolved node type");
        Ok(node_type)
    }
}

impl NodeTypeManager for InMemoryNodeTypeManager {
    fn get_node_type(&self, name: &NodeTypeName) -> Result<Arc<NodeType>> {
        self.resolve(name, &mut Vec::new())
    }

    fn has_node_type(&self, name: &NodeTypeName) -> bool {
        self.definitions.read().contains_key(name)
    }
}

/// Switch `name` on or off, keeping the position of an existing entry.
fn set_switch(switches: &mut SmallVec<[(NodeTypeName, bool); 4]>, name: &NodeTypeName, on: bool) {
    match switches.iter_mut().find(|(existing, _)| existing == name) {
        Some(entry) => entry.1 = on,
        None => switches.push((name.clone(), on)),
    }
}

/// Objects merge key by key; anything else in `overlay` replaces `base`.
fn deep_merge(base: &mut serde_json::Value, overlay: &serde_json::Value) {
    match (base, overlay) {
        (serde_json::Value::Object(base), serde_json::Value::Object(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(key) {
                    Some(existing) => deep_merge(existing, value),
                    None => {
                        base.insert(key.clone(), value.clone());
                    }
                }
            }
        }
        (base, overlay) => *base = overlay.clone(),
    }
}
