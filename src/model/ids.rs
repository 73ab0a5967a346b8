//! Identifier value types.
//!
//! All identifiers are validated on construction and immutable afterwards.
//! They round-trip through serde as plain strings.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

macro_rules! string_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal, $validate:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            pub fn from_string(value: impl Into<String>) -> Result<Self> {
                let value = value.into();
                let validate: fn(&str) -> bool = $validate;
                if validate(&value) {
                    Ok(Self(value))
                } else {
                    Err(Error::InvalidIdentifier { kind: $kind, value })
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl FromStr for $name {
            type Err = Error;
            fn from_str(s: &str) -> Result<Self> {
                Self::from_string(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = Error;
            fn try_from(value: String) -> Result<Self> {
                Self::from_string(value)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }
    };
}

impl Default for ContentRepositoryId {
    fn default() -> Self {
        Self("default".to_owned())
    }
}

fn non_empty(value: &str) -> bool {
    !value.trim().is_empty()
}

/// Aggregate identifiers are lowercase slugs of at most 64 characters.
fn aggregate_slug(value: &str) -> bool {
    (1..=64).contains(&value.len())
        && value
            .bytes()
            .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
}

fn node_name(value: &str) -> bool {
    non_empty(value) && value.len() <= 255 && !value.contains('/')
}

string_identifier!(
    /// Identifies the content repository a subgraph belongs to.
    ContentRepositoryId,
    "content repository id",
    non_empty
);

string_identifier!(
    /// Identifies a content stream (a versioned timeline of changes).
    ContentStreamId,
    "content stream id",
    non_empty
);

string_identifier!(
    /// Identifies a node aggregate across the whole dimension space.
    NodeAggregateId,
    "node aggregate id",
    aggregate_slug
);

string_identifier!(
    /// Fully qualified node type name, e.g. `Acme.Site:Document.Page`.
    NodeTypeName,
    "node type name",
    non_empty
);

string_identifier!(
    /// Edge label of a node below its parent.
    NodeName,
    "node name",
    node_name
);

string_identifier!(
    /// Property or reference name.
    PropertyName,
    "property name",
    non_empty
);

/// How a node aggregate relates to the rest of the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeAggregateClassification {
    /// Freely created, moved and removed.
    Regular,
    /// Top of a hierarchy; has no parent.
    Root,
    /// Automatically created along with its parent and bound to it.
    Tethered,
}

impl NodeAggregateClassification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Regular => "regular",
            Self::Root => "root",
            Self::Tethered => "tethered",
        }
    }

    pub fn is_root(&self) -> bool {
        matches!(self, Self::Root)
    }

    pub fn is_tethered(&self) -> bool {
        matches!(self, Self::Tethered)
    }
}

impl FromStr for NodeAggregateClassification {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "regular" => Ok(Self::Regular),
            "root" => Ok(Self::Root),
            "tethered" => Ok(Self::Tethered),
            other => Err(Error::InvalidClassification(other.to_owned())),
        }
    }
}

impl fmt::Display for NodeAggregateClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
