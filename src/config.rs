//! Node factory configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::model::ContentRepositoryId;
use crate::{Error, Result};

/// How a `disableddimensionspacepointhash` column is resolved to a point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisabledCoordinatePolicy {
    /// The hash must name the row's own covered point.
    #[default]
    Strict,
    /// The hash may name any covered point already seen for the aggregate
    /// earlier in the same fold.
    Lenient,
}

/// Configuration for a [`NodeFactory`](crate::NodeFactory).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FactoryConfig {
    pub content_repository_id: ContentRepositoryId,
    /// Parent column value marking rows that hang directly below the root.
    pub root_sentinel: String,
    pub disabled_coordinates: DisabledCoordinatePolicy,
}

impl Default for FactoryConfig {
    fn default() -> Self {
        Self {
            content_repository_id: ContentRepositoryId::default(),
            root_sentinel: "ROOT".to_owned(),
            disabled_coordinates: DisabledCoordinatePolicy::Strict,
        }
    }
}

impl FactoryConfig {
    pub fn from_json_str(input: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn with_content_repository_id(mut self, id: ContentRepositoryId) -> Self {
        self.content_repository_id = id;
        self
    }

    /// Fails with [`Error::Config`] when the sentinel is empty.
    pub fn with_root_sentinel(mut self, sentinel: impl Into<String>) -> Result<Self> {
        self.root_sentinel = sentinel.into();
        self.validate()?;
        Ok(self)
    }

    pub fn with_disabled_coordinates(mut self, policy: DisabledCoordinatePolicy) -> Self {
        self.disabled_coordinates = policy;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.root_sentinel.is_empty() {
            return Err(Error::Config("root_sentinel must not be empty".into()));
        }
        Ok(())
    }
}
