//! Graph configuration
//!
//! Built once at startup and handed to [`NodeRegistry`](crate::NodeRegistry)
//! and [`Pager`](crate::Pager). Nothing here is mutated afterwards.

use serde::Deserialize;

use crate::{GlobalId, GraphQLError, NodeKind, Result};

/// Top-level configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GraphConfig {
    pub registry: RegistryConfig,
    pub pagination: PagerConfig,
}

impl GraphConfig {
    /// Parse and validate configuration from JSON
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| GraphQLError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.registry.validate()?;
        self.pagination.validate()
    }
}

/// Kinds the node registry will resolve and classify
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RegistryConfig {
    pub kinds: Vec<NodeKind>,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            kinds: NodeKind::ALL.to_vec(),
        }
    }
}

impl RegistryConfig {
    pub fn only(kinds: impl IntoIterator<Item = NodeKind>) -> Self {
        Self {
            kinds: kinds.into_iter().collect(),
        }
    }

    /// Reject kinds registered more than once
    pub fn validate(&self) -> Result<()> {
        for (idx, kind) in self.kinds.iter().enumerate() {
            if self.kinds[..idx].contains(kind) {
                return Err(GraphQLError::Config(format!(
                    "node kind '{}' is registered twice",
                    kind
                )));
            }
        }
        Ok(())
    }

    pub fn is_enabled(&self, kind: NodeKind) -> bool {
        self.kinds.contains(&kind)
    }

    /// Whether a decoded ID names an enabled kind
    pub fn accepts(&self, id: &GlobalId) -> bool {
        self.is_enabled(id.kind)
    }
}

/// Page size limits for connections
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PagerConfig {
    /// Applied as `first` when neither `first` nor `last` is given
    pub default_page_size: Option<usize>,
    /// Largest accepted `first`/`last`
    pub max_page_size: Option<usize>,
}

impl Default for PagerConfig {
    fn default() -> Self {
        Self {
            default_page_size: None,
            max_page_size: Some(100),
        }
    }
}

impl PagerConfig {
    /// Reject a default page size above the maximum
    pub fn validate(&self) -> Result<()> {
        if let (Some(default), Some(max)) = (self.default_page_size, self.max_page_size) {
            if default > max {
                return Err(GraphQLError::Config(format!(
                    "default_page_size {} exceeds max_page_size {}",
                    default, max
                )));
            }
        }
        Ok(())
    }
}
