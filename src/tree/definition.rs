use crate::error::ConfigError;
use crate::tree::node::{CategoryNode, CategoryTree, Payload};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_threshold() -> f64 {
    0.01
}

/// User-defined category loaded from TOML
///
/// # Example TOML
/// ```toml
/// [[category]]
/// name = "compute"
/// threshold = 0.0
///
///   [[category.children]]
///   name = "base"
///   key = "Base"
///
///   [[category.children]]
///   name = "serial"
///   keys = ["Serialization", "LongLatency"]
/// ```
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct CategoryDefinition {
    pub name: String,

    /// Share of the parent's subtotal below which this category folds into
    /// the parent's `other` (default 0.01)
    #[serde(default = "default_threshold")]
    pub threshold: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keys: Option<Vec<String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CategoryDefinition>>,
}

impl TryFrom<CategoryDefinition> for CategoryNode {
    type Error = ConfigError;

    fn try_from(definition: CategoryDefinition) -> Result<Self, Self::Error> {
        let CategoryDefinition {
            name,
            threshold,
            key,
            keys,
            children,
        } = definition;

        let payload = match (key, keys, children) {
            (Some(key), None, None) => Payload::Key(key),
            (None, Some(keys), None) => Payload::KeySet(keys),
            (None, None, Some(children)) => Payload::Children(
                children
                    .into_iter()
                    .map(CategoryNode::try_from)
                    .collect::<Result<_, _>>()?,
            ),
            _ => return Err(ConfigError::AmbiguousPayload { name }),
        };

        Ok(CategoryNode {
            name,
            threshold,
            payload,
        })
    }
}

impl CategoryTree {
    /// Parse a tree from TOML `[[category]]` entries
    pub fn from_toml_str(content: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct TreeFile {
            category: Vec<CategoryDefinition>,
        }

        let file: TreeFile =
            toml::from_str(content).context("Failed to parse TOML category definitions")?;
        let roots = file
            .category
            .into_iter()
            .map(CategoryNode::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(CategoryTree::new(roots)?)
    }

    /// Load a tree from a TOML file
    ///
    /// # Errors
    /// Returns error if the file doesn't exist, has invalid TOML syntax, or
    /// describes an invalid tree (duplicate sibling names, thresholds outside
    /// [0, 1], categories without exactly one payload).
    pub fn from_toml<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).with_context(|| {
            format!("Failed to read category tree file: {}", path.as_ref().display())
        })?;
        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid category tree file: {}", path.as_ref().display()))
    }
}
