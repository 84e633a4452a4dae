use crate::error::ConfigError;
use std::collections::HashSet;

/// Name of the remainder bucket collecting below-threshold categories
pub const OTHER: &str = "other";

/// Separator between a parent name and a child name in emitted entries
pub const PATH_SEPARATOR: char = '-';

/// What a category sums
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    /// One reconciled category
    Key(String),
    /// Several reconciled categories summed anonymously
    KeySet(Vec<String>),
    /// Named sub-categories, collapsed against this node's subtotal
    Children(Vec<CategoryNode>),
}

/// One named category of a stack
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryNode {
    pub name: String,
    /// Minimum share of the parent's subtotal for this node to be named
    pub threshold: f64,
    pub payload: Payload,
}

impl CategoryNode {
    pub fn leaf(name: &str, threshold: f64, key: &str) -> Self {
        Self {
            name: name.to_string(),
            threshold,
            payload: Payload::Key(key.to_string()),
        }
    }

    pub fn group(name: &str, threshold: f64, keys: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            threshold,
            payload: Payload::KeySet(keys.iter().map(|key| key.to_string()).collect()),
        }
    }

    pub fn node(name: &str, threshold: f64, children: Vec<CategoryNode>) -> Self {
        Self {
            name: name.to_string(),
            threshold,
            payload: Payload::Children(children),
        }
    }

    /// Every reconciled category this node reads, in declaration order
    pub fn keys(&self) -> Vec<&str> {
        let mut keys = Vec::new();
        self.collect_keys(&mut keys);
        keys
    }

    fn collect_keys<'a>(&'a self, keys: &mut Vec<&'a str>) {
        match &self.payload {
            Payload::Key(key) => keys.push(key),
            Payload::KeySet(set) => keys.extend(set.iter().map(String::as_str)),
            Payload::Children(children) => {
                for child in children {
                    child.collect_keys(keys);
                }
            }
        }
    }
}

/// Validated category tree: an ordered list of top-level categories
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryTree {
    roots: Vec<CategoryNode>,
}

impl CategoryTree {
    /// Build a tree, rejecting duplicate or reserved sibling names,
    /// thresholds outside [0, 1] and clashing emitted names
    pub fn new(roots: Vec<CategoryNode>) -> Result<Self, ConfigError> {
        validate("<root>", &roots)?;
        let tree = Self { roots };
        tree.validate_paths()?;
        Ok(tree)
    }

    /// For trees whose validity is fixed by construction
    pub(crate) fn from_validated(roots: Vec<CategoryNode>) -> Self {
        debug_assert!(validate("<root>", &roots).is_ok());
        let tree = Self { roots };
        debug_assert!(tree.validate_paths().is_ok());
        tree
    }

    /// Flattened names, `<node>-other` remainders included, are unique
    /// across the whole tree
    fn validate_paths(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for name in self.names() {
            if seen.contains(&name) {
                return Err(ConfigError::DuplicateName {
                    parent: "<root>".to_string(),
                    name,
                });
            }
            seen.insert(name);
        }
        Ok(())
    }

    pub fn roots(&self) -> &[CategoryNode] {
        &self.roots
    }

    /// Every reconciled category the tree reads
    pub fn keys(&self) -> HashSet<&str> {
        self.roots.iter().flat_map(CategoryNode::keys).collect()
    }

    /// Every entry name the tree can emit, in declaration order
    ///
    /// Nested names are joined with `-`; each internal node is followed by its
    /// own `<node>-other` remainder and the list ends with `other`.
    pub fn names(&self) -> Vec<String> {
        let mut names = Vec::new();
        collect_names(None, &self.roots, &mut names);
        names.push(OTHER.to_string());
        names
    }
}

/// Full emitted name of `name` under `prefix`
pub(crate) fn path(prefix: Option<&str>, name: &str) -> String {
    match prefix {
        Some(prefix) => format!("{}{}{}", prefix, PATH_SEPARATOR, name),
        None => name.to_string(),
    }
}

fn collect_names(prefix: Option<&str>, nodes: &[CategoryNode], names: &mut Vec<String>) {
    for node in nodes {
        let full = path(prefix, &node.name);
        if let Payload::Children(children) = &node.payload {
            collect_names(Some(&full), children, names);
            names.push(path(Some(&full), OTHER));
        } else {
            names.push(full);
        }
    }
}

fn validate(parent: &str, nodes: &[CategoryNode]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for node in nodes {
        if node.name == OTHER {
            return Err(ConfigError::ReservedName {
                parent: parent.to_string(),
                name: node.name.clone(),
            });
        }
        if !seen.insert(node.name.as_str()) {
            return Err(ConfigError::DuplicateName {
                parent: parent.to_string(),
                name: node.name.clone(),
            });
        }
        if !(0.0..=1.0).contains(&node.threshold) {
            return Err(ConfigError::ThresholdOutOfRange {
                name: node.name.clone(),
                threshold: node.threshold,
            });
        }
        if let Payload::Children(children) = &node.payload {
            validate(&node.name, children)?;
        }
    }
    Ok(())
}
