// Top-level grouping used by the simplified stack
//
// Simplification replaces the detailed tree by one anonymous key set per
// group. Each group also claims a top-level entry carrying its own name, which
// makes the rewrite idempotent.

use crate::error::ConfigError;
use crate::tree::node::{CategoryNode, CategoryTree, Payload, OTHER};
use std::collections::HashSet;

/// Named group of top-level categories
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub name: String,
    pub members: Vec<String>,
}

impl CategoryGroup {
    pub fn new(name: &str, members: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            members: members.iter().map(|member| member.to_string()).collect(),
        }
    }

    fn claims(&self, top_level: &str) -> bool {
        self.name == top_level || self.members.iter().any(|member| member == top_level)
    }
}

/// Ordered groups for the simplified stack
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroups {
    groups: Vec<CategoryGroup>,
}

impl Default for CategoryGroups {
    /// compute / communicate / synchronize
    fn default() -> Self {
        Self {
            groups: vec![
                CategoryGroup::new(
                    "compute",
                    &[
                        "dispatch_width",
                        "base",
                        "issue",
                        "depend",
                        "contend",
                        "branch",
                        "serial",
                        "smt",
                    ],
                ),
                CategoryGroup::new("communicate", &["itlb", "dtlb", "ifetch", "mem"]),
                CategoryGroup::new(
                    "synchronize",
                    &["sync", "recv", "dvfs-transition", "imbalance"],
                ),
            ],
        }
    }
}

impl CategoryGroups {
    /// Groups must have distinct names other than `other`
    pub fn new(groups: Vec<CategoryGroup>) -> Result<Self, ConfigError> {
        {
            let mut seen = HashSet::new();
            for group in &groups {
                if group.name == OTHER {
                    return Err(ConfigError::ReservedName {
                        parent: "<groups>".to_string(),
                        name: group.name.clone(),
                    });
                }
                if !seen.insert(group.name.as_str()) {
                    return Err(ConfigError::DuplicateName {
                        parent: "<groups>".to_string(),
                        name: group.name.clone(),
                    });
                }
            }
        }
        Ok(Self { groups })
    }

    pub fn groups(&self) -> &[CategoryGroup] {
        &self.groups
    }

    /// Group claiming a top-level category name
    pub fn group_of(&self, top_level: &str) -> Option<&str> {
        self.groups
            .iter()
            .find(|group| group.claims(top_level))
            .map(|group| group.name.as_str())
    }
}

impl CategoryTree {
    /// Rewrite into one zero-threshold key set per group
    ///
    /// Top-level categories claimed by no group are kept unchanged after the
    /// groups. The receiver is left untouched.
    pub fn simplify(&self, groups: &CategoryGroups) -> CategoryTree {
        let mut claimed: HashSet<&str> = HashSet::new();
        let mut roots = Vec::with_capacity(groups.groups.len());

        for group in &groups.groups {
            let mut keys: Vec<String> = Vec::new();
            for node in self.roots() {
                if claimed.contains(node.name.as_str()) || !group.claims(&node.name) {
                    continue;
                }
                claimed.insert(node.name.as_str());
                keys.extend(node.keys().into_iter().map(str::to_string));
            }
            roots.push(CategoryNode {
                name: group.name.clone(),
                threshold: 0.0,
                payload: Payload::KeySet(keys),
            });
        }

        for node in self.roots() {
            if !claimed.contains(node.name.as_str()) {
                roots.push(node.clone());
            }
        }

        CategoryTree::from_validated(roots)
    }
}
