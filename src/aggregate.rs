//! Hierarchical aggregation of reconciled categories through a category tree
//!
//! Each node is evaluated against its own subtotal: a child is emitted by name
//! when its value reaches `threshold × subtotal`, otherwise it is folded into
//! the node's trailing remainder (`<node>-other`, or `other` at the top level).
//! A child's own remainder is final before its parent's threshold is applied.

use crate::counters::CategoryMap;
use crate::tree::{path, CategoryNode, CategoryTree, Payload, OTHER};
use std::collections::HashSet;

/// Ordered breakdown of one core
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoreStack {
    /// Emitted (name, cycles) pairs in declaration order, remainders last
    pub entries: Vec<(String, f64)>,
    /// Sum of all entries
    pub total: f64,
}

impl CoreStack {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.entries
            .iter()
            .find(|(entry, _)| entry == name)
            .map(|(_, value)| *value)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Share of the core's total carried by `value`, 0 for an empty stack
    pub fn share(&self, value: f64) -> f64 {
        if self.total == 0.0 {
            0.0
        } else {
            value / self.total
        }
    }

    /// Values aligned to `names`, 0 where this core emitted nothing
    pub fn aligned(&self, names: &[String]) -> Vec<f64> {
        names
            .iter()
            .map(|name| self.get(name).unwrap_or(0.0))
            .collect()
    }
}

/// Collapse behavior of the aggregator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
    /// Fold below-threshold children into remainders; when false every child
    /// is emitted by name
    pub collapse: bool,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self { collapse: true }
    }
}

/// Aggregate every core of `categories` through `tree`
pub fn merge(
    tree: &CategoryTree,
    categories: &CategoryMap,
    options: MergeOptions,
) -> Vec<CoreStack> {
    (0..categories.ncores())
        .map(|core| merge_core(tree, categories, core, options))
        .collect()
}

/// Aggregate one core
pub fn merge_core(
    tree: &CategoryTree,
    categories: &CategoryMap,
    core: usize,
    options: MergeOptions,
) -> CoreStack {
    merge_nodes(
        None,
        tree.roots(),
        &|key: &str| categories.get(core, key),
        options,
    )
}

/// Aggregate sibling `nodes` under `prefix` against their common subtotal
pub(crate) fn merge_nodes(
    prefix: Option<&str>,
    nodes: &[CategoryNode],
    lookup: &dyn Fn(&str) -> f64,
    options: MergeOptions,
) -> CoreStack {
    let evaluated: Vec<(&CategoryNode, CoreStack)> = nodes
        .iter()
        .map(|node| (node, evaluate(prefix, node, lookup, options)))
        .collect();
    let total: f64 = evaluated.iter().map(|(_, stack)| stack.total).sum();

    let mut entries = Vec::new();
    let mut other = 0.0;
    for (node, stack) in evaluated {
        if !options.collapse || stack.total >= node.threshold * total {
            entries.extend(stack.entries);
        } else {
            other += stack.total;
        }
    }
    if other != 0.0 {
        let name = match prefix {
            Some(prefix) => path(Some(prefix), OTHER),
            None => OTHER.to_string(),
        };
        entries.push((name, other));
    }

    CoreStack { entries, total }
}

fn evaluate(
    prefix: Option<&str>,
    node: &CategoryNode,
    lookup: &dyn Fn(&str) -> f64,
    options: MergeOptions,
) -> CoreStack {
    let name = path(prefix, &node.name);
    let value = match &node.payload {
        Payload::Key(key) => lookup(key),
        Payload::KeySet(keys) => keys.iter().map(|key| lookup(key)).sum(),
        Payload::Children(children) => {
            return merge_nodes(Some(&name), children, lookup, options)
        }
    };
    CoreStack {
        entries: vec![(name, value)],
        total: value,
    }
}

/// Names emitted by any core, in the tree's declaration order
pub fn union_names<'a>(
    tree: &CategoryTree,
    stacks: impl IntoIterator<Item = &'a CoreStack>,
) -> Vec<String> {
    let emitted: HashSet<&str> = stacks.into_iter().flat_map(CoreStack::names).collect();
    tree.names()
        .into_iter()
        .filter(|name| emitted.contains(name.as_str()))
        .collect()
}
