// Named category trees for cycle stacks
//
// A tree declares how reconciled categories roll up into the entries of a
// stack: single keys, anonymous key sets, or nested nodes whose children fold
// into a trailing "other" when they fall below their threshold. Trees are
// built from factories per granularity variant or loaded from TOML, and the
// simplified stack is a pure rewrite of a detailed tree.

mod definition;
mod groups;
mod node;
mod variants;

pub use definition::CategoryDefinition;
pub use groups::{CategoryGroup, CategoryGroups};
pub use node::{CategoryNode, CategoryTree, Payload, OTHER, PATH_SEPARATOR};
pub use variants::{default_tree, MemoryGranularity, SyncGranularity, TreeVariant};

pub(crate) use node::path;

#[cfg(test)]
mod tests;
