//! Hierarchical configuration trees
//!
//! A [`ConfigTree`] models an indentation-based device configuration as a tree
//! of text lines. Nodes live in an arena owned by the tree and are addressed
//! by copyable [`NodeId`] indices; parent back-references are plain indices,
//! never owning.

mod dump;
mod node;
mod parse;
mod query;
mod render;

pub use dump::{DUMP_VERSION, NodeDump, TreeDump};
pub use node::{ConfigTree, NodeId, ROOT};
pub use query::AllChildren;

pub(crate) use node::{DEFAULT_ORDER_WEIGHT, NEGATION_ORDER_WEIGHT};
