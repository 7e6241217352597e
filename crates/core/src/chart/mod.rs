//! Chart of accounts hierarchy.
//!
//! - Tree building from the flat account table
//! - Parent validation with full ancestor-walk cycle detection
//! - Deletion guards

pub mod hierarchy;
pub mod tree;

#[cfg(test)]
mod hierarchy_props;

pub use hierarchy::{ensure_deletable, validate_parent};
pub use tree::{AccountNode, ChartItem, DEFAULT_TREE_DEPTH, MAX_TREE_DEPTH, build_tree, clamp_depth};
