//! Account tree construction.
//!
//! Accounts are stored flat with a nullable parent reference. The tree is
//! derived on demand from a parent-id to child-index map, so no node ever
//! owns a reference back to its parent.

use std::collections::HashMap;

use partida_shared::types::AccountId;
use serde::Serialize;

/// Default number of descendant levels expanded under each root.
pub const DEFAULT_TREE_DEPTH: usize = 2;

/// Upper bound on the requested depth.
pub const MAX_TREE_DEPTH: usize = 16;

/// An account that knows its own id and parent.
pub trait ChartItem {
    /// The account's id.
    fn id(&self) -> AccountId;
    /// The account's parent, if any.
    fn parent_id(&self) -> Option<AccountId>;
}

/// A node in the account tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AccountNode<T> {
    /// The account at this node.
    #[serde(flatten)]
    pub account: T,
    /// Children, expanded up to the requested depth.
    pub children: Vec<AccountNode<T>>,
}

/// Clamps a requested depth into `0..=MAX_TREE_DEPTH`.
#[must_use]
pub fn clamp_depth(depth: Option<usize>) -> usize {
    depth.unwrap_or(DEFAULT_TREE_DEPTH).min(MAX_TREE_DEPTH)
}

/// Builds the forest of root accounts.
///
/// Roots are accounts without a parent. Each root carries `depth` levels of
/// descendants; anything deeper is cut off. Input order is kept among
/// siblings, so callers sort by code before building.
pub fn build_tree<T>(accounts: Vec<T>, depth: usize) -> Vec<AccountNode<T>>
where
    T: ChartItem + Clone,
{
    let mut children_of: HashMap<AccountId, Vec<usize>> = HashMap::new();
    let mut roots = Vec::new();

    for (idx, account) in accounts.iter().enumerate() {
        match account.parent_id() {
            Some(parent) => children_of.entry(parent).or_default().push(idx),
            None => roots.push(idx),
        }
    }

    roots
        .into_iter()
        .map(|idx| expand(&accounts, &children_of, idx, depth))
        .collect()
}

fn expand<T>(
    accounts: &[T],
    children_of: &HashMap<AccountId, Vec<usize>>,
    idx: usize,
    remaining: usize,
) -> AccountNode<T>
where
    T: ChartItem + Clone,
{
    let account = accounts[idx].clone();
    let children = if remaining == 0 {
        Vec::new()
    } else {
        children_of
            .get(&account.id())
            .map(|kids| {
                kids.iter()
                    .map(|&child| expand(accounts, children_of, child, remaining - 1))
                    .collect()
            })
            .unwrap_or_default()
    };

    AccountNode { account, children }
}
