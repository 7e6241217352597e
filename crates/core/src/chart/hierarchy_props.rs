//! Property-based tests for parent assignment and tree building.
//!
//! Forests are generated with every parent index lower than its child's,
//! so the generated data itself is always acyclic.

use std::collections::HashMap;

use partida_shared::types::AccountId;
use proptest::prelude::*;

use super::hierarchy::validate_parent;
use super::tree::{AccountNode, ChartItem, build_tree};
use crate::ledger::LedgerError;

#[derive(Debug, Clone)]
struct Node {
    id: AccountId,
    parent: Option<AccountId>,
}

impl ChartItem for Node {
    fn id(&self) -> AccountId {
        self.id
    }

    fn parent_id(&self) -> Option<AccountId> {
        self.parent
    }
}

/// Strategy producing an acyclic forest of 1 to 30 accounts.
fn forest() -> impl Strategy<Value = Vec<Node>> {
    prop::collection::vec(any::<prop::sample::Index>(), 1..30).prop_map(|picks| {
        picks
            .iter()
            .enumerate()
            .map(|(i, pick)| {
                let id = AccountId(i32::try_from(i).unwrap() + 1);
                // roughly one root in four
                let parent = if i == 0 || pick.index(4) == 0 {
                    None
                } else {
                    Some(AccountId(i32::try_from(pick.index(i)).unwrap() + 1))
                };
                Node { id, parent }
            })
            .collect()
    })
}

fn is_descendant(nodes: &HashMap<AccountId, Option<AccountId>>, node: AccountId, of: AccountId) -> bool {
    let mut current = nodes.get(&node).copied().flatten();
    while let Some(p) = current {
        if p == of {
            return true;
        }
        current = nodes.get(&p).copied().flatten();
    }
    false
}

fn count<T>(nodes: &[AccountNode<T>]) -> usize {
    nodes.iter().map(|n| 1 + count(&n.children)).sum()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// *For any* acyclic forest and any pair of accounts, re-parenting SHALL
    /// be rejected exactly when it would make an account its own ancestor.
    #[test]
    fn prop_cycle_detection_matches_ancestry(
        nodes in forest(),
        a in any::<prop::sample::Index>(),
        b in any::<prop::sample::Index>(),
    ) {
        let map: HashMap<AccountId, Option<AccountId>> =
            nodes.iter().map(|n| (n.id, n.parent)).collect();
        let account = nodes[a.index(nodes.len())].id;
        let parent = nodes[b.index(nodes.len())].id;

        let result = validate_parent(Some(account), parent, |id| map.get(&id).copied());

        if account == parent {
            prop_assert!(matches!(result, Err(LedgerError::SelfParent(_))));
        } else if is_descendant(&map, parent, account) {
            prop_assert!(matches!(result, Err(LedgerError::Cycle { .. })), "expected cycle");
        } else {
            prop_assert!(result.is_ok());
        }
    }

    /// *For any* acyclic forest, a tree built deep enough SHALL contain
    /// every account exactly once.
    #[test]
    fn prop_full_depth_tree_contains_every_account(nodes in forest()) {
        let total = nodes.len();
        let tree = build_tree(nodes, total);
        prop_assert_eq!(count(&tree), total);
    }

    /// *For any* forest, a shallower tree SHALL never contain more accounts
    /// than a deeper one.
    #[test]
    fn prop_depth_is_monotonic(nodes in forest(), depth in 0usize..5) {
        let shallow = count(&build_tree(nodes.clone(), depth));
        let deep = count(&build_tree(nodes, depth + 1));
        prop_assert!(shallow <= deep);
    }
}
