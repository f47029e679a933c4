//! Split-and-promote.
//!
//! When a key would push a node past `max_keys`, the node's keys (plus the
//! new one) are laid out in a temporary overfull array, the middle key is
//! promoted to the parent and the rest are dealt to two fresh siblings:
//!
//! ```text
//!   overfull:   [ k0  k1 | k2 | k3  k4 ]      mid = len / 2
//!                 small    ▲     big
//!                          └── promoted into parent
//! ```
//!
//! If the parent is full as well, the promoted key and the two siblings are
//! spliced into the parent's own overfull arrays and the parent is split
//! the same way. The cascade stops at a parent with room, or at the root,
//! where a new root holding just the promoted key is created.

use std::cmp::Ordering;
use std::mem;

use tracing::{debug, trace};

use crate::common::NodeId;
use crate::index::btree::node::{insert_ordered, Node};
use crate::index::btree::tree::BTree;

/// Result of splitting one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SplitOutcome {
    /// New left sibling (keys below the promoted key).
    pub(crate) small: NodeId,
    /// New right sibling (keys above the promoted key).
    pub(crate) big: NodeId,
    /// Node that now holds the promoted key, with `small` and `big` as the
    /// children on either side of it.
    pub(crate) owner: NodeId,
}

impl<K: Ord> BTree<K> {
    /// Split the full leaf `leaf` to make room for `key`.
    pub(crate) fn split_full_leaf(&mut self, leaf: NodeId, key: K) -> SplitOutcome {
        let mut keys = mem::take(&mut self.arena[leaf].keys);
        insert_ordered(&mut keys, key);
        self.split(leaf, keys, Vec::new())
    }

    /// Replace `curr` by two siblings built from its overfull contents.
    ///
    /// `keys` holds `max_keys + 1` ordered keys. `children` is empty for a
    /// leaf, otherwise it holds `max_keys + 2` children already ordered to
    /// match `keys`. The slot of `curr` is released; its `parent` link must
    /// still be intact.
    fn split(&mut self, curr: NodeId, mut keys: Vec<K>, mut children: Vec<NodeId>) -> SplitOutcome {
        debug_assert_eq!(keys.len(), self.config.max_keys() + 1);
        debug_assert!(children.is_empty() || children.len() == keys.len() + 1);

        let slot = self.slot_in_parent(curr);
        let parent = slot.map(|(p, _)| p);
        self.arena.release(curr);
        self.stats.record_split();

        let mid = keys.len() / 2;
        trace!(node = %curr, promoted_at = mid, "splitting overfull node");

        let mut big_keys = keys.split_off(mid);
        let promoted = big_keys.remove(0);
        let big_children = if children.is_empty() {
            Vec::new()
        } else {
            children.split_off(mid + 1)
        };

        let small = self.arena.alloc(Node::from_parts(keys, children, parent));
        let big = self.arena.alloc(Node::from_parts(big_keys, big_children, parent));
        self.adopt_children(small);
        self.adopt_children(big);

        match slot {
            None => self.grow_root(promoted, small, big),
            Some((p, pos)) => self.promote_into(p, pos, promoted, small, big),
        }
    }

    /// Top of the cascade: a fresh root holding only `promoted`.
    fn grow_root(&mut self, promoted: K, small: NodeId, big: NodeId) -> SplitOutcome {
        let root = self
            .arena
            .alloc(Node::from_parts(vec![promoted], vec![small, big], None));
        self.arena[small].parent = Some(root);
        self.arena[big].parent = Some(root);
        self.root = Some(root);
        self.stats.record_root_split();

        debug!(root = %root, nodes = self.arena.len(), "root split, tree grew one level");

        SplitOutcome {
            small,
            big,
            owner: root,
        }
    }

    /// Place `promoted` into parent `p`, where `small`/`big` replace the
    /// child at `pos`. Splits `p` in turn if it is full.
    fn promote_into(&mut self, p: NodeId, pos: usize, promoted: K, small: NodeId, big: NodeId) -> SplitOutcome {
        let max_keys = self.config.max_keys();

        if self.arena[p].key_count() < max_keys {
            let parent = &mut self.arena[p];
            let (at, _) = insert_ordered(&mut parent.keys, promoted);
            debug_assert_eq!(at, pos);
            parent.children[pos] = small;
            parent.children.insert(pos + 1, big);
            return SplitOutcome {
                small,
                big,
                owner: p,
            };
        }

        // Parent overflows too: splice into its overfull arrays and cascade.
        let parent = &mut self.arena[p];
        let mut keys = mem::take(&mut parent.keys);
        let mut children = mem::take(&mut parent.children);
        let (at, _) = insert_ordered(&mut keys, promoted);
        debug_assert_eq!(at, pos);
        children[pos] = small;
        children.insert(pos + 1, big);

        let upper = self.split(p, keys, children);
        let upper_mid = (max_keys + 1) / 2;
        let owner = match pos.cmp(&upper_mid) {
            Ordering::Less => upper.small,
            Ordering::Equal => upper.owner,
            Ordering::Greater => upper.big,
        };

        SplitOutcome { small, big, owner }
    }

    /// Point every child of `id` back at `id`.
    fn adopt_children(&mut self, id: NodeId) {
        for i in 0..self.arena[id].children.len() {
            let child = self.arena[id].children[i];
            self.arena[child].parent = Some(id);
        }
    }

    /// Parent of `child` and the child's position in it; `None` for the root.
    fn slot_in_parent(&self, child: NodeId) -> Option<(NodeId, usize)> {
        let parent = self.arena[child].parent?;
        let pos = self.arena[parent].child_position(child);
        debug_assert!(pos.is_some(), "{} is missing from its parent {}", child, parent);
        let pos = pos.expect("child is missing from its parent's children");
        Some((parent, pos))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(degree: usize, keys: &[i32]) -> BTree<i32> {
        let mut tree = BTree::new(degree).unwrap();
        for &k in keys {
            tree.insert(k);
        }
        tree
    }

    fn keys_of(tree: &BTree<i32>, id: NodeId) -> Vec<i32> {
        tree.arena[id].keys().to_vec()
    }

    #[test]
    fn test_split_leaf_root_grows_tree() {
        let mut tree = tree_with(3, &[10, 20]);
        let leaf = tree.root.unwrap();

        let outcome = tree.split_full_leaf(leaf, 5);

        assert_eq!(tree.root, Some(outcome.owner));
        assert_eq!(keys_of(&tree, outcome.owner), vec![10]);
        assert_eq!(keys_of(&tree, outcome.small), vec![5]);
        assert_eq!(keys_of(&tree, outcome.big), vec![20]);
        assert_eq!(tree.arena[outcome.small].parent(), Some(outcome.owner));
        assert_eq!(tree.arena[outcome.big].parent(), Some(outcome.owner));
        assert_eq!(tree.stats.snapshot().root_splits, 1);
    }

    #[test]
    fn test_split_promotes_into_parent_with_room() {
        // root [10], leaves [5] [15, 20]
        let mut tree = tree_with(3, &[10, 20, 5, 15]);
        let root = tree.root.unwrap();
        let right = tree.arena[root].children()[1];

        let outcome = tree.split_full_leaf(right, 25);

        assert_eq!(outcome.owner, root);
        assert_eq!(keys_of(&tree, root), vec![10, 20]);
        assert_eq!(tree.arena[root].children().len(), 3);
        assert_eq!(keys_of(&tree, outcome.small), vec![15]);
        assert_eq!(keys_of(&tree, outcome.big), vec![25]);
        assert_eq!(tree.arena[root].children()[1], outcome.small);
        assert_eq!(tree.arena[root].children()[2], outcome.big);
    }

    #[test]
    fn test_split_cascades_to_new_root() {
        // root [10, 20], leaves [5] [15] [25, 30]
        let mut tree = tree_with(3, &[10, 20, 5, 15, 25, 30]);
        let old_root = tree.root.unwrap();
        assert_eq!(keys_of(&tree, old_root), vec![10, 20]);
        let rightmost = tree.arena[old_root].children()[2];

        // Leaf overflow promotes 30 into the full root, which promotes 20.
        let outcome = tree.split_full_leaf(rightmost, 35);
        tree.len += 1;

        let root = tree.root.unwrap();
        assert_eq!(keys_of(&tree, root), vec![20]);
        assert_eq!(keys_of(&tree, outcome.owner), vec![30]);
        assert_eq!(tree.arena[outcome.owner].parent(), Some(root));
        assert_eq!(keys_of(&tree, outcome.small), vec![25]);
        assert_eq!(keys_of(&tree, outcome.big), vec![35]);
        tree.validate().unwrap();
    }

    #[test]
    fn test_owner_when_promoted_key_moves_up_again() {
        // root [10, 30], leaves [5] [20, 25] [40]
        let mut tree = tree_with(3, &[10, 30, 5, 20, 40, 25]);
        let root = tree.root.unwrap();
        assert_eq!(keys_of(&tree, root), vec![10, 30]);
        let middle = tree.arena[root].children()[1];
        assert_eq!(keys_of(&tree, middle), vec![20, 25]);

        // Overfull leaf [20, 22, 25] promotes 22; overfull root [10, 22, 30]
        // promotes 22 again, so its owner is the new root.
        let outcome = tree.split_full_leaf(middle, 22);
        tree.len += 1;

        let new_root = tree.root.unwrap();
        assert_eq!(outcome.owner, new_root);
        assert_eq!(keys_of(&tree, new_root), vec![22]);
        assert_ne!(tree.arena[outcome.small].parent(), tree.arena[outcome.big].parent());
        tree.validate().unwrap();
    }

    #[test]
    fn test_even_overfull_array_promotes_upper_middle() {
        // degree 4: max_keys 3, overfull array of 4 promotes index 2
        let mut tree = tree_with(4, &[1, 2, 3]);
        let leaf = tree.root.unwrap();

        let outcome = tree.split_full_leaf(leaf, 4);

        assert_eq!(keys_of(&tree, outcome.owner), vec![3]);
        assert_eq!(keys_of(&tree, outcome.small), vec![1, 2]);
        assert_eq!(keys_of(&tree, outcome.big), vec![4]);
    }

    #[test]
    #[should_panic(expected = "is missing from its parent")]
    fn test_split_with_broken_parent_link_is_caught() {
        // root [10], leaves [5] [15, 20]
        let mut tree = tree_with(3, &[10, 20, 5, 15]);
        let root = tree.root.unwrap();
        let left = tree.arena[root].children()[0];
        let right = tree.arena[root].children()[1];

        // right now claims a parent that does not list it
        tree.arena[right].parent = Some(left);
        tree.split_full_leaf(right, 25);
    }

    #[test]
    fn test_split_releases_overfull_node() {
        let mut tree = tree_with(3, &[10, 20]);
        let before = tree.arena.len();

        tree.split_full_leaf(tree.root.unwrap(), 5);

        // one node released, three allocated
        assert_eq!(tree.arena.len(), before + 2);
    }
}
