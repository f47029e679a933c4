//! The B-tree handle: construction, search, insert and structural checks.

use std::fmt::{self, Debug, Display, Formatter};

use tracing::trace;

use crate::common::{Error, NodeId, Result, TreeConfig};
use crate::index::btree::arena::NodeArena;
use crate::index::btree::node::{insert_ordered, Node};
use crate::index::btree::search::{descend, SearchResult};
use crate::index::btree::stats::TreeStats;

/// A balanced multiway search tree of fixed degree.
///
/// Keys are kept unique and ordered. All leaves sit at the same depth and
/// every non-root node holds between `min_keys` and `max_keys` keys.
///
/// Inserts land in a leaf; a leaf that would overflow is split and its
/// middle key promoted, cascading upward as far as needed (see the `split`
/// module). There is no delete path.
///
/// Not safe for concurrent mutation; wrap it in
/// [`SharedBTree`](crate::index::btree::SharedBTree) to share it.
///
/// # Example
/// ```
/// use mwtree::BTree;
///
/// let mut tree = BTree::new(3).unwrap();
/// for key in [10, 20, 5] {
///     tree.insert(key);
/// }
///
/// assert!(tree.contains(&5));
/// assert_eq!(tree.height(), 2);
/// assert_eq!(tree.keys(), vec![&5, &10, &20]);
/// ```
#[derive(Debug, Clone)]
pub struct BTree<K> {
    pub(crate) config: TreeConfig,
    pub(crate) arena: NodeArena<K>,
    pub(crate) root: Option<NodeId>,
    /// Number of stored keys.
    pub(crate) len: usize,
    pub(crate) stats: TreeStats,
}

impl<K> BTree<K> {
    /// Create an empty tree of the given degree.
    ///
    /// # Errors
    /// - `Error::InvalidDegree` if `degree < 3`
    pub fn new(degree: usize) -> Result<Self> {
        Ok(Self::with_config(TreeConfig::new(degree)?))
    }

    /// Create an empty tree from an already validated config.
    pub fn with_config(config: TreeConfig) -> Self {
        Self {
            config,
            arena: NodeArena::new(),
            root: None,
            len: 0,
            stats: TreeStats::new(),
        }
    }

    pub fn config(&self) -> TreeConfig {
        self.config
    }

    pub fn degree(&self) -> usize {
        self.config.degree()
    }

    pub fn min_keys(&self) -> usize {
        self.config.min_keys()
    }

    pub fn max_keys(&self) -> usize {
        self.config.max_keys()
    }

    pub fn min_children(&self) -> usize {
        self.config.min_children()
    }

    pub fn max_children(&self) -> usize {
        self.config.max_children()
    }

    /// Number of keys stored.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Number of live nodes.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    /// Look up a node by handle.
    ///
    /// Returns `None` for handles released by a split since they were
    /// handed out.
    pub fn node(&self, id: NodeId) -> Option<&Node<K>> {
        self.arena.get(id)
    }

    pub fn stats(&self) -> &TreeStats {
        &self.stats
    }

    /// Number of levels: 0 for an empty tree, 1 for a lone leaf root.
    pub fn height(&self) -> usize {
        let mut height = 0;
        let mut curr = self.root;
        while let Some(id) = curr {
            height += 1;
            curr = self.arena[id].children.first().copied();
        }
        height
    }

    /// Visit every node depth-first, parents before children, children left
    /// to right. The callback receives the node's depth (root = 0).
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(usize, NodeId, &Node<K>),
    {
        let mut stack: Vec<(NodeId, usize)> = self.root.map(|r| (r, 0)).into_iter().collect();
        while let Some((id, depth)) = stack.pop() {
            let node = &self.arena[id];
            visit(depth, id, node);
            stack.extend(node.children.iter().rev().map(|&c| (c, depth + 1)));
        }
    }

    /// All keys in ascending order.
    pub fn keys(&self) -> Vec<&K> {
        let mut out = Vec::with_capacity(self.len);
        if let Some(root) = self.root {
            self.collect_in_order(root, &mut out);
        }
        out
    }

    fn collect_in_order<'a>(&'a self, id: NodeId, out: &mut Vec<&'a K>) {
        let node = &self.arena[id];
        if node.is_leaf() {
            out.extend(node.keys.iter());
            return;
        }
        for (i, key) in node.keys.iter().enumerate() {
            self.collect_in_order(node.children[i], out);
            out.push(key);
        }
        if let Some(&last) = node.children.last() {
            self.collect_in_order(last, out);
        }
    }

    /// Smallest key.
    pub fn first(&self) -> Option<&K> {
        let mut id = self.root?;
        while let Some(&child) = self.arena[id].children.first() {
            id = child;
        }
        self.arena[id].keys.first()
    }

    /// Largest key.
    pub fn last(&self) -> Option<&K> {
        let mut id = self.root?;
        while let Some(&child) = self.arena[id].children.last() {
            id = child;
        }
        self.arena[id].keys.last()
    }
}

impl<K: Ord> BTree<K> {
    /// Search from the root.
    ///
    /// Returns `None` only when the tree is empty.
    pub fn search(&self, key: &K) -> Option<SearchResult> {
        self.stats.record_search();
        self.root.map(|root| descend(&self.arena, root, key))
    }

    /// Search the subtree rooted at `start`.
    ///
    /// # Errors
    /// - `Error::InvalidNode` if `start` is not a live node of this tree
    pub fn search_from(&self, start: NodeId, key: &K) -> Result<SearchResult> {
        if !self.arena.contains(start) {
            return Err(Error::InvalidNode(start));
        }
        self.stats.record_search();
        Ok(descend(&self.arena, start, key))
    }

    pub fn contains(&self, key: &K) -> bool {
        self.search(key).is_some_and(|hit| hit.found)
    }

    /// Make `key` a member of the tree.
    ///
    /// Returns `true` once the key is present, whether it was stored by
    /// this call or already there. Inserting an existing key changes
    /// nothing.
    pub fn insert(&mut self, key: K) -> bool {
        let Some(root) = self.root else {
            let leaf = Node::leaf_with_key(key, self.config.max_keys());
            self.root = Some(self.arena.alloc(leaf));
            self.len = 1;
            self.stats.record_insert();
            return true;
        };

        let hit = descend(&self.arena, root, &key);
        self.stats.record_search();
        if hit.found {
            trace!(node = %hit.node, index = hit.index, "key already present");
            self.stats.record_duplicate();
            return true;
        }

        if self.arena[hit.node].key_count() < self.config.max_keys() {
            let (at, _) = insert_ordered(&mut self.arena[hit.node].keys, key);
            debug_assert_eq!(at, hit.index);
        } else {
            let outcome = self.split_full_leaf(hit.node, key);
            trace!(owner = %outcome.owner, small = %outcome.small, big = %outcome.big, "leaf split");
        }

        self.len += 1;
        self.stats.record_insert();
        true
    }

    /// Deletion is not implemented.
    ///
    /// # Errors
    /// Always `Error::Unsupported`; the tree is left untouched.
    pub fn remove(&mut self, _key: &K) -> Result<bool> {
        Err(Error::Unsupported("remove"))
    }

    /// Check every structural invariant.
    ///
    /// - all leaves at the same depth
    /// - non-root occupancy within `min_keys..=max_keys`, root within `1..=max_keys`
    ///
    ///   The root's lower bound of 1 is stricter than the usual "root is
    ///   exempt" rule. An empty tree has no root node at all, and a root is
    ///   only ever created holding a key (first insert or a root split), so a
    ///   zero-key root can only come from corruption.
    ///
    /// - keys strictly increasing and bounded by the parent's separators
    /// - every non-root node's parent lists it exactly once among its children
    /// - stored key count and live node count match what the walk finds
    ///
    /// # Errors
    /// - `Error::InvariantViolation` describing the first broken rule
    pub fn validate(&self) -> Result<()> {
        let Some(root) = self.root else {
            if self.len != 0 || self.arena.len() != 0 {
                return Err(violation(format!(
                    "empty tree reports {} keys and {} nodes",
                    self.len,
                    self.arena.len()
                )));
            }
            return Ok(());
        };

        let mut audit = Audit::default();
        self.check_node(root, None, 0, None, None, &mut audit)?;

        if audit.keys != self.len {
            return Err(violation(format!(
                "tree reports {} keys but holds {}",
                self.len, audit.keys
            )));
        }
        if audit.nodes != self.arena.len() {
            return Err(violation(format!(
                "{} nodes reachable but {} allocated",
                audit.nodes,
                self.arena.len()
            )));
        }
        Ok(())
    }

    fn check_node(
        &self,
        id: NodeId,
        expected_parent: Option<NodeId>,
        depth: usize,
        lower: Option<&K>,
        upper: Option<&K>,
        audit: &mut Audit,
    ) -> Result<()> {
        let node = self
            .arena
            .get(id)
            .ok_or_else(|| violation(format!("{} is referenced but not live", id)))?;
        audit.nodes += 1;
        audit.keys += node.key_count();

        if node.parent != expected_parent {
            return Err(violation(format!(
                "{} has parent {:?}, expected {:?}",
                id, node.parent, expected_parent
            )));
        }
        if let Some(parent) = expected_parent {
            let listed = self.arena[parent].children.iter().filter(|&&c| c == id).count();
            if listed != 1 {
                return Err(violation(format!(
                    "{} appears {} times among the children of {}",
                    id, listed, parent
                )));
            }
        }

        let count = node.key_count();
        let min = if expected_parent.is_none() { 1 } else { self.config.min_keys() };
        if count < min || count > self.config.max_keys() {
            return Err(violation(format!(
                "{} holds {} keys, allowed {}..={}",
                id,
                count,
                min,
                self.config.max_keys()
            )));
        }

        if node.keys.windows(2).any(|w| w[0] >= w[1]) {
            return Err(violation(format!("{} keys are not strictly increasing", id)));
        }
        let below_lower = lower.is_some_and(|lo| node.keys.first().is_some_and(|k| k <= lo));
        let above_upper = upper.is_some_and(|hi| node.keys.last().is_some_and(|k| k >= hi));
        if below_lower || above_upper {
            return Err(violation(format!("{} keys escape their separator bounds", id)));
        }

        if node.is_leaf() {
            match audit.leaf_depth {
                None => audit.leaf_depth = Some(depth),
                Some(d) if d != depth => {
                    return Err(violation(format!(
                        "leaf {} at depth {}, other leaves at depth {}",
                        id, depth, d
                    )));
                }
                Some(_) => {}
            }
            return Ok(());
        }

        if node.children.len() != count + 1 {
            return Err(violation(format!(
                "{} has {} keys but {} children",
                id,
                count,
                node.children.len()
            )));
        }
        for (i, &child) in node.children.iter().enumerate() {
            let lo = if i == 0 { lower } else { node.keys.get(i - 1) };
            let hi = node.keys.get(i).or(upper);
            self.check_node(child, Some(id), depth + 1, lo, hi, audit)?;
        }
        Ok(())
    }
}

#[derive(Default)]
struct Audit {
    nodes: usize,
    keys: usize,
    leaf_depth: Option<usize>,
}

fn violation(message: String) -> Error {
    Error::InvariantViolation(message)
}

impl<K> Default for BTree<K> {
    fn default() -> Self {
        Self::with_config(TreeConfig::default())
    }
}

impl<K: Ord> Extend<K> for BTree<K> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for key in iter {
            self.insert(key);
        }
    }
}

impl<K: Debug> Display for BTree<K> {
    /// One node per line, indented two spaces per level.
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.root.is_none() {
            return writeln!(f, "(empty)");
        }
        let mut result = Ok(());
        self.walk(|depth, _, node| {
            if result.is_ok() {
                result = writeln!(f, "{}{:?}", "  ".repeat(depth), node.keys);
            }
        });
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tree_with(degree: usize, keys: &[i32]) -> BTree<i32> {
        let mut tree = BTree::new(degree).unwrap();
        tree.extend(keys.iter().copied());
        tree
    }

    fn root_keys(tree: &BTree<i32>) -> Vec<i32> {
        tree.node(tree.root().unwrap()).unwrap().keys().to_vec()
    }

    fn child_keys(tree: &BTree<i32>) -> Vec<Vec<i32>> {
        let root = tree.node(tree.root().unwrap()).unwrap();
        root.children()
            .iter()
            .map(|&c| tree.node(c).unwrap().keys().to_vec())
            .collect()
    }

    #[test]
    fn test_new_rejects_small_degree() {
        assert_eq!(
            BTree::<i32>::new(2).unwrap_err(),
            Error::InvalidDegree { degree: 2, min: 3 }
        );
        assert!(BTree::<i32>::new(3).is_ok());
    }

    #[test]
    fn test_empty_tree() {
        let tree: BTree<i32> = BTree::new(3).unwrap();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
        assert_eq!(tree.height(), 0);
        assert_eq!(tree.search(&1), None);
        assert!(!tree.contains(&1));
        assert!(tree.keys().is_empty());
        assert_eq!(tree.first(), None);
        tree.validate().unwrap();
    }

    #[test]
    fn test_first_insert_creates_leaf_root() {
        let mut tree = BTree::new(3).unwrap();
        assert!(tree.insert(42));

        let root = tree.node(tree.root().unwrap()).unwrap();
        assert!(root.is_leaf());
        assert_eq!(root.keys(), &[42]);
        assert_eq!(root.parent(), None);
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.height(), 1);
    }

    #[test]
    fn test_scenario_split_root_leaf() {
        let tree = tree_with(3, &[10, 20]);
        assert_eq!(root_keys(&tree), vec![10, 20]);

        let tree = tree_with(3, &[10, 20, 5]);
        assert_eq!(root_keys(&tree), vec![10]);
        assert_eq!(child_keys(&tree), vec![vec![5], vec![20]]);
        tree.validate().unwrap();
    }

    #[test]
    fn test_scenario_leaf_has_room() {
        let tree = tree_with(3, &[10, 20, 5, 15]);
        assert_eq!(root_keys(&tree), vec![10]);
        assert_eq!(child_keys(&tree), vec![vec![5], vec![15, 20]]);
    }

    #[test]
    fn test_scenario_promote_into_root() {
        let tree = tree_with(3, &[10, 20, 5, 15, 25]);
        assert_eq!(root_keys(&tree), vec![10, 20]);
        assert_eq!(child_keys(&tree), vec![vec![5], vec![15], vec![25]]);
        assert_eq!(tree.height(), 2);
        tree.validate().unwrap();
    }

    #[test]
    fn test_search_result_fields() {
        let tree = tree_with(3, &[10, 20, 5, 15]);
        let root = tree.root().unwrap();

        let hit = tree.search(&10).unwrap();
        assert_eq!((hit.node, hit.index, hit.found), (root, 0, true));

        let hit = tree.search(&20).unwrap();
        assert!(hit.found);
        assert_eq!(hit.index, 1);
        assert_eq!(tree.node(hit.node).unwrap().keys(), &[15, 20]);

        let miss = tree.search(&17).unwrap();
        assert!(!miss.found);
        assert_eq!(miss.index, 1);
        assert!(tree.node(miss.node).unwrap().is_leaf());
    }

    #[test]
    fn test_search_from_stale_node() {
        let mut tree = tree_with(3, &[10, 20]);
        let old_root = tree.root().unwrap();
        assert!(tree.search_from(old_root, &10).unwrap().found);

        // The split frees the old root's slot and reuses it right away.
        tree.insert(5);
        let mut live = Vec::new();
        tree.walk(|_, id, _| live.push(id));
        let successor = NodeId::new(old_root.slot(), old_root.generation() + 1);
        assert!(live.contains(&successor));
        assert!(!live.contains(&old_root));

        assert_eq!(tree.search_from(old_root, &20), Err(Error::InvalidNode(old_root)));
        assert_eq!(tree.node(old_root), None);

        let unknown = NodeId::new(1000, 0);
        assert_eq!(tree.search_from(unknown, &5), Err(Error::InvalidNode(unknown)));
    }

    #[test]
    fn test_search_from_subtree() {
        let tree = tree_with(3, &[10, 20, 5, 15]);
        let root = tree.node(tree.root().unwrap()).unwrap();
        let right = root.children()[1];

        assert!(tree.search_from(right, &15).unwrap().found);
        // 5 lives in the left subtree
        assert!(!tree.search_from(right, &5).unwrap().found);
    }

    #[test]
    fn test_duplicate_insert_is_idempotent() {
        let mut tree = tree_with(3, &[10, 20, 5, 15, 25]);
        let before = format!("{}", tree);

        assert!(tree.insert(15));
        assert!(tree.insert(10));

        assert_eq!(tree.len(), 5);
        assert_eq!(format!("{}", tree), before);
        assert_eq!(tree.stats().snapshot().duplicate_inserts, 2);
    }

    #[test]
    fn test_remove_is_unsupported() {
        let mut tree = tree_with(3, &[1, 2, 3]);
        assert_eq!(tree.remove(&2), Err(Error::Unsupported("remove")));
        assert!(tree.contains(&2));
        assert_eq!(tree.len(), 3);
    }

    #[test]
    fn test_keys_in_order() {
        let tree = tree_with(4, &[50, 10, 40, 20, 30, 60, 5, 45]);
        assert_eq!(tree.keys(), vec![&5, &10, &20, &30, &40, &45, &50, &60]);
        assert_eq!(tree.first(), Some(&5));
        assert_eq!(tree.last(), Some(&60));
    }

    #[test]
    fn test_walk_preorder() {
        let tree = tree_with(3, &[10, 20, 5, 15, 25]);
        let mut seen = Vec::new();
        tree.walk(|depth, _, node| seen.push((depth, node.keys().to_vec())));

        assert_eq!(
            seen,
            vec![
                (0, vec![10, 20]),
                (1, vec![5]),
                (1, vec![15]),
                (1, vec![25]),
            ]
        );
    }

    #[test]
    fn test_display() {
        let tree = tree_with(3, &[10, 20, 5]);
        assert_eq!(format!("{}", tree), "[10]\n  [5]\n  [20]\n");

        let empty: BTree<i32> = BTree::default();
        assert_eq!(format!("{}", empty), "(empty)\n");
    }

    #[test]
    fn test_validate_detects_corruption() {
        let mut tree = tree_with(3, &[10, 20, 5]);
        let root = tree.root().unwrap();
        let left = tree.arena[root].children[0];

        // Put a key on the wrong side of its separator
        tree.arena[left].keys[0] = 11;
        assert!(matches!(tree.validate(), Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_validate_rejects_empty_root_node() {
        let mut tree = tree_with(3, &[10]);
        let root = tree.root().unwrap();

        tree.arena[root].keys.clear();
        tree.len = 0;

        match tree.validate() {
            Err(Error::InvariantViolation(msg)) => assert!(msg.contains("holds 0 keys")),
            other => panic!("Expected InvariantViolation, got {:?}", other),
        }
    }

    #[test]
    fn test_validate_detects_bad_parent() {
        let mut tree = tree_with(3, &[10, 20, 5]);
        let root = tree.root().unwrap();
        let left = tree.arena[root].children[0];
        let right = tree.arena[root].children[1];

        tree.arena[left].parent = Some(right);
        assert!(matches!(tree.validate(), Err(Error::InvariantViolation(_))));
    }

    #[test]
    fn test_stats_counts() {
        let tree = tree_with(3, &[10, 20, 5, 15, 25]);
        let snapshot = tree.stats().snapshot();

        assert_eq!(snapshot.inserts, 5);
        assert_eq!(snapshot.splits, 2);
        assert_eq!(snapshot.root_splits, 1);
    }
}
