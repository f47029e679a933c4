//! Tree node layout and the ordered key-array helper.

use crate::common::NodeId;

/// Insert `key` into an ascending, duplicate-free key array.
///
/// Returns the slot the key occupies and whether it was newly written.
/// When the key is already present the array is left untouched and the
/// incoming key is dropped.
///
/// Every key placement in the tree goes through here: leaf inserts, the
/// overfull array a split partitions, and a promoted key landing in its
/// parent.
pub(crate) fn insert_ordered<K: Ord>(keys: &mut Vec<K>, key: K) -> (usize, bool) {
    match keys.binary_search(&key) {
        Ok(at) => (at, false),
        Err(at) => {
            keys.insert(at, key);
            (at, true)
        }
    }
}

/// A single node of the tree.
///
/// ```text
///            keys:      [ k0 | k1 | k2 ]
///            children: c0   c1   c2   c3
///
///   c0 < k0 < c1 < k1 < c2 < k2 < c3
/// ```
///
/// The key count is `keys.len()`; unused capacity is never observable.
/// A node is a leaf exactly when it has no children, otherwise it has
/// `keys.len() + 1` of them.
///
/// `parent` is a lookup link only. The arena owns every node and the
/// owning direction of the tree is `children`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<K> {
    pub(crate) keys: Vec<K>,
    pub(crate) children: Vec<NodeId>,
    pub(crate) parent: Option<NodeId>,
}

impl<K> Node<K> {
    /// Create an empty leaf with room for `capacity` keys.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            keys: Vec::with_capacity(capacity),
            children: Vec::new(),
            parent: None,
        }
    }

    /// Create a leaf holding exactly one key.
    pub(crate) fn leaf_with_key(key: K, capacity: usize) -> Self {
        let mut node = Self::with_capacity(capacity);
        node.keys.push(key);
        node
    }

    /// Build a node from already-ordered parts.
    pub(crate) fn from_parts(keys: Vec<K>, children: Vec<NodeId>, parent: Option<NodeId>) -> Self {
        debug_assert!(children.is_empty() || children.len() == keys.len() + 1);
        Self {
            keys,
            children,
            parent,
        }
    }

    /// Keys stored in this node, ascending.
    #[inline]
    pub fn keys(&self) -> &[K] {
        &self.keys
    }

    /// Child handles, empty for a leaf.
    #[inline]
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    /// The owning node, or `None` for the root.
    #[inline]
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    #[inline]
    pub fn key_count(&self) -> usize {
        self.keys.len()
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Position of `child` among this node's children.
    pub(crate) fn child_position(&self, child: NodeId) -> Option<usize> {
        self.children.iter().position(|&c| c == child)
    }
}

impl<K: Ord> Node<K> {
    /// Locate `key` within this node.
    ///
    /// Returns the first slot `i` with `key <= keys[i]` (or `key_count()` if
    /// none) and whether `keys[i] == key`. For an internal node a miss at `i`
    /// means the key belongs under `children[i]`.
    #[inline]
    pub(crate) fn locate(&self, key: &K) -> (usize, bool) {
        match self.keys.binary_search(key) {
            Ok(at) => (at, true),
            Err(at) => (at, false),
        }
    }
}
