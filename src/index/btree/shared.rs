//! A tree handle that can be shared across threads.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::common::{Result, TreeConfig};
use crate::index::btree::stats::TreeStatsSnapshot;
use crate::index::btree::tree::BTree;

/// A cloneable, thread-safe handle to one [`BTree`].
///
/// # Thread Safety
/// - inserts take the write lock, so there is one writer at a time and no
///   reader can observe a split half-way through
/// - lookups take the read lock and may run in parallel
///
/// # Example
/// ```
/// use mwtree::SharedBTree;
///
/// let tree = SharedBTree::new(4).unwrap();
/// let handle = tree.clone();
///
/// std::thread::spawn(move || handle.insert(7)).join().unwrap();
/// assert!(tree.contains(&7));
/// ```
#[derive(Debug)]
pub struct SharedBTree<K> {
    inner: Arc<RwLock<BTree<K>>>,
}

impl<K> Clone for SharedBTree<K> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<K> SharedBTree<K> {
    /// Create an empty shared tree of the given degree.
    ///
    /// # Errors
    /// - `Error::InvalidDegree` if `degree < 3`
    pub fn new(degree: usize) -> Result<Self> {
        Ok(Self::from_tree(BTree::new(degree)?))
    }

    pub fn with_config(config: TreeConfig) -> Self {
        Self::from_tree(BTree::with_config(config))
    }

    /// Wrap an existing tree.
    pub fn from_tree(tree: BTree<K>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn height(&self) -> usize {
        self.inner.read().height()
    }

    pub fn stats(&self) -> TreeStatsSnapshot {
        self.inner.read().stats().snapshot()
    }

    /// Run `f` against the tree under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&BTree<K>) -> R) -> R {
        f(&self.inner.read())
    }
}

impl<K: Ord> SharedBTree<K> {
    /// Insert under the write lock. See [`BTree::insert`].
    pub fn insert(&self, key: K) -> bool {
        self.inner.write().insert(key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.inner.read().contains(key)
    }

    /// Check the tree's invariants under the read lock.
    pub fn validate(&self) -> Result<()> {
        self.inner.read().validate()
    }
}
