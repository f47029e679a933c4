//! Downward key search.

use crate::common::NodeId;
use crate::index::btree::arena::NodeArena;

/// Outcome of a search walk.
///
/// When `found` is true, `node.keys()[index]` is the key. Otherwise `node`
/// is the leaf the walk ended in and `index` is where the key would be
/// inserted to keep that leaf ordered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchResult {
    pub node: NodeId,
    pub index: usize,
    pub found: bool,
}

/// Walk from `start` down to the key or to the leaf it belongs in.
///
/// Assumes a structurally valid subtree. Each step descends one level, so
/// the walk ends after at most `height` iterations.
pub(crate) fn descend<K: Ord>(arena: &NodeArena<K>, start: NodeId, key: &K) -> SearchResult {
    let mut curr = start;
    loop {
        let node = &arena[curr];
        let (index, found) = node.locate(key);
        if found || node.is_leaf() {
            return SearchResult {
                node: curr,
                index,
                found,
            };
        }
        curr = node.children[index];
    }
}
