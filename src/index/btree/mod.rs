//! B-tree index implementation.
//!
//! # Components
//! - [`BTree`] - The tree handle: search, insert, traversal, validation
//! - [`Node`] - Read-only view of one node's keys, children and parent
//! - [`SearchResult`] - Where a search ended and whether it hit
//! - [`TreeStats`] - Operation counters
//! - [`SharedBTree`] - Lock-wrapped handle for use across threads
//!
//! Nodes live in an arena owned by the tree and are addressed by
//! [`NodeId`](crate::NodeId); the `split` module holds the overflow
//! algorithm.

mod arena;
mod node;
mod search;
mod shared;
mod split;
mod stats;
mod tree;

pub use node::Node;
pub use search::SearchResult;
pub use shared::SharedBTree;
pub use stats::{TreeStats, TreeStatsSnapshot};
pub use tree::BTree;
