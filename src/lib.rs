//! mwtree - An in-memory B-tree index.
//!
//! # Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                             mwtree                              │
//! ├─────────────────────────────────────────────────────────────────┤
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │        SharedBTree (index/btree/shared)                  │   │
//! │  │      Arc<RwLock<BTree>>: one writer, many readers        │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              BTree (index/btree/tree)                    │   │
//! │  │   search → insert → split-and-promote (cascading up)     │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! │                              ↓                                  │
//! │  ┌─────────────────────────────────────────────────────────┐   │
//! │  │              NodeArena (index/btree/arena)               │   │
//! │  │    slots of Node { keys, children, parent } + free list  │   │
//! │  └─────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - Shared primitives (NodeId, TreeConfig, Error)
//! - [`index`] - Index structures (B-tree)
//!
//! # Quick Start
//! ```
//! use mwtree::BTree;
//!
//! let mut tree = BTree::new(3).unwrap();
//! tree.extend([10, 20, 5, 15, 25]);
//!
//! let hit = tree.search(&15).unwrap();
//! assert!(hit.found);
//! assert!(tree.validate().is_ok());
//! ```

pub mod common;
pub mod index;

// Re-export commonly used items at crate root for convenience
pub use common::config::{DEFAULT_DEGREE, MIN_DEGREE};
pub use common::{Error, NodeId, Result, TreeConfig};

pub use index::btree::{BTree, Node, SearchResult, SharedBTree, TreeStats, TreeStatsSnapshot};
