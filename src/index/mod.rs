//! Index structures.
//!
//! - [`btree`] - In-memory B-tree over unique, totally ordered keys

pub mod btree;
