//! Common types and utilities shared across mwtree.
//!
//! This module contains fundamental primitives used throughout the codebase:
//! - Configuration constants and the validated tree shape
//! - Error types
//! - Node identifiers

pub mod config;
pub mod error;
mod node_id;

pub use config::TreeConfig;
pub use error::{Error, Result};
pub use node_id::NodeId;
