//! Error types for mwtree.

use crate::common::NodeId;

/// Convenient Result type alias.
///
/// Instead of writing `Result<T, Error>` everywhere, we can write `Result<T>`.
pub type Result<T> = std::result::Result<T, Error>;

/// All possible errors in mwtree.
///
/// Every error is raised before the tree is touched, so a failed call never
/// leaves the tree in a state that breaks its structural invariants.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum Error {
    /// Tree constructed with a degree below the minimum order.
    #[error("Invalid degree {degree}: a B-tree needs degree >= {min}")]
    InvalidDegree { degree: usize, min: usize },

    /// A node handle that is not a live node of this tree.
    ///
    /// Handles go stale when a split releases the node they pointed at.
    #[error("{0} is not a live node of this tree")]
    InvalidNode(NodeId),

    /// The operation exists on the API but the tree does not implement it.
    #[error("Operation not supported: {0}")]
    Unsupported(&'static str),

    /// A structural check found the tree in an inconsistent shape.
    ///
    /// This indicates a bug in the tree itself.
    #[error("Invariant violated: {0}")]
    InvariantViolation(String),
}
