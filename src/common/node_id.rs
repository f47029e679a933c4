//! Generation-tagged node handles.

use std::fmt;

/// Handle to a node in a tree's arena.
///
/// A handle is a `(slot, generation)` pair. The arena bumps a slot's
/// generation every time it frees the slot, so a handle taken before a
/// split released its node no longer matches once the slot is reused:
///
/// ```text
///   search  -> Node(0:0)        slot 0 holds the old root
///   insert  -> split frees slot 0, generation becomes 1,
///              the new left sibling lands in slot 0 as Node(0:1)
///   lookup of Node(0:0) -> rejected, stale generation
/// ```
///
/// # Example
/// ```
/// use mwtree::NodeId;
///
/// let id = NodeId::new(3, 1);
/// assert_eq!(id.slot(), 3);
/// assert_eq!(id.generation(), 1);
/// assert_eq!(id.to_string(), "Node(3:1)");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    slot: usize,
    generation: u32,
}

impl NodeId {
    #[inline]
    pub fn new(slot: usize, generation: u32) -> Self {
        Self { slot, generation }
    }

    /// Index of the arena slot this handle points at.
    #[inline]
    pub fn slot(self) -> usize {
        self.slot
    }

    /// Generation the slot had when this handle was issued.
    #[inline]
    pub fn generation(self) -> u32 {
        self.generation
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({}:{})", self.slot, self.generation)
    }
}
