//! Slot storage for tree nodes.

use std::ops::{Index, IndexMut};

use crate::common::NodeId;
use crate::index::btree::node::Node;

/// Owns every node of a tree.
///
/// ```text
/// ┌────────────────────────────────────────────┐
/// │ slots: Vec<Slot<K>>                        │
/// │  [g0 Some] [g1 None] [g0 Some] [g2 None]   │
/// │               ▲                   ▲        │
/// │ free_list:    └────── indices ────┘        │
/// └────────────────────────────────────────────┘
/// ```
///
/// Released slots go on a free list (LIFO) and are reused by the next
/// allocation. Releasing a slot bumps its generation, so handles issued
/// before the release stop resolving even after the slot is refilled.
/// Indexing with a stale or released handle is a bug in the caller and
/// panics, like indexing past the end of a `Vec`.
#[derive(Debug, Clone)]
pub(crate) struct NodeArena<K> {
    slots: Vec<Slot<K>>,
    free_list: Vec<usize>,
    live: usize,
}

#[derive(Debug, Clone)]
struct Slot<K> {
    generation: u32,
    node: Option<Node<K>>,
}

impl<K> Slot<K> {
    /// The node, if `id` was issued for the slot's current generation.
    #[inline]
    fn get(&self, id: NodeId) -> Option<&Node<K>> {
        if self.generation == id.generation() {
            self.node.as_ref()
        } else {
            None
        }
    }

    #[inline]
    fn get_mut(&mut self, id: NodeId) -> Option<&mut Node<K>> {
        if self.generation == id.generation() {
            self.node.as_mut()
        } else {
            None
        }
    }
}

impl<K> NodeArena<K> {
    pub(crate) fn new() -> Self {
        Self {
            slots: Vec::new(),
            free_list: Vec::new(),
            live: 0,
        }
    }

    /// Store a node and return its handle.
    pub(crate) fn alloc(&mut self, node: Node<K>) -> NodeId {
        self.live += 1;
        match self.free_list.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                debug_assert!(slot.node.is_none());
                slot.node = Some(node);
                NodeId::new(index, slot.generation)
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId::new(self.slots.len() - 1, 0)
            }
        }
    }

    /// Take a node out of the arena, freeing its slot and retiring `id`.
    ///
    /// Returns `None` if `id` is stale, already released or out of range.
    pub(crate) fn release(&mut self, id: NodeId) -> Option<Node<K>> {
        let slot = self.slots.get_mut(id.slot())?;
        if slot.generation != id.generation() {
            return None;
        }
        let node = slot.node.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free_list.push(id.slot());
        self.live -= 1;
        Some(node)
    }

    pub(crate) fn get(&self, id: NodeId) -> Option<&Node<K>> {
        self.slots.get(id.slot())?.get(id)
    }

    pub(crate) fn contains(&self, id: NodeId) -> bool {
        self.get(id).is_some()
    }

    /// Number of live nodes.
    pub(crate) fn len(&self) -> usize {
        self.live
    }
}

impl<K> Default for NodeArena<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K> Index<NodeId> for NodeArena<K> {
    type Output = Node<K>;

    fn index(&self, id: NodeId) -> &Node<K> {
        match self.get(id) {
            Some(node) => node,
            None => panic!("{} is not a live node", id),
        }
    }
}

impl<K> IndexMut<NodeId> for NodeArena<K> {
    fn index_mut(&mut self, id: NodeId) -> &mut Node<K> {
        match self.slots.get_mut(id.slot()).and_then(|slot| slot.get_mut(id)) {
            Some(node) => node,
            None => panic!("{} is not a live node", id),
        }
    }
}
