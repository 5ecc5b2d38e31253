use alloc::boxed::Box;
use alloc::vec::Vec;

use super::NodeAllocator;
use crate::raw::{Handle, Node};

/// An unbounded allocator backed directly by the global heap.
///
/// Every [`allocate`](NodeAllocator::allocate) boxes a fresh node and every
/// [`release`](NodeAllocator::release) frees it again immediately. Only the
/// slot table that maps handles to boxes is kept around, so a single
/// `Dynamic` can serve any number of trees.
///
/// # Examples
///
/// ```
/// use avl_treemap::{AvlTree, Dynamic, NodeAllocator};
///
/// let mut heap = Dynamic::new();
/// let mut tree = AvlTree::new();
/// tree.put(&mut heap, 1, "a").unwrap();
/// assert_eq!(heap.in_use(), 1);
/// tree.clear(&mut heap);
/// assert_eq!(heap.in_use(), 0);
/// ```
pub struct Dynamic<K, V> {
    slots: Vec<Option<Box<Node<K, V>>>>,
    vacant: Vec<Handle>,
}

impl<K, V> Dynamic<K, V> {
    /// Creates an allocator with no slots.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            vacant: Vec::new(),
        }
    }
}

impl<K, V> Default for Dynamic<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> NodeAllocator<K, V> for Dynamic<K, V> {
    fn allocate(&mut self, node: Node<K, V>) -> Option<Handle> {
        let boxed = Box::new(node);
        if let Some(handle) = self.vacant.pop() {
            // Reuse a vacant slot; the box itself is always new.
            self.slots[handle.to_index()] = Some(boxed);
            Some(handle)
        } else if self.slots.len() < Handle::MAX_SLOTS {
            self.slots.push(Some(boxed));
            Some(Handle::from_index(self.slots.len() - 1))
        } else {
            tracing::trace!(target: "avl_treemap::allocator", slots = self.slots.len(), "dynamic allocator out of handles");
            None
        }
    }

    fn release(&mut self, handle: Handle) -> Node<K, V> {
        let boxed = self.slots[handle.to_index()].take().expect("`Dynamic::release()` - `handle` is invalid!");
        self.vacant.push(handle);
        *boxed
    }

    fn destroy(&mut self) {
        // Nothing is pooled; released nodes are already back on the heap.
    }

    #[inline]
    fn node(&self, handle: Handle) -> &Node<K, V> {
        self.slots[handle.to_index()].as_deref().expect("`Dynamic::node()` - `handle` is invalid!")
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.slots[handle.to_index()].as_deref_mut().expect("`Dynamic::node_mut()` - `handle` is invalid!")
    }

    fn capacity(&self) -> Option<usize> {
        None
    }

    fn in_use(&self) -> usize {
        self.slots.len() - self.vacant.len()
    }
}
