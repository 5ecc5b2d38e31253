use alloc::boxed::Box;
use alloc::vec::Vec;

use super::NodeAllocator;
use crate::raw::{Handle, Node};

/// A fixed-capacity allocator carved out of one contiguous block.
///
/// All node storage and the free list are allocated once, when the slab is
/// created. Allocation and release only move handles on and off the free
/// list, so the slab never touches the heap after construction and its
/// capacity is permanent.
///
/// # Examples
///
/// ```
/// use avl_treemap::{AvlTree, NodeAllocator, Slab, TreeError};
///
/// let mut slab = Slab::with_capacity(5);
/// let mut tree = AvlTree::new();
/// for key in 1..=3 {
///     tree.put(&mut slab, key, key * 10).unwrap();
/// }
///
/// // A copy needs three more nodes but only two are left.
/// assert_eq!(tree.copy(&mut slab).err(), Some(TreeError::Exhausted));
/// assert_eq!(slab.available(), Some(2));
/// assert_eq!(tree.len(), 3);
/// # tree.destroy(&mut slab);
/// ```
pub struct Slab<K, V> {
    slots: Box<[Option<Node<K, V>>]>,
    free: Vec<Handle>,
}

impl<K, V> Slab<K, V> {
    /// Creates a slab with room for exactly `capacity` nodes.
    ///
    /// `capacity` is clamped to the number of nodes a [`Handle`] can
    /// address.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.min(Handle::MAX_SLOTS);
        let slots = (0..capacity).map(|_| None).collect();
        // Seeded in slot order, so the last slot is handed out first.
        let free = (0..capacity).map(Handle::from_index).collect();

        tracing::trace!(target: "avl_treemap::allocator", capacity, "created node slab");
        Self { slots, free }
    }

    /// Returns the number of slots carved out of the block.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.slots.len()
    }
}

impl<K, V> NodeAllocator<K, V> for Slab<K, V> {
    fn allocate(&mut self, node: Node<K, V>) -> Option<Handle> {
        let Some(handle) = self.free.pop() else {
            tracing::trace!(target: "avl_treemap::allocator", capacity = self.slots.len(), "node slab exhausted");
            return None;
        };
        self.slots[handle.to_index()] = Some(node);
        Some(handle)
    }

    fn release(&mut self, handle: Handle) -> Node<K, V> {
        let node = self
            .slots
            .get_mut(handle.to_index())
            .and_then(Option::take)
            .expect("`Slab::release()` - `handle` is invalid!");
        // The free list was sized for every slot up front, so this never grows it.
        self.free.push(handle);
        tracing::trace!(target: "avl_treemap::allocator", ?handle, free = self.free.len(), "node returned to slab");
        node
    }

    fn destroy(&mut self) {
        tracing::debug!(
            target: "avl_treemap::allocator",
            capacity = self.slots.len(),
            free = self.free.len(),
            "destroying node slab"
        );
        self.slots = Box::default();
        self.free = Vec::new();
    }

    #[inline]
    fn node(&self, handle: Handle) -> &Node<K, V> {
        self.slots
            .get(handle.to_index())
            .and_then(Option::as_ref)
            .expect("`Slab::node()` - `handle` is invalid!")
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.slots
            .get_mut(handle.to_index())
            .and_then(Option::as_mut)
            .expect("`Slab::node_mut()` - `handle` is invalid!")
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.slots.len())
    }

    fn in_use(&self) -> usize {
        self.slots.len() - self.free.len()
    }
}
