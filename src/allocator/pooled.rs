use alloc::boxed::Box;
use alloc::vec::Vec;

use super::NodeAllocator;
use crate::raw::{Handle, Node};

/// A bounded allocator that recycles released records through a free list.
///
/// `preallocated` empty records are created eagerly; further records are
/// obtained from the heap one at a time until `capacity` records exist. From
/// then on allocation only succeeds by reusing a released record, and fails
/// once every record is checked out. Records are never returned to the heap
/// before [`destroy`](NodeAllocator::destroy), so a warmed-up pool serves a
/// steady workload without touching the heap at all.
///
/// Released records are reused most-recently-freed first.
///
/// # Examples
///
/// ```
/// use avl_treemap::{AvlTree, NodeAllocator, Pooled, TreeError};
///
/// let mut pool = Pooled::new(1, 2);
/// let mut tree = AvlTree::new();
/// tree.put(&mut pool, 1, "a").unwrap();
/// tree.put(&mut pool, 2, "b").unwrap();
/// assert_eq!(tree.put(&mut pool, 3, "c"), Err(TreeError::Exhausted));
///
/// tree.remove(&mut pool, &1);
/// assert_eq!(pool.available(), Some(1));
/// tree.put(&mut pool, 3, "c").unwrap();
/// # tree.destroy(&mut pool);
/// ```
pub struct Pooled<K, V> {
    // Each record is its own heap allocation; `None` marks a wiped record.
    records: Vec<Box<Option<Node<K, V>>>>,
    free: Vec<Handle>,
    capacity: usize,
}

impl<K, V> Pooled<K, V> {
    /// Creates a pool holding `preallocated` free records that may grow to
    /// `capacity` records.
    ///
    /// `preallocated` is clamped to `capacity`, and `capacity` to the number
    /// of nodes a [`Handle`] can address.
    #[must_use]
    pub fn new(preallocated: usize, capacity: usize) -> Self {
        let capacity = capacity.min(Handle::MAX_SLOTS);
        let preallocated = preallocated.min(capacity);

        let mut records = Vec::with_capacity(preallocated);
        let mut free = Vec::with_capacity(preallocated);
        for index in 0..preallocated {
            records.push(Box::new(None));
            free.push(Handle::from_index(index));
        }

        tracing::trace!(target: "avl_treemap::allocator", preallocated, capacity, "created node pool");
        Self { records, free, capacity }
    }

    /// Returns how many records have been obtained from the heap so far.
    #[must_use]
    pub fn allocated(&self) -> usize {
        self.records.len()
    }

    fn record(&self, handle: Handle) -> Option<&Node<K, V>> {
        self.records.get(handle.to_index()).and_then(|record| Option::as_ref(record))
    }
}

impl<K, V> NodeAllocator<K, V> for Pooled<K, V> {
    fn allocate(&mut self, node: Node<K, V>) -> Option<Handle> {
        if let Some(handle) = self.free.pop() {
            *self.records[handle.to_index()] = Some(node);
            Some(handle)
        } else if self.records.len() < self.capacity {
            self.records.push(Box::new(Some(node)));
            let handle = Handle::from_index(self.records.len() - 1);
            tracing::trace!(target: "avl_treemap::allocator", allocated = self.records.len(), capacity = self.capacity, "node pool grew");
            Some(handle)
        } else {
            tracing::trace!(target: "avl_treemap::allocator", capacity = self.capacity, "node pool exhausted");
            None
        }
    }

    fn release(&mut self, handle: Handle) -> Node<K, V> {
        let node = self
            .records
            .get_mut(handle.to_index())
            .and_then(|record| Option::take(record))
            .expect("`Pooled::release()` - `handle` is invalid!");
        self.free.push(handle);
        tracing::trace!(target: "avl_treemap::allocator", ?handle, free = self.free.len(), "node returned to pool");
        node
    }

    fn destroy(&mut self) {
        tracing::debug!(
            target: "avl_treemap::allocator",
            allocated = self.records.len(),
            free = self.free.len(),
            "destroying node pool"
        );
        self.records = Vec::new();
        self.free = Vec::new();
        self.capacity = 0;
    }

    #[inline]
    fn node(&self, handle: Handle) -> &Node<K, V> {
        self.record(handle).expect("`Pooled::node()` - `handle` is invalid!")
    }

    #[inline]
    fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V> {
        self.records
            .get_mut(handle.to_index())
            .and_then(|record| Option::as_mut(record))
            .expect("`Pooled::node_mut()` - `handle` is invalid!")
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.capacity)
    }

    fn in_use(&self) -> usize {
        self.records.len() - self.free.len()
    }
}
