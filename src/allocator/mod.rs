//! Node allocation strategies.
//!
//! Every [`AvlTree`](crate::AvlTree) obtains and recycles its node records
//! through a [`NodeAllocator`]. The allocator is lent to each tree operation
//! rather than owned by the tree, so one allocator can back several trees
//! and outlives all of them.
//!
//! Three strategies are provided:
//!
//! - [`Dynamic`] - every node is a fresh heap allocation, freed on release.
//! - [`Pooled`] - recycles released nodes through a free list and grows on
//!   demand up to a hard capacity.
//! - [`Slab`] - a single contiguous block sized at construction; never
//!   allocates again.

mod dynamic;
mod pooled;
mod slab;

pub use dynamic::Dynamic;
pub use pooled::Pooled;
pub use slab::Slab;

use crate::raw::{Handle, Node};

/// The capability interface shared by all node allocation strategies.
///
/// `allocate` hands out a record for a new node, `release` takes a record
/// back and `destroy` frees the allocator's own storage. Released records
/// are wiped: the key and value are moved out, so no stale data is visible
/// through a record that is later handed out again.
///
/// The trait is object safe; `&mut dyn NodeAllocator<K, V>` can be passed
/// anywhere a concrete allocator can.
pub trait NodeAllocator<K, V> {
    /// Stores `node` in a free record and returns its handle.
    ///
    /// Returns `None` when the allocator has reached its capacity. This is a
    /// normal backpressure signal, not an error: the tree reports it as a
    /// failed insertion and leaves its structure untouched.
    fn allocate(&mut self, node: Node<K, V>) -> Option<Handle>;

    /// Returns the record behind `handle` to the allocator, handing back the
    /// node it held.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not currently allocated.
    fn release(&mut self, handle: Handle) -> Node<K, V>;

    /// Frees every record the allocator holds.
    ///
    /// Afterwards every `allocate` fails. Nodes still checked out by a tree
    /// are dropped along with the storage; using that tree again is a
    /// caller error. Calling `destroy` more than once is harmless.
    fn destroy(&mut self);

    /// Returns the node behind `handle`.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not currently allocated.
    fn node(&self, handle: Handle) -> &Node<K, V>;

    /// Returns the node behind `handle` mutably.
    ///
    /// # Panics
    ///
    /// Panics if `handle` is not currently allocated.
    fn node_mut(&mut self, handle: Handle) -> &mut Node<K, V>;

    /// Returns the hard ceiling on records, or `None` if unbounded.
    fn capacity(&self) -> Option<usize>;

    /// Returns the number of records currently checked out.
    fn in_use(&self) -> usize;

    /// Returns how many more records can be allocated, or `None` if
    /// unbounded.
    fn available(&self) -> Option<usize> {
        self.capacity().map(|capacity| capacity.saturating_sub(self.in_use()))
    }
}
