use core::fmt;
use core::iter::FusedIterator;
use core::marker::PhantomData;

use crate::allocator::NodeAllocator;
use crate::comparator::{Comparator, NaturalOrder};
use crate::error::{InvariantViolation, TreeError};
use crate::raw::{Handle, RawAvlTree, Walk};

mod cursor;
mod deque;
mod order_statistic;

pub use cursor::{Cursor, CursorMut};
pub use deque::UnitStep;

/// An ordered map based on an [AVL tree], whose nodes live in a lent
/// [`NodeAllocator`].
///
/// Entries are kept in the order defined by the tree's [`Comparator`]
/// (ascending [`Ord`] by default). Every node records its height and the size
/// of its subtree, so besides the usual map operations the tree answers
/// order-statistic queries ([`get_by_rank`](AvlTree::get_by_rank),
/// [`rank_of`](AvlTree::rank_of)) in O(log n) and doubles as a deque over
/// integer keys (see [`push_first`](AvlTree::push_first)).
///
/// # Allocators
///
/// The tree does not own its nodes' storage. Each call borrows an allocator:
/// shared for reads, exclusive for anything that links or unlinks nodes. The
/// same allocator must be passed to every call on a given tree, and a single
/// allocator may serve any number of trees. Nodes are identified by
/// [`Handle`]s. A handle is stable across insertions and overwrites, but
/// removing *any* key may invalidate handles to other keys: a node with two
/// children takes over its in-order successor's entry and the successor's
/// record goes back to the allocator. After a removal, find nodes again by
/// key.
///
/// A tree that is dropped without [`clear`](AvlTree::clear) or
/// [`destroy`](AvlTree::destroy) leaves its nodes checked out of the
/// allocator. Nothing is freed twice; the records are simply unavailable
/// until the allocator itself is destroyed or dropped.
///
/// It is a logic error for a key to be modified in such a way that its
/// ordering relative to any other key changes while it is in the tree, or
/// to pass a tree an allocator other than the one holding its nodes. Either
/// may cause panics or incorrect results, never undefined behavior.
///
/// # Examples
///
/// ```
/// use avl_treemap::{AvlTree, Dynamic};
///
/// let mut heap = Dynamic::new();
/// let mut scores = AvlTree::new();
///
/// scores.put(&mut heap, "Carol", 92).unwrap();
/// scores.put(&mut heap, "Alice", 100).unwrap();
/// scores.put(&mut heap, "Bob", 85).unwrap();
///
/// assert_eq!(scores.get(&heap, &"Bob"), Some(&85));
/// assert_eq!(scores.get_by_rank(&heap, 0), Some((&"Alice", &100)));
/// assert_eq!(scores.rank_of(&heap, &"Carol"), Some(2));
///
/// // Replacing a value keeps the structure and hands back the old value.
/// assert_eq!(scores.put(&mut heap, "Bob", 88).unwrap(), Some(85));
/// assert_eq!(scores.len(), 3);
///
/// scores.destroy(&mut heap);
/// ```
///
/// [AVL tree]: https://en.wikipedia.org/wiki/AVL_tree
pub struct AvlTree<K, V, C = NaturalOrder> {
    raw: RawAvlTree<K, V>,
    comparator: C,
}

/// An iterator over the entries of an [`AvlTree`], in key order.
///
/// This `struct` is created by [`AvlTree::iter`].
#[must_use = "iterators are lazy and do nothing unless consumed"]
pub struct Iter<'a, K, V, A: ?Sized> {
    alloc: &'a A,
    /// In-order stack for the front of the iteration.
    front: Walk,
    /// Reverse in-order stack for the back of the iteration.
    back: Walk,
    remaining: usize,
    marker: PhantomData<&'a (K, V)>,
}

impl<K, V> AvlTree<K, V> {
    /// Makes a new, empty `AvlTree` ordered by `K`'s [`Ord`] implementation.
    ///
    /// Does not allocate anything on its own.
    #[must_use]
    pub const fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }
}

impl<K, V, C> AvlTree<K, V, C> {
    /// Makes a new, empty `AvlTree` ordered by `comparator`.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_treemap::{AvlTree, Dynamic, ReverseOrder};
    ///
    /// let mut heap = Dynamic::new();
    /// let mut tree = AvlTree::with_comparator(ReverseOrder);
    /// for key in 1..=3 {
    ///     tree.put(&mut heap, key, ()).unwrap();
    /// }
    /// assert_eq!(tree.first_key_value(&heap), Some((&3, &())));
    /// # tree.destroy(&mut heap);
    /// ```
    #[must_use]
    pub const fn with_comparator(comparator: C) -> Self {
        Self {
            raw: RawAvlTree::new(),
            comparator,
        }
    }

    /// Returns the comparator that orders this tree.
    #[must_use]
    pub const fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Returns the number of entries in the tree.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.raw.len()
    }

    /// Returns `true` if the tree contains no entries.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// Returns the root node, if any.
    #[must_use]
    pub const fn root_node(&self) -> Option<Handle> {
        self.raw.root()
    }

    /// Returns the node holding the smallest key.
    pub fn first_node<A>(&self, alloc: &A) -> Option<Handle>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.raw.first(alloc)
    }

    /// Returns the node holding the largest key.
    pub fn last_node<A>(&self, alloc: &A) -> Option<Handle>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.raw.last(alloc)
    }

    /// Returns the first key-value pair in the tree.
    pub fn first_key_value<'a, A>(&self, alloc: &'a A) -> Option<(&'a K, &'a V)>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.first_node(alloc).map(|handle| entry(alloc, handle))
    }

    /// Returns the last key-value pair in the tree.
    pub fn last_key_value<'a, A>(&self, alloc: &'a A) -> Option<(&'a K, &'a V)>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.last_node(alloc).map(|handle| entry(alloc, handle))
    }

    /// Releases every node back to `alloc`, leaving the tree empty and
    /// reusable.
    pub fn clear<A>(&mut self, alloc: &mut A)
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        tracing::debug!(target: "avl_treemap::tree", len = self.len(), "clearing tree");
        self.raw.clear(alloc);
    }

    /// Releases every node back to `alloc`.
    ///
    /// The allocator itself is left alive; it may still be lent to other
    /// trees. Destroying an already empty tree does nothing.
    pub fn destroy<A>(&mut self, alloc: &mut A)
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        if !self.is_empty() {
            self.clear(alloc);
        }
    }

    /// Gets an iterator over the entries of the tree, sorted by key.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_treemap::{AvlTree, Dynamic};
    ///
    /// let mut heap = Dynamic::new();
    /// let mut tree = AvlTree::new();
    /// tree.put(&mut heap, 3, "c").unwrap();
    /// tree.put(&mut heap, 1, "a").unwrap();
    /// tree.put(&mut heap, 2, "b").unwrap();
    ///
    /// let values: Vec<_> = tree.iter(&heap).map(|(_, v)| *v).collect();
    /// assert_eq!(values, ["a", "b", "c"]);
    ///
    /// let (key, _) = tree.iter(&heap).next_back().unwrap();
    /// assert_eq!(*key, 3);
    /// # tree.destroy(&mut heap);
    /// ```
    pub fn iter<'a, A>(&self, alloc: &'a A) -> Iter<'a, K, V, A>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        let mut front = Walk::new();
        let mut back = Walk::new();
        RawAvlTree::<K, V>::descend_left(alloc, self.raw.root(), &mut front);
        RawAvlTree::<K, V>::descend_right(alloc, self.raw.root(), &mut back);

        Iter {
            alloc,
            front,
            back,
            remaining: self.len(),
            marker: PhantomData,
        }
    }
}

impl<K, V, C: Comparator<K>> AvlTree<K, V, C> {
    /// Inserts a key-value pair into the tree.
    ///
    /// If the tree did not have this key present, `None` is returned.
    /// If it did, the value is updated and the old value is returned; the
    /// key stored in the tree is kept.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Exhausted`] if `alloc` has no node left. The
    /// tree is unchanged and `key` and `value` are dropped.
    pub fn put<A>(&mut self, alloc: &mut A, key: K, value: V) -> Result<Option<V>, TreeError>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.raw.insert(alloc, &self.comparator, key, value).map(|(_, old)| old)
    }

    /// Inserts a key-value pair like [`put`](AvlTree::put), returning the
    /// node that now holds `key`.
    ///
    /// The handle stays valid until the next removal from this tree.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Exhausted`] if `alloc` has no node left.
    pub fn put_node<A>(&mut self, alloc: &mut A, key: K, value: V) -> Result<Handle, TreeError>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.raw.insert(alloc, &self.comparator, key, value).map(|(handle, _)| handle)
    }

    /// Returns the node holding `key`.
    ///
    /// The handle stays valid until the next removal from this tree.
    pub fn get_node<A>(&self, alloc: &A, key: &K) -> Option<Handle>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.raw.search(alloc, &self.comparator, key)
    }

    /// Returns a reference to the value corresponding to `key`.
    pub fn get<'a, A>(&self, alloc: &'a A, key: &K) -> Option<&'a V>
    where
        A: NodeAllocator<K, V> + ?Sized,
        K: 'a,
        V: 'a,
    {
        self.get_node(alloc, key).map(|handle| alloc.node(handle).value())
    }

    /// Returns the stored key and value corresponding to `key`.
    pub fn get_key_value<'a, A>(&self, alloc: &'a A, key: &K) -> Option<(&'a K, &'a V)>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.get_node(alloc, key).map(|handle| entry(alloc, handle))
    }

    /// Returns a mutable reference to the value corresponding to `key`.
    pub fn get_mut<'a, A>(&self, alloc: &'a mut A, key: &K) -> Option<&'a mut V>
    where
        A: NodeAllocator<K, V> + ?Sized,
        K: 'a,
        V: 'a,
    {
        let handle = self.get_node(alloc, key)?;
        Some(alloc.node_mut(handle).value_mut())
    }

    /// Returns `true` if the tree contains `key`.
    pub fn contains_key<A>(&self, alloc: &A, key: &K) -> bool
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.get_node(alloc, key).is_some()
    }

    /// Removes `key` from the tree, returning its value if it was present.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_treemap::{AvlTree, Dynamic, NodeAllocator};
    ///
    /// let mut heap = Dynamic::new();
    /// let mut tree = AvlTree::new();
    /// tree.put(&mut heap, 1, "a").unwrap();
    ///
    /// assert_eq!(tree.remove(&mut heap, &1), Some("a"));
    /// assert_eq!(tree.remove(&mut heap, &1), None);
    /// assert_eq!(heap.in_use(), 0);
    /// ```
    pub fn remove<A>(&mut self, alloc: &mut A, key: &K) -> Option<V>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.remove_entry(alloc, key).map(|(_, value)| value)
    }

    /// Removes `key` from the tree, returning the stored key and value if
    /// the key was present.
    pub fn remove_entry<A>(&mut self, alloc: &mut A, key: &K) -> Option<(K, V)>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.raw.remove(alloc, &self.comparator, key)
    }

    /// Removes and returns the first entry in the tree.
    pub fn remove_first<A>(&mut self, alloc: &mut A) -> Option<(K, V)>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.raw.remove_first(alloc, &self.comparator)
    }

    /// Removes and returns the last entry in the tree.
    pub fn remove_last<A>(&mut self, alloc: &mut A) -> Option<(K, V)>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.raw.remove_last(alloc, &self.comparator)
    }

    /// Returns the node with the smallest key strictly greater than `key`.
    pub fn higher_node<A>(&self, alloc: &A, key: &K) -> Option<Handle>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.raw.higher(alloc, &self.comparator, key)
    }

    /// Returns the node with the largest key strictly less than `key`.
    pub fn lower_node<A>(&self, alloc: &A, key: &K) -> Option<Handle>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.raw.lower(alloc, &self.comparator, key)
    }

    /// Returns the entry with the smallest key strictly greater than `key`.
    ///
    /// `key` does not need to be in the tree.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_treemap::{AvlTree, Dynamic};
    ///
    /// let mut heap = Dynamic::new();
    /// let mut tree = AvlTree::new();
    /// for key in [10, 20, 30] {
    ///     tree.put(&mut heap, key, key / 10).unwrap();
    /// }
    /// assert_eq!(tree.higher(&heap, &15), Some((&20, &2)));
    /// assert_eq!(tree.higher(&heap, &30), None);
    /// assert_eq!(tree.lower(&heap, &10), None);
    /// assert_eq!(tree.lower(&heap, &11), Some((&10, &1)));
    /// # tree.destroy(&mut heap);
    /// ```
    pub fn higher<'a, A>(&self, alloc: &'a A, key: &K) -> Option<(&'a K, &'a V)>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.higher_node(alloc, key).map(|handle| entry(alloc, handle))
    }

    /// Returns the entry with the largest key strictly less than `key`.
    pub fn lower<'a, A>(&self, alloc: &'a A, key: &K) -> Option<(&'a K, &'a V)>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.lower_node(alloc, key).map(|handle| entry(alloc, handle))
    }

    /// Checks the tree's structural invariants: key order, recorded heights
    /// and subtree sizes, the AVL balance bound and the entry count.
    ///
    /// # Errors
    ///
    /// Returns the first [`InvariantViolation`] found.
    pub fn validate<A>(&self, alloc: &A) -> Result<(), InvariantViolation>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.raw.validate(alloc, &self.comparator)
    }
}

impl<K: Clone, V: Clone, C: Comparator<K> + Clone> AvlTree<K, V, C> {
    /// Makes a copy of the tree whose nodes come from the same allocator.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Exhausted`] if `alloc` runs out of nodes part way
    /// through. Every node of the partial copy is released again, and the
    /// source tree is untouched.
    pub fn copy<A>(&self, alloc: &mut A) -> Result<Self, TreeError>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        let mut copy = Self::with_comparator(self.comparator.clone());
        let mut pending = Walk::new();
        RawAvlTree::<K, V>::descend_left(alloc, self.raw.root(), &mut pending);

        while let Some(handle) = pending.pop() {
            let node = alloc.node(handle);
            let (key, value, right) = (node.key().clone(), node.value().clone(), node.right());
            if let Err(error) = copy.put(alloc, key, value) {
                copy.abandon(alloc);
                return Err(error);
            }
            RawAvlTree::<K, V>::descend_left(alloc, right, &mut pending);
        }

        Ok(copy)
    }

    /// Makes a copy of the tree in another allocator.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::Exhausted`] if `to` runs out of nodes part way
    /// through. The partial copy is released again.
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_treemap::{AvlTree, Dynamic, NodeAllocator, Slab};
    ///
    /// let mut heap = Dynamic::new();
    /// let mut tree = AvlTree::new();
    /// for key in 0..4 {
    ///     tree.put(&mut heap, key, key).unwrap();
    /// }
    ///
    /// let mut slab = Slab::with_capacity(4);
    /// let mut copy = tree.copy_to(&heap, &mut slab).unwrap();
    /// assert!(copy.iter(&slab).eq(tree.iter(&heap)));
    /// assert_eq!(slab.available(), Some(0));
    /// # copy.destroy(&mut slab);
    /// # tree.destroy(&mut heap);
    /// ```
    pub fn copy_to<A, B>(&self, from: &A, to: &mut B) -> Result<Self, TreeError>
    where
        A: NodeAllocator<K, V> + ?Sized,
        B: NodeAllocator<K, V> + ?Sized,
    {
        let mut copy = Self::with_comparator(self.comparator.clone());
        for (key, value) in self.iter(from) {
            if let Err(error) = copy.put(to, key.clone(), value.clone()) {
                copy.abandon(to);
                return Err(error);
            }
        }
        Ok(copy)
    }

    fn abandon<A>(mut self, alloc: &mut A)
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        tracing::debug!(
            target: "avl_treemap::tree",
            copied = self.len(),
            "allocator exhausted during copy, releasing partial copy"
        );
        self.raw.clear(alloc);
    }
}

#[inline]
fn entry<K, V, A>(alloc: &A, handle: Handle) -> (&K, &V)
where
    A: NodeAllocator<K, V> + ?Sized,
{
    let node = alloc.node(handle);
    (node.key(), node.value())
}

impl<K, V> Default for AvlTree<K, V> {
    /// Creates an empty `AvlTree` in natural key order.
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, C: fmt::Debug> fmt::Debug for AvlTree<K, V, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AvlTree")
            .field("len", &self.len())
            .field("root", &self.root_node())
            .field("comparator", &self.comparator)
            .finish()
    }
}

impl<'a, K: 'a, V: 'a, A> Iterator for Iter<'a, K, V, A>
where
    A: NodeAllocator<K, V> + ?Sized,
{
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.front.pop()?;
        let alloc = self.alloc;
        RawAvlTree::<K, V>::descend_left(alloc, alloc.node(handle).right(), &mut self.front);
        self.remaining -= 1;

        Some(entry(alloc, handle))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a, K: 'a, V: 'a, A> DoubleEndedIterator for Iter<'a, K, V, A>
where
    A: NodeAllocator<K, V> + ?Sized,
{
    fn next_back(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }

        let handle = self.back.pop()?;
        let alloc = self.alloc;
        RawAvlTree::<K, V>::descend_right(alloc, alloc.node(handle).left(), &mut self.back);
        self.remaining -= 1;

        Some(entry(alloc, handle))
    }
}

impl<'a, K: 'a, V: 'a, A> ExactSizeIterator for Iter<'a, K, V, A>
where
    A: NodeAllocator<K, V> + ?Sized,
{
    fn len(&self) -> usize {
        self.remaining
    }
}

impl<'a, K: 'a, V: 'a, A> FusedIterator for Iter<'a, K, V, A> where A: NodeAllocator<K, V> + ?Sized {}

impl<K, V, A: ?Sized> Clone for Iter<'_, K, V, A> {
    fn clone(&self) -> Self {
        Self {
            alloc: self.alloc,
            front: self.front.clone(),
            back: self.back.clone(),
            remaining: self.remaining,
            marker: PhantomData,
        }
    }
}

impl<K, V, A: ?Sized> fmt::Debug for Iter<'_, K, V, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Iter").field("remaining", &self.remaining).finish()
    }
}
