use super::{AvlTree, entry};
use crate::allocator::NodeAllocator;
use crate::comparator::Comparator;
use crate::raw::Handle;

impl<K, V, C> AvlTree<K, V, C> {
    /// Returns the node at position `rank` in key order.
    ///
    /// The rank is zero-based. Returns `None` if `rank` is out of bounds.
    ///
    /// # Complexity
    ///
    /// O(log n)
    pub fn nth_node<A>(&self, alloc: &A, rank: usize) -> Option<Handle>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.raw.nth(alloc, rank)
    }

    /// Returns the key-value pair at position `rank` in key order.
    ///
    /// The rank is zero-based. Returns `None` if `rank` is out of bounds.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_treemap::{AvlTree, Dynamic};
    ///
    /// let mut heap = Dynamic::new();
    /// let mut tree = AvlTree::new();
    /// tree.put(&mut heap, "a", 10).unwrap();
    /// tree.put(&mut heap, "c", 30).unwrap();
    /// tree.put(&mut heap, "b", 20).unwrap();
    ///
    /// assert_eq!(tree.get_by_rank(&heap, 1), Some((&"b", &20)));
    /// assert!(tree.get_by_rank(&heap, 3).is_none());
    /// # tree.destroy(&mut heap);
    /// ```
    pub fn get_by_rank<'a, A>(&self, alloc: &'a A, rank: usize) -> Option<(&'a K, &'a V)>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.nth_node(alloc, rank).map(|handle| entry(alloc, handle))
    }

    /// Returns the key and a mutable reference to the value at position
    /// `rank` in key order.
    pub fn get_by_rank_mut<'a, A>(&self, alloc: &'a mut A, rank: usize) -> Option<(&'a K, &'a mut V)>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        let handle = self.nth_node(alloc, rank)?;
        let node = alloc.node_mut(handle);
        Some(node.entry_mut())
    }
}

impl<K, V, C: Comparator<K>> AvlTree<K, V, C> {
    /// Returns the zero-based rank of `key` in key order, or `None` if the
    /// key is not present.
    ///
    /// # Complexity
    ///
    /// O(log n)
    ///
    /// # Examples
    ///
    /// ```
    /// use avl_treemap::{AvlTree, Dynamic};
    ///
    /// let mut heap = Dynamic::new();
    /// let mut tree = AvlTree::new();
    /// tree.put(&mut heap, 10, "a").unwrap();
    /// tree.put(&mut heap, 20, "b").unwrap();
    ///
    /// assert_eq!(tree.rank_of(&heap, &10), Some(0));
    /// assert_eq!(tree.rank_of(&heap, &15), None);
    /// # tree.destroy(&mut heap);
    /// ```
    pub fn rank_of<A>(&self, alloc: &A, key: &K) -> Option<usize>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.raw.rank_of(alloc, &self.comparator, key)
    }
}
