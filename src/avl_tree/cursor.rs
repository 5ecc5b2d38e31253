use core::fmt;

use super::{AvlTree, entry};
use crate::allocator::NodeAllocator;
use crate::comparator::Comparator;
use crate::raw::Handle;

/// A circular cursor over the entries of an [`AvlTree`].
///
/// A cursor either rests on a node or on the *sentinel*, a position before
/// the first and after the last entry. Fresh cursors start on the sentinel.
/// [`move_next`](Cursor::move_next) steps to the next larger key, and from
/// the last entry wraps around to the first one; [`move_prev`](Cursor::move_prev)
/// mirrors it. Callers that should stop at the end check
/// [`has_next`](Cursor::has_next) first.
///
/// Each step is an O(log n) successor search from the root; nodes carry no
/// parent links.
///
/// This `struct` is created by [`AvlTree::cursor`], [`AvlTree::cursor_at`]
/// and [`AvlTree::cursor_at_node`].
///
/// # Examples
///
/// ```
/// use avl_treemap::{AvlTree, Dynamic};
///
/// let mut heap = Dynamic::new();
/// let mut tree = AvlTree::new();
/// for key in [1, 2, 3] {
///     tree.put(&mut heap, key, key * 10).unwrap();
/// }
///
/// let mut cursor = tree.cursor(&heap);
/// let mut seen = Vec::new();
/// while cursor.has_next() {
///     seen.push(*cursor.move_next().unwrap().0);
/// }
/// assert_eq!(seen, [1, 2, 3]);
///
/// // Past the end the cursor wraps around.
/// assert_eq!(cursor.move_next(), Some((&1, &10)));
/// # tree.destroy(&mut heap);
/// ```
pub struct Cursor<'a, K, V, C, A: ?Sized> {
    tree: &'a AvlTree<K, V, C>,
    alloc: &'a A,
    current: Option<Handle>,
}

/// A circular cursor that can also overwrite values in place.
///
/// Moves exactly like [`Cursor`]. The tree's structure is never touched, so
/// only the tree is borrowed shared while the allocator is borrowed
/// exclusively.
///
/// This `struct` is created by [`AvlTree::cursor_mut`] and
/// [`AvlTree::cursor_mut_at`].
pub struct CursorMut<'a, K, V, C, A: ?Sized> {
    tree: &'a AvlTree<K, V, C>,
    alloc: &'a mut A,
    current: Option<Handle>,
}

fn successor<K, V, C, A>(tree: &AvlTree<K, V, C>, alloc: &A, current: Option<Handle>) -> Option<Handle>
where
    C: Comparator<K>,
    A: NodeAllocator<K, V> + ?Sized,
{
    match current {
        None => tree.first_node(alloc),
        Some(handle) => tree.higher_node(alloc, alloc.node(handle).key()).or_else(|| tree.first_node(alloc)),
    }
}

fn predecessor<K, V, C, A>(tree: &AvlTree<K, V, C>, alloc: &A, current: Option<Handle>) -> Option<Handle>
where
    C: Comparator<K>,
    A: NodeAllocator<K, V> + ?Sized,
{
    match current {
        None => tree.last_node(alloc),
        Some(handle) => tree.lower_node(alloc, alloc.node(handle).key()).or_else(|| tree.last_node(alloc)),
    }
}

fn has_successor<K, V, C, A>(tree: &AvlTree<K, V, C>, alloc: &A, current: Option<Handle>) -> bool
where
    C: Comparator<K>,
    A: NodeAllocator<K, V> + ?Sized,
{
    match current {
        None => !tree.is_empty(),
        Some(handle) => tree.higher_node(alloc, alloc.node(handle).key()).is_some(),
    }
}

fn has_predecessor<K, V, C, A>(tree: &AvlTree<K, V, C>, alloc: &A, current: Option<Handle>) -> bool
where
    C: Comparator<K>,
    A: NodeAllocator<K, V> + ?Sized,
{
    match current {
        None => !tree.is_empty(),
        Some(handle) => tree.lower_node(alloc, alloc.node(handle).key()).is_some(),
    }
}

impl<K, V, C> AvlTree<K, V, C> {
    /// Returns a cursor resting on the sentinel.
    pub fn cursor<'a, A>(&'a self, alloc: &'a A) -> Cursor<'a, K, V, C, A>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        Cursor {
            tree: self,
            alloc,
            current: None,
        }
    }

    /// Returns a cursor resting on `handle`.
    ///
    /// `handle` must be a node of this tree. Handles taken before a removal
    /// may no longer be; use [`cursor_at`](AvlTree::cursor_at) to resume by
    /// key.
    pub fn cursor_at_node<'a, A>(&'a self, alloc: &'a A, handle: Handle) -> Cursor<'a, K, V, C, A>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        Cursor {
            tree: self,
            alloc,
            current: Some(handle),
        }
    }

    /// Returns a value-mutating cursor resting on the sentinel.
    pub fn cursor_mut<'a, A>(&'a self, alloc: &'a mut A) -> CursorMut<'a, K, V, C, A>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        CursorMut {
            tree: self,
            alloc,
            current: None,
        }
    }
}

impl<K, V, C: Comparator<K>> AvlTree<K, V, C> {
    /// Returns a cursor resting on `key`, or on the sentinel if `key` is not
    /// in the tree.
    pub fn cursor_at<'a, A>(&'a self, alloc: &'a A, key: &K) -> Cursor<'a, K, V, C, A>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        Cursor {
            tree: self,
            alloc,
            current: self.get_node(alloc, key),
        }
    }

    /// Returns a value-mutating cursor resting on `key`, or on the sentinel
    /// if `key` is not in the tree.
    pub fn cursor_mut_at<'a, A>(&'a self, alloc: &'a mut A, key: &K) -> CursorMut<'a, K, V, C, A>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        let current = self.get_node(alloc, key);
        CursorMut {
            tree: self,
            alloc,
            current,
        }
    }
}

impl<'a, K, V, C, A> Cursor<'a, K, V, C, A>
where
    C: Comparator<K>,
    A: NodeAllocator<K, V> + ?Sized,
{
    /// Returns `true` if a larger key follows the current position. On the
    /// sentinel, returns `true` unless the tree is empty.
    #[must_use]
    pub fn has_next(&self) -> bool {
        has_successor(self.tree, self.alloc, self.current)
    }

    /// Returns `true` if a smaller key precedes the current position. On the
    /// sentinel, returns `true` unless the tree is empty.
    #[must_use]
    pub fn has_prev(&self) -> bool {
        has_predecessor(self.tree, self.alloc, self.current)
    }

    /// Moves to the next entry, wrapping from the last entry to the first,
    /// and returns it. Returns `None` only on an empty tree.
    pub fn move_next(&mut self) -> Option<(&'a K, &'a V)> {
        self.current = successor(self.tree, self.alloc, self.current);
        self.current()
    }

    /// Moves to the previous entry, wrapping from the first entry to the
    /// last, and returns it. Returns `None` only on an empty tree.
    pub fn move_prev(&mut self) -> Option<(&'a K, &'a V)> {
        self.current = predecessor(self.tree, self.alloc, self.current);
        self.current()
    }
}

impl<'a, K, V, C, A> Cursor<'a, K, V, C, A>
where
    A: NodeAllocator<K, V> + ?Sized,
{
    /// Returns the entry under the cursor, or `None` on the sentinel.
    #[must_use]
    pub fn current(&self) -> Option<(&'a K, &'a V)> {
        self.current.map(|handle| entry(self.alloc, handle))
    }

    /// Returns the key under the cursor, or `None` on the sentinel.
    #[must_use]
    pub fn key(&self) -> Option<&'a K> {
        self.current().map(|(key, _)| key)
    }

    /// Returns the value under the cursor, or `None` on the sentinel.
    #[must_use]
    pub fn value(&self) -> Option<&'a V> {
        self.current().map(|(_, value)| value)
    }

    /// Returns the node under the cursor, or `None` on the sentinel.
    #[must_use]
    pub const fn node(&self) -> Option<Handle> {
        self.current
    }

    /// Moves the cursor back to the sentinel.
    pub fn reset(&mut self) {
        self.current = None;
    }
}

impl<K, V, C, A> CursorMut<'_, K, V, C, A>
where
    C: Comparator<K>,
    A: NodeAllocator<K, V> + ?Sized,
{
    /// Returns `true` if a larger key follows the current position.
    #[must_use]
    pub fn has_next(&self) -> bool {
        has_successor(self.tree, &*self.alloc, self.current)
    }

    /// Returns `true` if a smaller key precedes the current position.
    #[must_use]
    pub fn has_prev(&self) -> bool {
        has_predecessor(self.tree, &*self.alloc, self.current)
    }

    /// Moves to the next entry, wrapping from the last entry to the first.
    pub fn move_next(&mut self) -> Option<(&K, &mut V)> {
        self.current = successor(self.tree, &*self.alloc, self.current);
        self.current_mut()
    }

    /// Moves to the previous entry, wrapping from the first entry to the last.
    pub fn move_prev(&mut self) -> Option<(&K, &mut V)> {
        self.current = predecessor(self.tree, &*self.alloc, self.current);
        self.current_mut()
    }
}

impl<K, V, C, A> CursorMut<'_, K, V, C, A>
where
    A: NodeAllocator<K, V> + ?Sized,
{
    /// Returns the entry under the cursor, or `None` on the sentinel.
    #[must_use]
    pub fn current(&self) -> Option<(&K, &V)> {
        self.current.map(|handle| entry(&*self.alloc, handle))
    }

    /// Returns the entry under the cursor with a mutable value.
    pub fn current_mut(&mut self) -> Option<(&K, &mut V)> {
        let handle = self.current?;
        Some(self.alloc.node_mut(handle).entry_mut())
    }

    /// Returns the key under the cursor, or `None` on the sentinel.
    #[must_use]
    pub fn key(&self) -> Option<&K> {
        self.current().map(|(key, _)| key)
    }

    /// Returns the value under the cursor, or `None` on the sentinel.
    #[must_use]
    pub fn value(&self) -> Option<&V> {
        self.current().map(|(_, value)| value)
    }

    /// Replaces the value under the cursor, returning the old one.
    ///
    /// # Panics
    ///
    /// Panics if the cursor rests on the sentinel.
    pub fn set_value(&mut self, value: V) -> V {
        let (_, slot) = self.current_mut().expect("`CursorMut::set_value()` - cursor is on the sentinel!");
        core::mem::replace(slot, value)
    }

    /// Returns the node under the cursor, or `None` on the sentinel.
    #[must_use]
    pub const fn node(&self) -> Option<Handle> {
        self.current
    }

    /// Moves the cursor back to the sentinel.
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Returns a read-only cursor at the same position.
    #[must_use]
    pub fn as_cursor(&self) -> Cursor<'_, K, V, C, A> {
        Cursor {
            tree: self.tree,
            alloc: &*self.alloc,
            current: self.current,
        }
    }
}

impl<K, V, C, A: ?Sized> Clone for Cursor<'_, K, V, C, A> {
    fn clone(&self) -> Self {
        Self {
            tree: self.tree,
            alloc: self.alloc,
            current: self.current,
        }
    }
}

impl<K, V, C, A: ?Sized> fmt::Debug for Cursor<'_, K, V, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Cursor").field(&self.current).finish()
    }
}

impl<K, V, C, A: ?Sized> fmt::Debug for CursorMut<'_, K, V, C, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("CursorMut").field(&self.current).finish()
    }
}
