use super::handle::Handle;

/// A single key/value record of an AVL tree.
///
/// Nodes are created by the tree and stored inside a
/// [`NodeAllocator`](crate::NodeAllocator); the tree refers to them through
/// [`Handle`]s. A node exclusively owns its two child links and has no link
/// back to its parent.
#[derive(Clone, Debug)]
pub struct Node<K, V> {
    // Leaves have height 0, an absent child counts as -1.
    height: i8,
    // The number of nodes in the subtree rooted at this node, itself included.
    size: usize,
    left: Option<Handle>,
    right: Option<Handle>,
    key: K,
    value: V,
}

impl<K, V> Node<K, V> {
    /// Creates a detached leaf.
    pub(crate) const fn leaf(key: K, value: V) -> Self {
        Self {
            height: 0,
            size: 1,
            left: None,
            right: None,
            key,
            value,
        }
    }

    /// Returns the node's key.
    #[inline]
    pub fn key(&self) -> &K {
        &self.key
    }

    /// Returns the node's value.
    #[inline]
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Returns the node's value mutably.
    ///
    /// Only the value is exposed mutably; changing the key would break the
    /// tree's ordering.
    #[inline]
    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    /// Returns the height of the subtree rooted at this node (0 for a leaf).
    #[inline]
    pub fn height(&self) -> i8 {
        self.height
    }

    /// Returns the number of nodes in the subtree rooted at this node.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Returns the left child.
    #[inline]
    pub fn left(&self) -> Option<Handle> {
        self.left
    }

    /// Returns the right child.
    #[inline]
    pub fn right(&self) -> Option<Handle> {
        self.right
    }

    #[inline]
    pub(crate) fn set_left(&mut self, left: Option<Handle>) {
        self.left = left;
    }

    #[inline]
    pub(crate) fn set_right(&mut self, right: Option<Handle>) {
        self.right = right;
    }

    #[inline]
    pub(crate) fn set_height(&mut self, height: i8) {
        self.height = height;
    }

    #[inline]
    pub(crate) fn set_size(&mut self, size: usize) {
        self.size = size;
    }

    /// Returns the key alongside a mutable reference to the value.
    pub(crate) fn entry_mut(&mut self) -> (&K, &mut V) {
        (&self.key, &mut self.value)
    }

    /// Swaps in a new key and value, returning the old pair.
    pub(crate) fn replace_entry(&mut self, key: K, value: V) -> (K, V) {
        let key = core::mem::replace(&mut self.key, key);
        let value = core::mem::replace(&mut self.value, value);
        (key, value)
    }

    /// Consumes the node, returning its key and value.
    pub(crate) fn into_entry(self) -> (K, V) {
        (self.key, self.value)
    }
}
