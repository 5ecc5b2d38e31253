use core::cmp::Ordering;
use core::marker::PhantomData;

use smallvec::SmallVec;

use super::handle::Handle;
use super::node::Node;
use crate::allocator::NodeAllocator;
use crate::comparator::Comparator;
use crate::error::{InvariantViolation, TreeError};

/// Stack of handles used for explicit tree walks. AVL height stays below
/// 1.45 * log2(n), so 64 entries cover any tree a `Handle` can address.
pub(crate) type Walk = SmallVec<[Handle; 64]>;

/// The core AVL implementation backing `AvlTree`.
///
/// Nodes live in a lent allocator; the raw tree only records the root and the
/// number of entries. Every method takes the allocator (and, where keys are
/// compared, the comparator) as an argument.
pub(crate) struct RawAvlTree<K, V> {
    /// Handle to the root node, if the tree is non-empty.
    root: Option<Handle>,
    /// Total number of key-value pairs in the tree.
    len: usize,
    marker: PhantomData<fn() -> (K, V)>,
}

/// Where an insertion landed.
enum Placement<V> {
    /// A new node was linked in.
    Inserted(Handle),
    /// The key already existed; its value was swapped out.
    Replaced(Handle, V),
}

/// What caused a rebalance, which decides between single and double rotation.
#[derive(Clone, Copy)]
enum Trigger {
    /// The node at this handle was just inserted below the rebalanced node.
    Inserted(Handle),
    /// A node was removed below the rebalanced node.
    Removed,
}

#[inline]
fn height_of<K, V, A>(alloc: &A, link: Option<Handle>) -> i8
where
    A: NodeAllocator<K, V> + ?Sized,
{
    link.map_or(-1, |handle| alloc.node(handle).height())
}

#[inline]
fn size_of<K, V, A>(alloc: &A, link: Option<Handle>) -> usize
where
    A: NodeAllocator<K, V> + ?Sized,
{
    link.map_or(0, |handle| alloc.node(handle).size())
}

fn balance_of<K, V, A>(alloc: &A, handle: Handle) -> i16
where
    A: NodeAllocator<K, V> + ?Sized,
{
    let node = alloc.node(handle);
    i16::from(height_of(alloc, node.left())) - i16::from(height_of(alloc, node.right()))
}

/// Recomputes height and size of `handle` from its children.
fn update<K, V, A>(alloc: &mut A, handle: Handle)
where
    A: NodeAllocator<K, V> + ?Sized,
{
    let node = alloc.node(handle);
    let (left, right) = (node.left(), node.right());
    let height = 1 + height_of(alloc, left).max(height_of(alloc, right));
    let size = 1 + size_of(alloc, left) + size_of(alloc, right);

    let node = alloc.node_mut(handle);
    node.set_height(height);
    node.set_size(size);
}

//       y            x
//      / \          / \
//     x   c  ==>   a   y
//    / \              / \
//   a   b            b   c
fn rotate_right<K, V, A>(alloc: &mut A, y: Handle) -> Handle
where
    A: NodeAllocator<K, V> + ?Sized,
{
    let x = alloc.node(y).left().expect("right rotation needs a left child");
    let b = alloc.node(x).right();

    alloc.node_mut(y).set_left(b);
    alloc.node_mut(x).set_right(Some(y));

    update(alloc, y);
    update(alloc, x);
    x
}

//     x                y
//    / \              / \
//   a   y    ==>     x   c
//      / \          / \
//     b   c        a   b
fn rotate_left<K, V, A>(alloc: &mut A, x: Handle) -> Handle
where
    A: NodeAllocator<K, V> + ?Sized,
{
    let y = alloc.node(x).right().expect("left rotation needs a right child");
    let b = alloc.node(y).left();

    alloc.node_mut(x).set_right(b);
    alloc.node_mut(y).set_left(Some(x));

    update(alloc, x);
    update(alloc, y);
    y
}

/// Refreshes `handle`'s bookkeeping and restores the balance invariant,
/// returning the root of the (possibly rotated) subtree.
///
/// After an insertion the inserted key decides the rotation: a key on the
/// inner side of the heavy child needs a double rotation. After a removal the
/// removed key sits on the light side and says nothing about the heavy
/// child, so the heavy child's own balance decides instead.
fn rebalance<K, V, A, C>(alloc: &mut A, comparator: &C, handle: Handle, trigger: Trigger) -> Handle
where
    A: NodeAllocator<K, V> + ?Sized,
    C: Comparator<K> + ?Sized,
{
    update(alloc, handle);
    let balance = balance_of(alloc, handle);

    if balance > 1 {
        let left = alloc.node(handle).left().expect("left-heavy node has a left child");
        let inner = match trigger {
            Trigger::Inserted(inserted) => {
                comparator.compare(alloc.node(inserted).key(), alloc.node(left).key()) == Ordering::Greater
            }
            Trigger::Removed => balance_of(alloc, left) < 0,
        };
        if inner {
            let pivot = rotate_left(alloc, left);
            alloc.node_mut(handle).set_left(Some(pivot));
        }
        rotate_right(alloc, handle)
    } else if balance < -1 {
        let right = alloc.node(handle).right().expect("right-heavy node has a right child");
        let inner = match trigger {
            Trigger::Inserted(inserted) => {
                comparator.compare(alloc.node(inserted).key(), alloc.node(right).key()) == Ordering::Less
            }
            Trigger::Removed => balance_of(alloc, right) > 0,
        };
        if inner {
            let pivot = rotate_right(alloc, right);
            alloc.node_mut(handle).set_right(Some(pivot));
        }
        rotate_left(alloc, handle)
    } else {
        handle
    }
}

/// Inserts below `link`, returning the new subtree root and where the key
/// landed. On allocator exhaustion nothing on the path has been touched.
fn insert_at<K, V, A, C>(
    alloc: &mut A,
    comparator: &C,
    link: Option<Handle>,
    key: K,
    value: V,
) -> Result<(Handle, Placement<V>), TreeError>
where
    A: NodeAllocator<K, V> + ?Sized,
    C: Comparator<K> + ?Sized,
{
    let Some(handle) = link else {
        let inserted = alloc.allocate(Node::leaf(key, value)).ok_or(TreeError::Exhausted)?;
        return Ok((inserted, Placement::Inserted(inserted)));
    };

    let placement = match comparator.compare(&key, alloc.node(handle).key()) {
        Ordering::Less => {
            let left = alloc.node(handle).left();
            let (child, placement) = insert_at(alloc, comparator, left, key, value)?;
            alloc.node_mut(handle).set_left(Some(child));
            placement
        }
        Ordering::Greater => {
            let right = alloc.node(handle).right();
            let (child, placement) = insert_at(alloc, comparator, right, key, value)?;
            alloc.node_mut(handle).set_right(Some(child));
            placement
        }
        Ordering::Equal => {
            let old = core::mem::replace(alloc.node_mut(handle).value_mut(), value);
            return Ok((handle, Placement::Replaced(handle, old)));
        }
    };

    match placement {
        Placement::Inserted(inserted) => {
            Ok((rebalance(alloc, comparator, handle, Trigger::Inserted(inserted)), placement))
        }
        Placement::Replaced(..) => Ok((handle, placement)),
    }
}

/// Unlinks the leftmost node below `handle` without releasing it. Returns the
/// new subtree root and the detached node.
fn detach_min<K, V, A, C>(alloc: &mut A, comparator: &C, handle: Handle) -> (Option<Handle>, Handle)
where
    A: NodeAllocator<K, V> + ?Sized,
    C: Comparator<K> + ?Sized,
{
    match alloc.node(handle).left() {
        None => (alloc.node(handle).right(), handle),
        Some(left) => {
            let (child, min) = detach_min(alloc, comparator, left);
            alloc.node_mut(handle).set_left(child);
            (Some(rebalance(alloc, comparator, handle, Trigger::Removed)), min)
        }
    }
}

/// Unlinks the rightmost node below `handle` without releasing it.
fn detach_max<K, V, A, C>(alloc: &mut A, comparator: &C, handle: Handle) -> (Option<Handle>, Handle)
where
    A: NodeAllocator<K, V> + ?Sized,
    C: Comparator<K> + ?Sized,
{
    match alloc.node(handle).right() {
        None => (alloc.node(handle).left(), handle),
        Some(right) => {
            let (child, max) = detach_max(alloc, comparator, right);
            alloc.node_mut(handle).set_right(child);
            (Some(rebalance(alloc, comparator, handle, Trigger::Removed)), max)
        }
    }
}

/// Removes `key` from below `link`, returning the new subtree root and the
/// removed entry. A missing key leaves every node untouched.
fn remove_at<K, V, A, C>(alloc: &mut A, comparator: &C, link: Option<Handle>, key: &K) -> (Option<Handle>, Option<(K, V)>)
where
    A: NodeAllocator<K, V> + ?Sized,
    C: Comparator<K> + ?Sized,
{
    let Some(handle) = link else {
        return (None, None);
    };

    let removed = match comparator.compare(key, alloc.node(handle).key()) {
        Ordering::Less => {
            let left = alloc.node(handle).left();
            let (child, removed) = remove_at(alloc, comparator, left, key);
            if removed.is_none() {
                return (link, None);
            }
            alloc.node_mut(handle).set_left(child);
            removed
        }
        Ordering::Greater => {
            let right = alloc.node(handle).right();
            let (child, removed) = remove_at(alloc, comparator, right, key);
            if removed.is_none() {
                return (link, None);
            }
            alloc.node_mut(handle).set_right(child);
            removed
        }
        Ordering::Equal => {
            let node = alloc.node(handle);
            match (node.left(), node.right()) {
                // At most one child: that child (a balanced subtree) takes the node's place.
                (None, child) | (child, None) => {
                    let entry = alloc.release(handle).into_entry();
                    return (child, Some(entry));
                }
                // Two children: the in-order successor's entry moves up into this node.
                (Some(_), Some(right)) => {
                    let (child, successor) = detach_min(alloc, comparator, right);
                    let (key, value) = alloc.release(successor).into_entry();
                    let node = alloc.node_mut(handle);
                    node.set_right(child);
                    Some(node.replace_entry(key, value))
                }
            }
        }
    };

    (Some(rebalance(alloc, comparator, handle, Trigger::Removed)), removed)
}

impl<K, V> RawAvlTree<K, V> {
    /// Creates a new, empty tree.
    pub(crate) const fn new() -> Self {
        Self {
            root: None,
            len: 0,
            marker: PhantomData,
        }
    }

    /// Returns the number of key-value pairs in the tree.
    pub(crate) const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the tree contains no elements.
    pub(crate) const fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Returns the root node, if any.
    pub(crate) const fn root(&self) -> Option<Handle> {
        self.root
    }

    /// Releases every node back to `alloc`.
    pub(crate) fn clear<A>(&mut self, alloc: &mut A)
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        let mut pending: Walk = self.root.take().into_iter().collect();
        while let Some(handle) = pending.pop() {
            let node = alloc.release(handle);
            pending.extend(node.left());
            pending.extend(node.right());
        }
        self.len = 0;
    }

    /// Returns the leftmost node.
    pub(crate) fn first<A>(&self, alloc: &A) -> Option<Handle>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        let mut current = self.root?;
        while let Some(left) = alloc.node(current).left() {
            current = left;
        }
        Some(current)
    }

    /// Returns the rightmost node.
    pub(crate) fn last<A>(&self, alloc: &A) -> Option<Handle>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        let mut current = self.root?;
        while let Some(right) = alloc.node(current).right() {
            current = right;
        }
        Some(current)
    }

    /// Returns the node at zero-based position `rank` in key order.
    pub(crate) fn nth<A>(&self, alloc: &A, rank: usize) -> Option<Handle>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        let mut current = self.root;
        // Number of nodes known to precede the current subtree.
        let mut prior = 0;

        while let Some(handle) = current {
            let node = alloc.node(handle);
            let position = prior + size_of(alloc, node.left());
            match position.cmp(&rank) {
                Ordering::Equal => return Some(handle),
                Ordering::Greater => current = node.left(),
                Ordering::Less => {
                    prior = position + 1;
                    current = node.right();
                }
            }
        }

        None
    }

    /// Walks an in-order stack down the left spine starting at `link`.
    pub(crate) fn descend_left<A>(alloc: &A, mut link: Option<Handle>, stack: &mut Walk)
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        while let Some(handle) = link {
            stack.push(handle);
            link = alloc.node(handle).left();
        }
    }

    /// Walks a reverse in-order stack down the right spine starting at `link`.
    pub(crate) fn descend_right<A>(alloc: &A, mut link: Option<Handle>, stack: &mut Walk)
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        while let Some(handle) = link {
            stack.push(handle);
            link = alloc.node(handle).right();
        }
    }
}

impl<K, V> RawAvlTree<K, V> {
    /// Searches for a key and returns its node.
    pub(crate) fn search<A, C>(&self, alloc: &A, comparator: &C, key: &K) -> Option<Handle>
    where
        A: NodeAllocator<K, V> + ?Sized,
        C: Comparator<K> + ?Sized,
    {
        let mut current = self.root;
        while let Some(handle) = current {
            let node = alloc.node(handle);
            current = match comparator.compare(key, node.key()) {
                Ordering::Less => node.left(),
                Ordering::Greater => node.right(),
                Ordering::Equal => return Some(handle),
            };
        }
        None
    }

    /// Returns the zero-based position of `key` in key order.
    pub(crate) fn rank_of<A, C>(&self, alloc: &A, comparator: &C, key: &K) -> Option<usize>
    where
        A: NodeAllocator<K, V> + ?Sized,
        C: Comparator<K> + ?Sized,
    {
        let mut current = self.root;
        let mut prior = 0;
        while let Some(handle) = current {
            let node = alloc.node(handle);
            match comparator.compare(key, node.key()) {
                Ordering::Less => current = node.left(),
                Ordering::Greater => {
                    prior += size_of(alloc, node.left()) + 1;
                    current = node.right();
                }
                Ordering::Equal => return Some(prior + size_of(alloc, node.left())),
            }
        }
        None
    }

    /// Returns the node with the smallest key strictly greater than `key`.
    pub(crate) fn higher<A, C>(&self, alloc: &A, comparator: &C, key: &K) -> Option<Handle>
    where
        A: NodeAllocator<K, V> + ?Sized,
        C: Comparator<K> + ?Sized,
    {
        let mut current = self.root;
        let mut successor = None;
        while let Some(handle) = current {
            let node = alloc.node(handle);
            if comparator.compare(key, node.key()) == Ordering::Less {
                successor = Some(handle);
                current = node.left();
            } else {
                current = node.right();
            }
        }
        successor
    }

    /// Returns the node with the largest key strictly less than `key`.
    pub(crate) fn lower<A, C>(&self, alloc: &A, comparator: &C, key: &K) -> Option<Handle>
    where
        A: NodeAllocator<K, V> + ?Sized,
        C: Comparator<K> + ?Sized,
    {
        let mut current = self.root;
        let mut predecessor = None;
        while let Some(handle) = current {
            let node = alloc.node(handle);
            if comparator.compare(key, node.key()) == Ordering::Greater {
                predecessor = Some(handle);
                current = node.right();
            } else {
                current = node.left();
            }
        }
        predecessor
    }

    /// Inserts a key-value pair, returning the key's node and the value it
    /// replaced, if any.
    ///
    /// On [`TreeError::Exhausted`] the tree is unchanged and `key` and
    /// `value` are dropped.
    pub(crate) fn insert<A, C>(&mut self, alloc: &mut A, comparator: &C, key: K, value: V) -> Result<(Handle, Option<V>), TreeError>
    where
        A: NodeAllocator<K, V> + ?Sized,
        C: Comparator<K> + ?Sized,
    {
        let (root, placement) = insert_at(alloc, comparator, self.root, key, value)?;
        self.root = Some(root);

        match placement {
            Placement::Inserted(handle) => {
                self.len += 1;
                Ok((handle, None))
            }
            Placement::Replaced(handle, old) => Ok((handle, Some(old))),
        }
    }

    /// Removes `key`, returning its entry if it was present.
    pub(crate) fn remove<A, C>(&mut self, alloc: &mut A, comparator: &C, key: &K) -> Option<(K, V)>
    where
        A: NodeAllocator<K, V> + ?Sized,
        C: Comparator<K> + ?Sized,
    {
        let (root, removed) = remove_at(alloc, comparator, self.root, key);
        if removed.is_some() {
            self.root = root;
            self.len -= 1;
        }
        removed
    }

    /// Removes the entry with the smallest key.
    pub(crate) fn remove_first<A, C>(&mut self, alloc: &mut A, comparator: &C) -> Option<(K, V)>
    where
        A: NodeAllocator<K, V> + ?Sized,
        C: Comparator<K> + ?Sized,
    {
        let (root, first) = detach_min(alloc, comparator, self.root?);
        self.root = root;
        self.len -= 1;
        Some(alloc.release(first).into_entry())
    }

    /// Removes the entry with the largest key.
    pub(crate) fn remove_last<A, C>(&mut self, alloc: &mut A, comparator: &C) -> Option<(K, V)>
    where
        A: NodeAllocator<K, V> + ?Sized,
        C: Comparator<K> + ?Sized,
    {
        let (root, last) = detach_max(alloc, comparator, self.root?);
        self.root = root;
        self.len -= 1;
        Some(alloc.release(last).into_entry())
    }

    /// Checks every structural invariant, reporting the first violation.
    pub(crate) fn validate<A, C>(&self, alloc: &A, comparator: &C) -> Result<(), InvariantViolation>
    where
        A: NodeAllocator<K, V> + ?Sized,
        C: Comparator<K> + ?Sized,
    {
        let (_, actual) = Self::validate_node(alloc, comparator, self.root, None, None)?;
        if actual == self.len {
            Ok(())
        } else {
            Err(InvariantViolation::Count {
                recorded: self.len,
                actual,
            })
        }
    }

    /// Validates the subtree at `link`, whose keys must lie strictly between
    /// the keys of `lower` and `upper`. Returns its height and size.
    fn validate_node<A, C>(
        alloc: &A,
        comparator: &C,
        link: Option<Handle>,
        lower: Option<Handle>,
        upper: Option<Handle>,
    ) -> Result<(i8, usize), InvariantViolation>
    where
        A: NodeAllocator<K, V> + ?Sized,
        C: Comparator<K> + ?Sized,
    {
        let Some(handle) = link else {
            return Ok((-1, 0));
        };
        let node = alloc.node(handle);

        let above_lower = lower.is_none_or(|bound| comparator.compare(alloc.node(bound).key(), node.key()) == Ordering::Less);
        let below_upper = upper.is_none_or(|bound| comparator.compare(node.key(), alloc.node(bound).key()) == Ordering::Less);
        if !above_lower || !below_upper {
            return Err(InvariantViolation::Order { node: handle });
        }

        let (left_height, left_size) = Self::validate_node(alloc, comparator, node.left(), lower, Some(handle))?;
        let (right_height, right_size) = Self::validate_node(alloc, comparator, node.right(), Some(handle), upper)?;

        let size = 1 + left_size + right_size;
        if node.size() != size {
            return Err(InvariantViolation::Size {
                node: handle,
                recorded: node.size(),
                actual: size,
            });
        }

        let height = 1 + left_height.max(right_height);
        if node.height() != height {
            return Err(InvariantViolation::Height {
                node: handle,
                recorded: node.height(),
                actual: height,
            });
        }

        let balance = i16::from(left_height) - i16::from(right_height);
        if !(-1..=1).contains(&balance) {
            return Err(InvariantViolation::Balance { node: handle, balance });
        }

        Ok((height, size))
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::allocator::{Dynamic, Pooled, Slab};
    use crate::comparator::{NaturalOrder, ReverseOrder};
    use alloc::collections::BTreeMap;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    fn keys_in_order<A: NodeAllocator<i32, i32>>(tree: &RawAvlTree<i32, i32>, alloc: &A) -> Vec<i32> {
        (0..tree.len()).map(|rank| *alloc.node(tree.nth(alloc, rank).unwrap()).key()).collect()
    }

    #[test]
    fn ascending_inserts_stay_balanced() {
        let mut heap = Dynamic::new();
        let mut tree = RawAvlTree::new();
        for key in 0..1000 {
            tree.insert(&mut heap, &NaturalOrder, key, key).unwrap();
            tree.validate(&heap, &NaturalOrder).unwrap();
        }
        // A perfectly balanced tree of 1000 nodes has height 9; AVL allows up to 1.44x.
        let root = heap.node(tree.root().unwrap());
        assert!(root.height() <= 13, "height = {}", root.height());
        assert_eq!(root.size(), 1000);
    }

    #[test]
    fn double_rotations_on_zigzag_inserts() {
        let mut heap = Dynamic::new();
        let mut tree = RawAvlTree::new();
        for key in [30, 10, 20, 50, 40, 5, 7, 60, 55] {
            tree.insert(&mut heap, &NaturalOrder, key, -key).unwrap();
            tree.validate(&heap, &NaturalOrder).unwrap();
        }
        assert_eq!(keys_in_order(&tree, &heap), [5, 7, 10, 20, 30, 40, 50, 55, 60]);
    }

    #[test]
    fn duplicate_insert_replaces_value_only() {
        let mut heap = Dynamic::new();
        let mut tree = RawAvlTree::new();
        let (first, old) = tree.insert(&mut heap, &NaturalOrder, 1, 10).unwrap();
        assert_eq!(old, None);
        let (second, old) = tree.insert(&mut heap, &NaturalOrder, 1, 11).unwrap();
        assert_eq!((second, old), (first, Some(10)));
        assert_eq!(tree.len(), 1);
        assert_eq!(heap.in_use(), 1);
    }

    #[test]
    fn exhaustion_leaves_tree_untouched() {
        let mut slab = Slab::with_capacity(3);
        let mut tree = RawAvlTree::new();
        for key in [2, 1, 3] {
            tree.insert(&mut slab, &NaturalOrder, key, key).unwrap();
        }
        let root = tree.root();
        assert_eq!(tree.insert(&mut slab, &NaturalOrder, 4, 4).err(), Some(TreeError::Exhausted));
        assert_eq!(tree.root(), root);
        assert_eq!(tree.len(), 3);
        assert_eq!(slab.node(root.unwrap()).height(), 1);
        tree.validate(&slab, &NaturalOrder).unwrap();
        tree.clear(&mut slab);
    }

    #[test]
    fn removing_two_child_node_releases_successor_record() {
        let mut pool = Pooled::new(0, 8);
        let mut tree = RawAvlTree::new();
        for key in [20, 10, 30, 25, 40] {
            tree.insert(&mut pool, &NaturalOrder, key, key * 2).unwrap();
        }
        let root = tree.root().unwrap();
        let successor = tree.search(&pool, &NaturalOrder, &25).unwrap();

        assert_eq!(tree.remove(&mut pool, &NaturalOrder, &20), Some((20, 40)));
        assert_eq!(tree.root(), Some(root));
        assert_eq!(pool.node(root).key(), &25);
        assert_eq!(pool.allocate(Node::leaf(0, 0)), Some(successor));
        let _ = pool.release(successor);
        tree.validate(&pool, &NaturalOrder).unwrap();
        tree.clear(&mut pool);
    }

    #[test]
    fn removing_missing_key_is_a_no_op() {
        let mut heap = Dynamic::new();
        let mut tree = RawAvlTree::new();
        assert_eq!(tree.remove(&mut heap, &NaturalOrder, &1), None);
        tree.insert(&mut heap, &NaturalOrder, 1, 1).unwrap();
        assert_eq!(tree.remove(&mut heap, &NaturalOrder, &2), None);
        assert_eq!(tree.len(), 1);
    }

    #[test]
    fn deletion_rebalancing_handles_outer_heavy_sibling() {
        // Removing 50 leaves 30 left-heavy over an outer-heavy left child: a single rotation.
        let mut heap = Dynamic::new();
        let mut tree = RawAvlTree::new();
        for key in [30, 20, 40, 10, 25, 50, 5] {
            tree.insert(&mut heap, &NaturalOrder, key, key).unwrap();
        }
        tree.remove(&mut heap, &NaturalOrder, &50);
        tree.remove(&mut heap, &NaturalOrder, &40);
        tree.validate(&heap, &NaturalOrder).unwrap();
        assert_eq!(keys_in_order(&tree, &heap), [5, 10, 20, 25, 30]);
    }

    #[test]
    fn clear_returns_every_node() {
        let mut pool = Pooled::new(0, 64);
        let mut tree = RawAvlTree::new();
        for key in 0..64 {
            tree.insert(&mut pool, &NaturalOrder, key, key).unwrap();
        }
        assert_eq!(pool.in_use(), 64);
        tree.clear(&mut pool);
        assert_eq!(pool.in_use(), 0);
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn successor_and_predecessor_searches() {
        let mut heap = Dynamic::new();
        let mut tree = RawAvlTree::new();
        for key in [10, 20, 30] {
            tree.insert(&mut heap, &NaturalOrder, key, key).unwrap();
        }
        let key_of = |link: Option<Handle>| link.map(|handle| *heap.node(handle).key());
        assert_eq!(key_of(tree.higher(&heap, &NaturalOrder, &10)), Some(20));
        assert_eq!(key_of(tree.higher(&heap, &NaturalOrder, &15)), Some(20));
        assert_eq!(key_of(tree.higher(&heap, &NaturalOrder, &30)), None);
        assert_eq!(key_of(tree.lower(&heap, &NaturalOrder, &30)), Some(20));
        assert_eq!(key_of(tree.lower(&heap, &NaturalOrder, &25)), Some(20));
        assert_eq!(key_of(tree.lower(&heap, &NaturalOrder, &10)), None);
    }

    #[test]
    fn reverse_order_flips_everything() {
        let mut heap = Dynamic::new();
        let mut tree = RawAvlTree::new();
        for key in 0..10 {
            tree.insert(&mut heap, &ReverseOrder, key, key).unwrap();
            tree.validate(&heap, &ReverseOrder).unwrap();
        }
        assert_eq!(keys_in_order(&tree, &heap), [9, 8, 7, 6, 5, 4, 3, 2, 1, 0]);
        assert_eq!(tree.rank_of(&heap, &ReverseOrder, &9), Some(0));
        // Natural-order validation of a reverse-ordered tree must fail.
        assert!(matches!(tree.validate(&heap, &NaturalOrder), Err(InvariantViolation::Order { .. })));
    }

    #[test]
    fn validate_detects_stale_size() {
        let mut heap = Dynamic::new();
        let mut tree = RawAvlTree::new();
        for key in 0..3 {
            tree.insert(&mut heap, &NaturalOrder, key, key).unwrap();
        }
        let root = tree.root().unwrap();
        heap.node_mut(root).set_size(7);
        assert_eq!(
            tree.validate(&heap, &NaturalOrder),
            Err(InvariantViolation::Size {
                node: root,
                recorded: 7,
                actual: 3
            })
        );
    }

    proptest! {
        #[test]
        fn raw_tree_matches_btreemap(operations in prop::collection::vec(strategy(), 0..512)) {
            let mut heap = Dynamic::new();
            let mut tree = RawAvlTree::new();
            let mut model = BTreeMap::new();

            for operation in operations {
                match operation {
                    Operation::Insert(key, value) => {
                        let (_, old) = tree.insert(&mut heap, &NaturalOrder, key, value).unwrap();
                        prop_assert_eq!(old, model.insert(key, value));
                    }
                    Operation::Remove(key) => {
                        let removed = tree.remove(&mut heap, &NaturalOrder, &key).map(|(_, value)| value);
                        prop_assert_eq!(removed, model.remove(&key));
                    }
                }

                prop_assert_eq!(tree.validate(&heap, &NaturalOrder), Ok(()));
                prop_assert_eq!(tree.len(), model.len());
                prop_assert_eq!(heap.in_use(), model.len());
            }

            for (rank, key) in model.keys().enumerate() {
                let handle = tree.nth(&heap, rank).unwrap();
                prop_assert_eq!(heap.node(handle).key(), key);
                prop_assert_eq!(tree.rank_of(&heap, &NaturalOrder, key), Some(rank));
            }
            prop_assert!(tree.nth(&heap, model.len()).is_none());
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        Insert(i32, i32),
        Remove(i32),
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            3 => (-200..200, any::<i32>()).prop_map(|(key, value)| Operation::Insert(key, value)),
            2 => (-200..200).prop_map(Operation::Remove),
        ]
    }
}
