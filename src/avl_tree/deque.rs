use core::cmp::Ordering;

use super::AvlTree;
use crate::allocator::NodeAllocator;
use crate::comparator::Comparator;
use crate::error::{End, TreeError};
use crate::raw::Handle;

/// Keys that can be stepped one unit up or down, so that an [`AvlTree`] can
/// synthesize them when used as a deque.
///
/// Implemented for every primitive integer type, with `ORIGIN` = 0.
pub trait UnitStep: Sized {
    /// The key used for the first entry pushed into an empty tree.
    const ORIGIN: Self;

    /// Returns the key one unit above `self`, if it exists.
    fn successor(&self) -> Option<Self>;

    /// Returns the key one unit below `self`, if it exists.
    fn predecessor(&self) -> Option<Self>;
}

macro_rules! unit_step {
    ($($int:ty)*) => {$(
        impl UnitStep for $int {
            const ORIGIN: Self = 0;

            #[inline]
            fn successor(&self) -> Option<Self> {
                self.checked_add(1)
            }

            #[inline]
            fn predecessor(&self) -> Option<Self> {
                self.checked_sub(1)
            }
        }
    )*};
}

unit_step!(u8 u16 u32 u64 u128 usize i8 i16 i32 i64 i128 isize);

/// Deque operations.
///
/// The tree's keys double as positions: pushing at the front stores the
/// value under a key one unit before the first key (in comparator order),
/// pushing at the back one unit after the last key. An empty tree starts at
/// [`UnitStep::ORIGIN`]. `push`, `peek` and `pop` work on the back, so
/// together they form a stack.
///
/// # Examples
///
/// ```
/// use avl_treemap::{AvlTree, Slab};
///
/// let mut slab = Slab::with_capacity(8);
/// let mut queue: AvlTree<i32, &str> = AvlTree::new();
///
/// queue.push_last(&mut slab, "b").unwrap();
/// queue.push_last(&mut slab, "c").unwrap();
/// queue.push_first(&mut slab, "a").unwrap();
///
/// assert_eq!(queue.first_key_value(&slab), Some((&-1, &"a")));
/// assert_eq!(queue.pop_first(&mut slab), Some("a"));
/// assert_eq!(queue.pop(&mut slab), Some("c"));
/// assert_eq!(queue.peek(&slab), Some(&"b"));
/// # queue.destroy(&mut slab);
/// ```
impl<K: UnitStep, V, C: Comparator<K>> AvlTree<K, V, C> {
    /// Pushes `value` before the first entry.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::KeySpaceExhausted`] if the first key has no
    /// neighbour before it, or [`TreeError::Exhausted`] if `alloc` has no
    /// node left.
    pub fn push_first<A>(&mut self, alloc: &mut A, value: V) -> Result<Handle, TreeError>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        let key = self.key_beyond(alloc, End::Front)?;
        self.put_node(alloc, key, value)
    }

    /// Pushes `value` after the last entry.
    ///
    /// # Errors
    ///
    /// Returns [`TreeError::KeySpaceExhausted`] if the last key has no
    /// neighbour after it, or [`TreeError::Exhausted`] if `alloc` has no
    /// node left.
    pub fn push_last<A>(&mut self, alloc: &mut A, value: V) -> Result<Handle, TreeError>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        let key = self.key_beyond(alloc, End::Back)?;
        self.put_node(alloc, key, value)
    }

    /// Pushes `value` after the last entry; same as
    /// [`push_last`](AvlTree::push_last).
    ///
    /// # Errors
    ///
    /// See [`push_last`](AvlTree::push_last).
    pub fn push<A>(&mut self, alloc: &mut A, value: V) -> Result<Handle, TreeError>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.push_last(alloc, value)
    }

    /// Same as [`push_first`](AvlTree::push_first).
    ///
    /// # Errors
    ///
    /// See [`push_first`](AvlTree::push_first).
    pub fn add_first<A>(&mut self, alloc: &mut A, value: V) -> Result<Handle, TreeError>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.push_first(alloc, value)
    }

    /// Same as [`push_last`](AvlTree::push_last).
    ///
    /// # Errors
    ///
    /// See [`push_last`](AvlTree::push_last).
    pub fn add_last<A>(&mut self, alloc: &mut A, value: V) -> Result<Handle, TreeError>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.push_last(alloc, value)
    }

    /// Returns the key one unit beyond `end` in comparator order.
    fn key_beyond<A>(&self, alloc: &A, end: End) -> Result<K, TreeError>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        let (edge, outward) = match end {
            End::Front => (self.first_node(alloc), Ordering::Less),
            End::Back => (self.last_node(alloc), Ordering::Greater),
        };
        let Some(edge) = edge else {
            return Ok(K::ORIGIN);
        };

        let edge = alloc.node(edge).key();
        let (near, far) = match end {
            End::Front => (edge.predecessor(), edge.successor()),
            End::Back => (edge.successor(), edge.predecessor()),
        };
        // Under a reversed comparator the unit step runs the other way.
        near.into_iter()
            .chain(far)
            .find(|candidate| self.comparator.compare(candidate, edge) == outward)
            .ok_or(TreeError::KeySpaceExhausted { end })
    }
}

impl<K, V, C> AvlTree<K, V, C> {
    /// Returns the value of the first entry.
    pub fn peek_first<'a, A>(&self, alloc: &'a A) -> Option<&'a V>
    where
        A: NodeAllocator<K, V> + ?Sized,
        K: 'a,
        V: 'a,
    {
        self.first_key_value(alloc).map(|(_, value)| value)
    }

    /// Returns the value of the last entry.
    pub fn peek_last<'a, A>(&self, alloc: &'a A) -> Option<&'a V>
    where
        A: NodeAllocator<K, V> + ?Sized,
        K: 'a,
        V: 'a,
    {
        self.last_key_value(alloc).map(|(_, value)| value)
    }

    /// Returns the value of the last entry; same as
    /// [`peek_last`](AvlTree::peek_last).
    pub fn peek<'a, A>(&self, alloc: &'a A) -> Option<&'a V>
    where
        A: NodeAllocator<K, V> + ?Sized,
        K: 'a,
        V: 'a,
    {
        self.peek_last(alloc)
    }
}

impl<K, V, C: Comparator<K>> AvlTree<K, V, C> {
    /// Removes the first entry and returns its value.
    pub fn pop_first<A>(&mut self, alloc: &mut A) -> Option<V>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.remove_first(alloc).map(|(_, value)| value)
    }

    /// Removes the last entry and returns its value.
    pub fn pop_last<A>(&mut self, alloc: &mut A) -> Option<V>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.remove_last(alloc).map(|(_, value)| value)
    }

    /// Removes the last entry and returns its value; same as
    /// [`pop_last`](AvlTree::pop_last).
    pub fn pop<A>(&mut self, alloc: &mut A) -> Option<V>
    where
        A: NodeAllocator<K, V> + ?Sized,
    {
        self.pop_last(alloc)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::allocator::{Dynamic, Pooled};
    use crate::comparator::ReverseOrder;
    use alloc::collections::VecDeque;
    use alloc::vec::Vec;
    use proptest::prelude::*;

    #[test]
    fn first_push_lands_on_origin() {
        let mut heap = Dynamic::new();
        let mut tree: AvlTree<u8, char> = AvlTree::new();
        tree.push_first(&mut heap, 'a').unwrap();
        assert_eq!(tree.first_key_value(&heap), Some((&0, &'a')));
        tree.clear(&mut heap);

        tree.push(&mut heap, 'b').unwrap();
        assert_eq!(tree.last_key_value(&heap), Some((&0, &'b')));
        tree.clear(&mut heap);
    }

    #[test]
    fn keys_drift_one_unit_per_push() {
        let mut heap = Dynamic::new();
        let mut tree: AvlTree<i64, &str> = AvlTree::new();
        tree.add_last(&mut heap, "x").unwrap();
        tree.add_last(&mut heap, "y").unwrap();
        tree.add_first(&mut heap, "w").unwrap();
        tree.add_first(&mut heap, "v").unwrap();

        let keys: Vec<_> = tree.iter(&heap).map(|(k, _)| *k).collect();
        assert_eq!(keys, [-2, -1, 0, 1]);
        assert_eq!(tree.peek_first(&heap), Some(&"v"));
        assert_eq!(tree.peek_last(&heap), Some(&"y"));
        tree.clear(&mut heap);
    }

    #[test]
    fn unsigned_front_runs_out_of_keys() {
        let mut heap = Dynamic::new();
        let mut tree: AvlTree<u32, ()> = AvlTree::new();
        tree.push_first(&mut heap, ()).unwrap();
        assert_eq!(
            tree.push_first(&mut heap, ()),
            Err(TreeError::KeySpaceExhausted { end: End::Front })
        );
        assert_eq!(tree.len(), 1);
        tree.clear(&mut heap);
    }

    #[test]
    fn back_runs_out_at_max() {
        let mut heap = Dynamic::new();
        let mut tree = AvlTree::new();
        tree.put(&mut heap, i8::MAX, ()).unwrap();
        assert_eq!(
            tree.push_last(&mut heap, ()),
            Err(TreeError::KeySpaceExhausted { end: End::Back })
        );
        tree.push_first(&mut heap, ()).unwrap();
        assert_eq!(tree.first_key_value(&heap), Some((&(i8::MAX - 1), &())));
        tree.clear(&mut heap);
    }

    #[test]
    fn reverse_order_steps_the_other_way() {
        let mut heap = Dynamic::new();
        let mut tree: AvlTree<i32, char, ReverseOrder> = AvlTree::with_comparator(ReverseOrder);
        tree.push_last(&mut heap, 'a').unwrap();
        tree.push_last(&mut heap, 'b').unwrap();
        tree.push_first(&mut heap, 'z').unwrap();

        let entries: Vec<_> = tree.iter(&heap).map(|(k, v)| (*k, *v)).collect();
        assert_eq!(entries, [(1, 'z'), (0, 'a'), (-1, 'b')]);
        tree.clear(&mut heap);
    }

    #[test]
    fn stack_operations_use_the_back() {
        let mut heap = Dynamic::new();
        let mut tree: AvlTree<i32, i32> = AvlTree::new();
        for value in 1..=3 {
            tree.push(&mut heap, value).unwrap();
        }
        assert_eq!(tree.peek(&heap), Some(&3));
        assert_eq!(tree.pop(&mut heap), Some(3));
        assert_eq!(tree.pop(&mut heap), Some(2));
        assert_eq!(tree.pop_first(&mut heap), Some(1));
        assert_eq!(tree.pop(&mut heap), None);
        assert_eq!(tree.peek(&heap), None);
        assert_eq!(heap.in_use(), 0);
    }

    #[test]
    fn exhausted_pool_rejects_push() {
        let mut pool = Pooled::new(1, 1);
        let mut tree: AvlTree<i32, i32> = AvlTree::new();
        tree.push(&mut pool, 1).unwrap();
        assert_eq!(tree.push_first(&mut pool, 0), Err(TreeError::Exhausted));
        assert_eq!(tree.len(), 1);
        tree.clear(&mut pool);
    }

    proptest! {
        #[test]
        fn deque_matches_vecdeque(operations in prop::collection::vec(strategy(), 0..256)) {
            let mut heap = Dynamic::new();
            let mut tree: AvlTree<i64, u16> = AvlTree::new();
            let mut model = VecDeque::new();

            for operation in operations {
                match operation {
                    Operation::PushFirst(value) => {
                        tree.push_first(&mut heap, value).unwrap();
                        model.push_front(value);
                    }
                    Operation::PushLast(value) => {
                        tree.push_last(&mut heap, value).unwrap();
                        model.push_back(value);
                    }
                    Operation::PopFirst => prop_assert_eq!(tree.pop_first(&mut heap), model.pop_front()),
                    Operation::PopLast => prop_assert_eq!(tree.pop_last(&mut heap), model.pop_back()),
                }
                prop_assert_eq!(tree.peek_first(&heap), model.front());
                prop_assert_eq!(tree.peek_last(&heap), model.back());
            }

            prop_assert!(tree.iter(&heap).map(|(_, v)| v).eq(model.iter()));
            tree.clear(&mut heap);
        }
    }

    #[derive(Clone, Debug)]
    enum Operation {
        PushFirst(u16),
        PushLast(u16),
        PopFirst,
        PopLast,
    }

    fn strategy() -> impl Strategy<Value = Operation> {
        prop_oneof![
            any::<u16>().prop_map(Operation::PushFirst),
            any::<u16>().prop_map(Operation::PushLast),
            Just(Operation::PopFirst),
            Just(Operation::PopLast),
        ]
    }
}
