use core::cmp::Ordering;

/// A total order over keys of type `K`.
///
/// The tree never calls [`Ord`] directly; every key comparison goes through
/// its comparator. Any `Fn(&K, &K) -> Ordering` closure is a comparator.
///
/// # Examples
///
/// ```
/// use avl_treemap::{AvlTree, Dynamic};
///
/// // Order strings by length first, then lexicographically.
/// let by_length = |a: &&str, b: &&str| a.len().cmp(&b.len()).then(a.cmp(b));
///
/// let mut heap = Dynamic::new();
/// let mut tree = AvlTree::with_comparator(by_length);
/// tree.put(&mut heap, "ccc", 3).unwrap();
/// tree.put(&mut heap, "a", 1).unwrap();
/// tree.put(&mut heap, "bb", 2).unwrap();
///
/// let keys: Vec<_> = tree.iter(&heap).map(|(k, _)| *k).collect();
/// assert_eq!(keys, ["a", "bb", "ccc"]);
/// # tree.destroy(&mut heap);
/// ```
pub trait Comparator<K: ?Sized> {
    /// Compares `a` with `b`.
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

/// Ascending order as defined by the key's [`Ord`] implementation.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct NaturalOrder;

/// The exact reverse of [`NaturalOrder`].
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Hash)]
pub struct ReverseOrder;

impl<K: ?Sized + Ord> Comparator<K> for NaturalOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

impl<K: ?Sized + Ord> Comparator<K> for ReverseOrder {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        b.cmp(a)
    }
}

impl<K: ?Sized, F> Comparator<K> for F
where
    F: Fn(&K, &K) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self(a, b)
    }
}
