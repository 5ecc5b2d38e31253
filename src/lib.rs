//! An AVL tree map with order statistics, over pluggable node allocators.
//!
//! [`AvlTree`] is a self-balancing binary search tree that works as
//!
//! - an ordered map: [`put`](AvlTree::put), [`get`](AvlTree::get),
//!   [`remove`](AvlTree::remove), [`higher`](AvlTree::higher) and
//!   [`lower`](AvlTree::lower) in O(log n);
//! - an order-statistic index: [`get_by_rank`](AvlTree::get_by_rank) and
//!   [`rank_of`](AvlTree::rank_of) in O(log n), via subtree sizes;
//! - a deque over integer keys: [`push_first`](AvlTree::push_first),
//!   [`pop_last`](AvlTree::pop_last) and friends synthesize keys one unit
//!   beyond either end.
//!
//! Node storage comes from a [`NodeAllocator`] that the caller lends to every
//! operation. Three strategies are provided:
//!
//! - [`Dynamic`]: unbounded, one heap allocation per node;
//! - [`Pooled`]: bounded, grows lazily and recycles released nodes;
//! - [`Slab`]: fixed capacity in a single block, no heap traffic after
//!   construction.
//!
//! Bounded allocators report exhaustion as [`TreeError::Exhausted`], leaving
//! the tree exactly as it was.
//!
//! # Example
//!
//! ```
//! use avl_treemap::{AvlTree, NodeAllocator, Pooled, TreeError};
//!
//! let mut pool = Pooled::new(4, 4);
//! let mut tree = AvlTree::new();
//!
//! for (key, value) in [(30, "c"), (10, "a"), (20, "b"), (40, "d")] {
//!     tree.put(&mut pool, key, value)?;
//! }
//! assert_eq!(tree.put(&mut pool, 50, "e"), Err(TreeError::Exhausted));
//!
//! assert_eq!(tree.get_by_rank(&pool, 1), Some((&20, &"b")));
//! assert_eq!(tree.higher(&pool, &25), Some((&30, &"c")));
//!
//! // Walk the tree with a circular cursor.
//! let mut cursor = tree.cursor_at(&pool, &40);
//! assert_eq!(cursor.move_next(), Some((&10, &"a")));
//!
//! tree.destroy(&mut pool);
//! assert_eq!(pool.in_use(), 0);
//! # Ok::<(), TreeError>(())
//! ```
//!
//! # Logging
//!
//! Allocator growth, exhaustion and tree teardown are reported through
//! [`tracing`] under the `avl_treemap::allocator` and `avl_treemap::tree`
//! targets. The crate installs no subscriber.
//!
//! # Features
//!
//! - **`no_std` compatible** - Only requires `alloc`
//! - **No unsafe code** - Nodes are addressed by index handles
//! - **Shared allocators** - Any number of trees may draw from one allocator

#![no_std]
// These forbid rules and lint groups are meant to be very restrictive.
#![forbid(unsafe_code)]
#![forbid(keyword_idents)]
#![forbid(non_ascii_idents)]
#![forbid(unreachable_pub)]
#![warn(clippy::all)]
#![warn(clippy::cargo)]
#![warn(clippy::pedantic)]
// Enable coverage attributes for nightly builds.
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

extern crate alloc;

mod allocator;
mod comparator;
mod error;
mod raw;

pub mod avl_tree;

pub use allocator::{Dynamic, NodeAllocator, Pooled, Slab};
pub use avl_tree::{AvlTree, Cursor, CursorMut, Iter, UnitStep};
pub use comparator::{Comparator, NaturalOrder, ReverseOrder};
pub use error::{End, InvariantViolation, TreeError};
pub use raw::{Handle, Node};
