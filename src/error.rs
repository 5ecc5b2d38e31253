use core::fmt;

use thiserror::Error;

use crate::raw::Handle;

/// Errors reported by fallible tree operations.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Error)]
pub enum TreeError {
    /// The allocator had no node record left to hand out.
    ///
    /// The tree is left exactly as it was before the call.
    #[error("node allocator exhausted")]
    Exhausted,
    /// No key exists one unit beyond the current first or last key.
    #[error("no key left beyond the {end} of the tree")]
    KeySpaceExhausted {
        /// The end of the tree the key was synthesized for.
        end: End,
    },
}

/// One end of a tree's key order.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum End {
    /// The smallest key under the tree's comparator.
    Front,
    /// The largest key under the tree's comparator.
    Back,
}

impl fmt::Display for End {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            End::Front => f.write_str("front"),
            End::Back => f.write_str("back"),
        }
    }
}

/// A broken structural invariant, as found by
/// [`AvlTree::validate`](crate::AvlTree::validate).
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum InvariantViolation {
    /// A key is not strictly between the keys of its ancestors.
    #[error("node {node:?} is out of order")]
    Order {
        /// The misplaced node.
        node: Handle,
    },
    /// A node's subtree size is not one plus the sizes of its children.
    #[error("node {node:?} records size {recorded}, actual {actual}")]
    Size {
        /// The node with the stale size.
        node: Handle,
        /// The size stored in the node.
        recorded: usize,
        /// The size computed from its children.
        actual: usize,
    },
    /// A node's height is not one plus the height of its taller child.
    #[error("node {node:?} records height {recorded}, actual {actual}")]
    Height {
        /// The node with the stale height.
        node: Handle,
        /// The height stored in the node.
        recorded: i8,
        /// The height computed from its children.
        actual: i8,
    },
    /// A node's children differ in height by more than one.
    #[error("node {node:?} has balance factor {balance}")]
    Balance {
        /// The unbalanced node.
        node: Handle,
        /// Left child height minus right child height.
        balance: i16,
    },
    /// The tree's element count disagrees with the number of reachable nodes.
    #[error("tree records {recorded} entries but {actual} nodes are reachable")]
    Count {
        /// The count stored in the tree.
        recorded: usize,
        /// The number of nodes reachable from the root.
        actual: usize,
    },
}
