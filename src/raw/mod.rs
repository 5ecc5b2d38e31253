mod handle;
mod node;
mod raw_avl_tree;

pub use handle::Handle;
pub use node::Node;
pub(crate) use raw_avl_tree::{RawAvlTree, Walk};
