//! Guided dialog structure: nodes, the tree that orders them and the actions
//! they may carry.

pub mod actions;
mod node;
mod tree;

pub use node::{DialogNode, NodeId};
pub use tree::DialogTree;
