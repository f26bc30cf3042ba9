//! Typed operator IR
//!
//! The in-memory data model consumed and produced by the rewrite passes:
//!
//! - [`AttrValue`]: typed attribute variant (int, float, bool, string, int list)
//! - [`Tensor`]: named value with optional constant payload and edge degrees
//! - [`Node`]: operator with ordered operands and an attribute map
//!
//! Nodes and tensors live in a [`Graph`](crate::graph::Graph) arena and are
//! addressed by stable [`NodeId`]/[`TensorId`] indices; tensors record their
//! producer and consumers as indices, so edge-degree checks (e.g. "single
//! consumer") are O(1).

pub mod attr;
pub mod node;
pub mod tensor;

pub use attr::{parse_perm, AttrMap, AttrValue, PermParseError};
pub use node::Node;
pub use tensor::Tensor;

/// Stable index of a node in the graph arena
///
/// Ids are never reused; a removed node leaves its slot empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// Raw arena index
    pub fn index(self) -> usize {
        self.0
    }
}

/// Stable index of a tensor in the graph arena
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TensorId(pub(crate) usize);

impl TensorId {
    /// Raw arena index
    pub fn index(self) -> usize {
        self.0
    }
}
