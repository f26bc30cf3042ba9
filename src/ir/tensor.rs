//! Tensors: named values flowing between operators
//!
//! A tensor records its producing node and consuming nodes as arena indices.
//! A tensor with a concrete payload and no producer is a constant.

use ndarray::ArrayD;
use smallvec::SmallVec;

use super::NodeId;

/// A value edge in the operator graph
#[derive(Debug, Clone)]
pub struct Tensor {
    /// Tensor name; empty for anonymous constants
    pub name: String,
    /// Concrete payload, present for constants
    pub data: Option<ArrayD<f32>>,
    pub(crate) producer: Option<NodeId>,
    pub(crate) consumers: SmallVec<[NodeId; 2]>,
}

impl Tensor {
    /// Create a named tensor with no payload
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: None,
            producer: None,
            consumers: SmallVec::new(),
        }
    }

    /// Create an anonymous constant carrying `data`
    pub fn constant(data: ArrayD<f32>) -> Self {
        Self {
            name: String::new(),
            data: Some(data),
            producer: None,
            consumers: SmallVec::new(),
        }
    }

    /// Create a named constant carrying `data`
    pub fn named_constant(name: impl Into<String>, data: ArrayD<f32>) -> Self {
        Self {
            name: name.into(),
            data: Some(data),
            producer: None,
            consumers: SmallVec::new(),
        }
    }

    /// A constant has a payload and no producing operator
    pub fn is_constant(&self) -> bool {
        self.data.is_some() && self.producer.is_none()
    }

    /// The node producing this tensor, if any
    pub fn producer(&self) -> Option<NodeId> {
        self.producer
    }

    /// Nodes consuming this tensor, one entry per operand reference
    pub fn consumers(&self) -> &[NodeId] {
        &self.consumers
    }

    /// Number of consuming operand references
    pub fn consumer_count(&self) -> usize {
        self.consumers.len()
    }
}
