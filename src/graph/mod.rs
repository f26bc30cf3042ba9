//! Graph arena for the operator IR
//!
//! [`Graph`] owns all nodes and tensors and keeps the execution order:
//!
//! - nodes live in a slab addressed by stable [`NodeId`]s; removal leaves the
//!   slot empty so ids in flight never dangle
//! - tensors hold producer/consumer ids, making edge-degree checks O(1)
//! - `order` is the topological execution order, spliced in place by
//!   [`Graph::insert_node_at`] / [`Graph::remove_node`]
//! - name→id indexes give O(1) lookup for tests and builders
//!
//! # Example
//!
//! ```ignore
//! use neural_engine_optimizer::graph::Graph;
//! use neural_engine_optimizer::ir::{Node, Tensor};
//!
//! let mut g = Graph::new();
//! let x = g.add_tensor(Tensor::new("x"));
//! let y = g.add_tensor(Tensor::new("y"));
//! g.add_node(Node::new("transpose_1", "Transpose")
//!     .input(x)
//!     .output(y)
//!     .attr("dst_perm", "1,0"));
//!
//! assert!(g.single_consumer(x, g.find_node("transpose_1").unwrap()));
//! g.validate()?;
//! ```
//!
//! [`NodeId`]: crate::ir::NodeId

pub mod arena;
pub mod mutators;

pub use arena::Graph;
