//! # Neural Engine Optimizer
//!
//! Graph-level rewrite passes for an in-memory operator IR, as produced by a
//! neural-engine model compiler.
//!
//! This crate provides the pattern-rewrite infrastructure for operator graphs,
//! centred on fusion passes that collapse multi-node subgraphs into single
//! fused operators:
//!
//! - **Typed IR**: nodes, tensors, and a typed attribute map
//! - **Graph arena**: nodes addressed by stable indices, O(1) edge queries
//! - **Pattern matching**: producer-chain matching of op-type sequences
//! - **Fusion**: `Transpose ×2 → FusedMatMul (→ Add)` collapsed into one node
//!
//! ## Example
//!
//! ```ignore
//! use neural_engine_optimizer::prelude::*;
//!
//! let mut graph = build_graph()?;
//! let result = TransposeBatchMatMul::new().transform(&mut graph)?;
//! println!("fused {} patterns", result.transforms_applied);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

pub mod error;
pub mod graph;
pub mod ir;
pub mod pattern;
pub mod transform;
pub mod transformers;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module - import commonly used types with `use neural_engine_optimizer::prelude::*`
pub mod prelude {
    pub use crate::error::{OptResult, TransformError};
    pub use crate::graph::Graph;
    pub use crate::ir::{AttrValue, Node, NodeId, Tensor, TensorId};
    pub use crate::pattern::{matcher, MatchResult, PatternMatcher};
    pub use crate::transform::{run_transformers, GraphTransformer, TransformResult};
    pub use crate::transformers::TransposeBatchMatMul;
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use error::{OptResult, TransformError};

// ============================================================================
// Version information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
