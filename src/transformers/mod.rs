//! Rewrite passes for the operator graph
//!
//! Each pass implements [`GraphTransformer`] and can be applied individually
//! or sequenced with [`run_transformers`].
//!
//! ```ignore
//! use neural_engine_optimizer::transformers::TransposeBatchMatMul;
//! use neural_engine_optimizer::transform::GraphTransformer;
//!
//! let result = TransposeBatchMatMul::new().transform(&mut graph)?;
//! println!("fused {} patterns", result.transforms_applied);
//! ```
//!
//! [`GraphTransformer`]: crate::transform::GraphTransformer
//! [`run_transformers`]: crate::transform::run_transformers

/// Fuse Transpose pairs into batch matmul
pub mod transpose_batch_matmul;

pub use transpose_batch_matmul::TransposeBatchMatMul;
