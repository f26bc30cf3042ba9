//! Error types for the graph optimizer
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

use crate::ir::PermParseError;

/// Main error type for graph transformation operations
#[derive(Error, Debug)]
pub enum TransformError {
    /// Pattern matching failed
    #[error("Pattern matching failed: {0}")]
    PatternNotMatched(String),

    /// Invalid node configuration
    #[error("Invalid node: {0}")]
    InvalidNode(String),

    /// Node not found in the graph
    #[error("Unknown node: {0}")]
    UnknownNode(String),

    /// Tensor not found in the graph
    #[error("Unknown tensor: {0}")]
    UnknownTensor(String),

    /// Required attribute is absent from a matched node
    #[error("Missing attribute `{attr}` on node `{node}`")]
    MissingAttribute {
        /// Node name
        node: String,
        /// Attribute name
        attr: String,
    },

    /// Permutation attribute could not be parsed
    #[error("Malformed permutation `{value}` on node `{node}`: {source}")]
    MalformedPermutation {
        /// Node carrying the attribute
        node: String,
        /// The raw attribute string
        value: String,
        /// Parse failure detail
        #[source]
        source: PermParseError,
    },

    /// Graph validation failed
    #[error("Graph validation failed: {0}")]
    ValidationFailed(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for graph operations
pub type OptResult<T> = Result<T, TransformError>;
