//! Pattern matching over operator graphs
//!
//! Matches op-type sequences in reverse (output→input) direction along
//! producer edges, with condition hooks and fusibility checks. Fusion passes
//! build on this to locate candidate subgraphs before rewriting them.

pub mod matcher;

pub use matcher::{matcher, MatchResult, PatternMatcher};
