//! Transformation infrastructure
//!
//! A rewrite pass implements [`GraphTransformer`] and mutates a
//! [`Graph`](crate::graph::Graph) in place, reporting what it did through
//! [`TransformResult`]. [`run_transformers`] sequences a set of passes,
//! skipping those not applicable to the graph at hand.

use tracing::debug;

use crate::error::OptResult;
use crate::graph::Graph;

/// Transformation statistics
#[derive(Debug, Default, Clone)]
pub struct TransformResult {
    /// Number of patterns matched
    pub patterns_matched: usize,
    /// Number of transformations applied
    pub transforms_applied: usize,
    /// Number of nodes eliminated
    pub nodes_eliminated: usize,
    /// Names of transformed nodes
    pub transformed_nodes: Vec<String>,
}

impl TransformResult {
    /// Create empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful transformation
    pub fn record(&mut self, node_name: &str) {
        self.transforms_applied += 1;
        self.transformed_nodes.push(node_name.to_string());
    }

    /// Merge with another result
    pub fn merge(&mut self, other: TransformResult) {
        self.patterns_matched += other.patterns_matched;
        self.transforms_applied += other.transforms_applied;
        self.nodes_eliminated += other.nodes_eliminated;
        self.transformed_nodes.extend(other.transformed_nodes);
    }
}

/// Trait for individual rewrite passes
pub trait GraphTransformer {
    /// Name of the transformer
    fn name(&self) -> &'static str;

    /// Apply the transformation, mutating the graph in place
    ///
    /// On error the graph must be left unmodified; passes collect and
    /// validate all matches before applying any rewrite.
    fn transform(&self, graph: &mut Graph) -> OptResult<TransformResult>;

    /// Check if this transformer is applicable to the graph
    fn is_applicable(&self, _graph: &Graph) -> bool {
        true
    }
}

/// Run multiple transformers in sequence
pub fn run_transformers(
    graph: &mut Graph,
    transformers: &[&dyn GraphTransformer],
) -> OptResult<TransformResult> {
    let mut total = TransformResult::new();

    for transformer in transformers {
        if !transformer.is_applicable(graph) {
            continue;
        }
        let result = transformer.transform(graph)?;
        debug!(
            pass = transformer.name(),
            matched = result.patterns_matched,
            eliminated = result.nodes_eliminated,
            "pass applied"
        );
        total.merge(result);
    }

    Ok(total)
}
