//! Producer-chain pattern matching

use crate::graph::Graph;
use crate::ir::NodeId;

/// Result of a successful pattern match
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Matched node ids in pattern order (first = anchor, last = earliest)
    pub nodes: Vec<NodeId>,
    /// The anchor node where the match started
    pub anchor: NodeId,
}

impl MatchResult {
    /// The anchor node
    pub fn first(&self) -> Option<NodeId> {
        self.nodes.first().copied()
    }

    /// The earliest matched node
    pub fn last(&self) -> Option<NodeId> {
        self.nodes.last().copied()
    }

    /// Matched node at index
    pub fn get(&self, index: usize) -> Option<NodeId> {
        self.nodes.get(index).copied()
    }

    /// Number of matched nodes
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Matches op-type sequences along producer edges
///
/// The pattern is matched in reverse order: the first element matches the
/// anchor node, each following element the producer of the previous node's
/// first input.
pub struct PatternMatcher<'a> {
    graph: &'a Graph,
}

impl<'a> PatternMatcher<'a> {
    /// Create a matcher over the given graph
    pub fn new(graph: &'a Graph) -> Self {
        Self { graph }
    }

    /// Match a pattern starting from the anchor node
    ///
    /// ```ignore
    /// // Match Add <- FusedMatMul <- Transpose walking producers
    /// let m = matcher.match_pattern(add, &["Add", "FusedMatMul", "Transpose"]);
    /// ```
    pub fn match_pattern(&self, anchor: NodeId, pattern: &[&str]) -> Option<MatchResult> {
        if pattern.is_empty() {
            return None;
        }

        let mut matched = Vec::with_capacity(pattern.len());
        let mut current = Some(anchor);

        for &op_type in pattern {
            let id = current?;
            let node = self.graph.node(id)?;
            if node.op_type != op_type {
                return None;
            }
            matched.push(id);
            current = node
                .inputs
                .first()
                .and_then(|&input| self.graph.producer(input));
        }

        Some(MatchResult {
            nodes: matched,
            anchor,
        })
    }

    /// Match a pattern and apply an additional condition on the matched nodes
    pub fn match_pattern_with_condition<F>(
        &self,
        anchor: NodeId,
        pattern: &[&str],
        condition: F,
    ) -> Option<MatchResult>
    where
        F: FnOnce(&[NodeId]) -> bool,
    {
        let result = self.match_pattern(anchor, pattern)?;
        condition(&result.nodes).then_some(result)
    }

    /// Find all matches of a pattern across the graph
    ///
    /// Every node whose op type equals the first pattern element is tried as
    /// an anchor.
    pub fn find_all_matches(&self, pattern: &[&str]) -> Vec<MatchResult> {
        let Some(&anchor_op) = pattern.first() else {
            return Vec::new();
        };

        self.graph
            .node_ids()
            .filter(|&id| {
                self.graph
                    .node(id)
                    .is_some_and(|n| n.op_type == anchor_op)
            })
            .filter_map(|id| self.match_pattern(id, pattern))
            .collect()
    }

    /// Check that the edge from `producer` to `consumer` is safe to fuse away
    ///
    /// True when the producer's single output tensor feeds `consumer` and
    /// nothing else. A producer with additional consumers must survive the
    /// rewrite, so the connection is not fusible.
    pub fn is_fusible_connection(&self, producer: NodeId, consumer: NodeId) -> bool {
        let Some(node) = self.graph.node(producer) else {
            return false;
        };
        match node.outputs.as_slice() {
            [output] => self.graph.single_consumer(*output, consumer),
            _ => false,
        }
    }
}

/// Convenience constructor for a pattern matcher
pub fn matcher(graph: &Graph) -> PatternMatcher<'_> {
    PatternMatcher::new(graph)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Node, Tensor};

    fn make_chain_graph() -> Graph {
        let mut g = Graph::new();
        let x = g.add_tensor(Tensor::new("X"));
        let t_out = g.add_tensor(Tensor::new("transpose:0"));
        let mm_out = g.add_tensor(Tensor::new("matmul:0"));
        let y = g.add_tensor(Tensor::new("add:0"));
        let bias = g.add_tensor(Tensor::constant(ndarray::arr0(1.0).into_dyn()));

        g.add_node(Node::new("input_data", "Input").output(x));
        g.add_node(
            Node::new("transpose", "Transpose")
                .input(x)
                .output(t_out)
                .attr("dst_perm", "0,2,1,3"),
        );
        g.add_node(
            Node::new("matmul", "FusedMatMul")
                .input(t_out)
                .input(bias)
                .output(mm_out),
        );
        g.add_node(Node::new("add", "Add").input(mm_out).input(bias).output(y));
        g
    }

    #[test]
    fn test_match_pattern_success() {
        let g = make_chain_graph();
        let m = matcher(&g);
        let add = g.find_node("add").unwrap();

        let result = m
            .match_pattern(add, &["Add", "FusedMatMul", "Transpose"])
            .unwrap();
        assert_eq!(result.len(), 3);
        assert_eq!(result.first(), Some(add));
        assert_eq!(result.last(), g.find_node("transpose"));
    }

    #[test]
    fn test_match_pattern_failure() {
        let g = make_chain_graph();
        let m = matcher(&g);
        let add = g.find_node("add").unwrap();

        assert!(m.match_pattern(add, &["Add", "Transpose"]).is_none());
        assert!(m.match_pattern(add, &[]).is_none());
    }

    #[test]
    fn test_find_all_matches() {
        let g = make_chain_graph();
        let m = matcher(&g);

        let matches = m.find_all_matches(&["FusedMatMul", "Transpose"]);
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].anchor, g.find_node("matmul").unwrap());
    }

    #[test]
    fn test_match_with_condition() {
        let g = make_chain_graph();
        let m = matcher(&g);
        let add = g.find_node("add").unwrap();

        assert!(m
            .match_pattern_with_condition(add, &["Add", "FusedMatMul"], |nodes| nodes.len() == 2)
            .is_some());
        assert!(m
            .match_pattern_with_condition(add, &["Add", "FusedMatMul"], |_| false)
            .is_none());
    }

    #[test]
    fn test_is_fusible_connection() {
        let g = make_chain_graph();
        let m = matcher(&g);
        let transpose = g.find_node("transpose").unwrap();
        let matmul = g.find_node("matmul").unwrap();
        let add = g.find_node("add").unwrap();

        assert!(m.is_fusible_connection(transpose, matmul));
        assert!(m.is_fusible_connection(matmul, add));
        // transpose does not feed add
        assert!(!m.is_fusible_connection(transpose, add));
    }
}
