//! Arena storage, accessors, and validation

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{OptResult, TransformError};
use crate::ir::{Node, NodeId, Tensor, TensorId};

/// An operator graph: a node arena plus its execution order
///
/// Node order is significant; it defines the topological execution order the
/// downstream code generator consumes. Rewrite passes mutate the graph in
/// place and must leave the order topologically valid.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    pub(crate) nodes: Vec<Option<Node>>,
    pub(crate) tensors: Vec<Tensor>,
    pub(crate) order: Vec<NodeId>,
    pub(crate) node_index: FxHashMap<String, NodeId>,
    pub(crate) tensor_index: FxHashMap<String, TensorId>,
}

impl Graph {
    /// Create an empty graph
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Tensor accessors
    // ========================================================================

    /// Register a tensor and return its id
    ///
    /// Named tensors are indexed for [`find_tensor`](Self::find_tensor);
    /// anonymous tensors (empty name) are not.
    pub fn add_tensor(&mut self, tensor: Tensor) -> TensorId {
        let id = TensorId(self.tensors.len());
        if !tensor.name.is_empty() {
            self.tensor_index.insert(tensor.name.clone(), id);
        }
        self.tensors.push(tensor);
        id
    }

    /// Get a tensor by id
    pub fn tensor(&self, id: TensorId) -> &Tensor {
        &self.tensors[id.0]
    }

    /// Get a mutable tensor by id
    pub fn tensor_mut(&mut self, id: TensorId) -> &mut Tensor {
        &mut self.tensors[id.0]
    }

    /// Look up a tensor id by name
    pub fn find_tensor(&self, name: &str) -> Option<TensorId> {
        self.tensor_index.get(name).copied()
    }

    /// Number of registered tensors, including orphans left by rewrites
    pub fn tensor_count(&self) -> usize {
        self.tensors.len()
    }

    // ========================================================================
    // Node accessors
    // ========================================================================

    /// Get a node by id; `None` if the node was removed
    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    /// Get a mutable node by id
    pub fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    /// Look up a node id by name
    pub fn find_node(&self, name: &str) -> Option<NodeId> {
        self.node_index.get(name).copied()
    }

    /// Get a node by name
    pub fn get_node(&self, name: &str) -> Option<&Node> {
        self.find_node(name).and_then(|id| self.node(id))
    }

    /// Check if a node with the given name exists
    pub fn has_node(&self, name: &str) -> bool {
        self.node_index.contains_key(name)
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        self.order.len()
    }

    /// Iterate node ids in execution order
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.order.iter().copied()
    }

    /// Iterate nodes in execution order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.order.iter().filter_map(|&id| self.node(id))
    }

    /// Position of a node in the execution order
    pub fn position(&self, id: NodeId) -> Option<usize> {
        self.order.iter().position(|&n| n == id)
    }

    /// Node at the given position in the execution order
    pub fn node_at(&self, position: usize) -> Option<&Node> {
        self.order.get(position).and_then(|&id| self.node(id))
    }

    // ========================================================================
    // Edge traversal
    // ========================================================================

    /// The node producing a tensor
    pub fn producer(&self, tensor: TensorId) -> Option<NodeId> {
        self.tensor(tensor).producer()
    }

    /// Nodes consuming a tensor, one entry per operand reference
    pub fn consumers(&self, tensor: TensorId) -> &[NodeId] {
        self.tensor(tensor).consumers()
    }

    /// Check that `node` is the only consumer of `tensor`
    ///
    /// O(1) degree check; false when the tensor feeds any other node or is
    /// referenced by `node` more than once alongside others.
    pub fn single_consumer(&self, tensor: TensorId, node: NodeId) -> bool {
        matches!(self.consumers(tensor), [only] if *only == node)
    }

    // ========================================================================
    // Validation
    // ========================================================================

    /// Check the structural invariants the downstream codegen relies on
    ///
    /// - `order` references only live nodes, each exactly once
    /// - every input tensor is a constant or produced by an earlier node
    /// - tensor producer/consumer links agree with node operand lists
    pub fn validate(&self) -> OptResult<()> {
        let mut seen: FxHashSet<NodeId> = FxHashSet::default();
        let mut produced: FxHashSet<TensorId> = FxHashSet::default();

        for &id in &self.order {
            if !seen.insert(id) {
                return Err(TransformError::ValidationFailed(format!(
                    "node id {} appears twice in the execution order",
                    id.index()
                )));
            }
            let node = self.node(id).ok_or_else(|| {
                TransformError::ValidationFailed(format!(
                    "execution order references removed node id {}",
                    id.index()
                ))
            })?;

            for &input in &node.inputs {
                let tensor = self.tensor(input);
                if produced.contains(&input) || tensor.is_constant() {
                    continue;
                }
                return Err(TransformError::ValidationFailed(format!(
                    "node `{}` consumes tensor `{}` before it is produced",
                    node.name, tensor.name
                )));
            }

            for &output in &node.outputs {
                let tensor = self.tensor(output);
                if tensor.producer() != Some(id) {
                    return Err(TransformError::ValidationFailed(format!(
                        "tensor `{}` does not record `{}` as its producer",
                        tensor.name, node.name
                    )));
                }
                produced.insert(output);
            }
        }

        // Consumer lists must match actual operand references
        let mut refs: FxHashMap<TensorId, usize> = FxHashMap::default();
        for node in self.nodes() {
            for &input in &node.inputs {
                *refs.entry(input).or_insert(0) += 1;
            }
        }
        for (idx, tensor) in self.tensors.iter().enumerate() {
            let expected = refs.get(&TensorId(idx)).copied().unwrap_or(0);
            if tensor.consumer_count() != expected {
                return Err(TransformError::ValidationFailed(format!(
                    "tensor `{}` records {} consumers but {} operands reference it",
                    tensor.name,
                    tensor.consumer_count(),
                    expected
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_test_graph() -> Graph {
        let mut g = Graph::new();
        let x = g.add_tensor(Tensor::new("X"));
        let conv_out = g.add_tensor(Tensor::new("conv_out"));
        let y = g.add_tensor(Tensor::new("Y"));

        let input = Node::new("input_data", "Input").output(x);
        let conv = Node::new("conv_0", "Conv").input(x).output(conv_out);
        let relu = Node::new("relu_0", "Relu").input(conv_out).output(y);
        g.add_node(input);
        g.add_node(conv);
        g.add_node(relu);
        g
    }

    #[test]
    fn test_lookup() {
        let g = make_test_graph();
        assert_eq!(g.node_count(), 3);
        assert!(g.has_node("conv_0"));
        assert_eq!(g.get_node("conv_0").unwrap().op_type, "Conv");
        assert!(g.get_node("missing").is_none());
    }

    #[test]
    fn test_edges() {
        let g = make_test_graph();
        let conv_out = g.find_tensor("conv_out").unwrap();
        let conv = g.find_node("conv_0").unwrap();
        let relu = g.find_node("relu_0").unwrap();

        assert_eq!(g.producer(conv_out), Some(conv));
        assert_eq!(g.consumers(conv_out), &[relu]);
        assert!(g.single_consumer(conv_out, relu));
        assert!(!g.single_consumer(conv_out, conv));
    }

    #[test]
    fn test_iteration_order() {
        let g = make_test_graph();
        let names: Vec<_> = g.nodes().map(|n| n.name.as_str()).collect();
        assert_eq!(names, vec!["input_data", "conv_0", "relu_0"]);
        assert_eq!(g.node_at(1).unwrap().name, "conv_0");
    }

    #[test]
    fn test_validate_ok() {
        let g = make_test_graph();
        g.validate().unwrap();
    }

    #[test]
    fn test_validate_consumed_before_produced() {
        let mut g = Graph::new();
        let t = g.add_tensor(Tensor::new("t"));
        // Consumer first, producer second: order is not topological
        g.add_node(Node::new("relu_0", "Relu").input(t));
        g.add_node(Node::new("conv_0", "Conv").output(t));
        assert!(g.validate().is_err());
    }

    #[test]
    fn test_validate_constant_input() {
        let mut g = Graph::new();
        let c = g.add_tensor(Tensor::constant(ndarray::arr0(1.0).into_dyn()));
        g.add_node(Node::new("relu_0", "Relu").input(c));
        g.validate().unwrap();
    }
}
