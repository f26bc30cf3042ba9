//! Structural graph mutation
//!
//! Insertion and removal keep the tensor producer/consumer links and the name
//! index consistent with the node list.

use crate::ir::{Node, NodeId};

use super::arena::Graph;

impl Graph {
    /// Append a node at the end of the execution order
    pub fn add_node(&mut self, node: Node) -> NodeId {
        let position = self.order.len();
        self.insert_node_at(position, node)
    }

    /// Insert a node at the given position in the execution order
    ///
    /// Links the node as producer of its outputs and consumer of its inputs.
    /// The caller is responsible for choosing a position that keeps the order
    /// topological; `validate` checks it.
    ///
    /// # Panics
    ///
    /// Panics if `position > node_count()`.
    pub fn insert_node_at(&mut self, position: usize, node: Node) -> NodeId {
        assert!(
            position <= self.order.len(),
            "insert position {position} out of bounds"
        );

        let id = NodeId(self.nodes.len());
        for &input in &node.inputs {
            self.tensors[input.index()].consumers.push(id);
        }
        for &output in &node.outputs {
            self.tensors[output.index()].producer = Some(id);
        }
        if !node.name.is_empty() {
            self.node_index.insert(node.name.clone(), id);
        }
        self.nodes.push(Some(node));
        self.order.insert(position, id);
        id
    }

    /// Remove a node, unlinking it from its tensors
    ///
    /// Returns the removed node, or `None` if the id was already removed.
    /// Tensors the node produced are left without a producer; tensors it
    /// consumed lose one consumer entry per operand reference.
    pub fn remove_node(&mut self, id: NodeId) -> Option<Node> {
        let node = self.nodes.get_mut(id.index())?.take()?;

        for &input in &node.inputs {
            let consumers = &mut self.tensors[input.index()].consumers;
            if let Some(pos) = consumers.iter().position(|&n| n == id) {
                consumers.remove(pos);
            }
        }
        for &output in &node.outputs {
            let tensor = &mut self.tensors[output.index()];
            if tensor.producer == Some(id) {
                tensor.producer = None;
            }
        }
        if self.node_index.get(&node.name) == Some(&id) {
            self.node_index.remove(&node.name);
        }
        if let Some(pos) = self.position(id) {
            self.order.remove(pos);
        }

        Some(node)
    }
}
