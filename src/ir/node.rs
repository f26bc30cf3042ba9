//! Operator nodes
//!
//! A node carries a name, an op-type tag, ordered operand tensors, and a typed
//! attribute map. Construction uses a builder chain mirroring how upstream
//! compilers emit nodes:
//!
//! ```ignore
//! let node = Node::new("transpose_1", "Transpose")
//!     .input(src)
//!     .output(dst)
//!     .attr("dst_perm", "0,2,1,3");
//! ```

use smallvec::SmallVec;

use super::attr::{AttrMap, AttrValue};
use super::TensorId;

/// An operator in the graph
#[derive(Debug, Clone)]
pub struct Node {
    /// Unique node name
    pub name: String,
    /// Operator type tag, e.g. `"Transpose"` or `"FusedMatMul"`
    pub op_type: String,
    /// Ordered input tensors
    pub inputs: SmallVec<[TensorId; 2]>,
    /// Ordered output tensors
    pub outputs: SmallVec<[TensorId; 1]>,
    /// Typed attributes, insertion order preserved
    pub attrs: AttrMap,
}

impl Node {
    /// Create a node with no operands or attributes
    pub fn new(name: impl Into<String>, op_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            op_type: op_type.into(),
            inputs: SmallVec::new(),
            outputs: SmallVec::new(),
            attrs: AttrMap::new(),
        }
    }

    /// Append an input operand
    pub fn input(mut self, tensor: TensorId) -> Self {
        self.inputs.push(tensor);
        self
    }

    /// Append an output operand
    pub fn output(mut self, tensor: TensorId) -> Self {
        self.outputs.push(tensor);
        self
    }

    /// Set an attribute
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    // ========================================================================
    // Typed attribute accessors
    // ========================================================================

    /// Get an integer attribute
    pub fn attr_int(&self, name: &str) -> Option<i64> {
        self.attrs.get(name).and_then(AttrValue::as_int)
    }

    /// Get a float attribute
    pub fn attr_float(&self, name: &str) -> Option<f64> {
        self.attrs.get(name).and_then(AttrValue::as_float)
    }

    /// Get a boolean attribute
    pub fn attr_bool(&self, name: &str) -> Option<bool> {
        self.attrs.get(name).and_then(AttrValue::as_bool)
    }

    /// Get a string attribute
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).and_then(AttrValue::as_str)
    }

    /// Get an integer-list attribute
    pub fn attr_ints(&self, name: &str) -> Option<&[i64]> {
        self.attrs.get(name).and_then(AttrValue::as_ints)
    }

    /// Set or update an attribute in place
    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<AttrValue>) {
        self.attrs.insert(name.into(), value.into());
    }

    /// Remove an attribute by name
    pub fn remove_attr(&mut self, name: &str) -> Option<AttrValue> {
        self.attrs.shift_remove(name)
    }

    /// Check if an attribute is present
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let node = Node::new("fused_matmul", "FusedMatMul")
            .input(TensorId(0))
            .input(TensorId(1))
            .output(TensorId(2))
            .attr("alpha", 0.125)
            .attr("transpose_a", false);

        assert_eq!(node.inputs.len(), 2);
        assert_eq!(node.outputs.len(), 1);
        assert_eq!(node.attr_float("alpha"), Some(0.125));
        assert_eq!(node.attr_bool("transpose_a"), Some(false));
    }

    #[test]
    fn test_attr_type_mismatch() {
        let node = Node::new("n", "Op").attr("alpha", 0.125);
        assert_eq!(node.attr_int("alpha"), None);
        assert_eq!(node.attr_str("alpha"), None);
    }

    #[test]
    fn test_set_and_remove_attr() {
        let mut node = Node::new("n", "Op");
        node.set_attr("dst_perm", "0,2,1,3");
        assert!(node.has_attr("dst_perm"));

        node.set_attr("dst_perm", "0,1");
        assert_eq!(node.attr_str("dst_perm"), Some("0,1"));

        assert!(node.remove_attr("dst_perm").is_some());
        assert!(!node.has_attr("dst_perm"));
    }

    #[test]
    fn test_attr_order_preserved() {
        let node = Node::new("n", "Op")
            .attr("src0_perm", "0,2,1,3")
            .attr("src1_perm", "0,2,3,1")
            .attr("output_scale", 0.125);

        let keys: Vec<_> = node.attrs.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["src0_perm", "src1_perm", "output_scale"]);
    }
}
