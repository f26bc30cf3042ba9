//! Transpose + FusedMatMul fusion

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::error::{OptResult, TransformError};
use crate::graph::Graph;
use crate::ir::{parse_perm, Node, NodeId, TensorId};
use crate::pattern::PatternMatcher;
use crate::transform::{GraphTransformer, TransformResult};

/// Fuses `Transpose ×2 → FusedMatMul (→ Add)` into a single Matmul node
///
/// Two independent Transpose nodes, each feeding exactly one FusedMatMul as
/// its two operands, collapse into one node that reads the pre-transpose
/// tensors directly. The transposes' `dst_perm` attributes move onto the
/// fused node as `src0_perm`/`src1_perm`, the FusedMatMul's `alpha` becomes
/// `output_scale`, and a single-consumer Add on the output is folded in as a
/// `binary_add` epilogue with its other operand appended as an extra input.
///
/// The pass is idempotent: the fused node's type no longer matches the
/// pattern. Matches are collected and validated before any rewrite, so a
/// malformed permutation fails the pass with the graph untouched.
#[derive(Debug, Default)]
pub struct TransposeBatchMatMul;

impl TransposeBatchMatMul {
    /// Create a new TransposeBatchMatMul transformer
    pub fn new() -> Self {
        Self
    }
}

struct TransposeMatMulMatch {
    transpose0: NodeId,
    transpose1: NodeId,
    matmul: NodeId,
    add: Option<NodeId>,
    /// Pre-transpose operands, in FusedMatMul operand order
    src0: TensorId,
    src1: TensorId,
    /// Validated permutation strings
    src0_perm: String,
    src1_perm: String,
    output_scale: Option<f64>,
    /// The Add's other operand, appended as an extra input when fused
    append_operand: Option<TensorId>,
    /// Final output tensor (the Add's if fused, else the FusedMatMul's)
    output: TensorId,
    fused_name: String,
}

impl GraphTransformer for TransposeBatchMatMul {
    fn name(&self) -> &'static str {
        "TransposeBatchMatMul"
    }

    fn transform(&self, graph: &mut Graph) -> OptResult<TransformResult> {
        // Two phases: every candidate is validated before the first rewrite,
        // so the whole pass either applies or leaves the graph unmodified.
        let matches = self.perceive(graph)?;

        let mut result = TransformResult::new();
        for m in &matches {
            let eliminated = self.apply(graph, m)?;
            result.patterns_matched += 1;
            result.nodes_eliminated += eliminated;
            result.record(&m.fused_name);
            debug!(
                node = m.fused_name.as_str(),
                epilogue = m.add.is_some(),
                "fused transpose pair into matmul"
            );
        }

        Ok(result)
    }

    fn is_applicable(&self, graph: &Graph) -> bool {
        graph.nodes().any(|n| n.op_type == "FusedMatMul")
    }
}

impl TransposeBatchMatMul {
    fn perceive(&self, graph: &Graph) -> OptResult<Vec<TransposeMatMulMatch>> {
        let matcher = PatternMatcher::new(graph);
        let mut matches = Vec::new();
        let mut claimed: FxHashSet<NodeId> = FxHashSet::default();

        for anchor in graph.node_ids() {
            let Some(node) = graph.node(anchor) else {
                continue;
            };
            if node.op_type != "FusedMatMul"
                || node.inputs.len() != 2
                || node.outputs.len() != 1
            {
                continue;
            }
            // Transposed-operand variants are unspecified upstream; leave
            // flagged matmuls alone.
            if node.attr_bool("transpose_a").unwrap_or(false)
                || node.attr_bool("transpose_b").unwrap_or(false)
            {
                continue;
            }

            let Some(t0) = graph.producer(node.inputs[0]) else {
                continue;
            };
            let Some(t1) = graph.producer(node.inputs[1]) else {
                continue;
            };
            if t0 == t1 {
                continue;
            }
            let (Some(tr0), Some(tr1)) = (graph.node(t0), graph.node(t1)) else {
                continue;
            };
            if tr0.op_type != "Transpose"
                || tr1.op_type != "Transpose"
                || tr0.inputs.len() != 1
                || tr1.inputs.len() != 1
            {
                continue;
            }
            // A transpose with other consumers must survive; skip the site.
            if !matcher.is_fusible_connection(t0, anchor)
                || !matcher.is_fusible_connection(t1, anchor)
            {
                continue;
            }

            let src0_perm = validated_perm(graph, t0)?;
            let src1_perm = validated_perm(graph, t1)?;

            let mm_out = node.outputs[0];
            let mut add = None;
            let mut append_operand = None;
            let mut output = mm_out;
            if let [consumer] = graph.consumers(mm_out) {
                let consumer = *consumer;
                if !claimed.contains(&consumer) {
                    if let Some((operand, add_out)) = epilogue_operand(graph, consumer, mm_out) {
                        // Fusing the epilogue pulls its operand up to the
                        // matmul's position; only sound if the operand is
                        // already available there.
                        if available_before(graph, operand, anchor) {
                            add = Some(consumer);
                            append_operand = Some(operand);
                            output = add_out;
                        }
                    }
                }
            }

            claimed.insert(anchor);
            claimed.insert(t0);
            claimed.insert(t1);
            if let Some(a) = add {
                claimed.insert(a);
            }

            matches.push(TransposeMatMulMatch {
                transpose0: t0,
                transpose1: t1,
                matmul: anchor,
                add,
                src0: tr0.inputs[0],
                src1: tr1.inputs[0],
                src0_perm,
                src1_perm,
                output_scale: node.attr_float("alpha"),
                append_operand,
                output,
                fused_name: node.name.clone(),
            });
        }

        Ok(matches)
    }

    fn apply(&self, graph: &mut Graph, m: &TransposeMatMulMatch) -> OptResult<usize> {
        if let Some(add) = m.add {
            remove_matched(graph, add)?;
        }
        remove_matched(graph, m.transpose0)?;
        remove_matched(graph, m.transpose1)?;

        let position = graph
            .position(m.matmul)
            .ok_or_else(|| TransformError::UnknownNode(m.fused_name.clone()))?;
        remove_matched(graph, m.matmul)?;

        let mut fused = Node::new(m.fused_name.as_str(), "Matmul")
            .input(m.src0)
            .input(m.src1)
            .attr("src0_perm", m.src0_perm.as_str())
            .attr("src1_perm", m.src1_perm.as_str());
        if let Some(scale) = m.output_scale {
            fused = fused.attr("output_scale", scale);
        }
        if let Some(operand) = m.append_operand {
            fused = fused.input(operand).attr("append_op", "binary_add");
        }
        graph.insert_node_at(position, fused.output(m.output));

        Ok(if m.add.is_some() { 3 } else { 2 })
    }
}

fn remove_matched(graph: &mut Graph, id: NodeId) -> OptResult<Node> {
    graph
        .remove_node(id)
        .ok_or_else(|| TransformError::UnknownNode(format!("node id {}", id.index())))
}

/// Read and validate a Transpose node's `dst_perm` attribute
fn validated_perm(graph: &Graph, id: NodeId) -> OptResult<String> {
    let node = graph
        .node(id)
        .ok_or_else(|| TransformError::UnknownNode(format!("node id {}", id.index())))?;
    let value = node
        .attr_str("dst_perm")
        .ok_or_else(|| TransformError::MissingAttribute {
            node: node.name.clone(),
            attr: "dst_perm".to_string(),
        })?;
    parse_perm(value).map_err(|source| TransformError::MalformedPermutation {
        node: node.name.clone(),
        value: value.to_string(),
        source,
    })?;
    Ok(value.to_string())
}

/// If `consumer` is a fusible elementwise Add, return its other operand and
/// its output tensor
fn epilogue_operand(
    graph: &Graph,
    consumer: NodeId,
    mm_out: TensorId,
) -> Option<(TensorId, TensorId)> {
    let add = graph.node(consumer)?;
    if add.op_type != "Add" || add.inputs.len() != 2 || add.outputs.len() != 1 {
        return None;
    }
    let operand = *add.inputs.iter().find(|&&t| t != mm_out)?;
    Some((operand, add.outputs[0]))
}

/// Check that `tensor` is already available at `anchor`'s position: it is a
/// producer-less tensor (constant or graph-level input) or its producer runs
/// earlier in the order.
fn available_before(graph: &Graph, tensor: TensorId, anchor: NodeId) -> bool {
    match graph.producer(tensor) {
        None => true,
        Some(producer) => match (graph.position(producer), graph.position(anchor)) {
            (Some(p), Some(a)) => p < a,
            _ => false,
        },
    }
}
