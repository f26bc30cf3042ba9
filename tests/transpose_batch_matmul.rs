//! End-to-end test for the transpose + batch matmul fusion
//!
//! Mirrors the reference scenario: `Input → (Transpose, Transpose) →
//! FusedMatMul → Add` with permutations `0,2,1,3` / `0,2,3,1` and
//! `alpha = 0.125` collapses to two nodes carrying the fused attributes.

use ndarray::arr0;
use neural_engine_optimizer::prelude::*;

fn build_reference_graph() -> Graph {
    let mut graph = Graph::new();

    let out0 = graph.add_tensor(Tensor::new(""));
    let out1 = graph.add_tensor(Tensor::new(""));
    let out2 = graph.add_tensor(Tensor::new(""));
    graph.add_node(
        Node::new("input_data", "Input")
            .output(out0)
            .output(out1)
            .output(out2),
    );

    let src0 = graph.add_tensor(Tensor::constant(arr0(1.0).into_dyn()));
    let transpose_1_out = graph.add_tensor(Tensor::new("transpose_1:0"));
    graph.add_node(
        Node::new("transpose_1", "Transpose")
            .input(src0)
            .output(transpose_1_out)
            .attr("dst_perm", "0,2,1,3"),
    );

    let src1 = graph.add_tensor(Tensor::constant(arr0(1.0).into_dyn()));
    let transpose_2_out = graph.add_tensor(Tensor::new("transpose_2:0"));
    graph.add_node(
        Node::new("transpose_2", "Transpose")
            .input(src1)
            .output(transpose_2_out)
            .attr("dst_perm", "0,2,3,1"),
    );

    let matmul_out = graph.add_tensor(Tensor::new("fused_matmul:0"));
    graph.add_node(
        Node::new("fused_matmul", "FusedMatMul")
            .input(transpose_1_out)
            .input(transpose_2_out)
            .output(matmul_out)
            .attr("transpose_a", false)
            .attr("transpose_b", false)
            .attr("alpha", 0.125),
    );

    let bias = graph.add_tensor(Tensor::constant(arr0(1.0).into_dyn()));
    let add_out = graph.add_tensor(Tensor::new("add:0"));
    graph.add_node(
        Node::new("add", "Add")
            .input(matmul_out)
            .input(bias)
            .output(add_out),
    );

    graph
}

#[test]
fn fuses_reference_pattern_to_two_nodes() {
    let mut graph = build_reference_graph();
    graph.validate().unwrap();

    let result = TransposeBatchMatMul::new().transform(&mut graph).unwrap();

    assert_eq!(result.patterns_matched, 1);
    assert_eq!(graph.node_count(), 2);

    let fused = graph.node_at(1).unwrap();
    assert_eq!(fused.attr_str("src0_perm"), Some("0,2,1,3"));
    assert_eq!(fused.attr_str("src1_perm"), Some("0,2,3,1"));
    assert_eq!(fused.attr_float("output_scale"), Some(0.125));
    assert_eq!(fused.attr_str("append_op"), Some("binary_add"));

    // Downstream edge preserved: the fused node owns the Add's output tensor
    let add_out = graph.find_tensor("add:0").unwrap();
    assert_eq!(graph.producer(add_out), graph.find_node("fused_matmul"));

    graph.validate().unwrap();
}

#[test]
fn pass_is_idempotent() {
    let mut graph = build_reference_graph();
    let pass = TransposeBatchMatMul::new();

    pass.transform(&mut graph).unwrap();
    let first: Vec<_> = graph.nodes().map(|n| n.name.clone()).collect();

    let again = pass.transform(&mut graph).unwrap();
    assert_eq!(again.patterns_matched, 0);
    let second: Vec<_> = graph.nodes().map(|n| n.name.clone()).collect();
    assert_eq!(first, second);
}

#[test]
fn shared_transpose_survives() {
    let mut graph = build_reference_graph();

    // Give transpose_2's output a second, unrelated consumer
    let transpose_2_out = graph.find_tensor("transpose_2:0").unwrap();
    let reshape_out = graph.add_tensor(Tensor::new("reshape:0"));
    graph.add_node(
        Node::new("reshape", "Reshape")
            .input(transpose_2_out)
            .output(reshape_out),
    );

    let before = graph.node_count();
    let result = TransposeBatchMatMul::new().transform(&mut graph).unwrap();

    assert_eq!(result.patterns_matched, 0);
    assert_eq!(graph.node_count(), before);

    let transpose_2 = graph.get_node("transpose_2").unwrap();
    assert_eq!(transpose_2.op_type, "Transpose");
    assert_eq!(transpose_2.attr_str("dst_perm"), Some("0,2,3,1"));
}

#[test]
fn runs_through_pipeline() {
    let mut graph = build_reference_graph();
    let pass = TransposeBatchMatMul::new();

    let result = run_transformers(&mut graph, &[&pass]).unwrap();
    assert_eq!(result.transforms_applied, 1);
    assert_eq!(result.nodes_eliminated, 3);
    assert_eq!(result.transformed_nodes, vec!["fused_matmul"]);
}
