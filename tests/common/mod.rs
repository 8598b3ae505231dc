//! Shared fixtures for the integration suites
//!
//! Graph builders for MatMul + Add pairs and a small `ndarray` evaluator
//! used to check that a rewritten graph computes what the original did.

#![allow(dead_code)]

use std::collections::HashMap;

use ndarray::{s, Array3, ArrayD, Axis, IxDyn};

use matmul_add_fusion::prelude::*;

pub type Values = HashMap<String, ArrayD<f32>>;

pub fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// numpy-style matmul result shape; both operands have rank >= 2
pub fn matmul_shape(a: &[u64], b: &[u64]) -> Vec<u64> {
    let (a_batch, b_batch) = (&a[..a.len() - 2], &b[..b.len() - 2]);
    let rank = a_batch.len().max(b_batch.len());
    let pick = |batch: &[u64], i: usize| {
        let offset = rank - batch.len();
        if i >= offset {
            batch[i - offset]
        } else {
            1
        }
    };

    let mut out: Vec<u64> = (0..rank)
        .map(|i| pick(a_batch, i).max(pick(b_batch, i)))
        .collect();
    out.push(a[a.len() - 2]);
    out.push(b[b.len() - 1]);
    out
}

/// Builder for `A -> MatMul(A, B) -> Add(mm_out, C) -> Y`
///
/// A is a graph input, B and C are initializers. Options add the
/// conditions the matcher must refuse.
#[derive(Debug, Clone)]
pub struct MatMulAddCase {
    pub a: Vec<u64>,
    pub b: Vec<u64>,
    pub bias: Vec<u64>,
    pub elem_type: ElementType,
    pub intermediate_type: Option<ElementType>,
    pub bias_first: bool,
    pub anchor_provider: String,
    pub consumer_provider: String,
    pub extra_consumer: bool,
    pub intermediate_is_output: bool,
    pub a_shape: Option<TensorShape>,
    pub out_shape: Option<TensorShape>,
    pub unshaped: Vec<String>,
}

impl MatMulAddCase {
    pub fn new(a: &[u64], b: &[u64], bias: &[u64]) -> Self {
        Self {
            a: a.to_vec(),
            b: b.to_vec(),
            bias: bias.to_vec(),
            elem_type: ElementType::Float,
            intermediate_type: None,
            bias_first: false,
            anchor_provider: String::new(),
            consumer_provider: String::new(),
            extra_consumer: false,
            intermediate_is_output: false,
            a_shape: None,
            out_shape: None,
            unshaped: Vec::new(),
        }
    }

    pub fn elem_type(mut self, elem_type: ElementType) -> Self {
        self.elem_type = elem_type;
        self
    }

    pub fn intermediate_type(mut self, elem_type: ElementType) -> Self {
        self.intermediate_type = Some(elem_type);
        self
    }

    pub fn bias_first(mut self) -> Self {
        self.bias_first = true;
        self
    }

    pub fn providers(mut self, anchor: &str, consumer: &str) -> Self {
        self.anchor_provider = anchor.to_string();
        self.consumer_provider = consumer.to_string();
        self
    }

    pub fn extra_consumer(mut self) -> Self {
        self.extra_consumer = true;
        self
    }

    pub fn intermediate_is_output(mut self) -> Self {
        self.intermediate_is_output = true;
        self
    }

    /// Override the declared shape of A (e.g. with symbolic dims)
    pub fn a_shape(mut self, shape: TensorShape) -> Self {
        self.a_shape = Some(shape);
        self
    }

    /// Override the declared shape of the MatMul result
    pub fn out_shape(mut self, shape: TensorShape) -> Self {
        self.out_shape = Some(shape);
        self
    }

    /// Declare operand `name` ("A" or "B") without any shape
    pub fn unshaped(mut self, name: &str) -> Self {
        self.unshaped.push(name.to_string());
        self
    }

    fn operand_desc(&self, name: &str, dims: &[u64]) -> TensorDesc {
        if self.unshaped.iter().any(|u| u == name) {
            TensorDesc::unshaped(name, self.elem_type)
        } else {
            TensorDesc::new(name, self.elem_type, dims)
        }
    }

    pub fn result_dims(&self) -> Vec<u64> {
        matmul_shape(&self.a, &self.b)
    }

    pub fn build(&self) -> Graph {
        let ty = self.elem_type;
        let out = self.result_dims();
        let out_shape = self
            .out_shape
            .clone()
            .unwrap_or_else(|| TensorShape::from_dims(&out));

        let mut graph = Graph::new("matmul_add");
        match &self.a_shape {
            Some(shape) => graph.add_input(TensorDesc::with_shape("A", ty, shape.clone())),
            None => graph.add_input(self.operand_desc("A", &self.a)),
        }
        graph.add_initializer(self.operand_desc("B", &self.b));
        graph.add_initializer(TensorDesc::new("C", ty, &self.bias));

        let mm_type = self.intermediate_type.unwrap_or(ty);
        let mm_desc = TensorDesc::with_shape("mm_out", mm_type, out_shape.clone());
        if self.intermediate_is_output {
            graph.add_output(mm_desc);
        } else {
            graph.set_desc(mm_desc);
        }
        graph.add_output(TensorDesc::with_shape("Y", ty, out_shape.clone()));

        graph.add_node(
            make_node("MatMul", &["A", "B"], &["mm_out"], "matmul_0")
                .version(13)
                .provider(&self.anchor_provider),
        );
        let add_inputs: [&str; 2] = if self.bias_first {
            ["C", "mm_out"]
        } else {
            ["mm_out", "C"]
        };
        graph.add_node(
            make_node("Add", &add_inputs, &["Y"], "add_0")
                .version(14)
                .provider(&self.consumer_provider),
        );

        if self.extra_consumer {
            graph.add_output(TensorDesc::with_shape("Z", mm_type, out_shape));
            graph.add_node(
                make_node("Relu", &["mm_out"], &["Z"], "relu_0")
                    .version(14)
                    .provider(&self.anchor_provider),
            );
        }

        graph
    }
}

/// Node names, op types and inputs, for comparing graphs before and after
pub fn snapshot(graph: &Graph) -> Vec<(String, String, Vec<String>, Vec<String>)> {
    graph
        .nodes()
        .map(|n| {
            (
                n.name.clone(),
                n.op_type.clone(),
                n.inputs.clone(),
                n.outputs.clone(),
            )
        })
        .collect()
}

// ============================================================================
// Reference evaluator
// ============================================================================

/// Deterministic values in [-1, 1) for every graph input and initializer
pub fn make_feeds(graph: &Graph, seed: u64) -> Values {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    let mut next = move || {
        state = state
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((state >> 40) as f32 / (1u64 << 24) as f32) * 2.0 - 1.0
    };

    let mut feeds = Values::new();
    for name in graph.inputs.iter().chain(graph.initializers.iter()) {
        let shape = graph
            .desc(name)
            .and_then(|d| d.shape.as_ref())
            .and_then(|s| s.concrete())
            .unwrap_or_else(|| panic!("feed '{}' needs a concrete shape", name));
        let len: usize = shape.iter().product();
        let data: Vec<f32> = (0..len).map(|_| next()).collect();
        let array = ArrayD::from_shape_vec(IxDyn(&shape), data).expect("feed shape");
        feeds.insert(name.clone(), array);
    }
    feeds
}

fn matmul(a: &ArrayD<f32>, b: &ArrayD<f32>) -> ArrayD<f32> {
    let a_dims: Vec<u64> = a.shape().iter().map(|&d| d as u64).collect();
    let b_dims: Vec<u64> = b.shape().iter().map(|&d| d as u64).collect();
    let out_dims: Vec<usize> = matmul_shape(&a_dims, &b_dims)
        .into_iter()
        .map(|d| d as usize)
        .collect();

    let rank = out_dims.len();
    let batch = &out_dims[..rank - 2];
    let (m, n) = (out_dims[rank - 2], out_dims[rank - 1]);
    let k = a.shape()[a.ndim() - 1];
    let batch_size: usize = batch.iter().product();

    let stack = |x: &ArrayD<f32>, rows: usize, cols: usize| -> Array3<f32> {
        let mut shape = batch.to_vec();
        shape.extend([rows, cols]);
        let view = x.broadcast(IxDyn(&shape)).expect("matmul batch broadcast");
        Array3::from_shape_vec((batch_size, rows, cols), view.iter().cloned().collect())
            .expect("matmul stack")
    };
    let a3 = stack(a, m, k);
    let b3 = stack(b, k, n);

    let mut out = Array3::<f32>::zeros((batch_size, m, n));
    for i in 0..batch_size {
        let product = a3.index_axis(Axis(0), i).dot(&b3.index_axis(Axis(0), i));
        out.slice_mut(s![i, .., ..]).assign(&product);
    }
    out.into_shape(IxDyn(&out_dims)).expect("matmul result shape")
}

/// Swap the last two axes when the node's `flag` attribute is set
fn maybe_transposed(node: &Node, flag: &str, x: &ArrayD<f32>) -> ArrayD<f32> {
    let mut view = x.view();
    if node.attributes.get_int(flag).unwrap_or(0) != 0 {
        let rank = view.ndim();
        view.swap_axes(rank - 2, rank - 1);
    }
    view.to_owned()
}

/// `alpha * op(A) . op(B)`, shared by Gemm and FusedMatMul
fn scaled_product(node: &Node, inputs: &[&ArrayD<f32>]) -> ArrayD<f32> {
    let alpha = node.attributes.get_float("alpha").unwrap_or(1.0);
    let a = maybe_transposed(node, "transA", inputs[0]);
    let b = maybe_transposed(node, "transB", inputs[1]);
    matmul(&a, &b).mapv(|v| v * alpha)
}

fn eval_node(node: &Node, inputs: &[&ArrayD<f32>]) -> ArrayD<f32> {
    match node.op_type.as_str() {
        "MatMul" => matmul(inputs[0], inputs[1]),
        "Add" => inputs[0] + inputs[1],
        "Relu" => inputs[0].mapv(|v| v.max(0.0)),
        "Gemm" => {
            assert_eq!(inputs[0].ndim(), 2, "Gemm takes matrices");
            assert_eq!(inputs[1].ndim(), 2, "Gemm takes matrices");
            let beta = node.attributes.get_float("beta").unwrap_or(1.0);
            &scaled_product(node, inputs) + &inputs[2].mapv(|v| v * beta)
        }
        "FusedMatMul" => {
            for flag in ["transBatchA", "transBatchB"] {
                assert_eq!(node.attributes.get_int(flag).unwrap_or(0), 0, "{} unsupported", flag);
            }
            let beta = node.attributes.get_float("beta").unwrap_or(1.0);
            let product = scaled_product(node, inputs);
            match inputs.get(2) {
                Some(bias) => &product + &bias.mapv(|v| v * beta),
                None => product,
            }
        }
        other => panic!("reference evaluator has no kernel for {}", other),
    }
}

/// Evaluate every graph output
pub fn evaluate(graph: &Graph, feeds: &Values) -> Values {
    let mut values = feeds.clone();
    for index in graph.topological_order() {
        let node = graph.get_node(index).expect("live node");
        let result = {
            let inputs: Vec<&ArrayD<f32>> = node
                .inputs
                .iter()
                .map(|i| {
                    values
                        .get(i)
                        .unwrap_or_else(|| panic!("'{}' not computed", i))
                })
                .collect();
            eval_node(node, &inputs)
        };
        values.insert(node.outputs[0].clone(), result);
    }

    graph
        .outputs
        .iter()
        .map(|o| (o.clone(), values[o].clone()))
        .collect()
}

pub fn assert_close(expected: &Values, actual: &Values) {
    assert_eq!(expected.len(), actual.len());
    for (name, want) in expected {
        let got = &actual[name];
        assert_eq!(want.shape(), got.shape(), "shape of '{}'", name);
        for (w, g) in want.iter().zip(got.iter()) {
            assert!((w - g).abs() <= 1e-4, "'{}': expected {}, got {}", name, w, g);
        }
    }
}
