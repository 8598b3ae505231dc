//! MatMul + Add pattern
//!
//! Matches a MatMul (or a two-input FusedMatMul) whose only consumer is an
//! Add, and plans its replacement by a single node carrying the Add's other
//! operand as bias:
//!
//! | Operand ranks | Replacement |
//! |---------------|-------------|
//! | both 2 | `Gemm(A, B, C)` |
//! | otherwise | `com.microsoft.FusedMatMul(A, B, C)` with `beta = 1.0` |
//!
//! A FusedMatMul anchor keeps its own attributes: `alpha`, `transA` and
//! `transB` move onto Gemm unchanged, and an anchor with a batch-transpose
//! flag set never takes the Gemm branch.
//!
//! The bias C must broadcast unidirectionally onto the last two dimensions
//! (M, N) of the MatMul result: (N), (1, N), (M, 1) or (M, N).

use log::trace;
use smallvec::smallvec;

use crate::config::FusionConfig;
use crate::graph::{AttributeValue, Attributes, Graph, Node, NodeIndex, MS_DOMAIN, ONNX_DOMAIN};
use crate::traits::FusionPattern;

use super::legality::{
    broadcast_bias_legal, is_candidate_operator, is_graph_output, is_provider_compatible,
    same_provider, single_consumer, type_compatible,
};
use super::ops::{
    BIAS_SCALE_ATTR, FUSED_MATMUL_OP, FUSED_MATMUL_VERSION, GEMM_COMPATIBLE_ATTRS, GEMM_OP,
    GEMM_VERSION, TRANS_BATCH_ATTRS,
};
use super::plan::{FusionPlan, ReplacementTemplate};

/// Which replacement a match produces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatMulAddBranch {
    /// Rank-2 operands, replaced by Gemm
    Gemm,
    /// Batched operands, replaced by FusedMatMul with bias
    FusedMatMul,
}

/// MatMul followed by Add
#[derive(Debug, Clone, Default)]
pub struct MatMulAddPattern {
    config: FusionConfig,
}

fn skip<T>(anchor: &Node, reason: &str) -> Option<T> {
    trace!("MatMulAdd: skip '{}': {}", anchor.name, reason);
    None
}

/// Anchor attributes restated for Gemm, `None` if Gemm cannot express them
fn gemm_attributes(anchor: &Node) -> Option<Attributes> {
    let mut attributes = Attributes::new();
    for (name, value) in anchor.attributes.iter() {
        if GEMM_COMPATIBLE_ATTRS.contains(&name) {
            attributes.set(name, value.clone());
        } else if TRANS_BATCH_ATTRS.contains(&name) && *value == AttributeValue::Int(0) {
            continue;
        } else if name != BIAS_SCALE_ATTR {
            return None;
        }
    }
    Some(attributes)
}

impl MatMulAddPattern {
    /// Pattern with the given configuration
    pub fn new(config: FusionConfig) -> Self {
        Self { config }
    }

    /// Active configuration
    pub fn config(&self) -> &FusionConfig {
        &self.config
    }

    /// Pick the branch from the anchor's operand shapes
    ///
    /// Both operands need a static shape. An anchor that already carries a
    /// third operand was produced by an earlier fusion and is left alone.
    pub fn select_branch(&self, graph: &Graph, anchor: &Node) -> Option<MatMulAddBranch> {
        let a = graph.input_desc(anchor, 0).and_then(|d| d.shape.as_ref());
        let b = graph.input_desc(anchor, 1).and_then(|d| d.shape.as_ref());
        let (a, b) = match (a, b) {
            (Some(a), Some(b)) => (a, b),
            _ => return skip(anchor, "operand shape unknown"),
        };

        if anchor.inputs.len() > 2 {
            return skip(anchor, "anchor already carries a bias operand");
        }

        if a.rank() == 2 && b.rank() == 2 {
            Some(MatMulAddBranch::Gemm)
        } else {
            Some(MatMulAddBranch::FusedMatMul)
        }
    }

    fn template(
        &self,
        branch: MatMulAddBranch,
        anchor: &Node,
        consumer: &Node,
        inputs: Vec<String>,
    ) -> Option<ReplacementTemplate> {
        let doc_string = format!("fused {} and {}", anchor.op_type, consumer.op_type);
        let template = match branch {
            MatMulAddBranch::Gemm => ReplacementTemplate {
                name_prefix: "gemm".to_string(),
                op_type: GEMM_OP.to_string(),
                domain: ONNX_DOMAIN.to_string(),
                since_version: GEMM_VERSION,
                inputs,
                attributes: gemm_attributes(anchor)?,
                execution_provider: anchor.execution_provider.clone(),
                doc_string,
            },
            MatMulAddBranch::FusedMatMul => {
                let mut attributes = anchor.attributes.clone();
                attributes.set(BIAS_SCALE_ATTR, AttributeValue::Float(1.0));
                ReplacementTemplate {
                    name_prefix: "FusedMatMulBias".to_string(),
                    op_type: FUSED_MATMUL_OP.to_string(),
                    domain: MS_DOMAIN.to_string(),
                    since_version: FUSED_MATMUL_VERSION,
                    inputs,
                    attributes,
                    execution_provider: anchor.execution_provider.clone(),
                    doc_string,
                }
            }
        };
        Some(template)
    }
}

impl FusionPattern for MatMulAddPattern {
    fn name(&self) -> &'static str {
        "MatMulAddFusion"
    }

    fn is_anchor(&self, node: &Node) -> bool {
        is_candidate_operator(node, &self.config.anchor_ops)
            && is_provider_compatible(node, &self.config.providers)
    }

    fn match_anchor(&self, graph: &Graph, index: NodeIndex) -> Option<FusionPlan> {
        let anchor = graph.get_node(index)?;

        if !single_consumer(graph, index) {
            return skip(anchor, "output does not have exactly one consumer");
        }
        if is_graph_output(graph, index) {
            return skip(anchor, "output is a graph output");
        }

        let consumer_index = graph.sole_consumer(index)?;
        let consumer = graph.get_node(consumer_index)?;
        if !is_candidate_operator(consumer, &self.config.consumer_ops) {
            return skip(anchor, "consumer is not a supported Add");
        }
        if !same_provider(anchor, consumer) {
            return skip(anchor, "consumer runs on another execution provider");
        }
        if !type_compatible(graph, anchor, consumer, &self.config.element_types) {
            return skip(anchor, "element types differ or are not supported");
        }

        let branch = self.select_branch(graph, anchor)?;

        let anchor_output = match anchor.outputs.first() {
            Some(name) if !name.is_empty() => name,
            _ => return skip(anchor, "anchor has no output"),
        };
        let bias = match consumer.inputs.as_slice() {
            [lhs, rhs] if lhs == anchor_output => rhs,
            [lhs, rhs] if rhs == anchor_output => lhs,
            _ => return skip(anchor, "consumer is not a binary Add of the anchor output"),
        };
        if bias.is_empty() {
            return skip(anchor, "bias operand missing");
        }
        let bias_shape = match graph.desc(bias).and_then(|d| d.shape.as_ref()) {
            Some(shape) => shape,
            None => return skip(anchor, "bias shape unknown"),
        };

        let output_shape = match graph.output_desc(anchor, 0).and_then(|d| d.shape.as_ref()) {
            Some(shape) => shape,
            None => return skip(anchor, "result shape unknown"),
        };
        if branch == MatMulAddBranch::Gemm && output_shape.rank() != 2 {
            return skip(anchor, "rank-2 operands with a non-matrix result");
        }
        let (m, n) = match output_shape.matrix_dims() {
            Some(dims) => dims,
            None => return skip(anchor, "result has rank below 2"),
        };
        if !broadcast_bias_legal(m, n, bias_shape) {
            return skip(anchor, "bias does not broadcast onto (M, N)");
        }

        let mut inputs = anchor.inputs.clone();
        inputs.push(bias.clone());
        let replacement = match self.template(branch, anchor, consumer, inputs) {
            Some(template) => template,
            None => return skip(anchor, "anchor attributes have no Gemm equivalent"),
        };

        Some(FusionPlan {
            pattern: self.name(),
            participants: smallvec![index, consumer_index],
            replacement,
        })
    }
}
