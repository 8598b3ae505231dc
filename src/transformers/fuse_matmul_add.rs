//! MatMul + Add fusion pass
//!
//! Replaces every legal MatMul → Add pair with a single Gemm (rank-2
//! operands) or `com.microsoft.FusedMatMul` carrying the bias as a third
//! input. Nested subgraphs are processed before their owning node.

use log::debug;

use crate::config::FusionConfig;
use crate::error::OnnxResult;
use crate::graph::{Graph, Node};
use crate::pattern::MatMulAddPattern;
use crate::transform::{recurse_subgraphs, walk_topological};

use super::common::{GraphTransformer, TransformResult};

/// Fuse MatMul followed by Add
#[derive(Debug, Default)]
pub struct MatMulAddFusion {
    pattern: MatMulAddPattern,
}

impl MatMulAddFusion {
    /// Pass with the default configuration (every provider)
    pub fn new() -> Self {
        Self::default()
    }

    /// Pass with a custom configuration
    pub fn with_config(config: FusionConfig) -> Self {
        Self {
            pattern: MatMulAddPattern::new(config),
        }
    }

    /// Pattern driven by this pass
    pub fn pattern(&self) -> &MatMulAddPattern {
        &self.pattern
    }
}

impl GraphTransformer for MatMulAddFusion {
    fn name(&self) -> &'static str {
        "MatMulAddFusion"
    }

    fn apply(&self, graph: &mut Graph, level: usize) -> OnnxResult<TransformResult> {
        let order = graph.topological_order();
        let mut nested = TransformResult::new();

        let stats = walk_topological(graph, &order, &self.pattern, |node: &mut Node| {
            recurse_subgraphs(node, |subgraph| {
                let inner = self.apply(subgraph, level + 1)?;
                let modified = inner.modified();
                nested.merge(inner);
                Ok(modified)
            })
        })?;

        if stats.fusions > 0 {
            debug!(
                "{}: {} fusion(s) in graph '{}' (level {})",
                self.name(),
                stats.fusions,
                graph.name,
                level
            );
        }

        let mut result = TransformResult {
            patterns_matched: stats.fusions + stats.stale_plans,
            transforms_applied: stats.fusions,
            nodes_eliminated: stats.eliminated,
            subgraphs_modified: stats.subgraphs_modified,
            transformed_nodes: stats.fused_nodes,
        };
        result.merge(nested);
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ProviderFilter, CPU_PROVIDER, CUDA_PROVIDER};
    use crate::graph::make_node;
    use crate::tensor::{ElementType, TensorDesc};

    const F32: ElementType = ElementType::Float;

    fn add_matmul_add(graph: &mut Graph, a: &str, suffix: &str, provider: &str) {
        let b = format!("B{}", suffix);
        let c = format!("C{}", suffix);
        let mm = format!("mm{}", suffix);
        let y = format!("Y{}", suffix);
        graph.add_initializer(TensorDesc::new(&b, F32, &[3, 4]));
        graph.add_initializer(TensorDesc::new(&c, F32, &[4]));
        graph.set_desc(TensorDesc::new(&mm, F32, &[2, 4]));
        graph.add_output(TensorDesc::new(&y, F32, &[2, 4]));
        graph.add_node(
            make_node("MatMul", &[a, &b], &[&mm], &format!("matmul{}", suffix))
                .version(13)
                .provider(provider),
        );
        graph.add_node(
            make_node("Add", &[&mm, &c], &[&y], &format!("add{}", suffix))
                .version(14)
                .provider(provider),
        );
    }

    #[test]
    fn test_fuses_main_graph() {
        let mut graph = Graph::new("main");
        graph.add_input(TensorDesc::new("A", F32, &[2, 3]));
        add_matmul_add(&mut graph, "A", "_0", CPU_PROVIDER);

        let result = MatMulAddFusion::new().apply(&mut graph, 0).unwrap();

        assert!(result.modified());
        assert_eq!(result.transforms_applied, 1);
        assert_eq!(result.nodes_eliminated, 2);
        assert_eq!(graph.node_count(), 1);
        let gemm = graph.nodes().next().unwrap();
        assert_eq!(gemm.op_type, "Gemm");
        assert_eq!(gemm.outputs, vec!["Y_0"]);
    }

    #[test]
    fn test_provider_filter_limits_pass() {
        let mut graph = Graph::new("main");
        graph.add_input(TensorDesc::new("A", F32, &[2, 3]));
        add_matmul_add(&mut graph, "A", "_cpu", CPU_PROVIDER);
        add_matmul_add(&mut graph, "A", "_cuda", CUDA_PROVIDER);

        let config = FusionConfig::default().with_providers(ProviderFilter::only(&[CPU_PROVIDER]));
        let result = MatMulAddFusion::with_config(config).apply(&mut graph, 0).unwrap();

        assert_eq!(result.transforms_applied, 1);
        assert!(graph.find_node("matmul_cuda").is_some());
        assert!(graph.find_node("add_cuda").is_some());
        assert!(graph.find_node("matmul_cpu").is_none());
    }

    #[test]
    fn test_recurses_into_subgraph() {
        let mut body = Graph::new("then_body");
        body.add_outer_scope_value(TensorDesc::new("A", F32, &[2, 3]));
        add_matmul_add(&mut body, "A", "_inner", "");

        let mut graph = Graph::new("main");
        graph.add_input(TensorDesc::new("A", F32, &[2, 3]));
        graph.add_input(TensorDesc::new("cond", ElementType::Bool, &[]));
        graph.add_output(TensorDesc::new("out", F32, &[2, 4]));
        graph.add_node(
            make_node("If", &["cond"], &["out"], "if_0").subgraph("then_branch", body),
        );

        let result = MatMulAddFusion::new().apply(&mut graph, 0).unwrap();

        assert!(result.modified());
        assert!(result.subgraphs_modified);
        assert_eq!(result.transforms_applied, 1);
        let if_node = graph.find_node("if_0").unwrap();
        assert_eq!(if_node.implicit_inputs, vec!["A"]);
        let body = &if_node.subgraphs["then_branch"];
        assert_eq!(body.node_count(), 1);
        assert!(body.nodes().all(|n| n.op_type == "Gemm"));
        assert!(body.validate().is_ok());
    }

    #[test]
    fn test_second_run_changes_nothing() {
        let mut graph = Graph::new("main");
        graph.add_input(TensorDesc::new("A", F32, &[2, 3]));
        add_matmul_add(&mut graph, "A", "_0", "");

        let pass = MatMulAddFusion::new();
        assert!(pass.apply(&mut graph, 0).unwrap().modified());
        assert!(!pass.apply(&mut graph, 0).unwrap().modified());
    }
}
