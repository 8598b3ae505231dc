//! Topological driver
//!
//! Walks a node order captured before any mutation, recursing into nested
//! subgraphs first and handing each live node to a fusion pattern. Nodes
//! consumed by an earlier rewrite in the same walk resolve to `None` and
//! are skipped.
//!
//! [`transform_until_fixed_point`] repeats whole passes until one sweep
//! leaves the graph unchanged.

use log::{trace, warn};

use crate::error::{OnnxResult, TransformError};
use crate::graph::{Graph, Node, NodeIndex};
use crate::traits::FusionPattern;
use crate::transformers::{run_transformers, GraphTransformer, TransformResult};

use super::fuse::apply_fusion;

/// Transform configuration
#[derive(Debug, Clone)]
pub struct TransformConfig {
    /// Maximum sweeps of the fixpoint loop
    pub max_iterations: usize,
    /// Run `Graph::validate` after every sweep that changed the graph
    pub validate_after: bool,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            validate_after: cfg!(debug_assertions),
        }
    }
}

/// Statistics from one topological walk
#[derive(Debug, Default, Clone)]
pub struct WalkStats {
    /// Live nodes visited
    pub visited: usize,
    /// Snapshot entries skipped because an earlier rewrite removed them
    pub skipped_removed: usize,
    /// Fusions committed in this graph
    pub fusions: usize,
    /// Nodes removed by those fusions
    pub eliminated: usize,
    /// Plans the rewrite engine refused
    pub stale_plans: usize,
    /// Whether any nested subgraph was modified
    pub subgraphs_modified: bool,
    /// Names of the replacement nodes
    pub fused_nodes: Vec<String>,
}

impl WalkStats {
    /// Check if the walk changed the graph or any of its subgraphs
    pub fn modified(&self) -> bool {
        self.fusions > 0 || self.subgraphs_modified
    }
}

/// Run `pass` over every subgraph of `node`
///
/// Failures are wrapped with the owning node and attribute, and abort the
/// remaining subgraphs.
pub fn recurse_subgraphs<F>(node: &mut Node, mut pass: F) -> OnnxResult<bool>
where
    F: FnMut(&mut Graph) -> OnnxResult<bool>,
{
    let mut modified = false;
    for (attribute, subgraph) in node.subgraphs.iter_mut() {
        modified |= pass(subgraph).map_err(|e| TransformError::Subgraph {
            node: node.name.clone(),
            attribute: attribute.clone(),
            source: Box::new(e),
        })?;
    }
    Ok(modified)
}

/// Walk `order` over `graph`, fusing wherever `pattern` matches
///
/// `order` is a snapshot: it is not re-read as the graph changes. For each
/// entry that still resolves, `recurse` runs on the node's subgraphs (if
/// any) before the node itself is matched, so inner fusions are complete
/// when the outer pattern looks at the node.
///
/// # Returns
/// * `Ok(WalkStats)` once the whole snapshot has been visited
/// * `Err` as soon as `recurse` fails; rewrites already committed stay
///   committed, and no rewrite is left half-applied
pub fn walk_topological<P, R>(
    graph: &mut Graph,
    order: &[NodeIndex],
    pattern: &P,
    mut recurse: R,
) -> OnnxResult<WalkStats>
where
    P: FusionPattern + ?Sized,
    R: FnMut(&mut Node) -> OnnxResult<bool>,
{
    let mut stats = WalkStats::default();

    for &index in order {
        let node = match graph.get_node_mut(index) {
            Some(node) => node,
            None => {
                trace!("{}: {} already removed", pattern.name(), index);
                stats.skipped_removed += 1;
                continue;
            }
        };
        stats.visited += 1;

        if node.has_subgraphs() && recurse(node)? {
            stats.subgraphs_modified = true;
        }

        let is_anchor = graph
            .get_node(index)
            .map(|n| pattern.is_anchor(n))
            .unwrap_or(false);
        if !is_anchor {
            continue;
        }

        let plan = match pattern.match_anchor(graph, index) {
            Some(plan) => plan,
            None => continue,
        };

        match apply_fusion(graph, &plan) {
            Ok(result) => {
                stats.fusions += 1;
                stats.eliminated += result.eliminated_nodes.len();
                stats.fused_nodes.push(result.fused_node_name);
            }
            Err(TransformError::StalePlan { reason, .. }) => {
                warn!("{}: plan at {} not applied: {}", pattern.name(), index, reason);
                stats.stale_plans += 1;
            }
            Err(e) => return Err(e),
        }
    }

    Ok(stats)
}

/// Statistics from a fixpoint run
#[derive(Debug, Default, Clone)]
pub struct TransformStats {
    /// Sweeps executed, including the final unchanged one
    pub iterations: usize,
    /// Fusions committed across all sweeps and subgraphs
    pub fusions_applied: usize,
    /// Nodes removed across all sweeps and subgraphs
    pub nodes_eliminated: usize,
    /// Whether the loop stopped at `max_iterations` with the graph still changing
    pub hit_cap: bool,
    /// Names of every replacement node
    pub fused_nodes: Vec<String>,
}

impl TransformStats {
    fn absorb(&mut self, result: TransformResult) {
        self.fusions_applied += result.transforms_applied;
        self.nodes_eliminated += result.nodes_eliminated;
        self.fused_nodes.extend(result.transformed_nodes);
    }
}

/// Run every pass once, in order
pub fn transform_once(
    graph: &mut Graph,
    passes: &[&dyn GraphTransformer],
    config: &TransformConfig,
) -> OnnxResult<TransformResult> {
    let result = run_transformers(graph, passes)?;
    if config.validate_after && result.modified() {
        graph.validate()?;
    }
    Ok(result)
}

/// Repeat `passes` until a sweep modifies nothing
///
/// Stops after `config.max_iterations` sweeps even if the graph is still
/// changing; `hit_cap` is set and a warning is logged in that case.
pub fn transform_until_fixed_point(
    graph: &mut Graph,
    passes: &[&dyn GraphTransformer],
    config: &TransformConfig,
) -> OnnxResult<TransformStats> {
    let mut stats = TransformStats::default();

    while stats.iterations < config.max_iterations {
        let result = transform_once(graph, passes, config)?;
        stats.iterations += 1;

        let modified = result.modified();
        stats.absorb(result);
        if !modified {
            return Ok(stats);
        }
    }

    stats.hit_cap = true;
    warn!(
        "graph '{}' still changing after {} iteration(s); stopping",
        graph.name, config.max_iterations
    );
    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::make_node;
    use crate::pattern::MatMulAddPattern;
    use crate::tensor::{ElementType, TensorDesc};

    const F32: ElementType = ElementType::Float;

    /// X -> MatMul -> Add -> MatMul -> Add -> Y
    fn make_chain() -> Graph {
        let mut graph = Graph::new("chain");
        graph.add_input(TensorDesc::new("X", F32, &[2, 4]));
        for i in 0..2 {
            graph.add_initializer(TensorDesc::new(&format!("W{}", i), F32, &[4, 4]));
            graph.add_initializer(TensorDesc::new(&format!("C{}", i), F32, &[4]));
            graph.set_desc(TensorDesc::new(&format!("mm{}", i), F32, &[2, 4]));
            graph.set_desc(TensorDesc::new(&format!("h{}", i), F32, &[2, 4]));
        }
        graph.add_output(TensorDesc::new("h1", F32, &[2, 4]));
        graph.add_node(make_node("MatMul", &["X", "W0"], &["mm0"], "mm_0").version(13));
        graph.add_node(make_node("Add", &["mm0", "C0"], &["h0"], "add_0").version(14));
        graph.add_node(make_node("MatMul", &["h0", "W1"], &["mm1"], "mm_1").version(13));
        graph.add_node(make_node("Add", &["mm1", "C1"], &["h1"], "add_1").version(14));
        graph
    }

    fn no_recursion(_: &mut Node) -> OnnxResult<bool> {
        Ok(false)
    }

    #[test]
    fn test_walk_fuses_chain_and_skips_removed() {
        let mut graph = make_chain();
        let order = graph.topological_order();
        let pattern = MatMulAddPattern::default();

        let stats = walk_topological(&mut graph, &order, &pattern, no_recursion).unwrap();

        assert_eq!(stats.fusions, 2);
        assert_eq!(stats.eliminated, 4);
        assert!(stats.modified());
        // Both Adds were consumed before the walk reached them
        assert_eq!(stats.skipped_removed, 2);
        assert_eq!(graph.node_count(), 2);
        assert!(graph.nodes().all(|n| n.op_type == "Gemm"));
        assert!(graph.validate().is_ok());
    }

    #[test]
    fn test_walk_on_stale_snapshot_with_dead_handles() {
        let mut graph = make_chain();
        let mut order = graph.topological_order();
        order.push(NodeIndex(1000));

        let stats =
            walk_topological(&mut graph, &order, &MatMulAddPattern::default(), no_recursion)
                .unwrap();
        assert_eq!(stats.fusions, 2);
        assert_eq!(stats.skipped_removed, 3);
    }

    #[test]
    fn test_recursion_error_aborts_walk() {
        let mut graph = make_chain();
        let mut body = Graph::new("body");
        body.add_input(TensorDesc::new("i", F32, &[1]));
        graph.add_node(
            make_node("If", &["X"], &["branch_out"], "if_0").subgraph("then_branch", body),
        );
        let order = graph.topological_order();

        let result = walk_topological(
            &mut graph,
            &order,
            &MatMulAddPattern::default(),
            |node: &mut Node| {
                recurse_subgraphs(node, |_| {
                    Err(TransformError::Internal("inner pass failed".to_string()))
                })
            },
        );

        let err = result.unwrap_err();
        assert!(matches!(err, TransformError::Subgraph { .. }));
        assert!(err.to_string().contains("if_0"));
        assert!(err.to_string().contains("then_branch"));
    }

    #[test]
    fn test_recurse_subgraphs_reports_modification() {
        let mut graph = Graph::new("outer");
        let index = graph.add_node(
            make_node("Loop", &[], &["out"], "loop_0")
                .subgraph("body", Graph::new("a"))
                .subgraph("else", Graph::new("b")),
        );
        let node = graph.get_node_mut(index).unwrap();

        let mut seen = Vec::new();
        let modified = recurse_subgraphs(node, |g| {
            seen.push(g.name.clone());
            Ok(g.name == "b")
        })
        .unwrap();

        assert!(modified);
        assert_eq!(seen, vec!["a", "b"]);
    }

    #[test]
    fn test_fixed_point_on_chain() {
        let mut graph = make_chain();
        let pass = crate::transformers::MatMulAddFusion::new();
        let config = TransformConfig {
            validate_after: true,
            ..Default::default()
        };

        let stats = transform_until_fixed_point(&mut graph, &[&pass], &config).unwrap();

        assert_eq!(stats.fusions_applied, 2);
        assert_eq!(stats.nodes_eliminated, 4);
        // One sweep fuses, the next confirms nothing is left
        assert_eq!(stats.iterations, 2);
        assert!(!stats.hit_cap);
    }

    struct AlwaysModifies;

    impl GraphTransformer for AlwaysModifies {
        fn name(&self) -> &'static str {
            "AlwaysModifies"
        }

        fn apply(&self, _graph: &mut Graph, _level: usize) -> OnnxResult<TransformResult> {
            let mut result = TransformResult::new();
            result.record("noop", 0);
            Ok(result)
        }
    }

    #[test]
    fn test_fixed_point_stops_at_cap() {
        let mut graph = Graph::new("spin");
        let config = TransformConfig {
            max_iterations: 3,
            validate_after: false,
        };

        let stats = transform_until_fixed_point(&mut graph, &[&AlwaysModifies], &config).unwrap();

        assert!(stats.hit_cap);
        assert_eq!(stats.iterations, 3);
        assert_eq!(stats.fusions_applied, 3);
    }
}
