//! Common utilities for transformers
//!
//! Shared types used by every graph pass.

use crate::error::OnnxResult;
use crate::graph::Graph;

/// Transformation result for statistics
#[derive(Debug, Default, Clone)]
pub struct TransformResult {
    /// Number of plans a pattern produced
    pub patterns_matched: usize,
    /// Number of fusions committed
    pub transforms_applied: usize,
    /// Number of nodes removed
    pub nodes_eliminated: usize,
    /// Whether a nested subgraph changed
    pub subgraphs_modified: bool,
    /// Names of the replacement nodes
    pub transformed_nodes: Vec<String>,
}

impl TransformResult {
    /// Create empty result
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a committed fusion that removed `eliminated` nodes
    pub fn record(&mut self, node_name: &str, eliminated: usize) {
        self.transforms_applied += 1;
        self.nodes_eliminated += eliminated;
        self.transformed_nodes.push(node_name.to_string());
    }

    /// Check if the pass changed the graph
    pub fn modified(&self) -> bool {
        self.transforms_applied > 0 || self.subgraphs_modified
    }

    /// Merge with another result
    pub fn merge(&mut self, other: TransformResult) {
        self.patterns_matched += other.patterns_matched;
        self.transforms_applied += other.transforms_applied;
        self.nodes_eliminated += other.nodes_eliminated;
        self.subgraphs_modified |= other.subgraphs_modified;
        self.transformed_nodes.extend(other.transformed_nodes);
    }
}

/// A pass over a graph
pub trait GraphTransformer {
    /// Name of the transformer
    fn name(&self) -> &'static str;

    /// Apply the pass to `graph`
    ///
    /// `level` is the nesting depth: 0 for the main graph, incremented for
    /// every subgraph the pass recurses into.
    fn apply(&self, graph: &mut Graph, level: usize) -> OnnxResult<TransformResult>;

    /// Check if this transformer is worth running on the graph
    fn is_applicable(&self, _graph: &Graph) -> bool {
        true
    }
}

/// Run multiple transformers in sequence on the main graph
pub fn run_transformers(
    graph: &mut Graph,
    transformers: &[&dyn GraphTransformer],
) -> OnnxResult<TransformResult> {
    let mut total = TransformResult::new();

    for transformer in transformers {
        if transformer.is_applicable(graph) {
            let result = transformer.apply(graph, 0)?;
            total.merge(result);
        }
    }

    Ok(total)
}
