//! Graph queries used by pattern matching and verification

use std::collections::VecDeque;

use rustc_hash::{FxHashMap, FxHashSet};

use crate::error::{OnnxResult, TransformError};
use crate::tensor::TensorDesc;

use super::context::Graph;
use super::node::{Node, NodeIndex};

impl Graph {
    // ========================================================================
    // Edge queries
    // ========================================================================

    /// Number of outgoing edges of a node
    ///
    /// One edge per consuming input slot, so `Add(x, x)` contributes two.
    pub fn output_edge_count(&self, index: NodeIndex) -> usize {
        self.get_node(index)
            .map(|node| {
                node.outputs
                    .iter()
                    .filter(|o| !o.is_empty())
                    .map(|o| self.get_consumers(o).len())
                    .sum()
            })
            .unwrap_or(0)
    }

    /// The single downstream consumer, only when there is exactly one edge
    pub fn sole_consumer(&self, index: NodeIndex) -> Option<NodeIndex> {
        if self.output_edge_count(index) != 1 {
            return None;
        }
        let node = self.get_node(index)?;
        node.outputs
            .iter()
            .filter(|o| !o.is_empty())
            .find_map(|o| self.get_consumers(o).first().copied())
    }

    /// Distinct consumer nodes of every output
    pub fn consumers_of(&self, index: NodeIndex) -> Vec<NodeIndex> {
        let mut result = Vec::new();
        if let Some(node) = self.get_node(index) {
            for output in node.outputs.iter().filter(|o| !o.is_empty()) {
                for &consumer in self.get_consumers(output) {
                    if !result.contains(&consumer) {
                        result.push(consumer);
                    }
                }
            }
        }
        result
    }

    /// Check if any output of the node is a graph output
    pub fn produces_graph_output(&self, index: NodeIndex) -> bool {
        self.get_node(index)
            .map(|node| node.outputs.iter().any(|o| self.is_graph_output(o)))
            .unwrap_or(false)
    }

    /// Descriptor of a node's `slot`-th input
    pub fn input_desc(&self, node: &Node, slot: usize) -> Option<&TensorDesc> {
        node.inputs
            .get(slot)
            .filter(|name| !name.is_empty())
            .and_then(|name| self.desc(name))
    }

    /// Descriptor of a node's `slot`-th output
    pub fn output_desc(&self, node: &Node, slot: usize) -> Option<&TensorDesc> {
        node.outputs
            .get(slot)
            .filter(|name| !name.is_empty())
            .and_then(|name| self.desc(name))
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Topological order of the live nodes (Kahn's algorithm)
    ///
    /// Ties are broken by arena position, so the order is deterministic.
    /// Nodes on a cycle are left out; `validate` reports them.
    pub fn topological_order(&self) -> Vec<NodeIndex> {
        let mut in_degree: FxHashMap<NodeIndex, usize> = FxHashMap::default();

        for node in self.nodes() {
            let preds = node
                .edge_inputs()
                .filter(|input| self.producer_map.contains_key(*input))
                .count();
            in_degree.insert(node.index, preds);
        }

        let mut queue: VecDeque<NodeIndex> = self
            .nodes()
            .filter(|n| in_degree.get(&n.index) == Some(&0))
            .map(|n| n.index)
            .collect();
        let mut result = Vec::with_capacity(in_degree.len());

        while let Some(index) = queue.pop_front() {
            result.push(index);

            if let Some(node) = self.get_node(index) {
                for output in node.outputs.iter().filter(|o| !o.is_empty()) {
                    for consumer in self.get_consumers(output) {
                        if let Some(count) = in_degree.get_mut(consumer) {
                            *count = count.saturating_sub(1);
                            if *count == 0 {
                                queue.push_back(*consumer);
                            }
                        }
                    }
                }
            }
        }

        result
    }

    // ========================================================================
    // Verification
    // ========================================================================

    /// Check the structural invariants
    ///
    /// - the graph is acyclic
    /// - every consumed value has exactly one live producer, or is a graph
    ///   input, initializer or outer-scope value
    /// - every graph output is producible
    /// - the incremental maps agree with the arena
    pub fn validate(&self) -> OnnxResult<()> {
        let order = self.topological_order();
        let live = self.node_count();
        if order.len() != live {
            return Err(TransformError::InvalidGraph(format!(
                "graph '{}' has a cycle ({} of {} nodes ordered)",
                self.name,
                order.len(),
                live
            )));
        }

        let mut produced: FxHashSet<&str> = FxHashSet::default();
        for node in self.nodes() {
            for output in node.outputs.iter().filter(|o| !o.is_empty()) {
                if !produced.insert(output.as_str()) {
                    return Err(TransformError::InvalidGraph(format!(
                        "value '{}' has more than one producer",
                        output
                    )));
                }
                if self.producer_map.get(output) != Some(&node.index) {
                    return Err(TransformError::InvalidGraph(format!(
                        "producer map out of date for '{}'",
                        output
                    )));
                }
            }
        }

        for node in self.nodes() {
            for input in node.edge_inputs() {
                if !produced.contains(input) && !self.is_source_value(input) {
                    return Err(TransformError::InvalidGraph(format!(
                        "node '{}' reads '{}', which nothing produces",
                        node.name, input
                    )));
                }
            }
        }

        for (name, consumers) in &self.consumer_map {
            for consumer in consumers {
                let reads = self
                    .get_node(*consumer)
                    .map(|n| n.edge_inputs().any(|i| i == name))
                    .unwrap_or(false);
                if !reads {
                    return Err(TransformError::InvalidGraph(format!(
                        "consumer map references {} for '{}', which does not read it",
                        consumer, name
                    )));
                }
            }
        }

        for output in &self.outputs {
            if !produced.contains(output.as_str()) && !self.is_source_value(output) {
                return Err(TransformError::InvalidGraph(format!(
                    "graph output '{}' is no longer produced",
                    output
                )));
            }
        }

        Ok(())
    }
}
