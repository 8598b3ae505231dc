//! Graph mutation operations
//!
//! Every structural change goes through these methods so the producer,
//! consumer and name maps never drift from the arena.

use super::context::Graph;
use super::node::{Node, NodeIndex, NodeSpec};

impl Graph {
    // ========================================================================
    // Node creation and removal
    // ========================================================================

    /// Insert a new node into the graph
    ///
    /// Updates all relevant maps. Values read by nested subgraphs from this
    /// graph become implicit inputs of the node and count as edges.
    pub fn add_node(&mut self, spec: NodeSpec) -> NodeIndex {
        let index = NodeIndex(self.nodes.len());

        let mut implicit_inputs: Vec<String> = Vec::new();
        for subgraph in spec.subgraphs.values() {
            for name in &subgraph.outer_scope {
                if !spec.inputs.contains(name) && !implicit_inputs.contains(name) {
                    implicit_inputs.push(name.clone());
                }
            }
        }

        let node = Node {
            index,
            name: spec.name,
            op_type: spec.op_type,
            domain: spec.domain,
            since_version: spec.since_version,
            inputs: spec.inputs,
            outputs: spec.outputs,
            implicit_inputs,
            execution_provider: spec.execution_provider,
            attributes: spec.attributes,
            doc_string: spec.doc_string,
            subgraphs: spec.subgraphs,
        };

        for output in node.outputs.iter().filter(|o| !o.is_empty()) {
            self.producer_map.insert(output.clone(), index);
        }
        for input in node.edge_inputs() {
            self.consumer_map
                .entry(input.to_string())
                .or_default()
                .push(index);
        }
        self.name_map.insert(node.name.clone(), index);
        self.nodes.push(Some(node));

        index
    }

    /// Remove a node from the graph
    ///
    /// Does not rewire consumers of its outputs; callers that need that use
    /// [`Graph::finalize_fusion`].
    pub(crate) fn remove_node(&mut self, index: NodeIndex) -> Option<Node> {
        let node = self.nodes.get_mut(index.0)?.take()?;

        for output in node.outputs.iter().filter(|o| !o.is_empty()) {
            if self.producer_map.get(output) == Some(&index) {
                self.producer_map.remove(output);
            }
        }

        for input in node.edge_inputs() {
            if let Some(consumers) = self.consumer_map.get_mut(input) {
                consumers.retain(|c| *c != index);
                if consumers.is_empty() {
                    self.consumer_map.remove(input);
                }
            }
        }

        if self.name_map.get(&node.name) == Some(&index) {
            self.name_map.remove(&node.name);
        }

        Some(node)
    }

    /// Assign the execution provider of a node
    pub fn set_execution_provider(&mut self, index: NodeIndex, provider: &str) -> bool {
        match self.get_node_mut(index) {
            Some(node) => {
                node.execution_provider = provider.to_string();
                true
            }
            None => false,
        }
    }

    /// Generate a node name not used by any live node
    pub fn generate_node_name(&mut self, prefix: &str) -> String {
        loop {
            let candidate = format!("{}_token_{}", prefix, self.name_counter);
            self.name_counter += 1;
            if !self.name_map.contains_key(&candidate) {
                return candidate;
            }
        }
    }

    // ========================================================================
    // Fusion
    // ========================================================================

    /// Replace `nodes` by `replacement`
    ///
    /// `nodes` is ordered; the outputs of its last element are the
    /// authoritative results. Those outputs and all their downstream edges
    /// move onto `replacement`, then every node in `nodes` is removed.
    ///
    /// # Panics
    ///
    /// If `nodes` is empty, if any handle is dead, if `replacement` is one
    /// of `nodes`, or if a node other than the last still feeds a consumer
    /// outside the fused group. These indicate a matcher defect, not a
    /// runtime condition.
    pub fn finalize_fusion(&mut self, nodes: &[NodeIndex], replacement: NodeIndex) {
        let (&last, fused) = nodes
            .split_last()
            .expect("finalize_fusion called with no nodes");
        assert!(
            self.contains(replacement),
            "replacement node {} is not live",
            replacement
        );
        assert!(
            !nodes.contains(&replacement),
            "replacement node {} is part of the fused group",
            replacement
        );

        for &index in fused {
            assert!(self.contains(index), "fused node {} is not live", index);
            for consumer in self.consumers_of(index) {
                assert!(
                    nodes.contains(&consumer),
                    "fused node {} still feeds {} outside the fused group",
                    index,
                    consumer
                );
            }
        }

        let outputs = match self.get_node(last) {
            Some(node) => node.outputs.clone(),
            None => panic!("last fused node {} is not live", last),
        };

        // Intermediate values die with the group
        let mut intermediates: Vec<String> = Vec::new();
        for &index in fused {
            if let Some(node) = self.get_node(index) {
                intermediates.extend(node.outputs.iter().filter(|o| !o.is_empty()).cloned());
            }
        }

        for &index in nodes {
            self.remove_node(index);
        }

        for output in outputs.iter().filter(|o| !o.is_empty()) {
            self.producer_map.insert(output.clone(), replacement);
        }
        if let Some(node) = self.get_node_mut(replacement) {
            node.outputs = outputs;
        }

        for name in intermediates {
            let referenced = self.producer_map.contains_key(&name)
                || self.consumer_map.contains_key(&name)
                || self.is_graph_output(&name)
                || self.is_source_value(&name);
            if !referenced {
                self.desc_map.remove(&name);
            }
        }
    }
}
