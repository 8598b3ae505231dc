//! Arena graph
//!
//! `Graph` is the central structure for the fusion pass. Nodes live in an
//! arena addressed by [`NodeIndex`]; producer, consumer and name maps are
//! kept in sync by the mutators so every query is a map lookup.

use crate::tensor::TensorDesc;

use super::maps::{
    live_nodes, ConsumerMap, DescMap, NameMap, NameSet, NodeArena, ProducerMap,
};
use super::node::{Node, NodeIndex};

/// Mutable dataflow graph
#[derive(Debug, Clone, Default)]
pub struct Graph {
    /// Graph name, used in diagnostics
    pub name: String,

    /// Node slots; removal leaves `None`
    pub(crate) nodes: NodeArena,

    /// Maps output tensor name → producer node
    pub producer_map: ProducerMap,

    /// Maps tensor name → consumer nodes (one entry per consuming slot)
    pub consumer_map: ConsumerMap,

    /// Maps node name → handle
    pub name_map: NameMap,

    /// Maps tensor name → descriptor
    pub desc_map: DescMap,

    /// Graph inputs, in declaration order
    pub inputs: NameSet,

    /// Constant initializers
    pub initializers: NameSet,

    /// Graph outputs, in declaration order
    pub outputs: NameSet,

    /// Values this graph reads from an enclosing graph
    pub outer_scope: NameSet,

    /// Counter backing `generate_node_name`
    pub(crate) name_counter: usize,
}

impl Graph {
    /// Create an empty graph
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    // ========================================================================
    // Declarations
    // ========================================================================

    /// Declare a graph input
    pub fn add_input(&mut self, desc: TensorDesc) {
        self.inputs.insert(desc.name.clone());
        self.set_desc(desc);
    }

    /// Declare a constant initializer
    pub fn add_initializer(&mut self, desc: TensorDesc) {
        self.initializers.insert(desc.name.clone());
        self.set_desc(desc);
    }

    /// Declare a value read from the enclosing graph
    pub fn add_outer_scope_value(&mut self, desc: TensorDesc) {
        self.outer_scope.insert(desc.name.clone());
        self.set_desc(desc);
    }

    /// Declare a graph output, recording its descriptor
    pub fn add_output(&mut self, desc: TensorDesc) {
        self.outputs.insert(desc.name.clone());
        self.set_desc(desc);
    }

    /// Add or replace the descriptor of an intermediate value
    pub fn set_desc(&mut self, desc: TensorDesc) {
        self.desc_map.insert(desc.name.clone(), desc);
    }

    // ========================================================================
    // Node accessors
    // ========================================================================

    /// Look up a node; `None` once it has been removed
    pub fn get_node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index.0).and_then(Option::as_ref)
    }

    /// Mutable node lookup
    pub fn get_node_mut(&mut self, index: NodeIndex) -> Option<&mut Node> {
        self.nodes.get_mut(index.0).and_then(Option::as_mut)
    }

    /// Look up a node by name
    pub fn find_node(&self, name: &str) -> Option<&Node> {
        self.name_map.get(name).and_then(|&idx| self.get_node(idx))
    }

    /// Check if a handle resolves to a live node
    pub fn contains(&self, index: NodeIndex) -> bool {
        self.get_node(index).is_some()
    }

    /// Number of live nodes
    pub fn node_count(&self) -> usize {
        live_nodes(&self.nodes).count()
    }

    /// Iterate over live nodes in arena order
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        live_nodes(&self.nodes)
    }

    /// Raw arena, including removed slots
    pub fn arena(&self) -> &NodeArena {
        &self.nodes
    }

    // ========================================================================
    // Value accessors
    // ========================================================================

    /// Descriptor of a tensor
    pub fn desc(&self, name: &str) -> Option<&TensorDesc> {
        self.desc_map.get(name)
    }

    /// Check if a tensor is a graph input
    pub fn is_graph_input(&self, name: &str) -> bool {
        self.inputs.contains(name)
    }

    /// Check if a tensor is a graph output
    pub fn is_graph_output(&self, name: &str) -> bool {
        self.outputs.contains(name)
    }

    /// Check if a tensor is an initializer
    pub fn is_initializer(&self, name: &str) -> bool {
        self.initializers.contains(name)
    }

    /// Check if a tensor is available without a producing node
    pub fn is_source_value(&self, name: &str) -> bool {
        self.is_graph_input(name) || self.is_initializer(name) || self.outer_scope.contains(name)
    }

    /// Get the producer node for a tensor
    pub fn get_producer(&self, tensor_name: &str) -> Option<&Node> {
        self.producer_map
            .get(tensor_name)
            .and_then(|&idx| self.get_node(idx))
    }

    /// Get consumer handles for a tensor
    pub fn get_consumers(&self, tensor_name: &str) -> &[NodeIndex] {
        self.consumer_map
            .get(tensor_name)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
