//! Graph map types and builders
//!
//! Producer and consumer maps are derived from the node arena and kept in
//! sync by the mutators; `rebuild_*` recomputes them from scratch.

use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::tensor::TensorDesc;

use super::node::{Node, NodeIndex};

/// Node arena: removed nodes leave a `None` slot behind
pub type NodeArena = Vec<Option<Node>>;

/// Type alias for producer map: output_name → producing node
pub type ProducerMap = FxHashMap<String, NodeIndex>;

/// Type alias for consumer map: tensor_name → consuming nodes, one entry per
/// consuming input slot
/// SmallVec optimized for common case of 1-4 consumers
pub type ConsumerMap = FxHashMap<String, SmallVec<[NodeIndex; 4]>>;

/// Type alias for descriptor map: tensor_name → descriptor
pub type DescMap = FxHashMap<String, TensorDesc>;

/// Type alias for node name index: node_name → handle
pub type NameMap = FxHashMap<String, NodeIndex>;

/// Ordered set of tensor names (graph inputs, outputs, initializers)
pub type NameSet = IndexSet<String>;

/// Iterate the live nodes of an arena
pub fn live_nodes(arena: &NodeArena) -> impl Iterator<Item = &Node> {
    arena.iter().filter_map(Option::as_ref)
}

/// Build producer map from the live nodes
pub fn rebuild_producer_map(arena: &NodeArena) -> ProducerMap {
    let mut map = FxHashMap::default();

    for node in live_nodes(arena) {
        for output in &node.outputs {
            if !output.is_empty() {
                map.insert(output.clone(), node.index);
            }
        }
    }

    map
}

/// Build consumer map from the live nodes
pub fn rebuild_consumer_map(arena: &NodeArena) -> ConsumerMap {
    let mut map: ConsumerMap = FxHashMap::default();

    for node in live_nodes(arena) {
        for input in node.edge_inputs() {
            map.entry(input.to_string()).or_default().push(node.index);
        }
    }

    map
}

/// Build the node name index
pub fn rebuild_name_map(arena: &NodeArena) -> NameMap {
    live_nodes(arena)
        .map(|n| (n.name.clone(), n.index))
        .collect()
}
