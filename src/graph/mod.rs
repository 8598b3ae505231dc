//! Graph model for the fusion pass
//!
//! This module provides the in-memory dataflow graph the pass rewrites:
//!
//! - [`Graph`]: node arena with O(1) producer/consumer lookups
//! - [`Node`], [`NodeIndex`]: operator nodes and their stable handles
//! - [`maps`]: type definitions and builders for the derived maps
//!
//! # Overview
//!
//! Nodes are addressed by [`NodeIndex`]. Removing a node leaves its slot
//! empty, so a handle taken from an earlier topological snapshot simply
//! resolves to `None` once a rewrite has consumed it.
//!
//! # Example
//!
//! ```ignore
//! use matmul_add_fusion::graph::{make_node, Graph};
//!
//! let mut graph = Graph::new("main");
//! let mm = graph.add_node(make_node("MatMul", &["A", "B"], &["mm_out"], "matmul_0"));
//! let add = graph.add_node(make_node("Add", &["mm_out", "bias"], &["Y"], "add_0"));
//!
//! assert_eq!(graph.sole_consumer(mm), Some(add));
//! for index in graph.topological_order() {
//!     // ...
//! }
//! ```
//!
//! # Maps
//!
//! | Map | Description |
//! |-----|-------------|
//! | `producer_map` | output_name → producer node |
//! | `consumer_map` | tensor_name → consumer nodes |
//! | `name_map` | node_name → node |
//! | `desc_map` | tensor_name → TensorDesc |

pub mod accessors;
pub mod context;
pub mod maps;
pub mod mutators;
pub mod node;

// Re-export main types
pub use context::Graph;
pub use maps::{ConsumerMap, DescMap, NameMap, NameSet, NodeArena, ProducerMap};
pub use node::{
    make_node, AttributeValue, Attributes, Node, NodeIndex, NodeSpec, MS_DOMAIN, ONNX_DOMAIN,
};
