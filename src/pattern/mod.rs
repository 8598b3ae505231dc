//! Pattern matching for fusion
//!
//! This module decides *whether* and *how* a group of nodes can be fused.
//! It never mutates the graph.
//!
//! # Overview
//!
//! 1. [`ops`] names the operator identities patterns accept
//! 2. [`legality`] holds the pure predicates (fan-out, providers, types,
//!    bias broadcast) every pattern combines
//! 3. [`matcher`] implements the MatMul + Add pattern on top of them
//! 4. [`plan`] describes the result handed to the rewrite engine
//!
//! # Example
//!
//! ```ignore
//! use matmul_add_fusion::pattern::MatMulAddPattern;
//! use matmul_add_fusion::traits::FusionPattern;
//!
//! let pattern = MatMulAddPattern::default();
//! for index in graph.topological_order() {
//!     let Some(node) = graph.get_node(index) else { continue };
//!     if pattern.is_anchor(node) {
//!         if let Some(plan) = pattern.match_anchor(&graph, index) {
//!             println!("{} -> {}", plan.pattern, plan.replacement.op_type);
//!         }
//!     }
//! }
//! ```

pub mod legality;
pub mod matcher;
pub mod ops;
pub mod plan;

// Re-export main types
pub use legality::{
    broadcast_bias_legal, is_candidate_operator, is_graph_output, is_provider_compatible,
    same_provider, single_consumer, type_compatible,
};
pub use matcher::{MatMulAddBranch, MatMulAddPattern};
pub use ops::{OpIdentity, ADD, FUSED_MATMUL, MATMUL};
pub use plan::{FusionPlan, ReplacementTemplate};
