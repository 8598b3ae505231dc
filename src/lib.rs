//! # MatMul + Add fusion
//!
//! Graph-level fusion of a matrix multiplication and the element-wise
//! addition that consumes it, for ONNX-style dataflow graphs.
//!
//! ## Features
//!
//! - **Arena graph**: stable node handles with producer/consumer maps
//! - **Pattern matching**: pure legality predicates and a MatMul+Add matcher
//! - **Atomic rewrite**: a plan is re-checked and committed in one step
//! - **Subgraphs**: passes recurse into control-flow bodies first
//!
//! Rank-2 pairs become `Gemm`; batched pairs become
//! `com.microsoft.FusedMatMul` with the bias as a third input.
//!
//! ## Example
//!
//! ```ignore
//! use matmul_add_fusion::prelude::*;
//!
//! let mut graph = Graph::new("main");
//! // ... declare inputs, initializers and nodes ...
//! let stats = fuse_matmul_add(&mut graph)?;
//! assert!(!stats.hit_cap);
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]

// ============================================================================
// Module declarations
// ============================================================================

pub mod config;
pub mod error;
pub mod graph;
pub mod pattern;
pub mod tensor;
pub mod traits;
pub mod transform;
pub mod transformers;

// ============================================================================
// Prelude module for convenient imports
// ============================================================================

/// Prelude module - import commonly used types with `use matmul_add_fusion::prelude::*`
pub mod prelude {
    pub use crate::config::{FusionConfig, ProviderFilter};
    pub use crate::error::{OnnxResult, TransformError};
    pub use crate::graph::{make_node, AttributeValue, Graph, Node, NodeIndex};
    pub use crate::pattern::{FusionPlan, MatMulAddPattern};
    pub use crate::tensor::{Dim, ElementType, TensorDesc, TensorShape};
    pub use crate::traits::FusionPattern;
    pub use crate::transform::{transform_until_fixed_point, TransformConfig, TransformStats};
    pub use crate::transformers::{GraphTransformer, MatMulAddFusion, OptimizationPipeline};
    pub use crate::fuse_matmul_add;
}

// ============================================================================
// Crate-level re-exports
// ============================================================================

pub use error::{OnnxResult, TransformError};
pub use traits::FusionPattern;

/// Run MatMul + Add fusion to a fixed point with default settings
pub fn fuse_matmul_add(graph: &mut graph::Graph) -> OnnxResult<transform::TransformStats> {
    transformers::OptimizationPipeline::default().run(graph)
}

// ============================================================================
// Version information
// ============================================================================

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
