//! Graph transformation module
//!
//! - [`core`]: topological driver and fixpoint loop
//! - [`fuse`]: atomic rewrite of a fusion plan
//!
//! # Overview
//!
//! A pass captures a topological snapshot of the graph and walks it with
//! [`walk_topological`]. Each anchor the pattern accepts yields a
//! [`FusionPlan`](crate::pattern::FusionPlan), which [`apply_fusion`]
//! re-checks and commits in one step. [`transform_until_fixed_point`]
//! repeats whole passes until nothing changes.
//!
//! # Example
//!
//! ```ignore
//! use matmul_add_fusion::transform::{transform_until_fixed_point, TransformConfig};
//! use matmul_add_fusion::transformers::MatMulAddFusion;
//!
//! let pass = MatMulAddFusion::new();
//! let stats = transform_until_fixed_point(&mut graph, &[&pass], &TransformConfig::default())?;
//! println!("{} fusion(s) in {} sweep(s)", stats.fusions_applied, stats.iterations);
//! ```

pub mod core;
pub mod fuse;

// Re-export main types and functions
pub use core::{
    recurse_subgraphs, transform_once, transform_until_fixed_point, walk_topological,
    TransformConfig, TransformStats, WalkStats,
};

pub use fuse::{apply_fusion, check_plan, FusionResult};
