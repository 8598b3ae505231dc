//! Graph transformers
//!
//! Ready-to-use passes built on the [`transform`](crate::transform) driver.
//! Each implements [`GraphTransformer`] and can run alone, through
//! [`run_transformers`], or inside an [`OptimizationPipeline`].
//!
//! # Example
//!
//! ```ignore
//! use matmul_add_fusion::transformers::{GraphTransformer, MatMulAddFusion};
//!
//! let result = MatMulAddFusion::new().apply(&mut graph, 0)?;
//! println!("Fused {} MatMul+Add pairs", result.transforms_applied);
//! ```

/// Common utilities and types
pub mod common;
/// Fuse MatMul + Add
pub mod fuse_matmul_add;

pub use common::{run_transformers, GraphTransformer, TransformResult};
pub use fuse_matmul_add::MatMulAddFusion;

use crate::config::FusionConfig;
use crate::error::OnnxResult;
use crate::graph::Graph;
use crate::transform::{transform_until_fixed_point, TransformConfig, TransformStats};

/// Fusion passes run together until the graph stops changing
#[derive(Debug, Default)]
pub struct OptimizationPipeline {
    /// MatMul + Add fusion
    pub matmul_add: MatMulAddFusion,
    /// Fixpoint settings
    pub config: TransformConfig,
}

impl OptimizationPipeline {
    /// Create a new pipeline with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Pipeline whose fusion pass uses `fusion`
    pub fn with_fusion_config(fusion: FusionConfig) -> Self {
        Self {
            matmul_add: MatMulAddFusion::with_config(fusion),
            config: TransformConfig::default(),
        }
    }

    /// Override the fixpoint settings
    pub fn with_transform_config(mut self, config: TransformConfig) -> Self {
        self.config = config;
        self
    }

    /// Run the pipeline
    pub fn run(&self, graph: &mut Graph) -> OnnxResult<TransformStats> {
        transform_until_fixed_point(graph, &[&self.matmul_add], &self.config)
    }
}
