//! Static configuration for fusion passes
//!
//! A pass is configured with data, never by parsing: which operator
//! identities may anchor or complete a pattern, which element types the
//! fused kernel accepts, and which execution providers the pass may touch.

pub mod providers;

pub use providers::{
    ProviderFilter, COREML_PROVIDER, CPU_PROVIDER, CUDA_PROVIDER, DML_PROVIDER, KNOWN_PROVIDERS,
    ROCM_PROVIDER,
};

use crate::pattern::ops::{OpIdentity, ADD, FUSED_MATMUL, MATMUL};
use crate::tensor::{ElementType, GEMM_ELEMENT_TYPES};

/// Configuration of a producer/consumer fusion pattern
#[derive(Debug, Clone)]
pub struct FusionConfig {
    /// Identities accepted for the first-stage (anchor) node
    pub anchor_ops: Vec<OpIdentity>,
    /// Identities accepted for the second-stage (consumer) node
    pub consumer_ops: Vec<OpIdentity>,
    /// Element types the fused kernel supports
    pub element_types: Vec<ElementType>,
    /// Providers the pass may rewrite nodes on
    pub providers: ProviderFilter,
}

impl FusionConfig {
    /// MatMul / FusedMatMul followed by Add, all providers
    pub fn matmul_add() -> Self {
        Self {
            anchor_ops: vec![MATMUL.clone(), FUSED_MATMUL.clone()],
            consumer_ops: vec![ADD.clone()],
            element_types: GEMM_ELEMENT_TYPES.to_vec(),
            providers: ProviderFilter::new(),
        }
    }

    /// Restrict the pass to the given providers
    pub fn with_providers(mut self, providers: ProviderFilter) -> Self {
        self.providers = providers;
        self
    }

    /// Replace the element type allow-set
    pub fn with_element_types(mut self, element_types: &[ElementType]) -> Self {
        self.element_types = element_types.to_vec();
        self
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self::matmul_add()
    }
}
