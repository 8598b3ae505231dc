//! Execution provider filter
//!
//! Providers are open string identifiers; a filter is an ordered set of
//! them. An empty filter places no restriction.

use indexmap::IndexSet;

/// Default CPU provider
pub const CPU_PROVIDER: &str = "CPUExecutionProvider";
/// NVIDIA CUDA provider
pub const CUDA_PROVIDER: &str = "CUDAExecutionProvider";
/// AMD ROCm provider
pub const ROCM_PROVIDER: &str = "ROCMExecutionProvider";
/// DirectML provider
pub const DML_PROVIDER: &str = "DmlExecutionProvider";
/// Apple CoreML provider
pub const COREML_PROVIDER: &str = "CoreMLExecutionProvider";

/// Providers added by [`ProviderFilter::include_all`]
pub const KNOWN_PROVIDERS: &[&str] = &[
    CPU_PROVIDER,
    CUDA_PROVIDER,
    ROCM_PROVIDER,
    DML_PROVIDER,
    COREML_PROVIDER,
];

/// Ordered set of execution providers a pass may touch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderFilter {
    providers: IndexSet<String>,
}

impl ProviderFilter {
    /// Empty filter, admitting every provider
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter admitting exactly the given providers
    pub fn only(providers: &[&str]) -> Self {
        let mut filter = Self::new();
        for p in providers {
            filter.include(p);
        }
        filter
    }

    /// Add every provider in [`KNOWN_PROVIDERS`]
    pub fn include_all(&mut self) -> &mut Self {
        for p in KNOWN_PROVIDERS {
            self.providers.insert(p.to_string());
        }
        self
    }

    /// Add one provider
    pub fn include(&mut self, provider: &str) -> &mut Self {
        self.providers.insert(provider.to_string());
        self
    }

    /// Remove every provider, lifting the restriction
    pub fn clear(&mut self) -> &mut Self {
        self.providers.clear();
        self
    }

    /// Check if a node assigned to `provider` is admitted
    pub fn admits(&self, provider: &str) -> bool {
        self.providers.is_empty() || self.providers.contains(provider)
    }

    /// Check if `provider` is listed explicitly
    pub fn contains(&self, provider: &str) -> bool {
        self.providers.contains(provider)
    }

    /// Provider at `index`, in insertion order
    pub fn get(&self, index: usize) -> Option<&str> {
        self.providers.get_index(index).map(String::as_str)
    }

    /// Position of `provider`
    pub fn index_of(&self, provider: &str) -> Option<usize> {
        self.providers.get_index_of(provider)
    }

    /// Number of listed providers
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Check if no provider is listed
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Iterate over listed providers
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.providers.iter().map(String::as_str)
    }
}
