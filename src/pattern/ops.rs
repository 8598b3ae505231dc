//! Operator identities used by fusion patterns
//!
//! An identity is (op_type, accepted since-versions, domain). Version and
//! domain are part of the identity: `MatMul` in a custom domain, or at an
//! opset the fused kernels were not validated against, is a different
//! operator as far as matching is concerned.

use std::borrow::Cow;

use crate::graph::{Node, MS_DOMAIN, ONNX_DOMAIN};

/// Allow-list entry for operator matching
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OpIdentity {
    /// Operator type
    pub op_type: Cow<'static, str>,
    /// Accepted `since_version` values
    pub versions: Cow<'static, [i64]>,
    /// Operator domain
    pub domain: Cow<'static, str>,
}

impl OpIdentity {
    /// Identity built at runtime, e.g. for a custom pattern
    pub fn new(op_type: &str, versions: &[i64], domain: &str) -> Self {
        Self {
            op_type: Cow::Owned(op_type.to_string()),
            versions: Cow::Owned(versions.to_vec()),
            domain: Cow::Owned(domain.to_string()),
        }
    }

    /// Check if `node` has this identity
    pub fn matches(&self, node: &Node) -> bool {
        node.op_type == self.op_type
            && node.domain == self.domain
            && self.versions.contains(&node.since_version)
    }
}

/// ONNX MatMul
pub const MATMUL: OpIdentity = OpIdentity {
    op_type: Cow::Borrowed("MatMul"),
    versions: Cow::Borrowed(&[1, 9, 13]),
    domain: Cow::Borrowed(ONNX_DOMAIN),
};

/// Contrib FusedMatMul (batched matmul with optional bias)
pub const FUSED_MATMUL: OpIdentity = OpIdentity {
    op_type: Cow::Borrowed("FusedMatMul"),
    versions: Cow::Borrowed(&[1]),
    domain: Cow::Borrowed(MS_DOMAIN),
};

/// ONNX Add
pub const ADD: OpIdentity = OpIdentity {
    op_type: Cow::Borrowed("Add"),
    versions: Cow::Borrowed(&[7, 13, 14]),
    domain: Cow::Borrowed(ONNX_DOMAIN),
};

/// Op type of the rank-2 replacement
pub const GEMM_OP: &str = "Gemm";
/// Opset version assigned to created Gemm nodes
pub const GEMM_VERSION: i64 = 13;

/// Op type of the batched replacement
pub const FUSED_MATMUL_OP: &str = "FusedMatMul";
/// Version assigned to created FusedMatMul nodes
pub const FUSED_MATMUL_VERSION: i64 = 1;

/// Attribute marking the trailing bias operand of FusedMatMul, with its scale
pub const BIAS_SCALE_ATTR: &str = "beta";

/// Attributes FusedMatMul shares with Gemm under the same name and meaning
pub const GEMM_COMPATIBLE_ATTRS: [&str; 3] = ["alpha", "transA", "transB"];

/// FusedMatMul batch-transpose flags; Gemm has no counterpart
pub const TRANS_BATCH_ATTRS: [&str; 2] = ["transBatchA", "transBatchB"];

/// Check if `node` matches any identity in `allowed`
pub fn matches_any(node: &Node, allowed: &[OpIdentity]) -> bool {
    allowed.iter().any(|id| id.matches(node))
}
