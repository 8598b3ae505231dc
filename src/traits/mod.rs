//! Core traits for matmul-add-fusion
//!
//! Defines the interface a fusion pattern implements so the topological
//! driver and rewrite engine can run it without knowing its operators.

use crate::graph::{Graph, Node, NodeIndex};
use crate::pattern::FusionPlan;

/// A producer/consumer fusion pattern
///
/// Implementations never mutate the graph: they either decline an anchor or
/// return a complete [`FusionPlan`] for the rewrite engine.
///
/// # Example
///
/// ```ignore
/// struct ConvRelu;
///
/// impl FusionPattern for ConvRelu {
///     fn name(&self) -> &'static str {
///         "ConvRelu"
///     }
///
///     fn is_anchor(&self, node: &Node) -> bool {
///         node.op_type == "Conv"
///     }
///
///     fn match_anchor(&self, graph: &Graph, anchor: NodeIndex) -> Option<FusionPlan> {
///         // ...
///         None
///     }
/// }
/// ```
pub trait FusionPattern {
    /// Name used in logs and plans
    fn name(&self) -> &'static str;

    /// Check operator identity and provider of a potential anchor
    ///
    /// The driver calls this before [`FusionPattern::match_anchor`].
    fn is_anchor(&self, node: &Node) -> bool;

    /// Try to build a plan rooted at `anchor`
    ///
    /// # Returns
    /// * `Some(FusionPlan)` if the anchor and its neighbourhood can be fused
    /// * `None` otherwise; this is ordinary control flow
    fn match_anchor(&self, graph: &Graph, anchor: NodeIndex) -> Option<FusionPlan>;
}
