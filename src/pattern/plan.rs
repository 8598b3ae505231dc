//! Fusion plans
//!
//! A plan is what a matcher hands to the rewrite engine: the nodes to
//! remove and a complete description of the node that replaces them. Plans
//! are computed against an immutable graph and carry no borrows into it.

use smallvec::SmallVec;

use crate::graph::{Attributes, NodeIndex, NodeSpec};

/// Description of the replacement node
#[derive(Debug, Clone, PartialEq)]
pub struct ReplacementTemplate {
    /// Prefix for the generated node name
    pub name_prefix: String,
    /// Operator type
    pub op_type: String,
    /// Operator domain
    pub domain: String,
    /// Opset version
    pub since_version: i64,
    /// Input descriptor names, in operand order
    pub inputs: Vec<String>,
    /// Attributes
    pub attributes: Attributes,
    /// Execution provider, copied from the anchor
    pub execution_provider: String,
    /// Documentation
    pub doc_string: String,
}

impl ReplacementTemplate {
    /// Node spec for this template under `name`, with no outputs yet
    pub fn to_node_spec(&self, name: String) -> NodeSpec {
        NodeSpec {
            name,
            op_type: self.op_type.clone(),
            domain: self.domain.clone(),
            since_version: self.since_version,
            inputs: self.inputs.clone(),
            outputs: Vec::new(),
            execution_provider: self.execution_provider.clone(),
            attributes: self.attributes.clone(),
            doc_string: self.doc_string.clone(),
            ..Default::default()
        }
    }
}

/// A fully specified rewrite
#[derive(Debug, Clone)]
pub struct FusionPlan {
    /// Name of the pattern that produced the plan
    pub pattern: &'static str,
    /// Nodes to remove, in dataflow order; the last one's outputs survive
    pub participants: SmallVec<[NodeIndex; 4]>,
    /// The node that replaces them
    pub replacement: ReplacementTemplate,
}

impl FusionPlan {
    /// First participant (the anchor)
    pub fn anchor(&self) -> Option<NodeIndex> {
        self.participants.first().copied()
    }

    /// Participant whose outputs are taken over by the replacement
    pub fn authoritative(&self) -> Option<NodeIndex> {
        self.participants.last().copied()
    }
}
