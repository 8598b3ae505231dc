//! Legality predicates
//!
//! Pure, side-effect-free checks shared by fusion patterns. A `false` from
//! any of them means "leave this pair alone", never an error.

use crate::config::ProviderFilter;
use crate::graph::{Graph, Node, NodeIndex};
use crate::tensor::{Dim, ElementType, TensorShape};

use super::ops::{matches_any, OpIdentity};

/// Node's (op_type, version, domain) is in the allow-list
pub fn is_candidate_operator(node: &Node, allowed: &[OpIdentity]) -> bool {
    matches_any(node, allowed)
}

/// Node's execution provider is admitted by the pass
pub fn is_provider_compatible(node: &Node, providers: &ProviderFilter) -> bool {
    providers.admits(&node.execution_provider)
}

/// Exactly one outgoing edge leaves the node
pub fn single_consumer(graph: &Graph, node: NodeIndex) -> bool {
    graph.output_edge_count(node) == 1
}

/// Any of the node's outputs is a graph output
pub fn is_graph_output(graph: &Graph, node: NodeIndex) -> bool {
    graph.produces_graph_output(node)
}

/// Both nodes run on the identical execution provider
pub fn same_provider(a: &Node, b: &Node) -> bool {
    a.execution_provider == b.execution_provider
}

/// Primary operand element types are identical and in `allowed`
///
/// Missing descriptors fail the check.
pub fn type_compatible(graph: &Graph, a: &Node, b: &Node, allowed: &[ElementType]) -> bool {
    let (a_desc, b_desc) = match (graph.input_desc(a, 0), graph.input_desc(b, 0)) {
        (Some(a_desc), Some(b_desc)) => (a_desc, b_desc),
        _ => return false,
    };
    a_desc.elem_type == b_desc.elem_type && allowed.contains(&a_desc.elem_type)
}

/// Bias shape accepted by unidirectional broadcast onto an (M, N) result
///
/// Valid shapes are (N), (1, N), (M, 1) and (M, N). Every dimension taking
/// part in a comparison must be concrete; an unknown dimension on either
/// side makes the shape illegal.
pub fn broadcast_bias_legal(m: &Dim, n: &Dim, bias: &TensorShape) -> bool {
    match bias.dims() {
        [b0] => b0.same_known(n),
        [b0, b1] => {
            (b0.is_value(1) && b1.same_known(n))
                || (b0.same_known(m) && (b1.is_value(1) || b1.same_known(n)))
        }
        _ => false,
    }
}
