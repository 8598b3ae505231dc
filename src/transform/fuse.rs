//! Rewrite engine
//!
//! Commits a [`FusionPlan`] as one step: create the replacement, move the
//! authoritative outputs onto it, drop the participants. Preconditions are
//! re-checked first, and a failed check leaves the graph untouched.

use log::debug;

use crate::error::{OnnxResult, TransformError};
use crate::graph::{Graph, NodeIndex};
use crate::pattern::FusionPlan;

/// Result of a committed fusion
#[derive(Debug, Clone)]
pub struct FusionResult {
    /// Handle of the replacement node
    pub fused_node: NodeIndex,
    /// Name of the replacement node
    pub fused_node_name: String,
    /// Names of the nodes that were removed
    pub eliminated_nodes: Vec<String>,
}

fn stale(plan: &FusionPlan, reason: String) -> TransformError {
    TransformError::StalePlan {
        pattern: plan.pattern.to_string(),
        reason,
    }
}

/// Re-check a plan against the current graph without mutating it
///
/// - every participant is live
/// - only the last participant feeds nodes outside the group, and only it
///   may produce a graph output
/// - every replacement input is still available and not produced inside
///   the group
pub fn check_plan(graph: &Graph, plan: &FusionPlan) -> OnnxResult<()> {
    let (_, fused) = plan
        .participants
        .split_last()
        .ok_or_else(|| stale(plan, "no participants".to_string()))?;

    for &index in &plan.participants {
        if !graph.contains(index) {
            return Err(stale(plan, format!("participant {} was removed", index)));
        }
    }

    for &index in fused {
        if let Some(consumer) = graph
            .consumers_of(index)
            .into_iter()
            .find(|c| !plan.participants.contains(c))
        {
            return Err(stale(
                plan,
                format!("participant {} also feeds {}", index, consumer),
            ));
        }
        if graph.produces_graph_output(index) {
            return Err(stale(
                plan,
                format!("participant {} produces a graph output", index),
            ));
        }
    }

    for input in plan.replacement.inputs.iter().filter(|i| !i.is_empty()) {
        match graph.producer_map.get(input) {
            Some(producer) if plan.participants.contains(producer) => {
                return Err(stale(
                    plan,
                    format!("input '{}' is produced inside the fused group", input),
                ));
            }
            Some(_) => {}
            None if graph.is_source_value(input) => {}
            None => {
                return Err(stale(plan, format!("input '{}' is not available", input)));
            }
        }
    }

    Ok(())
}

/// Commit a plan
///
/// # Returns
/// * `Ok(FusionResult)` after the graph has been rewritten
/// * `Err(StalePlan)` if a precondition no longer holds; the graph is
///   unchanged in that case
pub fn apply_fusion(graph: &mut Graph, plan: &FusionPlan) -> OnnxResult<FusionResult> {
    check_plan(graph, plan)?;

    let eliminated_nodes: Vec<String> = plan
        .participants
        .iter()
        .filter_map(|&i| graph.get_node(i).map(|n| n.name.clone()))
        .collect();

    let name = graph.generate_node_name(&plan.replacement.name_prefix);
    let fused_node = graph.add_node(plan.replacement.to_node_spec(name.clone()));
    graph.set_execution_provider(fused_node, &plan.replacement.execution_provider);
    graph.finalize_fusion(&plan.participants, fused_node);

    debug!(
        "{}: fused [{}] into {} '{}'",
        plan.pattern,
        eliminated_nodes.join(", "),
        plan.replacement.op_type,
        name
    );

    Ok(FusionResult {
        fused_node,
        fused_node_name: name,
        eliminated_nodes,
    })
}
