//! One-hop downstream propagation of interactive status edits.
//!
//! One user action changes one node. Every node one step downstream of the
//! edit (its dependents, plus its interdependency neighbors in either
//! orientation) is then re-aggregated from its own upstream neighborhood,
//! worst status wins. Exactly one level per edit: a recomputed node does not
//! push the change onward. Deepening the cascade would change review
//! semantics, so the single hop is load-bearing, not an accident.

use crate::error::GraphIntegrityError;
use crate::plan::graph::{Node, PlanGraph, StatusChange};
use crate::plan::id::NodeId;
use crate::plan::status::{ProgressStatus, StatusDomain};

/// Apply one manual status edit and recompute its one-hop downstream.
/// Returns every rewrite, the edited node's first.
pub fn apply_status_edit(
    graph: &mut PlanGraph<ProgressStatus>,
    id: &NodeId,
    status: ProgressStatus,
) -> Result<Vec<StatusChange<ProgressStatus>>, GraphIntegrityError> {
    match graph.node(id) {
        None => {
            return Err(GraphIntegrityError(format!(
                "status edit on unknown node {id}"
            )));
        }
        Some(Node::Group(_)) => {
            return Err(GraphIntegrityError(format!(
                "status edit on group {id}; groups carry no status"
            )));
        }
        Some(_) => {}
    }

    let mut changes = Vec::new();
    if let Some(work) = graph.work_mut(id) {
        if work.status != status {
            changes.push(StatusChange {
                id: id.clone(),
                from: work.status,
                to: status,
            });
            work.status = status;
        }
    }

    // One level out, then stop. Peers are visited in id order and each
    // aggregation reads the model as it stands at that point.
    for peer in graph.downstream(id) {
        let Some(current) = graph.status_of(&peer) else {
            continue;
        };
        let recomputed = worst_upstream(graph, &peer);
        if recomputed != current {
            if let Some(work) = graph.work_mut(&peer) {
                changes.push(StatusChange {
                    id: peer.clone(),
                    from: current,
                    to: recomputed,
                });
                work.status = recomputed;
            }
        }
    }
    Ok(changes)
}

/// Worst-wins over a node's upstream neighborhood (dependency targets plus
/// interdependency neighbors). No status-bearing upstream at all reads as
/// nothing left to wait on, which aggregates to completed.
fn worst_upstream(graph: &PlanGraph<ProgressStatus>, id: &NodeId) -> ProgressStatus {
    graph
        .upstream(id)
        .iter()
        .filter_map(|up| graph.status_of(up))
        .max_by_key(|status| status.severity())
        .unwrap_or(ProgressStatus::Completed)
}
