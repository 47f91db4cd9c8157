//! Display subgraphs: the wire model handed to rendering collaborators,
//! plus the two selection filters.
//!
//! Filters are pure reads. They never look at statuses and never change the
//! model; they only choose which nodes and edges a renderer should see.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::plan::graph::{Edge, EdgeKind, Node, PlanGraph};
use crate::plan::id::NodeId;
use crate::plan::status::StatusDomain;

/// Wire shape of one node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeView<S> {
    pub id: NodeId,
    pub label: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<S>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent: Option<NodeId>,
}

/// Wire shape of one edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeView {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

/// A display subgraph. Nodes come deduplicated in render order (groups,
/// then objectives, then sub-objectives, each sorted by id); edges sort by
/// source, target, kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubGraph<S> {
    pub nodes: Vec<NodeView<S>>,
    pub edges: Vec<EdgeView>,
}

/// The inspect payload for one node: its wire form plus incident edges.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDetail<S> {
    pub node: NodeView<S>,
    pub edges: Vec<EdgeView>,
}

/// The whole model; the initial render payload.
pub fn full<S: StatusDomain>(graph: &PlanGraph<S>) -> SubGraph<S> {
    let ids = graph.nodes().map(|n| n.id().clone()).collect();
    let edges = graph.edges().to_vec();
    materialize(graph, ids, edges)
}

/// Scope the display to whole groups: each selected group, every node whose
/// parent it is, every edge touching those nodes, and (for edges that leave
/// the selection) the far endpoint plus its own parent group. Selections
/// that are not group ids are ignored.
pub fn group_filter<S: StatusDomain>(graph: &PlanGraph<S>, selected: &[NodeId]) -> SubGraph<S> {
    let mut base: BTreeSet<NodeId> = BTreeSet::new();
    for id in selected {
        if let Some(Node::Group(g)) = graph.node(id) {
            base.insert(g.id.clone());
        }
    }
    // Members never collide with group ids, so extending base mid-scan is
    // safe for the parent lookups.
    for node in graph.nodes() {
        if let Some(parent) = node.parent() {
            if base.contains(parent) {
                base.insert(node.id().clone());
            }
        }
    }
    let ids = base.clone();
    extend_over_edges(graph, base, ids)
}

/// Scope the display to the immediate network of chosen nodes: each known
/// selected node, its parent group, every edge incident to a selected node,
/// and each such edge's far endpoint plus that endpoint's parent group.
/// Single hop; neighbors of neighbors stay out.
pub fn ego_filter<S: StatusDomain>(graph: &PlanGraph<S>, selected: &[NodeId]) -> SubGraph<S> {
    let mut base: BTreeSet<NodeId> = BTreeSet::new();
    let mut ids: BTreeSet<NodeId> = BTreeSet::new();
    for raw in selected {
        let Some(node) = graph.node(raw) else { continue };
        base.insert(node.id().clone());
        ids.insert(node.id().clone());
        if let Some(parent) = node.parent() {
            ids.insert(parent.clone());
        }
    }
    extend_over_edges(graph, base, ids)
}

pub fn node_detail<S: StatusDomain>(graph: &PlanGraph<S>, id: &NodeId) -> Option<NodeDetail<S>> {
    let node = graph.node(id)?;
    let edges = graph
        .edges()
        .iter()
        .filter(|e| &e.source == id || &e.target == id)
        .map(edge_view)
        .collect();
    Some(NodeDetail {
        node: node_view(node),
        edges,
    })
}

/// Pull in every edge touching `base`, plus each such edge's out-of-base
/// endpoint and that endpoint's parent group.
fn extend_over_edges<S: StatusDomain>(
    graph: &PlanGraph<S>,
    base: BTreeSet<NodeId>,
    mut ids: BTreeSet<NodeId>,
) -> SubGraph<S> {
    let mut edges = Vec::new();
    for edge in graph.edges() {
        if !base.contains(&edge.source) && !base.contains(&edge.target) {
            continue;
        }
        edges.push(edge.clone());
        for end in [&edge.source, &edge.target] {
            if base.contains(end) {
                continue;
            }
            ids.insert(end.clone());
            if let Some(parent) = graph.node(end).and_then(|n| n.parent()) {
                ids.insert(parent.clone());
            }
        }
    }
    materialize(graph, ids, edges)
}

fn materialize<S: StatusDomain>(
    graph: &PlanGraph<S>,
    ids: BTreeSet<NodeId>,
    mut edges: Vec<Edge>,
) -> SubGraph<S> {
    let mut picked: Vec<&Node<S>> = ids.iter().filter_map(|id| graph.node(id)).collect();
    picked.sort_by_key(|n| (n.kind(), n.id().clone()));
    edges.sort();
    edges.dedup();
    SubGraph {
        nodes: picked.into_iter().map(node_view).collect(),
        edges: edges.iter().map(edge_view).collect(),
    }
}

fn node_view<S: StatusDomain>(node: &Node<S>) -> NodeView<S> {
    NodeView {
        id: node.id().clone(),
        label: node.label().to_string(),
        description: node.description().to_string(),
        status: node.status(),
        parent: node.parent().cloned(),
    }
}

fn edge_view(edge: &Edge) -> EdgeView {
    EdgeView {
        source: edge.source.clone(),
        target: edge.target.clone(),
        kind: edge.kind,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::id::IdPatterns;
    use crate::plan::links::LinkSpec;
    use crate::plan::status::ProgressStatus;
    use crate::sheet;
    use pretty_assertions::assert_eq;

    fn graph_from(sheet_text: &str, links_json: &str) -> PlanGraph<ProgressStatus> {
        let raw = sheet::read_rows(sheet_text).unwrap();
        let patterns = IdPatterns::new().unwrap();
        let rows = sheet::validate_rows(&patterns, &raw).unwrap();
        let links = LinkSpec::parse(links_json).unwrap();
        PlanGraph::build(&rows, &links).unwrap()
    }

    fn id(raw: &str) -> NodeId {
        NodeId::canonical(raw)
    }

    fn ids(of: &SubGraph<ProgressStatus>) -> Vec<&str> {
        of.nodes.iter().map(|n| n.id.as_str()).collect()
    }

    const SHEET: &str = "\
ID,Description,Start Date,End Date,Status,Dependencies
LOE1,First line,,,,
LOE2,Second line,,,,
O1.1,Alpha,2024-01-01,2024-03-01,on track,
O1.2,Beta,2024-01-01,2024-04-01,ahead,o1.1
O1.3,Standalone,2024-01-01,2024-04-01,on track,
O2.1,Gamma,2024-02-01,2024-05-01,behind,o1.2
IO2.1.1,Gamma detail,2024-02-01,2024-03-01,on track,
";

    const LINKS: &str = r#"{ "interdependencies": [["io2.1.1", "o1.1"]] }"#;

    #[test]
    fn full_model_serializes_the_wire_shape() {
        let graph = graph_from(
            "\
ID,Description,Start Date,End Date,Status,Dependencies
LOE1,First line,,,,
O1.1,Alpha,2024-01-01,2024-03-01,on track,
",
            "{}",
        );
        let value = serde_json::to_value(full(&graph)).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "nodes": [
                    { "id": "loe1", "label": "LOE1", "description": "First line" },
                    {
                        "id": "o1.1",
                        "label": "O1.1",
                        "description": "Alpha",
                        "status": "on track",
                        "parent": "loe1"
                    }
                ],
                "edges": []
            })
        );
    }

    #[test]
    fn group_filter_keeps_external_endpoints_and_their_groups() {
        let graph = graph_from(SHEET, LINKS);
        let sub = group_filter(&graph, &[id("loe2")]);

        // o1.1 and o1.2 ride in on the cross-group edges; o1.3 does not.
        assert_eq!(
            ids(&sub),
            vec!["loe1", "loe2", "o1.1", "o1.2", "o2.1", "io2.1.1"]
        );
        // The edge internal to the foreign group stays out.
        assert_eq!(
            sub.edges,
            vec![
                EdgeView {
                    source: id("io2.1.1"),
                    target: id("o1.1"),
                    kind: EdgeKind::Interdependency,
                },
                EdgeView {
                    source: id("o2.1"),
                    target: id("o1.2"),
                    kind: EdgeKind::Dependency,
                },
            ]
        );
    }

    #[test]
    fn group_filter_over_every_group_is_the_full_model() {
        let graph = graph_from(SHEET, LINKS);
        let all = group_filter(&graph, &[id("loe1"), id("loe2")]);
        assert_eq!(all, full(&graph));
    }

    #[test]
    fn group_filter_on_a_closed_group_returns_exactly_its_members() {
        let graph = graph_from(
            "\
ID,Description,Start Date,End Date,Status,Dependencies
LOE1,Only line,,,,
O1.1,Parent objective,2024-01-01,2024-03-01,on track,io1.1.1
IO1.1.1,Detail,2024-01-01,2024-02-01,ahead,
",
            "{}",
        );
        let sub = group_filter(&graph, &[id("loe1")]);
        assert_eq!(ids(&sub), vec!["loe1", "o1.1", "io1.1.1"]);
        assert_eq!(
            sub.edges,
            vec![EdgeView {
                source: id("o1.1"),
                target: id("io1.1.1"),
                kind: EdgeKind::Dependency,
            }]
        );
    }

    #[test]
    fn group_filter_ignores_unknown_and_non_group_selections() {
        let graph = graph_from(SHEET, LINKS);
        let empty = group_filter(&graph, &[id("loe9")]);
        assert_eq!(empty.nodes, vec![]);
        assert_eq!(empty.edges, vec![]);
        assert_eq!(group_filter(&graph, &[id("o1.1")]).nodes, vec![]);
        // Overlapping selections do not duplicate anything.
        let doubled = group_filter(&graph, &[id("loe1"), id("loe1")]);
        assert_eq!(doubled, group_filter(&graph, &[id("loe1")]));
    }

    #[test]
    fn ego_filter_reaches_exactly_one_hop() {
        let graph = graph_from(SHEET, LINKS);
        let sub = ego_filter(&graph, &[id("o1.2")]);

        // Neighbors o1.1 and o2.1 come in with their groups; o1.1's own
        // interdependency partner io2.1.1 sits two hops out and stays away.
        assert_eq!(ids(&sub), vec!["loe1", "loe2", "o1.1", "o1.2", "o2.1"]);
        assert_eq!(sub.edges.len(), 2);
    }

    #[test]
    fn ego_filter_on_unknown_ids_is_empty() {
        let graph = graph_from(SHEET, LINKS);
        let sub = ego_filter(&graph, &[id("o9.9")]);
        assert_eq!(sub.nodes, vec![]);
        assert_eq!(sub.edges, vec![]);
    }

    #[test]
    fn node_detail_lists_incident_edges_only() {
        let graph = graph_from(SHEET, LINKS);
        let detail = node_detail(&graph, &id("o1.1")).unwrap();
        assert_eq!(detail.node.label, "O1.1");
        assert_eq!(detail.edges.len(), 2);
        assert!(node_detail(&graph, &id("o9.9")).is_none());
    }
}
