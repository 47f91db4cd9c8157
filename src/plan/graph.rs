//! The validated plan model: typed nodes, tagged edges, adjacency indexes.
//!
//! A [`PlanGraph`] is the single canonical structure every operation reads.
//! Nodes are keyed by canonical id; edges are deduplicated and carried in a
//! deterministic order; adjacency maps answer the traversal questions the
//! status operations ask without scanning the edge list.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::{GraphIntegrityError, LoadError};
use crate::plan::id::{IdKind, NodeId};
use crate::plan::links::LinkSpec;
use crate::plan::status::StatusDomain;
use crate::sheet::validate::{PlanRow, WorkRow};

/// Top-level grouping node (Line of Effort). Carries no status and no dates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupNode {
    pub id: NodeId,
    pub label: String,
    pub description: String,
}

/// Status-bearing work item; objectives and sub-objectives share this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkNode<S> {
    pub id: NodeId,
    pub label: String,
    pub description: String,
    pub parent: NodeId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub status: S,
}

/// A plan node. The variant is the node's kind; consumers match exhaustively
/// instead of re-deriving roles from id spellings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node<S> {
    Group(GroupNode),
    Objective(WorkNode<S>),
    SubObjective(WorkNode<S>),
}

impl<S: StatusDomain> Node<S> {
    pub fn id(&self) -> &NodeId {
        match self {
            Node::Group(g) => &g.id,
            Node::Objective(w) | Node::SubObjective(w) => &w.id,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Node::Group(g) => &g.label,
            Node::Objective(w) | Node::SubObjective(w) => &w.label,
        }
    }

    pub fn description(&self) -> &str {
        match self {
            Node::Group(g) => &g.description,
            Node::Objective(w) | Node::SubObjective(w) => &w.description,
        }
    }

    /// Parent group id; `None` for groups.
    pub fn parent(&self) -> Option<&NodeId> {
        match self {
            Node::Group(_) => None,
            Node::Objective(w) | Node::SubObjective(w) => Some(&w.parent),
        }
    }

    /// Current status; `None` for groups.
    pub fn status(&self) -> Option<S> {
        self.work().map(|w| w.status)
    }

    pub fn work(&self) -> Option<&WorkNode<S>> {
        match self {
            Node::Group(_) => None,
            Node::Objective(w) | Node::SubObjective(w) => Some(w),
        }
    }

    pub fn kind(&self) -> IdKind {
        match self {
            Node::Group(_) => IdKind::Group,
            Node::Objective(_) => IdKind::Objective,
            Node::SubObjective(_) => IdKind::SubObjective,
        }
    }
}

/// Relation class carried on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeKind {
    /// Directed: the source needs the target done (or healthy) first.
    Dependency,
    /// Mutual influence. Stored with the authored orientation, traversed in
    /// both directions everywhere.
    Interdependency,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
    pub kind: EdgeKind,
}

/// One status rewrite performed by a derive pass or a propagated edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusChange<S> {
    pub id: NodeId,
    pub from: S,
    pub to: S,
}

/// The canonical in-memory model.
#[derive(Debug, Clone)]
pub struct PlanGraph<S> {
    nodes: BTreeMap<NodeId, Node<S>>,
    edges: Vec<Edge>,
    /// Dependency edges, source to targets: what each node depends on.
    dep_targets: BTreeMap<NodeId, Vec<NodeId>>,
    /// Dependency edges, target to sources: what depends on each node.
    dep_sources: BTreeMap<NodeId, Vec<NodeId>>,
    /// Interdependency neighbors, both directions of every pair.
    linked: BTreeMap<NodeId, Vec<NodeId>>,
}

impl<S: StatusDomain> PlanGraph<S> {
    /// Build the model from validated rows plus the interdependency links.
    ///
    /// Group rows become nodes only; their dependency cells never emit
    /// edges. Re-checks the linkage invariants the row validator cannot
    /// see, chiefly a work id whose group row is absent from the sheet.
    pub fn build(rows: &[PlanRow<S>], links: &LinkSpec) -> Result<Self, LoadError> {
        let mut nodes: BTreeMap<NodeId, Node<S>> = BTreeMap::new();
        for row in rows {
            let node = match row {
                PlanRow::Group(g) => Node::Group(GroupNode {
                    id: g.id.clone(),
                    label: g.label.clone(),
                    description: g.description.clone(),
                }),
                PlanRow::Objective(w) => Node::Objective(work_node(w)),
                PlanRow::SubObjective(w) => Node::SubObjective(work_node(w)),
            };
            let id = node.id().clone();
            if nodes.insert(id.clone(), node).is_some() {
                return Err(GraphIntegrityError(format!("duplicate node {id}")).into());
            }
        }

        let mut edges: Vec<Edge> = Vec::new();
        for row in rows {
            let Some(work) = row.work() else { continue };
            if !nodes.contains_key(&work.group) {
                return Err(GraphIntegrityError(format!(
                    "row {}: work item {} names group {}, but that group row is missing",
                    work.line, work.id, work.group
                ))
                .into());
            }
            for dep in &work.dependencies {
                // The row validator already resolved these.
                if !nodes.contains_key(dep) {
                    return Err(GraphIntegrityError(format!(
                        "row {}: dependency {dep} of {} is not in the model",
                        work.line, work.id
                    ))
                    .into());
                }
                edges.push(Edge {
                    source: work.id.clone(),
                    target: dep.clone(),
                    kind: EdgeKind::Dependency,
                });
            }
        }

        let ids: BTreeSet<NodeId> = nodes.keys().cloned().collect();
        for (a, b) in links.resolve(&ids)? {
            edges.push(Edge {
                source: a,
                target: b,
                kind: EdgeKind::Interdependency,
            });
        }

        edges.sort();
        edges.dedup();

        let mut dep_targets: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        let mut dep_sources: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        let mut linked: BTreeMap<NodeId, Vec<NodeId>> = BTreeMap::new();
        for edge in &edges {
            match edge.kind {
                EdgeKind::Dependency => {
                    dep_targets
                        .entry(edge.source.clone())
                        .or_default()
                        .push(edge.target.clone());
                    dep_sources
                        .entry(edge.target.clone())
                        .or_default()
                        .push(edge.source.clone());
                }
                EdgeKind::Interdependency => {
                    linked
                        .entry(edge.source.clone())
                        .or_default()
                        .push(edge.target.clone());
                    linked
                        .entry(edge.target.clone())
                        .or_default()
                        .push(edge.source.clone());
                }
            }
        }
        for list in dep_targets
            .values_mut()
            .chain(dep_sources.values_mut())
            .chain(linked.values_mut())
        {
            list.sort();
            list.dedup();
        }

        Ok(PlanGraph {
            nodes,
            edges,
            dep_targets,
            dep_sources,
            linked,
        })
    }

    pub fn node(&self, id: &NodeId) -> Option<&Node<S>> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node<S>> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn status_of(&self, id: &NodeId) -> Option<S> {
        self.nodes.get(id).and_then(|n| n.status())
    }

    pub fn work_mut(&mut self, id: &NodeId) -> Option<&mut WorkNode<S>> {
        match self.nodes.get_mut(id) {
            Some(Node::Objective(w)) | Some(Node::SubObjective(w)) => Some(w),
            _ => None,
        }
    }

    /// What `id` depends on: targets of its outgoing dependency edges.
    pub fn dependency_targets(&self, id: &NodeId) -> &[NodeId] {
        self.dep_targets.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// What depends on `id`: sources of dependency edges pointing at it.
    pub fn dependents(&self, id: &NodeId) -> &[NodeId] {
        self.dep_sources.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Interdependency neighbors of `id`, regardless of stored orientation.
    pub fn interdependent(&self, id: &NodeId) -> &[NodeId] {
        self.linked.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Upstream neighborhood for status aggregation: dependency targets plus
    /// interdependency neighbors.
    pub fn upstream(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self
            .dependency_targets(id)
            .iter()
            .chain(self.interdependent(id))
            .cloned()
            .collect();
        out.sort();
        out.dedup();
        out
    }

    /// One-hop downstream set of `id`: its dependents plus its
    /// interdependency neighbors.
    pub fn downstream(&self, id: &NodeId) -> Vec<NodeId> {
        let mut out: Vec<NodeId> = self
            .dependents(id)
            .iter()
            .chain(self.interdependent(id))
            .cloned()
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

fn work_node<S: StatusDomain>(row: &WorkRow<S>) -> WorkNode<S> {
    WorkNode {
        id: row.id.clone(),
        label: row.label.clone(),
        description: row.description.clone(),
        parent: row.group.clone(),
        start: row.start,
        end: row.end,
        status: row.status,
    }
}
