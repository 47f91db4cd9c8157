//! Batch derivation of schedule statuses.
//!
//! Two ordered passes over the whole model:
//!
//! 1. date pass: any work node whose end date is strictly before today and
//!    whose status is not complete becomes overdue;
//! 2. dependency pass: any work node not already overdue whose direct
//!    dependency targets include an overdue node becomes at risk.
//!
//! The dependency pass reads the picture left by the date pass, looks along
//! dependency edges only, and reaches exactly one hop: at risk never
//! cascades to the dependents of an at-risk node.

use chrono::NaiveDate;

use crate::plan::graph::{PlanGraph, StatusChange};
use crate::plan::id::NodeId;
use crate::plan::status::ScheduleStatus;

/// Recompute every work node's schedule status for `today`. Returns the
/// rewrites in model order, date pass first.
pub fn derive_schedule(
    graph: &mut PlanGraph<ScheduleStatus>,
    today: NaiveDate,
) -> Vec<StatusChange<ScheduleStatus>> {
    let mut changes = Vec::new();
    let ids: Vec<NodeId> = graph.nodes().map(|n| n.id().clone()).collect();

    for id in &ids {
        let Some(work) = graph.work_mut(id) else { continue };
        if work.end < today
            && work.status != ScheduleStatus::Complete
            && work.status != ScheduleStatus::Overdue
        {
            changes.push(StatusChange {
                id: id.clone(),
                from: work.status,
                to: ScheduleStatus::Overdue,
            });
            work.status = ScheduleStatus::Overdue;
        }
    }

    // This pass never writes overdue, so reading live state is the same as
    // reading a snapshot taken after the date pass.
    for id in &ids {
        let current = match graph.status_of(id) {
            None | Some(ScheduleStatus::Overdue) => continue,
            Some(current) => current,
        };
        let threatened = graph
            .dependency_targets(id)
            .iter()
            .any(|dep| graph.status_of(dep) == Some(ScheduleStatus::Overdue));
        if threatened && current != ScheduleStatus::AtRisk {
            if let Some(work) = graph.work_mut(id) {
                changes.push(StatusChange {
                    id: id.clone(),
                    from: current,
                    to: ScheduleStatus::AtRisk,
                });
                work.status = ScheduleStatus::AtRisk;
            }
        }
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::id::IdPatterns;
    use crate::plan::links::LinkSpec;
    use crate::sheet;
    use pretty_assertions::assert_eq;

    fn graph_from(sheet_text: &str, links_json: &str) -> PlanGraph<ScheduleStatus> {
        let raw = sheet::read_rows(sheet_text).unwrap();
        let patterns = IdPatterns::new().unwrap();
        let rows = sheet::validate_rows(&patterns, &raw).unwrap();
        let links = LinkSpec::parse(links_json).unwrap();
        PlanGraph::build(&rows, &links).unwrap()
    }

    fn id(raw: &str) -> NodeId {
        NodeId::canonical(raw)
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn date_pass_then_dependency_pass_without_cascade() {
        let mut graph = graph_from(
            "\
ID,Description,Start Date,End Date,Status,Dependencies
LOE1,First line,,,,
O1.1,Slipped,2024-01-01,2024-03-01,at risk,
O1.2,Depends on slipped,2024-01-01,2024-12-01,on track,o1.1
O1.3,Two hops out,2024-01-01,2024-06-01,on track,o1.2
O1.4,Done long ago,2023-01-01,2023-06-01,complete,
",
            "{}",
        );

        let changes = derive_schedule(&mut graph, today());

        assert_eq!(
            changes,
            vec![
                StatusChange {
                    id: id("o1.1"),
                    from: ScheduleStatus::AtRisk,
                    to: ScheduleStatus::Overdue,
                },
                StatusChange {
                    id: id("o1.2"),
                    from: ScheduleStatus::OnTrack,
                    to: ScheduleStatus::AtRisk,
                },
            ]
        );

        // o1.3 ends exactly today (not strictly past) and its dependency
        // o1.2 is at risk, not overdue: both passes leave it alone.
        assert_eq!(graph.status_of(&id("o1.3")), Some(ScheduleStatus::OnTrack));
        // Complete is exempt from the date pass no matter how old.
        assert_eq!(graph.status_of(&id("o1.4")), Some(ScheduleStatus::Complete));
    }

    #[test]
    fn dependency_became_overdue_in_the_same_run() {
        // o1.2's dependency is healthy on disk and only turns overdue during
        // the date pass; the dependency pass must still see it.
        let mut graph = graph_from(
            "\
ID,Description,Start Date,End Date,Status,Dependencies
LOE1,First line,,,,
O1.1,Slipped quietly,2024-01-01,2024-05-01,on track,
O1.2,Downstream,2024-01-01,2024-12-01,on track,o1.1
",
            "{}",
        );

        derive_schedule(&mut graph, today());

        assert_eq!(graph.status_of(&id("o1.1")), Some(ScheduleStatus::Overdue));
        assert_eq!(graph.status_of(&id("o1.2")), Some(ScheduleStatus::AtRisk));
    }

    #[test]
    fn interdependencies_are_ignored_by_both_passes() {
        let mut graph = graph_from(
            "\
ID,Description,Start Date,End Date,Status,Dependencies
LOE1,First line,,,,
O1.1,Slipped,2024-01-01,2024-03-01,on track,
O1.2,Linked only,2024-01-01,2024-12-01,on track,
",
            r#"{ "interdependencies": [["o1.1", "o1.2"]] }"#,
        );

        derive_schedule(&mut graph, today());

        assert_eq!(graph.status_of(&id("o1.1")), Some(ScheduleStatus::Overdue));
        assert_eq!(graph.status_of(&id("o1.2")), Some(ScheduleStatus::OnTrack));
    }

    #[test]
    fn dependency_pass_exempts_only_overdue_nodes() {
        // Even a complete node is pulled to at risk when something it
        // depends on is overdue; only overdue itself is left standing.
        let mut graph = graph_from(
            "\
ID,Description,Start Date,End Date,Status,Dependencies
LOE1,First line,,,,
O1.1,Slipped,2024-01-01,2024-03-01,on track,
O1.2,Finished on top of slipped,2024-01-01,2024-12-01,complete,o1.1
",
            "{}",
        );

        derive_schedule(&mut graph, today());

        assert_eq!(graph.status_of(&id("o1.2")), Some(ScheduleStatus::AtRisk));
    }

    #[test]
    fn second_run_changes_nothing() {
        let mut graph = graph_from(
            "\
ID,Description,Start Date,End Date,Status,Dependencies
LOE1,First line,,,,
O1.1,Slipped,2024-01-01,2024-03-01,on track,
O1.2,Downstream,2024-01-01,2024-12-01,on track,o1.1
",
            "{}",
        );

        let first = derive_schedule(&mut graph, today());
        assert_eq!(first.len(), 2);
        let second = derive_schedule(&mut graph, today());
        assert_eq!(second, vec![]);
    }
}
