//! Write the sheet of record back out after a batch recompute.
//!
//! Only status cells change. Every other cell is emitted exactly as
//! authored: dates keep their spelling, dependency lists their order and
//! spacing, ids their case.

use crate::plan::graph::PlanGraph;
use crate::plan::status::StatusDomain;
use crate::sheet::parse::EXPECTED_COLUMNS;
use crate::sheet::validate::PlanRow;

/// Render rows plus the model's current statuses as CSV text.
pub fn render_sheet<S: StatusDomain>(
    rows: &[PlanRow<S>],
    graph: &PlanGraph<S>,
) -> crate::Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPECTED_COLUMNS)?;
    for row in rows {
        match row {
            PlanRow::Group(g) => {
                writer.write_record([
                    g.label.as_str(),
                    g.description.as_str(),
                    g.start_cell.as_str(),
                    g.end_cell.as_str(),
                    g.status_cell.as_str(),
                    g.deps_cell.as_str(),
                ])?;
            }
            PlanRow::Objective(w) | PlanRow::SubObjective(w) => {
                let status = graph.status_of(&w.id).unwrap_or(w.status);
                writer.write_record([
                    w.label.as_str(),
                    w.description.as_str(),
                    w.start_cell.as_str(),
                    w.end_cell.as_str(),
                    status.label(),
                    w.deps_cell.as_str(),
                ])?;
            }
        }
    }
    let bytes = writer.into_inner()?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plan::id::{IdPatterns, NodeId};
    use crate::plan::links::LinkSpec;
    use crate::plan::status::ScheduleStatus;
    use crate::sheet::parse::read_rows;
    use crate::sheet::validate::validate_rows;
    use pretty_assertions::assert_eq;

    #[test]
    fn write_back_touches_only_status_cells() {
        let sheet = "\
ID,Description,Start Date,End Date,Status,Dependencies
LOE1,First line,,,,
O1.1,Alpha,2024-01-01,3/1/2024,On Track,
O1.2,Beta,2024-01-01,2024-04-01,complete,\"O1.1 , o1.1\"
";
        let raw = read_rows(sheet).unwrap();
        let patterns = IdPatterns::new().unwrap();
        let rows = validate_rows::<ScheduleStatus>(&patterns, &raw).unwrap();
        let mut graph = PlanGraph::build(&rows, &LinkSpec::default()).unwrap();

        graph
            .work_mut(&NodeId::canonical("o1.1"))
            .unwrap()
            .status = ScheduleStatus::Overdue;

        let out = render_sheet(&rows, &graph).unwrap();
        assert_eq!(
            out,
            "\
ID,Description,Start Date,End Date,Status,Dependencies
LOE1,First line,,,,
O1.1,Alpha,2024-01-01,3/1/2024,overdue,
O1.2,Beta,2024-01-01,2024-04-01,complete,\"O1.1 , o1.1\"
"
        );
    }
}
