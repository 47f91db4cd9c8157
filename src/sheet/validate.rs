//! Row-level validation: the ordered checks that turn raw cells into typed
//! plan rows.
//!
//! Checks run one at a time over the whole sheet: id format, id uniqueness,
//! date ranges, status domain, dependency references. The first failure in
//! the earliest check wins and aborts the load; nothing downstream ever
//! sees a partially valid sheet.

use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::diagnostics;
use crate::error::{DateRangeReason, GraphIntegrityError, LoadError};
use crate::plan::id::{IdKind, IdPatterns, NodeId};
use crate::plan::status::StatusDomain;
use crate::sheet::parse::RawRow;

/// A validated sheet row. Group rows carry identity and description only;
/// work rows carry the full schedule payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanRow<S> {
    Group(GroupRow),
    Objective(WorkRow<S>),
    SubObjective(WorkRow<S>),
}

impl<S> PlanRow<S> {
    pub fn work(&self) -> Option<&WorkRow<S>> {
        match self {
            PlanRow::Group(_) => None,
            PlanRow::Objective(w) | PlanRow::SubObjective(w) => Some(w),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRow {
    pub id: NodeId,
    /// The id exactly as authored; becomes the node label.
    pub label: String,
    pub description: String,
    /// Authored cell text, preserved verbatim for write-back.
    pub start_cell: String,
    pub end_cell: String,
    pub status_cell: String,
    pub deps_cell: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkRow<S> {
    /// 1-based data-row number, for messages past the validator.
    pub line: usize,
    pub id: NodeId,
    pub label: String,
    pub description: String,
    /// Parent group id, derived from the id's leading number.
    pub group: NodeId,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub status: S,
    /// Canonical, sorted, deduplicated dependency ids.
    pub dependencies: Vec<NodeId>,
    /// Authored cell text, preserved verbatim for write-back.
    pub start_cell: String,
    pub end_cell: String,
    pub deps_cell: String,
}

/// Accepted date spellings: ISO, and the slash form spreadsheets export.
fn parse_date(cell: &str) -> Option<NaiveDate> {
    let cell = cell.trim();
    NaiveDate::parse_from_str(cell, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(cell, "%m/%d/%Y"))
        .ok()
}

/// Run the row checks, in order, and assemble typed rows.
pub fn validate_rows<S: StatusDomain>(
    patterns: &IdPatterns,
    rows: &[RawRow],
) -> Result<Vec<PlanRow<S>>, LoadError> {
    // Ids classify first; every later check keys off the canonical forms.
    let mut parsed = Vec::with_capacity(rows.len());
    for row in rows {
        let raw_id = row.cells[0].trim();
        match patterns.classify(raw_id) {
            Some(p) => parsed.push(p),
            None => {
                return Err(LoadError::IdFormat {
                    line: row.line,
                    id: raw_id.to_string(),
                });
            }
        }
    }

    // Uniqueness is case-insensitive: canonical forms collide.
    let mut seen: BTreeSet<&NodeId> = BTreeSet::new();
    for (row, p) in rows.iter().zip(&parsed) {
        if !seen.insert(&p.id) {
            return Err(LoadError::DuplicateId {
                line: row.line,
                id: p.id.clone(),
            });
        }
    }

    // Dates: work rows must carry a well-formed, strictly ordered range.
    let mut dates: Vec<Option<(NaiveDate, NaiveDate)>> = Vec::with_capacity(rows.len());
    for (row, p) in rows.iter().zip(&parsed) {
        if p.kind == IdKind::Group {
            dates.push(None);
            continue;
        }
        let parse_or = |index: usize, field: &'static str| {
            parse_date(&row.cells[index]).ok_or_else(|| LoadError::DateRange {
                line: row.line,
                id: p.id.clone(),
                reason: DateRangeReason::Unparsable {
                    field,
                    value: row.cells[index].trim().to_string(),
                },
            })
        };
        let start = parse_or(2, "start date")?;
        let end = parse_or(3, "end date")?;
        if start >= end {
            return Err(LoadError::DateRange {
                line: row.line,
                id: p.id.clone(),
                reason: DateRangeReason::Inverted { start, end },
            });
        }
        dates.push(Some((start, end)));
    }

    // Status: the mode's closed label set, nothing else.
    let mut statuses: Vec<Option<S>> = Vec::with_capacity(rows.len());
    for (row, p) in rows.iter().zip(&parsed) {
        if p.kind == IdKind::Group {
            statuses.push(None);
            continue;
        }
        match S::parse(&row.cells[4]) {
            Some(status) => statuses.push(Some(status)),
            None => {
                return Err(LoadError::StatusDomain {
                    line: row.line,
                    id: p.id.clone(),
                    value: row.cells[4].trim().to_string(),
                    expected: S::LABELS.join(", "),
                });
            }
        }
    }

    // Dependencies: every token resolves inside the sheet and never to the
    // row itself. Group cells are checked too, though they emit no edges.
    let ids: BTreeSet<&NodeId> = parsed.iter().map(|p| &p.id).collect();
    let mut dependencies: Vec<Vec<NodeId>> = Vec::with_capacity(rows.len());
    for (row, p) in rows.iter().zip(&parsed) {
        let cell = row.cells[5].trim();
        let mut deps = Vec::new();
        let mut unknown = Vec::new();
        for token in cell.split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            let dep = NodeId::canonical(token);
            if dep == p.id || !ids.contains(&dep) {
                unknown.push(token.to_string());
            } else {
                deps.push(dep);
            }
        }
        if !unknown.is_empty() {
            return Err(LoadError::DependencyReference {
                line: row.line,
                id: p.id.clone(),
                cell: cell.to_string(),
                unknown,
            });
        }
        deps.sort();
        deps.dedup();
        dependencies.push(deps);
    }

    // Assemble typed rows.
    let mut out = Vec::with_capacity(rows.len());
    for (i, row) in rows.iter().enumerate() {
        let p = &parsed[i];
        let label = row.cells[0].trim().to_string();
        let description = row.cells[1].clone();
        match p.kind {
            IdKind::Group => {
                if row.cells[2..5].iter().any(|cell| !cell.trim().is_empty()) {
                    diagnostics::warn(format!(
                        "row {} ({}): group rows carry no dates or status; cells ignored",
                        row.line, p.id
                    ));
                }
                out.push(PlanRow::Group(GroupRow {
                    id: p.id.clone(),
                    label,
                    description,
                    start_cell: row.cells[2].clone(),
                    end_cell: row.cells[3].clone(),
                    status_cell: row.cells[4].clone(),
                    deps_cell: row.cells[5].clone(),
                }));
            }
            IdKind::Objective | IdKind::SubObjective => {
                let (Some((start, end)), Some(status), Some(group)) =
                    (dates[i], statuses[i], p.group.clone())
                else {
                    return Err(GraphIntegrityError(format!(
                        "row {}: work row lost its payload during validation",
                        row.line
                    ))
                    .into());
                };
                let work = WorkRow {
                    line: row.line,
                    id: p.id.clone(),
                    label,
                    description,
                    group,
                    start,
                    end,
                    status,
                    dependencies: dependencies[i].clone(),
                    start_cell: row.cells[2].clone(),
                    end_cell: row.cells[3].clone(),
                    deps_cell: row.cells[5].clone(),
                };
                out.push(match p.kind {
                    IdKind::Objective => PlanRow::Objective(work),
                    _ => PlanRow::SubObjective(work),
                });
            }
        }
    }
    Ok(out)
}
