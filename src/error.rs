//! Load-time and integrity error types.
//!
//! Every load error is terminal: the caller fixes the source data and
//! reloads, nothing downstream of validation ever observes a partial sheet.
//! `GraphIntegrityError` is different in kind — it marks a broken model
//! invariant (builder stage) or a defensive check in the interactive
//! operations, not a user-facing validation outcome.

use crate::plan::id::NodeId;
use chrono::NaiveDate;

/// Fatal problems in the plan sheet or the interdependency links file.
///
/// `line` is the 1-based data-row number; the header row is not counted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The input could not be read as CSV/JSON at all.
    #[error("unreadable input: {0}")]
    Unreadable(String),

    /// Header row does not match the template columns.
    #[error(
        "invalid columns: unexpected {unexpected:?}, missing {missing:?}; \
         columns must not be modified from the template"
    )]
    Schema {
        unexpected: Vec<String>,
        missing: Vec<String>,
    },

    /// A data row has the wrong number of cells.
    #[error("row {line}: expected {expected} cells, found {found}")]
    Ragged {
        line: usize,
        expected: usize,
        found: usize,
    },

    /// The sheet has a header but no data rows.
    #[error("sheet contains no data rows")]
    Empty,

    #[error("row {line}: id {id:?} matches no id pattern (loe<n>, o<n>.<n>, io<n>.<n>.<n>)")]
    IdFormat { line: usize, id: String },

    #[error("row {line}: duplicate id {id}")]
    DuplicateId { line: usize, id: NodeId },

    #[error("row {line} ({id}): {reason}")]
    DateRange {
        line: usize,
        id: NodeId,
        reason: DateRangeReason,
    },

    #[error("row {line} ({id}): status {value:?} is not one of [{expected}]")]
    StatusDomain {
        line: usize,
        id: NodeId,
        value: String,
        expected: String,
    },

    #[error("row {line} ({id}): dependency cell {cell:?} references unknown or self id(s) {unknown:?}")]
    DependencyReference {
        line: usize,
        id: NodeId,
        cell: String,
        unknown: Vec<String>,
    },

    /// An interdependency pair in the links file could not be resolved.
    #[error("interdependency pair [{a}, {b}]: {detail}")]
    Link { a: NodeId, b: NodeId, detail: String },

    #[error(transparent)]
    Integrity(#[from] GraphIntegrityError),
}

/// Why a date check failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateRangeReason {
    #[error("{field} {value:?} is not a date (expected YYYY-MM-DD or M/D/YYYY)")]
    Unparsable { field: &'static str, value: String },

    #[error("start date {start} does not precede end date {end}")]
    Inverted { start: NaiveDate, end: NaiveDate },
}

/// A model invariant did not hold. With the validator in front this is
/// unreachable except for one data shape it cannot see: a work-item id whose
/// group row is missing from the sheet.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("graph integrity: {0}")]
pub struct GraphIntegrityError(pub String);
