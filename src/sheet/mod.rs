//! The tabular plan-sheet layer: schema contract, row validation, and
//! write-back.

pub mod parse;
pub mod validate;
pub mod write;

pub use parse::read_rows;
pub use validate::{validate_rows, PlanRow};
pub use write::render_sheet;
