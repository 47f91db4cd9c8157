//! CSV mechanics for the plan sheet.
//!
//! Reads records, enforces the column contract, and hands raw rows to the
//! validator. The expected header, exact names in exact order:
//!
//!   ID, Description, Start Date, End Date, Status, Dependencies

use crate::error::LoadError;

/// The template's column titles, in order.
pub const EXPECTED_COLUMNS: [&str; 6] = [
    "ID",
    "Description",
    "Start Date",
    "End Date",
    "Status",
    "Dependencies",
];

/// One raw data row: the six cells as authored, plus the 1-based data-row
/// number (the header is not counted).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub line: usize,
    pub cells: [String; 6],
}

/// Read sheet text into raw rows, checking the header, row widths, and that
/// at least one data row exists.
pub fn read_rows(text: &str) -> Result<Vec<RawRow>, LoadError> {
    // Excel exports often open with a BOM.
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());
    let mut records = reader.records();

    let header = match records.next() {
        Some(Ok(record)) => record,
        Some(Err(e)) => return Err(LoadError::Unreadable(e.to_string())),
        None => return Err(LoadError::Empty),
    };
    validate_columns(&header)?;

    let mut rows = Vec::new();
    for (i, record) in records.enumerate() {
        let line = i + 1;
        let record = record.map_err(|e| LoadError::Unreadable(format!("row {line}: {e}")))?;
        if record.len() != EXPECTED_COLUMNS.len() {
            return Err(LoadError::Ragged {
                line,
                expected: EXPECTED_COLUMNS.len(),
                found: record.len(),
            });
        }
        let cells = std::array::from_fn(|c| record.get(c).unwrap_or("").to_string());
        rows.push(RawRow { line, cells });
    }
    if rows.is_empty() {
        return Err(LoadError::Empty);
    }
    Ok(rows)
}

/// Titles must match the template exactly, order included. On mismatch the
/// error reports every unexpected and every missing title at once.
fn validate_columns(header: &csv::StringRecord) -> Result<(), LoadError> {
    let actual: Vec<&str> = header.iter().map(str::trim).collect();
    if actual == EXPECTED_COLUMNS {
        return Ok(());
    }
    let unexpected = actual
        .iter()
        .filter(|title| !EXPECTED_COLUMNS.contains(title))
        .map(|title| title.to_string())
        .collect();
    let missing = EXPECTED_COLUMNS
        .iter()
        .filter(|title| !actual.contains(title))
        .map(|title| title.to_string())
        .collect();
    Err(LoadError::Schema {
        unexpected,
        missing,
    })
}
