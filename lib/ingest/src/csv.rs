//! CSV loading
//!
//! Headers are not assumed: many vendor exports open with title junk, so
//! the header row is schema inference's call. Ragged rows are tolerated and
//! numeric-looking fields are sniffed into numbers up front.

use std::path::Path;

use tracing::debug;

use skudex_core::{Cell, Error, Grid, Result, Sheet};

/// Load a CSV file into a single-sheet grid named after the file
pub fn load_csv(path: &Path) -> Result<Grid> {
    let mut reader = ::csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .map_err(|e| Error::Csv(e.to_string()))?;

    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("Sheet1");
    let mut sheet = Sheet::new(name);
    for record in reader.records() {
        let record = record.map_err(|e| Error::Csv(e.to_string()))?;
        sheet.push_row(record.iter().map(cell_from_field).collect());
    }
    debug!(sheet = %sheet.name, rows = sheet.height(), "loaded csv");
    Ok(Grid::new().with_sheets(vec![sheet]))
}

fn cell_from_field(field: &str) -> Cell {
    let trimmed = field.trim();
    if trimmed.is_empty() {
        return Cell::Empty;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return Cell::Bool(true);
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return Cell::Bool(false);
    }
    if let Ok(n) = trimmed.parse::<f64>() {
        return Cell::Number(n);
    }
    Cell::from(field)
}
