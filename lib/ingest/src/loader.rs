//! Format dispatch
//!
//! One entry point for every supported document format, keyed on file
//! extension. Whatever the format, the caller gets back the same untyped
//! [`Grid`] and schema inference takes it from there.

use std::path::Path;

use tracing::info;

use skudex_core::{CatalogPolicy, Error, Grid, Result};

use crate::csv::load_csv;
use crate::text::load_text;
use crate::workbook::load_workbook;

/// Extensions routed through the spreadsheet loader
pub const SPREADSHEET_EXTENSIONS: &[&str] = &["xlsx", "xlsm", "xlsb", "xls", "ods"];

/// Load any supported document into a grid
///
/// Dispatches on the file extension: spreadsheets via calamine, `.csv` via
/// the CSV reader, `.txt`/`.text` through code mining. A grid with nothing
/// but blank cells is rejected here, before schema inference ever runs.
pub fn load_grid(path: &Path, policy: &CatalogPolicy) -> Result<Grid> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase);

    let grid = match ext.as_deref() {
        Some(e) if SPREADSHEET_EXTENSIONS.contains(&e) => load_workbook(path)?,
        Some("csv") => load_csv(path)?,
        Some("txt") | Some("text") => load_text(path, policy)?,
        Some(other) => {
            return Err(Error::UnsupportedFormat(format!(
                "{} ({})",
                path.display(),
                other
            )))
        }
        None => {
            return Err(Error::UnsupportedFormat(format!(
                "{} (no extension)",
                path.display()
            )))
        }
    };

    if grid.is_empty() {
        return Err(Error::EmptyDocument(path.display().to_string()));
    }
    info!(
        path = %path.display(),
        sheets = grid.sheets().len(),
        "loaded document"
    );
    Ok(grid)
}
