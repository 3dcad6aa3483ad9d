//! Spreadsheet loading
//!
//! All formats calamine can open (xlsx, xlsm, xlsb, xls, ods) come through
//! here. Every sheet is loaded; deciding which ones hold catalog data is
//! schema inference's job, not the loader's.

use std::path::Path;

use calamine::{open_workbook_auto, Data, Reader};
use tracing::debug;

use skudex_core::{Cell, Error, Grid, Result, Sheet};

/// Load every worksheet of a spreadsheet into a grid
///
/// Cell coordinates are kept absolute: a used range that starts below or
/// right of A1 is padded with empty cells, so record rows cite the same row
/// the user sees in the document.
pub fn load_workbook(path: &Path) -> Result<Grid> {
    let mut workbook = open_workbook_auto(path).map_err(|e| Error::Workbook(e.to_string()))?;
    let names = workbook.sheet_names().to_owned();

    let mut grid = Grid::new();
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| Error::Workbook(format!("sheet '{}': {}", name, e)))?;
        let (row_offset, col_offset) =
            range.start().map_or((0, 0), |(r, c)| (r as usize, c as usize));

        let mut sheet = Sheet::new(name);
        for _ in 0..row_offset {
            sheet.push_row(Vec::new());
        }
        for row in range.rows() {
            let mut cells = vec![Cell::Empty; col_offset];
            cells.extend(row.iter().map(cell_from_data));
            sheet.push_row(cells);
        }
        debug!(sheet = %sheet.name, rows = sheet.height(), "loaded worksheet");
        grid.push_sheet(sheet);
    }
    Ok(grid)
}

pub(crate) fn cell_from_data(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::from(s.as_str()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::from(dt.to_string()),
        Data::DateTimeIso(s) => Cell::from(s.as_str()),
        Data::DurationIso(s) => Cell::from(s.as_str()),
        // Formula errors carry no value worth keeping
        Data::Error(_) => Cell::Empty,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use calamine::CellErrorType;

    #[test]
    fn test_cell_mapping() {
        assert_eq!(cell_from_data(&Data::String("B24".to_string())), Cell::Text("B24".to_string()));
        assert_eq!(cell_from_data(&Data::Float(753.0)), Cell::Number(753.0));
        assert_eq!(cell_from_data(&Data::Int(42)), Cell::Number(42.0));
        assert_eq!(cell_from_data(&Data::Bool(true)), Cell::Bool(true));
        assert_eq!(cell_from_data(&Data::Empty), Cell::Empty);
        assert_eq!(cell_from_data(&Data::Error(CellErrorType::NA)), Cell::Empty);
    }

    #[test]
    fn test_missing_file_is_a_workbook_error() {
        let err = load_workbook(Path::new("/definitely/not/here.xlsx")).unwrap_err();
        assert!(matches!(err, Error::Workbook(_)));
    }
}
