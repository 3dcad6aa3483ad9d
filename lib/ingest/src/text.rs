//! Plain-text loading
//!
//! Quotes, emails, and notes carry catalog data without any tabular shape.
//! This loader mines product code mentions and the dollar amounts near them,
//! then emits a synthetic two-column grid so that schema inference and
//! indexing run unchanged downstream.

use std::path::Path;

use regex::Regex;
use tracing::debug;

use skudex_core::{scan_amount, token_pattern, CatalogPolicy, Cell, Error, Grid, Result, Sheet};

/// Load a plain-text file into a mined Code/Price grid
pub fn load_text(path: &Path, policy: &CatalogPolicy) -> Result<Grid> {
    let text = std::fs::read_to_string(path)?;
    let name = path
        .file_stem()
        .and_then(|s| s.to_str())
        .filter(|s| !s.is_empty())
        .unwrap_or("Document");
    grid_from_text(name, &text, policy)
}

/// Shape free-form text into a synthetic catalog sheet
///
/// Each code mention becomes one row. The price cell is filled from the text
/// between that mention and the next one on the same line, so "B24 runs $753
/// and W3030 runs $412" attributes each amount to its own code.
pub fn grid_from_text(name: &str, text: &str, policy: &CatalogPolicy) -> Result<Grid> {
    let code_re = Regex::new(&token_pattern(&policy.code_suffixes))
        .map_err(|e| Error::InvalidPolicy(format!("code pattern: {}", e)))?;

    let mut sheet = Sheet::new(name);
    sheet.push_row(vec![Cell::from("Code"), Cell::from("Price")]);
    for line in text.lines() {
        let found: Vec<_> = code_re.find_iter(line).collect();
        for (i, mention) in found.iter().enumerate() {
            let tail_end = found.get(i + 1).map_or(line.len(), |next| next.start());
            let price = scan_amount(&line[mention.end()..tail_end], policy)
                .and_then(|outcome| outcome.accepted())
                .map_or(Cell::Empty, Cell::Number);
            sheet.push_row(vec![Cell::from(mention.as_str()), price]);
        }
    }
    debug!(sheet = %sheet.name, rows = sheet.height() - 1, "mined codes from text");
    Ok(Grid::new().with_sheets(vec![sheet]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use skudex_core::CatalogIndex;

    fn policy() -> CatalogPolicy {
        CatalogPolicy::default()
    }

    #[test]
    fn test_code_with_nearby_amount() {
        let grid = grid_from_text("quote", "The B24 runs $753.00 installed.", &policy()).unwrap();
        let sheet = &grid.sheets()[0];
        assert_eq!(sheet.height(), 2);
        assert_eq!(sheet.cell(1, 0), Some(&Cell::Text("B24".to_string())));
        assert_eq!(sheet.cell(1, 1), Some(&Cell::Number(753.0)));
    }

    #[test]
    fn test_amounts_attributed_per_mention() {
        let text = "B24 at $753.00, W3030 at $412.50, and W3036 is out of stock.";
        let grid = grid_from_text("quote", text, &policy()).unwrap();
        let sheet = &grid.sheets()[0];
        assert_eq!(sheet.height(), 4);
        assert_eq!(sheet.cell(1, 1), Some(&Cell::Number(753.0)));
        assert_eq!(sheet.cell(2, 1), Some(&Cell::Number(412.5)));
        assert_eq!(sheet.cell(3, 0), Some(&Cell::Text("W3036".to_string())));
        assert_eq!(sheet.cell(3, 1), Some(&Cell::Empty));
    }

    #[test]
    fn test_suffixed_mention_survives_mining() {
        let grid =
            grid_from_text("quote", "Need the B24 BUTT door for 812 dollars.", &policy()).unwrap();
        let sheet = &grid.sheets()[0];
        assert_eq!(sheet.cell(1, 0), Some(&Cell::Text("B24 BUTT".to_string())));
        assert_eq!(sheet.cell(1, 1), Some(&Cell::Number(812.0)));
    }

    #[test]
    fn test_mined_grid_feeds_the_index() {
        let text = "Quoted: B24 $753.00, B24 BUTT $812.00.\nAlso W3030 $412.50.";
        let grid = grid_from_text("quote", text, &policy()).unwrap();
        let index = CatalogIndex::from_grid(&grid, &policy()).unwrap();
        assert_eq!(index.len(), 3);
        let hits = index.resolve("b24", false);
        assert_eq!(index.record(hits[0].0).unwrap().normalized_code, "B24");
    }

    #[test]
    fn test_text_without_codes_has_no_rows() {
        let grid = grid_from_text("memo", "Meeting moved to Tuesday at 3pm.", &policy()).unwrap();
        let sheet = &grid.sheets()[0];
        assert_eq!(sheet.height(), 1);
        let err = CatalogIndex::from_grid(&grid, &policy()).unwrap_err();
        assert!(matches!(err, Error::SchemaUnresolved(_)));
    }

    #[test]
    fn test_load_text_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("quote.txt");
        std::fs::write(&path, "Customer wants W3030 at $412.50.\n").unwrap();

        let grid = load_text(&path, &policy()).unwrap();
        assert_eq!(grid.sheets()[0].name, "quote");
        assert_eq!(grid.sheets()[0].cell(1, 1), Some(&Cell::Number(412.5)));
    }
}
