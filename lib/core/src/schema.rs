//! Schema inference over untyped grids
//!
//! Vendor exports rarely declare where the header row is, which column holds
//! the product code, or which columns carry prices. The engine guesses all
//! three from cell shapes and the policy's keyword tables. It always returns
//! a guess for a non-empty sheet; a low-confidence guess beats dropping the
//! sheet, because "no header" silently discards every row downstream.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::code::is_code_shaped;
use crate::grid::{Cell, Sheet};
use crate::policy::CatalogPolicy;
use crate::value::parse_cell;

const KEYWORD_WEIGHT: f32 = 0.3;
const TEXT_HEAVY_BONUS: f32 = 0.4;
const PROPER_NOUN_BONUS: f32 = 0.5;
const NO_CODE_BONUS: f32 = 0.3;
const PROPER_NOUN_MIN: usize = 5;

/// Score assigned when the header row comes from the leading-row keyword
/// fallback instead of full scoring
const FALLBACK_HEADER_SCORE: f32 = 0.25;

/// Which strategy located the identifier column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierEvidence {
    /// A header cell matched the identifier keyword table
    HeaderName,
    /// The column sits immediately before the configured gate column
    GateAdjacent,
    /// Sampled data cells in the column look like product codes
    CodeShapeScan,
    /// Configured fallback position, or column 0
    DefaultColumn,
}

/// A column believed to hold numeric values
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueColumn {
    pub index: usize,
    pub label: String,
}

/// The inferred layout of one sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaGuess {
    /// Scored or fallback header row; `None` means nothing looked like a
    /// header and row 0 is treated as one
    pub header_row: Option<usize>,
    pub header_score: f32,
    pub identifier_column: usize,
    pub identifier_evidence: IdentifierEvidence,
    pub value_columns: Vec<ValueColumn>,
    /// Overall confidence in [0, 1]
    pub confidence: f32,
}

impl SchemaGuess {
    /// Row treated as the header for data-start purposes
    #[inline]
    #[must_use]
    pub fn effective_header_row(&self) -> usize {
        self.header_row.unwrap_or(0)
    }

    /// First row read as data
    #[inline]
    #[must_use]
    pub fn data_start(&self) -> usize {
        self.effective_header_row() + 1
    }
}

/// Infers sheet layout under a policy
#[derive(Debug, Clone)]
pub struct SchemaEngine {
    policy: CatalogPolicy,
}

impl SchemaEngine {
    pub fn new(policy: CatalogPolicy) -> Self {
        Self { policy }
    }

    #[inline]
    pub fn policy(&self) -> &CatalogPolicy {
        &self.policy
    }

    /// Guess the layout of a sheet
    ///
    /// Returns `None` only when the sheet holds no non-empty cell at all.
    pub fn infer(&self, sheet: &Sheet) -> Option<SchemaGuess> {
        if sheet.is_empty() {
            return None;
        }

        let (header_row, header_score) = self.find_header_row(sheet);
        let effective = header_row.unwrap_or(0);
        let data_start = effective + 1;

        let (identifier_column, identifier_evidence) =
            self.find_identifier_column(sheet, effective, data_start);
        let (value_columns, value_evidence) =
            self.find_value_columns(sheet, effective, data_start, identifier_column);

        let identifier_component = match identifier_evidence {
            IdentifierEvidence::HeaderName => 0.25,
            IdentifierEvidence::GateAdjacent => 0.22,
            IdentifierEvidence::CodeShapeScan => 0.18,
            IdentifierEvidence::DefaultColumn => 0.08,
        };
        let value_component = if value_columns.is_empty() {
            0.0
        } else if value_evidence {
            0.25
        } else {
            0.1
        };
        let confidence =
            (header_score.clamp(0.0, 1.0) * 0.5 + identifier_component + value_component)
                .clamp(0.0, 1.0);

        debug!(
            sheet = %sheet.name,
            header_row = ?header_row,
            identifier_column,
            evidence = ?identifier_evidence,
            value_columns = value_columns.len(),
            confidence,
            "inferred sheet layout"
        );

        Some(SchemaGuess {
            header_row,
            header_score,
            identifier_column,
            identifier_evidence,
            value_columns,
            confidence,
        })
    }

    /// Best-scoring candidate row, ties broken by the lowest row index
    fn find_header_row(&self, sheet: &Sheet) -> (Option<usize>, f32) {
        let scan = sheet.height().min(self.policy.header_scan_rows);
        let mut best: Option<(usize, f32)> = None;
        for row_idx in 0..scan {
            let Some(row) = sheet.row(row_idx) else { continue };
            let score = self.score_header_row(row);
            if best.map_or(true, |(_, s)| score > s) {
                best = Some((row_idx, score));
            }
        }
        if let Some((row_idx, score)) = best {
            // Strictly above threshold: the no-code bonus alone must not
            // elect a header out of a sheet of plain data rows
            if score > self.policy.min_header_score {
                return (Some(row_idx), score);
            }
        }

        // Low-confidence fallback: first leading row with any domain keyword
        for row_idx in 0..sheet.height().min(3) {
            let Some(row) = sheet.row(row_idx) else { continue };
            let text = row_text(row);
            if self.policy.has_header_keyword(&text) {
                return (Some(row_idx), FALLBACK_HEADER_SCORE);
            }
        }
        (None, 0.0)
    }

    fn score_header_row(&self, row: &[Cell]) -> f32 {
        if row.iter().all(Cell::is_empty) {
            return 0.0;
        }

        let mut score = self.policy.count_header_keywords(&row_text(row)) as f32 * KEYWORD_WEIGHT;

        let text_like = row.iter().filter(|c| c.is_text_like()).count();
        let numeric_like = row.iter().filter(|c| c.is_numeric_like()).count();
        if text_like > numeric_like {
            score += TEXT_HEAVY_BONUS;
        }

        let proper_nouns = row
            .iter()
            .filter_map(Cell::as_text)
            .filter(|t| self.looks_proper_noun(t))
            .count();
        if proper_nouns >= PROPER_NOUN_MIN {
            score += PROPER_NOUN_BONUS;
        }

        let code_shaped = row.iter().filter_map(Cell::as_text).any(is_code_shaped);
        if !code_shaped {
            score += NO_CODE_BONUS;
        }

        score
    }

    /// Capitalized word or short phrase, alphabetic, not a known
    /// metadata token. The shape of a material or grade name.
    fn looks_proper_noun(&self, text: &str) -> bool {
        let trimmed = text.trim();
        trimmed.chars().count() >= 3
            && trimmed.chars().next().is_some_and(|c| c.is_ascii_uppercase())
            && trimmed.chars().all(|c| c.is_alphabetic() || c == ' ')
            && !self.policy.is_metadata_header(trimmed)
    }

    fn find_gate_column(&self, sheet: &Sheet, header_row: usize) -> Option<usize> {
        let gate = self.policy.gate_keyword.as_deref()?;
        let row = sheet.row(header_row)?;
        row.iter()
            .position(|cell| cell.as_text().is_some_and(|t| t.trim().eq_ignore_ascii_case(gate)))
    }

    /// Strategies tried in order until one succeeds
    fn find_identifier_column(
        &self,
        sheet: &Sheet,
        header_row: usize,
        data_start: usize,
    ) -> (usize, IdentifierEvidence) {
        // 1. Header cell named like an identifier
        if let Some(row) = sheet.row(header_row) {
            for (col, cell) in row.iter().enumerate() {
                if cell.as_text().is_some_and(|t| self.policy.is_identifier_header(t)) {
                    return (col, IdentifierEvidence::HeaderName);
                }
            }
        }

        // 2. Immediately before the gate column
        if let Some(gate_col) = self.find_gate_column(sheet, header_row) {
            if gate_col > 0 {
                return (gate_col - 1, IdentifierEvidence::GateAdjacent);
            }
        }

        // 3. Column whose sampled data cells look like codes
        let mut best: Option<(usize, usize)> = None;
        for col in 0..sheet.width().min(self.policy.column_scan_limit) {
            let hits = (data_start..data_start + self.policy.code_probe_rows)
                .filter_map(|row_idx| sheet.cell(row_idx, col))
                .filter_map(Cell::as_text)
                .filter(|t| is_code_shaped(t))
                .count();
            if best.map_or(true, |(_, h)| hits > h) {
                best = Some((col, hits));
            }
        }
        if let Some((col, hits)) = best {
            if hits >= self.policy.min_code_hits {
                return (col, IdentifierEvidence::CodeShapeScan);
            }
        }

        // 4. Configured fallback, validated against one sample cell
        let default_col = self.policy.default_identifier_column;
        let sample_ok = (data_start..data_start + self.policy.code_probe_rows)
            .filter_map(|row_idx| sheet.cell(row_idx, default_col))
            .find(|cell| !cell.is_empty())
            .and_then(Cell::as_text)
            .is_some_and(is_code_shaped);
        if sample_ok {
            (default_col, IdentifierEvidence::DefaultColumn)
        } else {
            (0, IdentifierEvidence::DefaultColumn)
        }
    }

    /// Returns the detected value columns and whether they came from header
    /// or data evidence rather than the positional fallback
    fn find_value_columns(
        &self,
        sheet: &Sheet,
        header_row: usize,
        data_start: usize,
        identifier_column: usize,
    ) -> (Vec<ValueColumn>, bool) {
        let header = sheet.row(header_row).unwrap_or(&[]);
        let mut columns = Vec::new();

        for col in 0..sheet.width() {
            if col == identifier_column {
                continue;
            }
            let Some(label) = header.get(col).and_then(Cell::as_text) else { continue };
            let label = label.trim();
            if self.policy.is_metadata_header(label) || self.policy.is_dimension_header(label) {
                continue;
            }
            if self.policy.is_value_header(label) {
                columns.push(ValueColumn { index: col, label: label.to_string() });
                continue;
            }
            // Unlabeled-as-price material columns: a proper-noun header over
            // cells that parse as in-range numbers
            if self.looks_proper_noun(label) {
                let hits = (data_start..data_start + self.policy.value_probe_rows)
                    .filter_map(|row_idx| sheet.cell(row_idx, col))
                    .filter(|cell| {
                        matches!(
                            parse_cell(cell, &self.policy),
                            crate::value::ValueOutcome::Accepted(_)
                        )
                    })
                    .count();
                if hits >= self.policy.min_value_hits {
                    columns.push(ValueColumn { index: col, label: label.to_string() });
                }
            }
        }
        if !columns.is_empty() {
            return (columns, true);
        }

        // Positional fallback: a contiguous span after the gate column when
        // one exists, otherwise after the identifier column
        let start = match self.find_gate_column(sheet, header_row) {
            Some(gate_col) => gate_col + 1,
            None => identifier_column + 1,
        };
        let end = (start + self.policy.value_span).min(sheet.width());
        let columns = (start..end)
            .filter(|&col| col != identifier_column)
            .map(|col| {
                let label = header
                    .get(col)
                    .and_then(Cell::as_text)
                    .map(|t| t.trim().to_string())
                    .unwrap_or_else(|| format!("Column {}", col + 1));
                ValueColumn { index: col, label }
            })
            .collect();
        (columns, false)
    }
}

fn row_text(row: &[Cell]) -> String {
    row.iter()
        .filter_map(Cell::as_text)
        .map(|t| t.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Sheet;

    fn engine() -> SchemaEngine {
        SchemaEngine::new(CatalogPolicy::default())
    }

    fn text_row(cells: &[&str]) -> Vec<Cell> {
        cells.iter().map(|&c| Cell::from(c)).collect()
    }

    /// Title junk above the real header, as vendor exports tend to have
    fn cabinet_sheet() -> Sheet {
        Sheet::new("Cabinets").with_rows(vec![
            text_row(&["Vendor Export 2024", "", ""]),
            text_row(&["", "", ""]),
            text_row(&["Code", "Elite Cherry", "Choice Painted"]),
            text_row(&["B24", "753.00", "479.88"]),
            text_row(&["B24 BUTT", "", ""]),
            text_row(&["W3030", "412.00", "380.10"]),
        ])
    }

    #[test]
    fn test_header_row_behind_title_junk() {
        let guess = engine().infer(&cabinet_sheet()).unwrap();
        assert_eq!(guess.header_row, Some(2));
        assert_eq!(guess.data_start(), 3);
        assert_eq!(guess.identifier_column, 0);
        assert_eq!(guess.identifier_evidence, IdentifierEvidence::HeaderName);
        let indices: Vec<usize> = guess.value_columns.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![1, 2]);
        assert_eq!(guess.value_columns[0].label, "Elite Cherry");
    }

    #[test]
    fn test_simple_sku_price_layout() {
        let sheet = Sheet::new("Sheet1").with_rows(vec![
            text_row(&["SKU", "Price"]),
            vec![Cell::from("B24"), Cell::from(753.0)],
            vec![Cell::from("W3030"), Cell::from(412.5)],
        ]);
        let guess = engine().infer(&sheet).unwrap();
        assert_eq!(guess.header_row, Some(0));
        assert_eq!(guess.identifier_column, 0);
        assert_eq!(guess.value_columns.len(), 1);
        assert_eq!(guess.value_columns[0].index, 1);
        assert!(guess.confidence > 0.5);
    }

    #[test]
    fn test_gate_adjacency() {
        let mut rows = vec![text_row(&["Line", "Used", "AW", "Elite Cherry"])];
        for i in 0..6 {
            rows.push(vec![
                Cell::from("x"),
                Cell::from(format!("B{}", 20 + i).as_str()),
                Cell::from("y"),
                Cell::from(100.0 + i as f64),
            ]);
        }
        let sheet = Sheet::new("Gated").with_rows(rows);
        let guess = engine().infer(&sheet).unwrap();
        assert_eq!(guess.identifier_column, 1);
        assert_eq!(guess.identifier_evidence, IdentifierEvidence::GateAdjacent);
    }

    #[test]
    fn test_statistical_code_scan() {
        let mut rows = vec![text_row(&["Region", "Material"])];
        for i in 0..6 {
            rows.push(vec![Cell::from(format!("B{}", 12 + i).as_str()), Cell::from(50.0)]);
        }
        let sheet = Sheet::new("Scan").with_rows(rows);
        let guess = engine().infer(&sheet).unwrap();
        assert_eq!(guess.identifier_column, 0);
        assert_eq!(guess.identifier_evidence, IdentifierEvidence::CodeShapeScan);
    }

    #[test]
    fn test_default_column_fallback() {
        // Too few code rows for the scan; configured default column holds a code
        let sheet = Sheet::new("Sparse").with_rows(vec![
            text_row(&["", "", "", ""]),
            text_row(&["note", "note", "B24", "753.00"]),
            text_row(&["note", "note", "W3030", "412.00"]),
        ]);
        let guess = engine().infer(&sheet).unwrap();
        assert_eq!(guess.identifier_column, 2);
        assert_eq!(guess.identifier_evidence, IdentifierEvidence::DefaultColumn);

        // Default column sample fails validation; fall to column 0
        let sheet = Sheet::new("Sparse2").with_rows(vec![
            text_row(&["", "", "", ""]),
            text_row(&["B24", "x", "note", "753.00"]),
        ]);
        let guess = engine().infer(&sheet).unwrap();
        assert_eq!(guess.identifier_column, 0);
        assert_eq!(guess.identifier_evidence, IdentifierEvidence::DefaultColumn);
    }

    #[test]
    fn test_header_totality_on_headerless_sheet() {
        // Pure data, nothing remotely header-like in any row
        let rows: Vec<Vec<Cell>> = (0..5)
            .map(|i| vec![Cell::from(format!("B{}", 12 + i).as_str()), Cell::from(100.0 + i as f64)])
            .collect();
        let sheet = Sheet::new("Data").with_rows(rows);
        let guess = engine().infer(&sheet).unwrap();
        assert_eq!(guess.header_row, None);
        assert_eq!(guess.effective_header_row(), 0);
        assert_eq!(guess.data_start(), 1);
    }

    #[test]
    fn test_empty_sheet_yields_no_guess() {
        let sheet = Sheet::new("Empty").with_rows(vec![text_row(&["", ""]), text_row(&[""])]);
        assert!(engine().infer(&sheet).is_none());
        assert!(engine().infer(&Sheet::new("Blank")).is_none());
    }

    #[test]
    fn test_metadata_and_dimension_columns_excluded() {
        let sheet = Sheet::new("Meta").with_rows(vec![
            text_row(&["Code", "Width", "Rush CF", "Price"]),
            text_row(&["B24", "24", "Y", "753.00"]),
        ]);
        let guess = engine().infer(&sheet).unwrap();
        let indices: Vec<usize> = guess.value_columns.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![3]);
    }

    #[test]
    fn test_fallback_value_span_after_gate() {
        let mut rows = vec![text_row(&["Zone", "Used", "AW", "", ""])];
        for i in 0..6 {
            rows.push(vec![
                Cell::from("x"),
                Cell::from(format!("B{}", 20 + i).as_str()),
                Cell::from("y"),
                Cell::from(100.0),
                Cell::from(120.0),
            ]);
        }
        let sheet = Sheet::new("Span").with_rows(rows);
        let guess = engine().infer(&sheet).unwrap();
        let indices: Vec<usize> = guess.value_columns.iter().map(|c| c.index).collect();
        assert_eq!(indices, vec![3, 4]);
        assert!(guess.value_columns.iter().all(|c| c.label.starts_with("Column ")));
    }

    #[test]
    fn test_proper_noun_shapes() {
        let e = engine();
        assert!(e.looks_proper_noun("Elite Cherry"));
        assert!(e.looks_proper_noun("Maple"));
        assert!(!e.looks_proper_noun("B24"));
        assert!(!e.looks_proper_noun("aw"));
        assert!(!e.looks_proper_noun("Y"));
        assert!(!e.looks_proper_noun("Species"));
    }
}
