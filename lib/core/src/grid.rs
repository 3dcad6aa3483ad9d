//! Untyped tabular grid model
//!
//! A [`Grid`] is what the ingest layer hands to schema inference: an ordered
//! sequence of sheets, each a row-major grid of untyped cells. No schema is
//! assumed at this level; rows within a sheet may have different lengths and
//! every column lookup tolerates short rows.

use serde::{Deserialize, Serialize};

/// A single untyped cell as read from a source document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Empty,
    Number(f64),
    Bool(bool),
    Text(String),
}

impl Cell {
    /// True for missing cells and for text that is blank after trimming
    #[inline]
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The text content, if this is a non-blank text cell
    #[inline]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Cell::Text(s) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }

    /// Render the cell for display or header labeling
    pub fn to_text(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Number(n) => {
                if n.fract() == 0.0 && n.abs() < 1e15 {
                    format!("{}", *n as i64)
                } else {
                    format!("{}", n)
                }
            }
            Cell::Bool(b) => if *b { "TRUE".to_string() } else { "FALSE".to_string() },
            Cell::Text(s) => s.trim().to_string(),
        }
    }

    /// Text cell that does not parse as a plain number
    pub fn is_text_like(&self) -> bool {
        match self {
            Cell::Text(s) => {
                let t = s.trim();
                !t.is_empty() && t.parse::<f64>().is_err()
            }
            _ => false,
        }
    }

    /// Numeric cell, or text that parses as a plain number
    pub fn is_numeric_like(&self) -> bool {
        match self {
            Cell::Number(_) => true,
            Cell::Text(s) => s.trim().parse::<f64>().is_ok(),
            _ => false,
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::from(s.as_str())
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

/// One sheet of a document: a named, row-major grid of cells
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sheet {
    pub name: String,
    rows: Vec<Vec<Cell>>,
}

impl Sheet {
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    #[inline]
    #[must_use]
    pub fn with_rows(mut self, rows: Vec<Vec<Cell>>) -> Self {
        self.rows = rows;
        self
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Cell at (row, col); `None` when the row is missing or shorter than col
    #[inline]
    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|r| r.get(col))
    }

    #[inline]
    pub fn row(&self, idx: usize) -> Option<&[Cell]> {
        self.rows.get(idx).map(Vec::as_slice)
    }

    #[inline]
    #[must_use]
    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// Number of rows
    #[inline]
    #[must_use]
    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row
    #[inline]
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// True when the sheet has no rows or only blank cells
    pub fn is_empty(&self) -> bool {
        self.rows.iter().all(|r| r.iter().all(Cell::is_empty))
    }
}

/// An ordered collection of sheets representing one source document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    sheets: Vec<Sheet>,
}

impl Grid {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_sheets(mut self, sheets: Vec<Sheet>) -> Self {
        self.sheets = sheets;
        self
    }

    pub fn push_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    #[inline]
    #[must_use]
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Find a sheet by name
    pub fn sheet(&self, name: &str) -> Option<&Sheet> {
        self.sheets.iter().find(|s| s.name == name)
    }

    /// True when every sheet is empty
    pub fn is_empty(&self) -> bool {
        self.sheets.iter().all(Sheet::is_empty)
    }
}
