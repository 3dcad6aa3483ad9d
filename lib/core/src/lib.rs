//! # skudex Core
//!
//! Core library for the skudex catalog engine.
//!
//! This crate turns untyped spreadsheet grids into queryable product
//! catalogs:
//!
//! - [`Grid`] - Untyped sheet-of-cells input model
//! - [`CatalogPolicy`] - Externally supplied keyword tables and thresholds
//! - [`SchemaEngine`] - Header/identifier/value-column inference
//! - [`CatalogIndex`] - Records addressable by normalized and base code
//! - [`MatchKind`] - The exact/base/prefix/substring precedence ladder
//!
//! ## Example
//!
//! ```rust
//! use skudex_core::{CatalogIndex, CatalogPolicy, Cell, Grid, Sheet};
//!
//! // A minimal catalog sheet
//! let sheet = Sheet::new("Catalog").with_rows(vec![
//!     vec![Cell::from("SKU"), Cell::from("Price")],
//!     vec![Cell::from("B24"), Cell::from(753.0)],
//!     vec![Cell::from("B24 BUTT"), Cell::from(812.0)],
//! ]);
//! let grid = Grid::new().with_sheets(vec![sheet]);
//!
//! // Infer the layout and build the index
//! let index = CatalogIndex::from_grid(&grid, &CatalogPolicy::default()).unwrap();
//!
//! // Punctuation variants resolve to the same record
//! let matches = index.resolve("b-24", false);
//! assert_eq!(index.record(matches[0].0).unwrap().normalized_code, "B24");
//! ```

pub mod code;
pub mod error;
pub mod grid;
pub mod index;
pub mod policy;
pub mod record;
pub mod schema;
pub mod value;

pub use code::{
    base_code, canonical_key, classify, common_prefix_len, is_code_shaped, normalize,
    token_pattern, MatchKind,
};
pub use error::{Error, Result};
pub use grid::{Cell, Grid, Sheet};
pub use index::{CatalogIndex, SheetSummary};
pub use policy::CatalogPolicy;
pub use record::ProductRecord;
pub use schema::{IdentifierEvidence, SchemaEngine, SchemaGuess, ValueColumn};
pub use value::{flag_outliers, parse_cell, parse_text, round2, scan_amount, ValueOutcome};
