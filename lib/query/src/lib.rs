//! # skudex Query
//!
//! Query-side library for the skudex catalog engine: signal extraction,
//! intent classification, relevance scoring, and ranked search over a built
//! [`CatalogIndex`](skudex_core::CatalogIndex).
//!
//! - [`QueryAnalyzer`] - Codes, amounts, quantities, and keywords out of raw text
//! - [`QueryIntent`] - Coarse categories with keyword-bucket detection
//! - [`Scorer`] / [`SignalStrategy`] - Independently testable scoring heuristics
//! - [`QueryEngine`] - Resolution, pooling, scoring, and top-K truncation
//!
//! ## Example
//!
//! ```rust
//! use skudex_core::{CatalogIndex, CatalogPolicy, Cell, Grid, Sheet};
//! use skudex_query::{QueryEngine, ScoringWeights};
//!
//! let grid = Grid::new().with_sheets(vec![Sheet::new("Catalog").with_rows(vec![
//!     vec![Cell::from("SKU"), Cell::from("Price")],
//!     vec![Cell::from("B24"), Cell::from(753.0)],
//! ])]);
//! let index = CatalogIndex::from_grid(&grid, &CatalogPolicy::default()).unwrap();
//!
//! let engine = QueryEngine::new(&CatalogPolicy::default(), ScoringWeights::default()).unwrap();
//! let outcome = engine.search(&index, "how much is b-24?", None);
//! assert_eq!(outcome.matches[0].record.normalized_code, "B24");
//! ```

pub mod intent;
pub mod rank;
pub mod score;
pub mod signals;

pub use intent::QueryIntent;
pub use rank::{QueryEngine, QueryMatch, QueryOutcome};
pub use score::{
    IdentifierMatch, IntentFit, KeywordOverlap, PhraseOverlap, Scorer, ScoringWeights,
    SignalStrategy, WeightsError,
};
pub use signals::{QueryAnalyzer, QuerySignals};
