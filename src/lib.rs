//! # skudex
//!
//! Catalog schema inference and fuzzy product-code retrieval.
//!
//! skudex ingests messy vendor price documents (spreadsheets, CSV exports,
//! free-form quotes), infers where the catalog actually lives in them, and
//! answers ranked fuzzy lookups over the product codes it found.
//!
//! ## Quick Start
//!
//! ### As a CLI
//!
//! ```bash
//! cargo install skudex
//! skudex pricing.xlsx "how much is b-24?"
//! ```
//!
//! ### As a Library
//!
//! ```rust,no_run
//! use std::path::Path;
//! use skudex::prelude::*;
//!
//! // Build the cached catalog service
//! let store = CatalogStore::new(CatalogPolicy::default(), CacheConfig::default()).unwrap();
//! let doc = store.catalog(Path::new("pricing.xlsx")).unwrap();
//!
//! // Ask a question against the built index
//! let engine = QueryEngine::new(store.policy(), ScoringWeights::default()).unwrap();
//! let outcome = engine.search(&doc.index, "price for b24 butt", None);
//! for hit in &outcome.matches {
//!     println!("{}  {:.3}  {}", hit.record.code, hit.score, hit.kind);
//! }
//! ```
//!
//! ## Crate Structure
//!
//! skudex is composed of several crates:
//!
//! - [`skudex-core`](https://docs.rs/skudex-core) - Grid model, schema inference, code normalization, value extraction, indexing
//! - [`skudex-ingest`](https://docs.rs/skudex-ingest) - Format-dispatched loaders and the cached catalog service
//! - [`skudex-query`](https://docs.rs/skudex-query) - Signal extraction, intent detection, multi-signal ranking
//!
//! ## Features
//!
//! - **Schema inference**: header, identifier, and value columns found by scoring rows, not by convention
//! - **Code normalization**: `b-24`, `B24`, and `B 24` resolve to the same record
//! - **Match precedence**: exact beats base beats prefix beats substring, longest base first
//! - **Tolerant values**: `"$1,234.50"` and `"OPT 342"` parse; junk is skipped and logged
//! - **TTL caching**: fingerprint-keyed document cache with a swappable clock for tests

// Re-export core types
pub use skudex_core::{
    CatalogIndex, CatalogPolicy, Cell, Grid, MatchKind, ProductRecord, SchemaEngine, SchemaGuess,
    Sheet, SheetSummary,
    Error, Result,
};

// Re-export ingestion
pub use skudex_ingest::{CacheConfig, CacheStats, CatalogDocument, CatalogStore};

// Re-export query
pub use skudex_query::{
    QueryEngine, QueryIntent, QueryMatch, QueryOutcome, QuerySignals, ScoringWeights,
};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        CatalogIndex, CatalogPolicy, Cell, Grid, MatchKind, ProductRecord, SchemaEngine,
        SchemaGuess, Sheet, SheetSummary,
        Error, Result,
        CacheConfig, CacheStats, CatalogDocument, CatalogStore,
        QueryEngine, QueryIntent, QueryMatch, QueryOutcome, QuerySignals, ScoringWeights,
    };
}
