//! # skudex Ingest
//!
//! Ingestion layer for the skudex catalog engine: format-dispatched loaders
//! that turn documents into untyped [`Grid`](skudex_core::Grid)s, and the
//! cached [`CatalogStore`] service that owns loading, schema inference, and
//! index construction end to end.
//!
//! - [`load_grid`] - One entry point across xlsx/xls/ods/csv/txt
//! - [`DocumentCache`] - TTL cache with swappable [`Clock`] for tests
//! - [`CatalogStore`] - Fingerprint-keyed read-through catalog service
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::path::Path;
//! use skudex_core::CatalogPolicy;
//! use skudex_ingest::{CacheConfig, CatalogStore};
//!
//! let store = CatalogStore::new(CatalogPolicy::default(), CacheConfig::default()).unwrap();
//! let doc = store.catalog(Path::new("pricing.xlsx")).unwrap();
//! println!("{} records", doc.index.len());
//! ```

pub mod cache;
pub mod csv;
pub mod loader;
pub mod store;
pub mod text;
pub mod workbook;

pub use cache::{CacheConfig, CacheStats, Clock, DocumentCache, ManualClock, SystemClock};
pub use csv::load_csv;
pub use loader::{load_grid, SPREADSHEET_EXTENSIONS};
pub use store::{CatalogDocument, CatalogStore};
pub use text::{grid_from_text, load_text};
pub use workbook::load_workbook;
