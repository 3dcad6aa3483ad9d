//! Catalog policy
//!
//! All vendor-dependent knowledge lives here as data: keyword tables, the
//! plausible price range, scan depths, confidence thresholds, fallback column
//! positions. A policy is loaded from configuration (JSON) or built from
//! [`CatalogPolicy::default`], then validated and normalized once before use.
//! Nothing downstream hardcodes a vendor.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Externally supplied configuration for schema inference and matching
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogPolicy {
    /// Tokens that suggest a row is a header row
    pub header_keywords: Vec<String>,
    /// Tokens that mark an identifier column by header name
    pub identifier_keywords: Vec<String>,
    /// Tokens that mark a value column by header name (price/grade vocabulary)
    pub value_keywords: Vec<String>,
    /// Header tokens for non-value metadata columns (flags, species, notes)
    pub metadata_keywords: Vec<String>,
    /// Header tokens for dimension columns, never value columns
    pub dimension_keywords: Vec<String>,
    /// Header token marking the start of the pricing block, if the vendor has one
    pub gate_keyword: Option<String>,
    /// Modifier tokens that may trail a base code (`B24 BUTT`)
    pub code_suffixes: Vec<String>,
    /// Query phrasings that ask for every variant of a code
    pub variant_phrases: Vec<String>,
    /// Qualifier tokens stripped from value cells before parsing (`OPT 342`)
    pub value_qualifiers: Vec<String>,
    /// Lower bound of the plausible value range, inclusive
    pub min_value: f64,
    /// Upper bound of the plausible value range, inclusive
    pub max_value: f64,
    /// How many leading rows to consider as header candidates
    pub header_scan_rows: usize,
    /// How many leading columns the statistical identifier scan probes
    pub column_scan_limit: usize,
    /// How many data rows the identifier scan samples per column
    pub code_probe_rows: usize,
    /// How many data rows the value-column scan samples per column
    pub value_probe_rows: usize,
    /// Minimum header score for a confident header guess
    pub min_header_score: f32,
    /// Minimum code-shaped cells for the statistical identifier scan to accept
    pub min_code_hits: usize,
    /// Minimum in-range numeric cells for a sampled value column to accept
    pub min_value_hits: usize,
    /// Identifier column tried when every detection strategy fails
    pub default_identifier_column: usize,
    /// Width of the contiguous value-column fallback span
    pub value_span: usize,
}

impl Default for CatalogPolicy {
    fn default() -> Self {
        Self {
            header_keywords: to_strings(&[
                "code", "item", "sku", "product", "description", "price", "grade", "elite",
                "premium", "prime", "choice", "select", "cherry", "maple", "oak", "painted",
                "base",
            ]),
            identifier_keywords: to_strings(&["sku", "code", "item", "part", "catalog", "product"]),
            value_keywords: to_strings(&[
                "price", "cost", "list", "retail", "msrp", "grade", "elite", "premium", "prime",
                "choice", "select", "cherry", "maple", "oak", "painted", "duraform",
            ]),
            metadata_keywords: to_strings(&[
                "rush", "cf", "aw", "receives", "species", "y", "n", "qty", "quantity", "notes",
                "comments",
            ]),
            dimension_keywords: to_strings(&[
                "deep", "high", "wide", "width", "height", "depth", "inch", "dimension", "size",
                "x",
            ]),
            gate_keyword: Some("aw".to_string()),
            code_suffixes: to_strings(&["BUTT", "FH", "TD", "SD", "SS", "GD", "L", "R", "L/R"]),
            variant_phrases: to_strings(&[
                "all material options",
                "all options",
                "all variants",
                "all variations",
                "full pricing",
                "full breakdown",
                "complete pricing",
                "all finishes",
                "all grades",
                "all materials",
                "every option",
                "all configurations",
            ]),
            value_qualifiers: to_strings(&["opt", "optional"]),
            min_value: 10.0,
            max_value: 1_000_000.0,
            header_scan_rows: 20,
            column_scan_limit: 10,
            code_probe_rows: 20,
            value_probe_rows: 10,
            min_header_score: 0.3,
            min_code_hits: 5,
            min_value_hits: 3,
            default_identifier_column: 2,
            value_span: 25,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl CatalogPolicy {
    /// Parse a policy from JSON, filling absent fields from the defaults,
    /// then validate and normalize it
    pub fn from_json_str(json: &str) -> Result<Self> {
        let mut policy: CatalogPolicy =
            serde_json::from_str(json).map_err(|e| Error::InvalidPolicy(e.to_string()))?;
        policy.validate_and_normalize()?;
        Ok(policy)
    }

    /// Validate bounds and lowercase the keyword tables
    ///
    /// Keyword matching throughout the engine is case-insensitive; lists are
    /// normalized here once so the hot paths compare lowercase to lowercase.
    /// Code suffixes are uppercased instead, matching normalized codes.
    pub fn validate_and_normalize(&mut self) -> Result<()> {
        if !self.min_value.is_finite() || !self.max_value.is_finite() {
            return Err(Error::InvalidPolicy("value range must be finite".to_string()));
        }
        if self.min_value < 0.0 {
            return Err(Error::InvalidPolicy("min_value must not be negative".to_string()));
        }
        if self.max_value <= self.min_value {
            return Err(Error::InvalidPolicy(format!(
                "value range is empty: {} ..= {}",
                self.min_value, self.max_value
            )));
        }
        if self.header_scan_rows == 0 {
            return Err(Error::InvalidPolicy("header_scan_rows must be at least 1".to_string()));
        }
        if self.column_scan_limit == 0 {
            return Err(Error::InvalidPolicy("column_scan_limit must be at least 1".to_string()));
        }
        if self.min_header_score < 0.0 {
            return Err(Error::InvalidPolicy("min_header_score must not be negative".to_string()));
        }

        for list in [
            &mut self.header_keywords,
            &mut self.identifier_keywords,
            &mut self.value_keywords,
            &mut self.metadata_keywords,
            &mut self.dimension_keywords,
            &mut self.variant_phrases,
            &mut self.value_qualifiers,
        ] {
            for item in list.iter_mut() {
                *item = item.trim().to_lowercase();
            }
            list.retain(|item| !item.is_empty());
        }
        if let Some(gate) = &mut self.gate_keyword {
            *gate = gate.trim().to_lowercase();
            if gate.is_empty() {
                self.gate_keyword = None;
            }
        }
        for suffix in self.code_suffixes.iter_mut() {
            *suffix = suffix.trim().to_uppercase();
        }
        self.code_suffixes.retain(|s| !s.is_empty());

        Ok(())
    }

    /// Number of distinct header keywords present in the given lowercase text
    pub fn count_header_keywords(&self, lower_text: &str) -> usize {
        self.header_keywords
            .iter()
            .filter(|k| lower_text.contains(k.as_str()))
            .count()
    }

    pub fn has_header_keyword(&self, lower_text: &str) -> bool {
        self.header_keywords.iter().any(|k| lower_text.contains(k.as_str()))
    }

    pub fn is_identifier_header(&self, label: &str) -> bool {
        let lower = label.trim().to_lowercase();
        !lower.is_empty() && self.identifier_keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    pub fn is_value_header(&self, label: &str) -> bool {
        let lower = label.trim().to_lowercase();
        !lower.is_empty() && self.value_keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// Metadata headers match whole tokens only, so `Rush CF` matches but
    /// `Rushmore Grade` does not
    pub fn is_metadata_header(&self, label: &str) -> bool {
        let lower = label.trim().to_lowercase();
        lower
            .split_whitespace()
            .any(|token| self.metadata_keywords.iter().any(|k| k == token))
    }

    /// Dimension headers match by substring for real words and by whole token
    /// for one- and two-letter markers like `x`
    pub fn is_dimension_header(&self, label: &str) -> bool {
        let lower = label.trim().to_lowercase();
        self.dimension_keywords.iter().any(|k| {
            if k.len() > 2 {
                lower.contains(k.as_str())
            } else {
                lower.split_whitespace().any(|token| token == k)
            }
        })
    }

    #[inline]
    pub fn in_range(&self, value: f64) -> bool {
        value >= self.min_value && value <= self.max_value
    }
}
