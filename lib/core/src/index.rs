//! The queryable catalog index
//!
//! Built once per document from a [`Grid`] and a [`CatalogPolicy`], then
//! read-only. Records are addressable by normalized code, canonical key, and
//! base code; token resolution walks the match-precedence ladder over those
//! maps.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::code::{base_code, canonical_key, common_prefix_len, is_code_shaped, normalize, MatchKind};
use crate::error::{Error, Result};
use crate::grid::{Cell, Grid};
use crate::policy::CatalogPolicy;
use crate::record::ProductRecord;
use crate::schema::{SchemaEngine, SchemaGuess};
use crate::value::{flag_outliers, parse_cell, ValueOutcome};

/// Jaccard cutoff for trigram-based suggestions
const SUGGEST_SIMILARITY: f64 = 0.3;

/// What one sheet contributed to the index
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSummary {
    pub name: String,
    pub guess: SchemaGuess,
    pub records: usize,
}

/// Immutable index over every product record extracted from one document
#[derive(Debug, Clone, Default)]
pub struct CatalogIndex {
    records: Vec<ProductRecord>,
    by_normalized: AHashMap<String, Vec<usize>>,
    by_canonical: AHashMap<String, Vec<usize>>,
    by_base: AHashMap<String, Vec<usize>>,
    sheets: Vec<SheetSummary>,
}

impl CatalogIndex {
    /// Infer each sheet's layout and lift its rows into records
    ///
    /// Sheet-level failures are recovered by moving on to the next sheet; the
    /// only hard error is a document where no sheet yields a single record.
    pub fn from_grid(grid: &Grid, policy: &CatalogPolicy) -> Result<Self> {
        let engine = SchemaEngine::new(policy.clone());
        let mut index = CatalogIndex::default();

        for sheet in grid.sheets() {
            let Some(guess) = engine.infer(sheet) else {
                debug!(sheet = %sheet.name, "skipping empty sheet");
                continue;
            };
            let before = index.records.len();
            index.ingest_sheet(sheet, &guess, policy);
            let extracted = index.records.len() - before;
            if extracted == 0 {
                warn!(sheet = %sheet.name, "sheet produced no records");
            }
            index.sheets.push(SheetSummary {
                name: sheet.name.clone(),
                guess,
                records: extracted,
            });
        }

        if index.records.is_empty() {
            return Err(Error::SchemaUnresolved(format!(
                "no usable rows across {} sheet(s)",
                grid.sheets().len()
            )));
        }
        debug!(records = index.records.len(), sheets = index.sheets.len(), "built catalog index");
        Ok(index)
    }

    fn ingest_sheet(&mut self, sheet: &crate::grid::Sheet, guess: &SchemaGuess, policy: &CatalogPolicy) {
        for row_idx in guess.data_start()..sheet.height() {
            let Some(raw_code) = sheet
                .cell(row_idx, guess.identifier_column)
                .and_then(Cell::as_text)
                .map(str::trim)
            else {
                continue;
            };
            // Section titles and notes land in the identifier column too;
            // only code-shaped cells start a record
            if !is_code_shaped(raw_code) {
                continue;
            }

            let mut record = ProductRecord::new(raw_code, sheet.name.clone(), row_idx)
                .with_confidence(guess.confidence);
            for column in &guess.value_columns {
                let Some(cell) = sheet.cell(row_idx, column.index) else { continue };
                match parse_cell(cell, policy) {
                    ValueOutcome::Accepted(value) => {
                        record.values.insert(column.label.clone(), value);
                    }
                    ValueOutcome::Blank => {}
                    ValueOutcome::Unparsable => {
                        debug!(
                            sheet = %sheet.name,
                            row = row_idx,
                            column = %column.label,
                            "skipping unparsable value cell"
                        );
                    }
                    ValueOutcome::OutOfRange(value) => {
                        debug!(
                            sheet = %sheet.name,
                            row = row_idx,
                            column = %column.label,
                            value,
                            "skipping out-of-range value"
                        );
                    }
                }
            }
            for (label, value) in flag_outliers(&record.values) {
                warn!(
                    code = %record.normalized_code,
                    column = %label,
                    value,
                    "value far from the record's mean"
                );
            }
            self.push_record(record);
        }
    }

    fn push_record(&mut self, record: ProductRecord) {
        let idx = self.records.len();
        self.by_normalized.entry(record.normalized_code.clone()).or_default().push(idx);
        self.by_canonical
            .entry(canonical_key(&record.normalized_code))
            .or_default()
            .push(idx);
        self.by_base.entry(record.base_code.clone()).or_default().push(idx);
        self.records.push(record);
    }

    /// Resolve a query token to records, walking the precedence ladder
    ///
    /// Exact beats base-exact beats prefix beats substring; lower rungs are
    /// not consulted once a higher rung matched. `all_variants` merges the
    /// exact and base-exact rungs so a bare code surfaces its whole variant
    /// family, base form first.
    pub fn resolve(&self, token: &str, all_variants: bool) -> Vec<(usize, MatchKind)> {
        let qn = normalize(token);
        if qn.is_empty() {
            return Vec::new();
        }
        let qk = canonical_key(&qn);
        let qb = base_code(&qn);

        let mut out: Vec<(usize, MatchKind)> = Vec::new();
        for idx in self.by_normalized.get(&qn).into_iter().flatten() {
            out.push((*idx, MatchKind::Exact));
        }
        for idx in self.by_canonical.get(&qk).into_iter().flatten() {
            if !out.iter().any(|(i, _)| i == idx) {
                out.push((*idx, MatchKind::Exact));
            }
        }

        let exact_hit = !out.is_empty();
        if !exact_hit || all_variants {
            for idx in self.by_base.get(&qb).into_iter().flatten() {
                if !out.iter().any(|(i, _)| i == idx) {
                    out.push((*idx, MatchKind::BaseExact));
                }
            }
        }
        if !out.is_empty() {
            self.order_matches(&qk, &mut out);
            return out;
        }

        // Prefix and substring live on the canonical keys; single-character
        // tokens would match half the catalog and are rejected outright
        if qk.len() < 2 {
            return Vec::new();
        }
        for (key, ids) in &self.by_canonical {
            let kind = if key.starts_with(&qk) || qk.starts_with(key.as_str()) {
                MatchKind::Prefix
            } else if key.contains(&qk) || qk.contains(key.as_str()) {
                MatchKind::Substring
            } else {
                continue;
            };
            for idx in ids {
                out.push((*idx, kind));
            }
        }
        self.order_matches(&qk, &mut out);
        out
    }

    /// Kind first, then the longest shared canonical prefix, then the less
    /// modified form. Ambiguity between base codes sharing a leading run
    /// resolves toward the longest match.
    fn order_matches(&self, qk: &str, out: &mut Vec<(usize, MatchKind)>) {
        out.sort_by(|a, b| {
            let ra = &self.records[a.0];
            let rb = &self.records[b.0];
            let pa = common_prefix_len(qk, &canonical_key(&ra.normalized_code));
            let pb = common_prefix_len(qk, &canonical_key(&rb.normalized_code));
            a.1.cmp(&b.1)
                .then_with(|| pb.cmp(&pa))
                .then_with(|| ra.is_variant().cmp(&rb.is_variant()))
                .then_with(|| ra.normalized_code.len().cmp(&rb.normalized_code.len()))
                .then_with(|| a.0.cmp(&b.0))
        });
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[inline]
    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    #[inline]
    pub fn record(&self, idx: usize) -> Option<&ProductRecord> {
        self.records.get(idx)
    }

    #[inline]
    pub fn summaries(&self) -> &[SheetSummary] {
        &self.sheets
    }

    /// Every known normalized code, sorted and deduplicated
    pub fn codes(&self) -> Vec<&str> {
        let mut codes: Vec<&str> = self.by_normalized.keys().map(String::as_str).collect();
        codes.sort_unstable();
        codes
    }

    /// Codes grouped under their base code, both levels sorted
    pub fn base_groups(&self) -> BTreeMap<&str, Vec<&str>> {
        let mut groups: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
        for record in &self.records {
            let entry = groups.entry(record.base_code.as_str()).or_default();
            if !entry.contains(&record.normalized_code.as_str()) {
                entry.push(record.normalized_code.as_str());
            }
        }
        for codes in groups.values_mut() {
            codes.sort_unstable();
        }
        groups
    }

    /// Codes under a caller-supplied category prefix
    pub fn codes_with_prefix(&self, prefix: &str) -> Vec<&str> {
        let wanted = canonical_key(prefix);
        if wanted.is_empty() {
            return self.codes();
        }
        self.codes()
            .into_iter()
            .filter(|code| canonical_key(code).starts_with(&wanted))
            .collect()
    }

    /// All records stored under a code, exact forms only
    pub fn records_for(&self, code: &str) -> Vec<&ProductRecord> {
        self.resolve(code, false)
            .into_iter()
            .filter(|(_, kind)| *kind == MatchKind::Exact)
            .filter_map(|(idx, _)| self.records.get(idx))
            .collect()
    }

    /// Near-miss codes for an unmatched token
    ///
    /// Trigram similarity over the normalized codes, falling back to a
    /// shared two-character lead when nothing clears the cutoff.
    pub fn suggest(&self, token: &str, limit: usize) -> Vec<String> {
        let target = canonical_key(token);
        if target.is_empty() || limit == 0 {
            return Vec::new();
        }

        let mut scored: Vec<(f64, &str)> = self
            .by_normalized
            .keys()
            .map(|code| (trigram_similarity(&target, &canonical_key(code)), code.as_str()))
            .filter(|(sim, _)| *sim >= SUGGEST_SIMILARITY)
            .collect();
        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal).then_with(|| a.1.cmp(b.1))
        });
        if !scored.is_empty() {
            return scored.into_iter().take(limit).map(|(_, code)| code.to_string()).collect();
        }

        let lead: String = target.chars().take(2).collect();
        let mut near: Vec<&str> = self
            .by_normalized
            .keys()
            .filter(|code| canonical_key(code).starts_with(&lead))
            .map(String::as_str)
            .collect();
        near.sort_unstable();
        near.into_iter().take(limit).map(str::to_string).collect()
    }
}

fn trigram_similarity(a: &str, b: &str) -> f64 {
    let ta = trigrams(a);
    let tb = trigrams(b);
    if ta.is_empty() || tb.is_empty() {
        return 0.0;
    }
    let shared = ta.iter().filter(|t| tb.contains(*t)).count();
    let union = ta.len() + tb.len() - shared;
    if union == 0 {
        0.0
    } else {
        shared as f64 / union as f64
    }
}

/// Padded character trigrams, so short codes still share their lead
fn trigrams(s: &str) -> ahash::AHashSet<String> {
    let padded: Vec<char> = format!("  {}  ", s).chars().collect();
    padded.windows(3).map(|w| w.iter().collect()).collect()
}
