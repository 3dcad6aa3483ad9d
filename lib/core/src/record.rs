//! Catalog product records

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::code::{base_code, normalize};

/// One product row lifted out of a catalog sheet
///
/// Values are keyed by column label in a `BTreeMap` so serialized output and
/// iteration order stay deterministic across runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Code as it appeared in the document
    pub code: String,
    /// Uppercased, separator-collapsed form used for display and matching
    pub normalized_code: String,
    /// Shared stem of all suffixed variants of this item
    pub base_code: String,
    /// Extracted numeric values by column label
    pub values: BTreeMap<String, f64>,
    /// Sheet the row came from
    pub sheet: String,
    /// Zero-based row within that sheet
    pub row: usize,
    /// Confidence of the schema guess that produced this record
    pub source_confidence: f32,
}

impl ProductRecord {
    pub fn new(code: impl Into<String>, sheet: impl Into<String>, row: usize) -> Self {
        let code = code.into();
        let normalized_code = normalize(&code);
        let base = base_code(&normalized_code);
        Self {
            code,
            normalized_code,
            base_code: base,
            values: BTreeMap::new(),
            sheet: sheet.into(),
            row,
            source_confidence: 0.0,
        }
    }

    #[must_use]
    pub fn with_value(mut self, label: impl Into<String>, value: f64) -> Self {
        self.values.insert(label.into(), value);
        self
    }

    #[must_use]
    pub fn with_confidence(mut self, confidence: f32) -> Self {
        self.source_confidence = confidence.clamp(0.0, 1.0);
        self
    }

    /// Whether the code carries a suffix beyond its base
    #[inline]
    #[must_use]
    pub fn is_variant(&self) -> bool {
        self.normalized_code != self.base_code
    }

    #[inline]
    #[must_use]
    pub fn has_values(&self) -> bool {
        !self.values.is_empty()
    }

    /// Cheapest extracted value, with its column label
    #[must_use]
    pub fn lowest_value(&self) -> Option<(&str, f64)> {
        self.values
            .iter()
            .min_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
            .map(|(label, value)| (label.as_str(), *value))
    }

    /// Flattened text used for keyword scoring
    pub fn search_text(&self) -> String {
        let mut text = String::with_capacity(64);
        text.push_str(&self.normalized_code);
        for (label, value) in &self.values {
            text.push(' ');
            text.push_str(label);
            text.push(' ');
            text.push_str(&format!("{:.2}", value));
        }
        text.push(' ');
        text.push_str(&self.sheet);
        text
    }
}
