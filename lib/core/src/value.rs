//! Tolerant numeric value extraction from catalog cells
//!
//! Catalog exports mix clean numbers with decorated text (`"$1,234.50"`,
//! `"OPT 342"`), blank markers, and junk. Extraction classifies every cell
//! into one of four outcomes so callers can decide what to skip and what to
//! surface.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::policy::CatalogPolicy;

/// Strings treated as deliberate blanks rather than parse failures
const BLANK_MARKERS: &[&str] = &["nan", "none", "n/a", "-", "--", "---", "null"];

/// Outliers are advisory beyond this many standard deviations
const OUTLIER_Z_THRESHOLD: f64 = 3.0;

fn amount_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\$?\s*(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)(?:\s*(?:dollars?|usd))?")
            .expect("amount pattern compiles")
    })
}

/// What a cell turned out to hold
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ValueOutcome {
    /// A usable number, rounded to two decimals
    Accepted(f64),
    /// Empty or a recognized blank marker; not an error
    Blank,
    /// Text with no recoverable number
    Unparsable,
    /// Parsed fine but falls outside the plausible range
    OutOfRange(f64),
}

impl ValueOutcome {
    #[inline]
    #[must_use]
    pub fn accepted(&self) -> Option<f64> {
        match self {
            ValueOutcome::Accepted(n) => Some(*n),
            _ => None,
        }
    }
}

/// Round half away from zero to two decimal places
#[inline]
pub fn round2(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

/// Classify a cell under the policy's plausible-value range
pub fn parse_cell(cell: &crate::grid::Cell, policy: &CatalogPolicy) -> ValueOutcome {
    match cell {
        crate::grid::Cell::Empty => ValueOutcome::Blank,
        crate::grid::Cell::Number(n) => check_range(*n, policy),
        crate::grid::Cell::Bool(_) => ValueOutcome::Unparsable,
        crate::grid::Cell::Text(text) => parse_text(text, policy),
    }
}

/// Classify a text field under the policy's plausible-value range
pub fn parse_text(text: &str, policy: &CatalogPolicy) -> ValueOutcome {
    let trimmed = text.trim();
    if trimmed.is_empty() || BLANK_MARKERS.contains(&trimmed.to_lowercase().as_str()) {
        return ValueOutcome::Blank;
    }

    let stripped = strip_decorations(trimmed, policy);
    if stripped.is_empty() {
        return ValueOutcome::Unparsable;
    }
    if let Ok(n) = stripped.parse::<f64>() {
        return check_range(n, policy);
    }

    // Fall back to the first embedded amount in the undecorated text
    match scan_amount(trimmed, policy) {
        Some(outcome) => outcome,
        None => ValueOutcome::Unparsable,
    }
}

/// Find the first embedded dollar amount in free-form text
///
/// Used both as the parse fallback for decorated cells and by the plain-text
/// loader, which has no cell structure at all. Returns `None` when nothing
/// number-shaped appears.
pub fn scan_amount(text: &str, policy: &CatalogPolicy) -> Option<ValueOutcome> {
    let captures = amount_re().captures(text)?;
    let digits = captures.get(1)?.as_str().replace(',', "");
    let n = digits.parse::<f64>().ok()?;
    Some(check_range(n, policy))
}

fn check_range(n: f64, policy: &CatalogPolicy) -> ValueOutcome {
    if !n.is_finite() {
        return ValueOutcome::Unparsable;
    }
    if !policy.in_range(n) {
        return ValueOutcome::OutOfRange(n);
    }
    ValueOutcome::Accepted(round2(n))
}

/// Remove policy qualifiers, currency symbols, and thousands separators
///
/// `"OPT 342"` becomes `"342"`, `"$1,234.50"` becomes `"1234.50"`. The
/// result may be empty when the cell was qualifiers all the way down.
fn strip_decorations(text: &str, policy: &CatalogPolicy) -> String {
    let kept: Vec<&str> = text
        .split_whitespace()
        .filter(|token| {
            let bare = token.trim_matches(|c| c == '$' || c == ',');
            !policy
                .value_qualifiers
                .iter()
                .any(|q| bare.eq_ignore_ascii_case(q))
        })
        .collect();
    kept.join(" ").replace(['$', ','], "")
}

/// Flag values more than three standard deviations from the mean
///
/// Advisory only. Returns the flagged `(key, value)` entries; fewer than two
/// values can never produce a flag.
pub fn flag_outliers(values: &BTreeMap<String, f64>) -> Vec<(String, f64)> {
    if values.len() < 2 {
        return Vec::new();
    }
    let n = values.len() as f64;
    let mean = values.values().sum::<f64>() / n;
    let variance = values.values().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    let sd = variance.sqrt();
    if sd == 0.0 {
        return Vec::new();
    }
    values
        .iter()
        .filter(|(_, v)| ((*v - mean) / sd).abs() > OUTLIER_Z_THRESHOLD)
        .map(|(k, v)| (k.clone(), *v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Cell;

    fn policy() -> CatalogPolicy {
        CatalogPolicy::default()
    }

    #[test]
    fn test_plain_number() {
        assert_eq!(parse_text("753.00", &policy()), ValueOutcome::Accepted(753.0));
        assert_eq!(parse_text("  42  ", &policy()), ValueOutcome::Accepted(42.0));
    }

    #[test]
    fn test_decorated_amount() {
        assert_eq!(parse_text("$1,234.50", &policy()), ValueOutcome::Accepted(1234.50));
        assert_eq!(parse_text("1,234 dollars", &policy()), ValueOutcome::Accepted(1234.0));
        assert_eq!(parse_text("about $560 usd", &policy()), ValueOutcome::Accepted(560.0));
    }

    #[test]
    fn test_qualifier_prefix() {
        assert_eq!(parse_text("OPT 342", &policy()), ValueOutcome::Accepted(342.0));
        assert_eq!(parse_text("optional 99.5", &policy()), ValueOutcome::Accepted(99.5));
    }

    #[test]
    fn test_blank_markers() {
        for marker in ["", "   ", "nan", "None", "N/A", "-", "--", "null"] {
            assert_eq!(parse_text(marker, &policy()), ValueOutcome::Blank, "{:?}", marker);
        }
    }

    #[test]
    fn test_unparsable() {
        assert_eq!(parse_text("call for quote", &policy()), ValueOutcome::Unparsable);
        assert_eq!(parse_text("OPT", &policy()), ValueOutcome::Unparsable);
        assert_eq!(parse_cell(&Cell::Bool(true), &policy()), ValueOutcome::Unparsable);
    }

    #[test]
    fn test_out_of_range() {
        // Plausibly a phone number or a serial, not a price
        assert_eq!(parse_text("45000000", &policy()), ValueOutcome::OutOfRange(45_000_000.0));
        assert_eq!(parse_text("3", &policy()), ValueOutcome::OutOfRange(3.0));
        assert_eq!(parse_cell(&Cell::Number(2.5), &policy()), ValueOutcome::OutOfRange(2.5));
    }

    #[test]
    fn test_rounding() {
        assert_eq!(parse_text("12.346", &policy()), ValueOutcome::Accepted(12.35));
        assert_eq!(parse_text("12.344", &policy()), ValueOutcome::Accepted(12.34));
        // Exact binary halves round away from zero
        assert_eq!(round2(0.125), 0.13);
        assert_eq!(round2(-0.125), -0.13);
    }

    #[test]
    fn test_scan_amount_in_prose() {
        let outcome = scan_amount("B24 base cabinet runs $1,234.50 installed", &policy());
        assert_eq!(outcome, Some(ValueOutcome::Accepted(1234.50)));
        assert_eq!(scan_amount("no numbers here", &policy()), None);
    }

    #[test]
    fn test_outlier_flagging() {
        let mut values = BTreeMap::new();
        for i in 0..30 {
            values.insert(format!("B{}", i), 100.0 + i as f64);
        }
        values.insert("ODD".to_string(), 90_000.0);
        let flagged = flag_outliers(&values);
        assert_eq!(flagged.len(), 1);
        assert_eq!(flagged[0].0, "ODD");

        let two: BTreeMap<String, f64> =
            [("A".to_string(), 10.0), ("B".to_string(), 9_000.0)].into();
        assert!(flag_outliers(&two).len() <= 2);

        let one: BTreeMap<String, f64> = [("A".to_string(), 10.0)].into();
        assert!(flag_outliers(&one).is_empty());
    }
}
