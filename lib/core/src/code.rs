//! Product-code normalization and matching
//!
//! Makes `B24`, `b-24`, `B 24`, and `B24 BUTT` comparable. Three derived
//! forms exist per code:
//!
//! - **normalized**: uppercase, separator runs collapsed to single spaces,
//!   directional words mapped to `L`/`R`/`L/R`, trimmed. The display and
//!   primary lookup form.
//! - **canonical key**: the normalized form with every non-alphanumeric
//!   character removed, for matching across punctuation differences.
//! - **base code**: the leading `[1-3 letters][2+ digits]` of the canonical
//!   key, shared by all suffixed variants of one item. When the shape does
//!   not match, the base code is the normalized form itself.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

fn base_shape_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Z]{1,3}\d{2,}").expect("base shape pattern compiles"))
}

/// Canonicalize a raw code string
///
/// Deterministic pipeline, order matters: uppercase, collapse
/// whitespace/hyphen/underscore runs to one space, map directional tokens,
/// trim. Idempotent.
pub fn normalize(raw: &str) -> String {
    let upper = raw.to_uppercase();

    let mut collapsed = String::with_capacity(upper.len());
    let mut pending_sep = false;
    for ch in upper.chars() {
        if ch.is_whitespace() || ch == '-' || ch == '_' {
            pending_sep = true;
            continue;
        }
        if pending_sep && !collapsed.is_empty() {
            collapsed.push(' ');
        }
        pending_sep = false;
        collapsed.push(ch);
    }

    collapsed
        .split(' ')
        .map(|token| match token {
            "LEFT" => "L",
            "RIGHT" => "R",
            "LEFT/RIGHT" | "RIGHT/LEFT" => "L/R",
            other => other,
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// The punctuation-free lookup key for a code
pub fn canonical_key(raw: &str) -> String {
    normalize(raw)
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .collect()
}

/// Extract the base code shared by all variants of one item
///
/// Extraction runs over the canonical key, so `b-24`, `B 24`, and `B24 BUTT`
/// all yield `B24`. Codes that do not start with the letter+digit shape keep
/// their normalized form as their base.
pub fn base_code(raw: &str) -> String {
    let normalized = normalize(raw);
    let key: String = normalized.chars().filter(char::is_ascii_alphanumeric).collect();
    match base_shape_re().find(&key) {
        Some(m) => m.as_str().to_string(),
        None => normalized,
    }
}

/// Whether a cell value looks like a product code
///
/// Prefix match: the canonical key must start with 1-3 letters followed by
/// at least two digits. Trailing modifier text is allowed.
pub fn is_code_shaped(raw: &str) -> bool {
    base_shape_re().is_match(&canonical_key(raw))
}

/// How a query token matched a catalog code, strongest first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Normalized forms or canonical keys are equal
    Exact,
    /// Base codes are equal
    BaseExact,
    /// One canonical key is a prefix of the other
    Prefix,
    /// One canonical key contains the other
    Substring,
    /// Matched only through keyword overlap, not through the code itself
    Keyword,
}

impl MatchKind {
    /// Score contribution of this match kind, in [0, 1]
    #[inline]
    #[must_use]
    pub fn strength(&self) -> f32 {
        match self {
            MatchKind::Exact => 1.0,
            MatchKind::BaseExact => 0.85,
            MatchKind::Prefix => 0.7,
            MatchKind::Substring => 0.55,
            MatchKind::Keyword => 0.3,
        }
    }
}

impl fmt::Display for MatchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MatchKind::Exact => "exact",
            MatchKind::BaseExact => "base_exact",
            MatchKind::Prefix => "prefix",
            MatchKind::Substring => "substring",
            MatchKind::Keyword => "keyword",
        };
        write!(f, "{}", name)
    }
}

/// Classify how strongly a query token matches one candidate code
///
/// Returns the strongest applicable kind, or `None` when the two codes are
/// unrelated. Substring comparison needs at least two canonical characters
/// on the query side so single letters do not match half the catalog.
pub fn classify(query: &str, candidate: &str) -> Option<MatchKind> {
    let qn = normalize(query);
    let cn = normalize(candidate);
    if qn.is_empty() || cn.is_empty() {
        return None;
    }

    let qk = canonical_key(&qn);
    let ck = canonical_key(&cn);
    if qn == cn || (!qk.is_empty() && qk == ck) {
        return Some(MatchKind::Exact);
    }
    if base_code(&qn) == base_code(&cn) {
        return Some(MatchKind::BaseExact);
    }
    if qk.len() < 2 {
        return None;
    }
    if ck.starts_with(&qk) || qk.starts_with(&ck) {
        return Some(MatchKind::Prefix);
    }
    if ck.contains(&qk) || qk.contains(&ck) {
        return Some(MatchKind::Substring);
    }
    None
}

/// Length of the shared leading run of two canonical keys
pub fn common_prefix_len(a: &str, b: &str) -> usize {
    a.bytes().zip(b.bytes()).take_while(|(x, y)| x == y).count()
}

/// Regex source matching one code token in free text
///
/// Hyphen and underscore may separate the letter and digit parts (`b-24`)
/// but whitespace may not: three letters plus a space plus digits would
/// swallow phrases like `"and 750"`. Suffixes from the policy vocabulary may
/// trail, alternated longest-first so `L/R` wins over `L`.
pub fn token_pattern(suffixes: &[String]) -> String {
    if suffixes.is_empty() {
        return r"(?i)\b[A-Za-z]{1,3}[-_]*\d{2,}\b".to_string();
    }
    let mut alts: Vec<String> = suffixes.iter().map(|s| regex::escape(s)).collect();
    alts.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    format!(r"(?i)\b[A-Za-z]{{1,3}}[-_]*\d{{2,}}(?:[\s_-]+(?:{}))*\b", alts.join("|"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_idempotent() {
        for raw in ["B24", "b-24", "B  24", "B24 BUTT", "w3030__sd", "  CW 2442 Left "] {
            let once = normalize(raw);
            assert_eq!(normalize(&once), once, "normalize not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_normalize_separators() {
        assert_eq!(normalize("b-24"), "B 24");
        assert_eq!(normalize("B24   BUTT"), "B24 BUTT");
        assert_eq!(normalize("w3030_sd"), "W3030 SD");
        assert_eq!(normalize("  B24  "), "B24");
        assert_eq!(normalize(""), "");
    }

    #[test]
    fn test_normalize_directions() {
        assert_eq!(normalize("CW2442 Left"), "CW2442 L");
        assert_eq!(normalize("CW2442 right"), "CW2442 R");
        assert_eq!(normalize("CW2442 LEFT/RIGHT"), "CW2442 L/R");
        assert_eq!(normalize("CW2442 L/R"), "CW2442 L/R");
    }

    #[test]
    fn test_canonical_key() {
        assert_eq!(canonical_key("b-24"), "B24");
        assert_eq!(canonical_key("B24 BUTT"), "B24BUTT");
        assert_eq!(canonical_key("CW2442 L/R"), "CW2442LR");
    }

    #[test]
    fn test_base_code() {
        assert_eq!(base_code("B24"), "B24");
        assert_eq!(base_code("B24 BUTT"), "B24");
        assert_eq!(base_code("b-24"), "B24");
        assert_eq!(base_code("W3030 SD"), "W3030");
        assert_eq!(base_code("CW2442 L/R"), "CW2442");
        // No leading code shape: the normalized form is its own base
        assert_eq!(base_code("Elite Cherry"), "ELITE CHERRY");
    }

    #[test]
    fn test_base_code_stable_under_normalize() {
        for raw in ["B24 BUTT", "b-24", "W3030sd", "Elite Cherry", "UT1596"] {
            assert_eq!(base_code(raw), base_code(&normalize(raw)));
        }
    }

    #[test]
    fn test_code_shape() {
        assert!(is_code_shaped("B24"));
        assert!(is_code_shaped("b 24"));
        assert!(is_code_shaped("W3030 BUTT"));
        assert!(is_code_shaped("UT1596"));
        assert!(!is_code_shaped("Elite Cherry"));
        assert!(!is_code_shaped("753.00"));
        assert!(!is_code_shaped("Price 2024"));
        assert!(!is_code_shaped(""));
    }

    #[test]
    fn test_classify_precedence() {
        assert_eq!(classify("B24", "B24"), Some(MatchKind::Exact));
        assert_eq!(classify("b-24", "B24"), Some(MatchKind::Exact));
        assert_eq!(classify("B24", "B24 BUTT"), Some(MatchKind::BaseExact));
        assert_eq!(classify("W30", "W3036"), Some(MatchKind::Prefix));
        assert_eq!(classify("3036", "W3036"), Some(MatchKind::Substring));
        assert_eq!(classify("B24", "SB36"), None);
        assert_eq!(classify("", "B24"), None);
    }

    #[test]
    fn test_exact_match_implies_base_match() {
        let pairs = [("b-24", "B24"), ("W3030 sd", "w3030_SD"), ("CW2442 Left", "cw2442 L")];
        for (a, b) in pairs {
            assert_eq!(classify(a, b), Some(MatchKind::Exact));
            assert_eq!(base_code(a), base_code(b), "bases diverge for {:?} / {:?}", a, b);
        }
    }

    #[test]
    fn test_common_prefix_len() {
        assert_eq!(common_prefix_len("W3030", "W3036"), 4);
        assert_eq!(common_prefix_len("W3030", "B24"), 0);
        assert_eq!(common_prefix_len("B24", "B24BUTT"), 3);
    }

    #[test]
    fn test_token_pattern_matches_suffixed_codes() {
        let suffixes = vec!["BUTT".to_string(), "L".to_string(), "L/R".to_string()];
        let re = Regex::new(&token_pattern(&suffixes)).unwrap();
        let hits: Vec<&str> = re
            .find_iter("need b-24 butt and w3030 l/r by friday, not 750 alone")
            .map(|m| m.as_str())
            .collect();
        assert_eq!(hits, vec!["b-24 butt", "w3030 l/r"]);

        let bare = Regex::new(&token_pattern(&[])).unwrap();
        assert!(bare.is_match("ut1596"));
        assert!(!bare.is_match("and 750"));
    }

    #[test]
    fn test_kind_ordering() {
        assert!(MatchKind::Exact < MatchKind::BaseExact);
        assert!(MatchKind::BaseExact < MatchKind::Prefix);
        assert!(MatchKind::Prefix < MatchKind::Substring);
        assert!(MatchKind::Substring < MatchKind::Keyword);
        assert!(MatchKind::Exact.strength() > MatchKind::BaseExact.strength());
    }
}
