//! Signal extraction from query strings
//!
//! A query like `"how much is 2 x b-24 butt, around $750?"` carries several
//! independent signals: candidate product codes, explicit dollar amounts,
//! quantities, leftover keywords, and a coarse intent. The analyzer pulls
//! them apart once so every downstream scorer works from the same view.

use ahash::AHashSet;
use regex::Regex;
use serde::Serialize;

use skudex_core::{normalize, token_pattern, CatalogPolicy, Error, Result};

use crate::intent::QueryIntent;

const STOPWORDS: &[&str] = &[
    "the", "a", "an", "is", "are", "was", "be", "of", "for", "and", "or", "to", "in", "on", "at",
    "it", "its", "with", "me", "my", "please", "i", "you", "we", "can", "could", "would", "do",
    "does", "what", "whats", "which", "how", "many", "tell", "give", "get", "about", "around",
];

/// Everything the engine extracted from one query string
#[derive(Debug, Clone, Serialize)]
pub struct QuerySignals {
    pub raw: String,
    /// Normalized candidate codes, in order of appearance, deduplicated
    pub codes: Vec<String>,
    /// Dollar amounts mentioned in the query
    pub amounts: Vec<f64>,
    /// Explicit quantities, from phrasing like `2 x B24`
    pub quantities: Vec<u32>,
    /// Lowercased content words left after codes and amounts are removed
    pub keywords: Vec<String>,
    pub intent: QueryIntent,
    /// Whether the query asks for the whole variant family of a code
    pub all_variants: bool,
}

/// Compiled extraction patterns for one policy
#[derive(Debug, Clone)]
pub struct QueryAnalyzer {
    code_re: Regex,
    amount_re: Regex,
    quantity_re: Regex,
    dimension_re: Regex,
    variant_phrases: Vec<String>,
    stopwords: AHashSet<&'static str>,
}

impl QueryAnalyzer {
    /// Compile the policy's suffix table into the code pattern
    pub fn new(policy: &CatalogPolicy) -> Result<Self> {
        let code_re = Regex::new(&token_pattern(&policy.code_suffixes))
            .map_err(|e| Error::InvalidPolicy(e.to_string()))?;

        let amount_re = Regex::new(
            r"(?i)\$\s*(\d{1,3}(?:,\d{3})+(?:\.\d+)?|\d+(?:\.\d+)?)|\b(\d+(?:\.\d+)?)\s*(?:dollars?|usd)\b",
        )
        .map_err(|e| Error::InvalidPolicy(e.to_string()))?;
        let quantity_re = Regex::new(r"(?i)\b(\d+)\s*(?:x|pcs?|pieces?|units?)\b")
            .map_err(|e| Error::InvalidPolicy(e.to_string()))?;
        let dimension_re = Regex::new(r"(?i)\b\d+(?:\.\d+)?\s*x\s*\d+(?:\.\d+)?\b")
            .map_err(|e| Error::InvalidPolicy(e.to_string()))?;

        Ok(Self {
            code_re,
            amount_re,
            quantity_re,
            dimension_re,
            variant_phrases: policy.variant_phrases.clone(),
            stopwords: STOPWORDS.iter().copied().collect(),
        })
    }

    /// Pull all signals out of one query
    pub fn analyze(&self, query: &str, hint: Option<QueryIntent>) -> QuerySignals {
        let lower = query.to_lowercase();

        let mut codes: Vec<String> = Vec::new();
        for found in self.code_re.find_iter(query) {
            let code = normalize(found.as_str());
            if !codes.contains(&code) {
                codes.push(code);
            }
        }

        let mut amounts = Vec::new();
        for captures in self.amount_re.captures_iter(query) {
            let digits = captures
                .get(1)
                .or_else(|| captures.get(2))
                .map(|m| m.as_str().replace(',', ""));
            if let Some(n) = digits.and_then(|d| d.parse::<f64>().ok()) {
                amounts.push(n);
            }
        }

        // Dimension mentions like "24 x 30" would read as a quantity of 24
        let without_dimensions = self.dimension_re.replace_all(&lower, " ");
        let quantities = self
            .quantity_re
            .captures_iter(&without_dimensions)
            .filter_map(|c| c.get(1))
            .filter_map(|m| m.as_str().parse::<u32>().ok())
            .collect();

        let stripped = self.code_re.replace_all(query, " ");
        let stripped = self.amount_re.replace_all(&stripped, " ");
        let keywords = stripped
            .to_lowercase()
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| t.len() > 1)
            .filter(|t| t.chars().any(|c| c.is_ascii_alphabetic()))
            .filter(|t| !self.stopwords.contains(t))
            .map(str::to_string)
            .fold(Vec::new(), |mut acc, t| {
                if !acc.contains(&t) {
                    acc.push(t);
                }
                acc
            });

        let intent = hint.unwrap_or_else(|| QueryIntent::detect(query));
        let all_variants = intent == QueryIntent::CodeListing
            || self.variant_phrases.iter().any(|p| lower.contains(p.as_str()));

        QuerySignals { raw: query.to_string(), codes, amounts, quantities, keywords, intent, all_variants }
    }
}
