//! Query intent categories
//!
//! A coarse classification of what the user is after. Callers may pass an
//! intent hint from their own classifier; otherwise [`QueryIntent::detect`]
//! guesses from keyword buckets.

use std::fmt;
use std::str::FromStr;

use ahash::AHashSet;
use serde::{Deserialize, Serialize};

const PRICE_WORDS: &[&str] =
    &["price", "prices", "pricing", "cost", "costs", "quote", "much", "dollar", "dollars", "usd"];
const LISTING_WORDS: &[&str] = &[
    "list", "listing", "show", "codes", "skus", "items", "available", "catalog", "everything",
    "options",
];
const CALC_WORDS: &[&str] =
    &["total", "sum", "add", "calculate", "calculation", "combined", "altogether", "plus"];
const COMPARISON_WORDS: &[&str] = &[
    "compare",
    "comparison",
    "difference",
    "versus",
    "vs",
    "cheaper",
    "cheapest",
    "expensive",
    "better",
];
const LOCATION_WORDS: &[&str] =
    &["where", "sheet", "page", "tab", "location", "located", "section"];

/// What kind of answer the query is asking for
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryIntent {
    /// "how much is B24"
    PriceLookup,
    /// "list all wall cabinet codes"
    CodeListing,
    /// "total for 2 x B24 plus W3030"
    Calculation,
    /// "is B24 cheaper than B30"
    Comparison,
    /// "where is W3030 in the catalog"
    Location,
    #[default]
    General,
}

impl QueryIntent {
    /// Guess the intent from keyword buckets
    ///
    /// The bucket with the most hits wins; ties go to the earlier bucket in
    /// declaration order, and zero hits everywhere means [`General`].
    ///
    /// [`General`]: QueryIntent::General
    pub fn detect(query: &str) -> Self {
        let lower = query.to_lowercase();
        let tokens: AHashSet<&str> = lower
            .split(|c: char| !c.is_ascii_alphanumeric())
            .filter(|t| !t.is_empty())
            .collect();
        let hits = |words: &[&str]| words.iter().filter(|w| tokens.contains(**w)).count();

        let mut price = hits(PRICE_WORDS);
        if lower.contains('$') {
            price += 1;
        }
        let buckets = [
            (QueryIntent::PriceLookup, price),
            (QueryIntent::CodeListing, hits(LISTING_WORDS)),
            (QueryIntent::Calculation, hits(CALC_WORDS)),
            (QueryIntent::Comparison, hits(COMPARISON_WORDS)),
            (QueryIntent::Location, hits(LOCATION_WORDS)),
        ];

        let mut best = (QueryIntent::General, 0);
        for (intent, count) in buckets {
            if count > best.1 {
                best = (intent, count);
            }
        }
        best.0
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            QueryIntent::PriceLookup => "price_lookup",
            QueryIntent::CodeListing => "code_listing",
            QueryIntent::Calculation => "calculation",
            QueryIntent::Comparison => "comparison",
            QueryIntent::Location => "location",
            QueryIntent::General => "general",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for QueryIntent {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "price" | "price_lookup" => Ok(QueryIntent::PriceLookup),
            "listing" | "code_listing" => Ok(QueryIntent::CodeListing),
            "calculation" | "calc" => Ok(QueryIntent::Calculation),
            "comparison" | "compare" => Ok(QueryIntent::Comparison),
            "location" => Ok(QueryIntent::Location),
            "general" => Ok(QueryIntent::General),
            other => Err(format!(
                "unknown intent '{}', expected one of: price_lookup, code_listing, \
                 calculation, comparison, location, general",
                other
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_each_category() {
        assert_eq!(QueryIntent::detect("how much is b24"), QueryIntent::PriceLookup);
        assert_eq!(QueryIntent::detect("what does the B24 cost"), QueryIntent::PriceLookup);
        assert_eq!(QueryIntent::detect("list all cabinet codes"), QueryIntent::CodeListing);
        assert_eq!(QueryIntent::detect("total for b24 and w3030"), QueryIntent::Calculation);
        assert_eq!(QueryIntent::detect("compare b24 vs b30"), QueryIntent::Comparison);
        assert_eq!(QueryIntent::detect("where is w3030"), QueryIntent::Location);
        assert_eq!(QueryIntent::detect("b24"), QueryIntent::General);
    }

    #[test]
    fn test_dollar_sign_counts_toward_price() {
        assert_eq!(QueryIntent::detect("$ for b24"), QueryIntent::PriceLookup);
    }

    #[test]
    fn test_tie_goes_to_earlier_bucket() {
        // One price hit, one comparison hit
        assert_eq!(QueryIntent::detect("cost difference b24 b30"), QueryIntent::PriceLookup);
    }

    #[test]
    fn test_short_words_need_whole_tokens() {
        // "vs" buried inside a word is not a comparison
        assert_eq!(QueryIntent::detect("canvas panel b24"), QueryIntent::General);
    }

    #[test]
    fn test_from_str_round_trip() {
        for intent in [
            QueryIntent::PriceLookup,
            QueryIntent::CodeListing,
            QueryIntent::Calculation,
            QueryIntent::Comparison,
            QueryIntent::Location,
            QueryIntent::General,
        ] {
            assert_eq!(intent.to_string().parse::<QueryIntent>(), Ok(intent));
        }
        assert!("price-lookup".parse::<QueryIntent>().is_ok());
        assert!("nonsense".parse::<QueryIntent>().is_err());
    }
}
