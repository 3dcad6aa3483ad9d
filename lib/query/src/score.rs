//! Relevance scoring strategies
//!
//! Each signal family scores in isolation behind [`SignalStrategy`], so a
//! heuristic can be tested and retuned without touching the others. The
//! [`Scorer`] combines whatever strategies apply to a query: weights are
//! renormalized over the present signals, so a query with no keywords is not
//! penalized for the keyword strategy sitting out.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use skudex_core::{classify, MatchKind, ProductRecord};

use crate::intent::QueryIntent;
use crate::signals::QuerySignals;

/// Longest phrase run that still increases the phrase score
const PHRASE_RUN_CAP: usize = 4;

/// Relative weight of each signal family
///
/// Policy, not identity. Retuning these changes ranking flavor, never
/// correctness; they are renormalized before combining.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    pub identifier: f32,
    pub keyword: f32,
    pub intent: f32,
    pub phrase: f32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self { identifier: 0.5, keyword: 0.2, intent: 0.2, phrase: 0.1 }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeightsError {
    #[error("scoring weight '{0}' must not be negative")]
    Negative(&'static str),
    #[error("scoring weights must not all be zero")]
    ZeroTotal,
}

impl ScoringWeights {
    pub fn validate(&self) -> Result<(), WeightsError> {
        for (name, value) in [
            ("identifier", self.identifier),
            ("keyword", self.keyword),
            ("intent", self.intent),
            ("phrase", self.phrase),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(WeightsError::Negative(name));
            }
        }
        if self.identifier + self.keyword + self.intent + self.phrase <= 0.0 {
            return Err(WeightsError::ZeroTotal);
        }
        Ok(())
    }

    /// Weights in strategy order
    fn as_array(&self) -> [f32; 4] {
        [self.identifier, self.keyword, self.intent, self.phrase]
    }
}

/// One independently testable scoring heuristic
pub trait SignalStrategy {
    fn name(&self) -> &'static str;

    /// Score in [0, 1], or `None` when the query carries no signal this
    /// strategy can use
    fn score(&self, signals: &QuerySignals, record: &ProductRecord) -> Option<f32>;
}

/// How strongly any query code matches the record's code
pub struct IdentifierMatch;

impl SignalStrategy for IdentifierMatch {
    fn name(&self) -> &'static str {
        "identifier"
    }

    fn score(&self, signals: &QuerySignals, record: &ProductRecord) -> Option<f32> {
        if signals.codes.is_empty() {
            return None;
        }
        let best: Option<MatchKind> = signals
            .codes
            .iter()
            .filter_map(|code| classify(code, &record.normalized_code))
            .min();
        Some(best.map_or(0.0, |kind| kind.strength()))
    }
}

/// Fraction of query keywords found in the record's text
pub struct KeywordOverlap;

impl SignalStrategy for KeywordOverlap {
    fn name(&self) -> &'static str {
        "keyword"
    }

    fn score(&self, signals: &QuerySignals, record: &ProductRecord) -> Option<f32> {
        if signals.keywords.is_empty() {
            return None;
        }
        let text = record.search_text().to_lowercase();
        let hits = signals.keywords.iter().filter(|k| text.contains(k.as_str())).count();
        Some((hits as f32 / signals.keywords.len() as f32).min(1.0))
    }
}

/// Fixed fit between the intent category and what the record carries
pub struct IntentFit;

impl SignalStrategy for IntentFit {
    fn name(&self) -> &'static str {
        "intent"
    }

    fn score(&self, signals: &QuerySignals, record: &ProductRecord) -> Option<f32> {
        let fit = match signals.intent {
            QueryIntent::PriceLookup | QueryIntent::Calculation => {
                if record.has_values() {
                    1.0
                } else {
                    0.2
                }
            }
            QueryIntent::CodeListing => 1.0,
            QueryIntent::Comparison => match record.values.len() {
                0 => 0.2,
                1 => 0.6,
                _ => 1.0,
            },
            // Every record carries sheet and row provenance
            QueryIntent::Location => 0.8,
            QueryIntent::General => 0.5,
        };
        Some(fit)
    }
}

/// Longest shared contiguous word run between query and record text
pub struct PhraseOverlap;

impl SignalStrategy for PhraseOverlap {
    fn name(&self) -> &'static str {
        "phrase"
    }

    fn score(&self, signals: &QuerySignals, record: &ProductRecord) -> Option<f32> {
        let query_words: Vec<String> =
            signals.raw.to_lowercase().split_whitespace().map(str::to_string).collect();
        if query_words.len() < 2 {
            return None;
        }
        let record_words: Vec<String> =
            record.search_text().to_lowercase().split_whitespace().map(str::to_string).collect();

        let mut longest = 0;
        for qi in 0..query_words.len() {
            for ri in 0..record_words.len() {
                let mut run = 0;
                while qi + run < query_words.len()
                    && ri + run < record_words.len()
                    && query_words[qi + run] == record_words[ri + run]
                {
                    run += 1;
                }
                longest = longest.max(run);
            }
        }
        if longest < 2 {
            return Some(0.0);
        }
        Some(longest.min(PHRASE_RUN_CAP) as f32 / PHRASE_RUN_CAP as f32)
    }
}

fn strategies() -> [&'static dyn SignalStrategy; 4] {
    [&IdentifierMatch, &KeywordOverlap, &IntentFit, &PhraseOverlap]
}

/// Weighted combination of the signal strategies
#[derive(Debug, Clone)]
pub struct Scorer {
    weights: ScoringWeights,
}

impl Scorer {
    pub fn new(weights: ScoringWeights) -> Result<Self, WeightsError> {
        weights.validate()?;
        Ok(Self { weights })
    }

    #[inline]
    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    /// Combined relevance of one record, in [0, 1]
    ///
    /// Absent strategies drop out of both numerator and denominator.
    pub fn score(&self, signals: &QuerySignals, record: &ProductRecord) -> f32 {
        let weights = self.weights.as_array();
        let mut weighted = 0.0_f32;
        let mut total_weight = 0.0_f32;
        for (strategy, weight) in strategies().into_iter().zip(weights) {
            if let Some(value) = strategy.score(signals, record) {
                weighted += value.clamp(0.0, 1.0) * weight;
                total_weight += weight;
            }
        }
        if total_weight <= 0.0 {
            return 0.0;
        }
        (weighted / total_weight).clamp(0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::signals::QueryAnalyzer;
    use skudex_core::CatalogPolicy;

    fn analyze(query: &str) -> QuerySignals {
        let mut policy = CatalogPolicy::default();
        policy.validate_and_normalize().unwrap();
        QueryAnalyzer::new(&policy).unwrap().analyze(query, None)
    }

    fn priced_record() -> ProductRecord {
        ProductRecord::new("B24", "Base Cabinets", 3)
            .with_value("Elite Cherry", 753.0)
            .with_value("Choice Painted", 479.88)
    }

    fn bare_record() -> ProductRecord {
        ProductRecord::new("B24 BUTT", "Base Cabinets", 4)
    }

    #[test]
    fn test_identifier_strategy_ranks_by_kind() {
        let signals = analyze("price for b24");
        let exact = IdentifierMatch.score(&signals, &priced_record()).unwrap();
        let base = IdentifierMatch.score(&signals, &bare_record()).unwrap();
        let miss = IdentifierMatch
            .score(&signals, &ProductRecord::new("SB36", "S", 0))
            .unwrap();
        assert_eq!(exact, 1.0);
        assert_eq!(base, 0.85);
        assert_eq!(miss, 0.0);
    }

    #[test]
    fn test_identifier_strategy_absent_without_codes() {
        let signals = analyze("cherry cabinet pricing");
        assert!(IdentifierMatch.score(&signals, &priced_record()).is_none());
    }

    #[test]
    fn test_keyword_strategy_fraction() {
        let signals = analyze("cherry price listing");
        let score = KeywordOverlap.score(&signals, &priced_record()).unwrap();
        // "cherry" hits, "price" and "listing" do not appear in the text
        assert!(score > 0.0 && score < 1.0);

        let none = analyze("b24");
        assert!(KeywordOverlap.score(&none, &priced_record()).is_none());
    }

    #[test]
    fn test_intent_fit_table() {
        let mut signals = analyze("how much is b24");
        assert_eq!(signals.intent, QueryIntent::PriceLookup);
        assert_eq!(IntentFit.score(&signals, &priced_record()), Some(1.0));
        assert_eq!(IntentFit.score(&signals, &bare_record()), Some(0.2));

        signals.intent = QueryIntent::Comparison;
        assert_eq!(IntentFit.score(&signals, &priced_record()), Some(1.0));
        let one_value = ProductRecord::new("B24", "S", 0).with_value("Price", 10.0);
        assert_eq!(IntentFit.score(&signals, &one_value), Some(0.6));

        signals.intent = QueryIntent::General;
        assert_eq!(IntentFit.score(&signals, &bare_record()), Some(0.5));
    }

    #[test]
    fn test_phrase_strategy_runs() {
        let signals = analyze("elite cherry for the kitchen");
        let score = PhraseOverlap.score(&signals, &priced_record()).unwrap();
        // "elite cherry" is a two-word run out of the four-word cap
        assert_eq!(score, 0.5);

        let single = analyze("b24");
        assert!(PhraseOverlap.score(&single, &priced_record()).is_none());

        let unrelated = analyze("nothing shared here");
        assert_eq!(PhraseOverlap.score(&unrelated, &priced_record()), Some(0.0));
    }

    #[test]
    fn test_combined_score_bounded() {
        let scorer = Scorer::new(ScoringWeights::default()).unwrap();
        for query in [
            "b24",
            "how much is b24 butt",
            "elite cherry price for b24 and w3030",
            "compare b24 vs b30 totals",
            "",
        ] {
            let signals = analyze(query);
            for record in [priced_record(), bare_record()] {
                let score = scorer.score(&signals, &record);
                assert!((0.0..=1.0).contains(&score), "score {} for {:?}", score, query);
            }
        }
    }

    #[test]
    fn test_missing_signal_renormalizes() {
        let scorer = Scorer::new(ScoringWeights::default()).unwrap();
        // No keywords at all: identifier, intent, and phrase still combine
        let signals = analyze("b24");
        assert!(signals.keywords.is_empty());
        let score = scorer.score(&signals, &priced_record());
        // identifier 1.0 and intent 0.5 over their weight share
        let expected = (1.0 * 0.5 + 0.5 * 0.2) / 0.7;
        assert!((score - expected).abs() < 1e-6);
    }

    #[test]
    fn test_weight_validation() {
        assert!(ScoringWeights::default().validate().is_ok());
        let negative = ScoringWeights { identifier: -0.1, ..Default::default() };
        assert_eq!(negative.validate(), Err(WeightsError::Negative("identifier")));
        let zero = ScoringWeights { identifier: 0.0, keyword: 0.0, intent: 0.0, phrase: 0.0 };
        assert_eq!(zero.validate(), Err(WeightsError::ZeroTotal));
        assert!(Scorer::new(zero).is_err());
    }
}
