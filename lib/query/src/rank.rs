//! Query execution and ranking
//!
//! [`QueryEngine::search`] resolves each code token through the index's
//! precedence ladder, pools the candidates, scores them, and returns the
//! top-K with per-token miss reporting. A query with unmatched tokens but at
//! least one match is labeled partial, never passed off as complete.

use std::collections::BTreeMap;

use ahash::AHashMap;
use serde::Serialize;
use tracing::debug;

use skudex_core::{CatalogIndex, CatalogPolicy, MatchKind, ProductRecord, Result};

use crate::intent::QueryIntent;
use crate::score::{Scorer, ScoringWeights};
use crate::signals::{QueryAnalyzer, QuerySignals};

const DEFAULT_TOP_K: usize = 10;
const SUGGESTIONS_PER_TOKEN: usize = 3;

/// One ranked hit with its provenance
#[derive(Debug, Clone, Serialize)]
pub struct QueryMatch {
    pub record: ProductRecord,
    /// Combined relevance in [0, 1]
    pub score: f32,
    /// How the record entered the candidate pool
    pub kind: MatchKind,
}

/// Everything a caller needs to answer, or to say why it cannot
#[derive(Debug, Clone, Serialize)]
pub struct QueryOutcome {
    pub matches: Vec<QueryMatch>,
    /// Code tokens that resolved to nothing
    pub unmatched: Vec<String>,
    /// Near-miss codes per unmatched token
    pub suggestions: BTreeMap<String, Vec<String>>,
    /// Some tokens matched and some did not
    pub partial: bool,
    pub signals: QuerySignals,
}

impl QueryOutcome {
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }
}

/// Analyzer, scorer, and truncation policy bundled for reuse across queries
#[derive(Debug, Clone)]
pub struct QueryEngine {
    analyzer: QueryAnalyzer,
    scorer: Scorer,
    top_k: usize,
}

impl QueryEngine {
    pub fn new(policy: &CatalogPolicy, weights: ScoringWeights) -> Result<Self> {
        let analyzer = QueryAnalyzer::new(policy)?;
        let scorer = Scorer::new(weights)
            .map_err(|e| skudex_core::Error::InvalidPolicy(e.to_string()))?;
        Ok(Self { analyzer, scorer, top_k: DEFAULT_TOP_K })
    }

    #[must_use]
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Run one query against a built index
    ///
    /// Pure read; safe to call concurrently against the same index.
    pub fn search(
        &self,
        index: &CatalogIndex,
        query: &str,
        hint: Option<QueryIntent>,
    ) -> QueryOutcome {
        let signals = self.analyzer.analyze(query, hint);
        debug!(
            codes = signals.codes.len(),
            keywords = signals.keywords.len(),
            intent = %signals.intent,
            all_variants = signals.all_variants,
            "analyzed query"
        );

        let mut pool: Vec<(usize, MatchKind)> = Vec::new();
        let mut position: AHashMap<usize, usize> = AHashMap::new();
        let mut unmatched = Vec::new();
        let mut suggestions = BTreeMap::new();

        if signals.codes.is_empty() {
            // No code tokens: every record competes on the other signals
            pool.extend((0..index.len()).map(|idx| (idx, MatchKind::Keyword)));
        } else {
            for token in &signals.codes {
                let resolved = index.resolve(token, signals.all_variants);
                if resolved.is_empty() {
                    let near = index.suggest(token, SUGGESTIONS_PER_TOKEN);
                    debug!(token = %token, suggestions = near.len(), "token matched nothing");
                    suggestions.insert(token.clone(), near);
                    unmatched.push(token.clone());
                    continue;
                }
                for (idx, kind) in resolved {
                    match position.get(&idx) {
                        Some(&at) => {
                            // Two tokens can reach one record; keep the
                            // strongest kind
                            if kind < pool[at].1 {
                                pool[at].1 = kind;
                            }
                        }
                        None => {
                            position.insert(idx, pool.len());
                            pool.push((idx, kind));
                        }
                    }
                }
            }
        }

        let mut matches: Vec<QueryMatch> = pool
            .into_iter()
            .filter_map(|(idx, kind)| index.record(idx).map(|r| (r, kind)))
            .map(|(record, kind)| QueryMatch {
                score: self.scorer.score(&signals, record),
                record: record.clone(),
                kind,
            })
            .collect();
        // Stable sort: candidates tied on score keep resolution order
        matches.sort_by(|a, b| {
            b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(self.top_k);

        let partial = !unmatched.is_empty() && !matches.is_empty();
        QueryOutcome { matches, unmatched, suggestions, partial, signals }
    }
}
