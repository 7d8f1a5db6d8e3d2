/// Overlap statistics over per-document match outcomes
///
/// Pure aggregation: no matching happens here. The denominator set holds
/// documents with any K1 hit, the numerator set those that also had a K2 hit.

use std::collections::BTreeSet;

use serde::Serialize;

use crate::core::counts::CountTable;
use crate::core::scanner::MatchOutcome;

/// A K1 keyword and the K2 keyword it co-occurred with
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct KeywordPair {
    pub k1: String,
    pub k2: String,
}

impl KeywordPair {
    pub fn new(k1: impl Into<String>, k2: impl Into<String>) -> Self {
        Self {
            k1: k1.into(),
            k2: k2.into(),
        }
    }
}

impl std::fmt::Display for KeywordPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} and {}", self.k1, self.k2)
    }
}

/// Corpus-wide results of one scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorpusStats {
    pub denominator_ids: BTreeSet<usize>,
    pub numerator_ids: BTreeSet<usize>,
    pub k1_counts: CountTable<String>,
    pub k2_counts: CountTable<String>,
    pub k3_counts: CountTable<String>,
    pub pair_counts: CountTable<KeywordPair>,
}

impl CorpusStats {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold one document's outcome into the statistics
    ///
    /// Every K1 hit counts separately, so a document matching several K1
    /// keywords contributes its K2, K3 and pair counts once per K1 hit while
    /// appearing only once in each id set.
    pub fn record(&mut self, outcome: &MatchOutcome) {
        for hit in &outcome.hits {
            self.k1_counts.increment(hit.k1.clone());
            self.denominator_ids.insert(outcome.doc_id);

            for k2 in &hit.k2 {
                self.k2_counts.increment(k2.clone());
                self.pair_counts.increment(KeywordPair::new(&hit.k1, k2));
                self.numerator_ids.insert(outcome.doc_id);
            }

            for k3 in &hit.k3 {
                self.k3_counts.increment(k3.clone());
            }
        }
    }

    /// Merge statistics from another shard: set union and exact count addition
    pub fn merge(&mut self, other: CorpusStats) {
        self.denominator_ids.extend(other.denominator_ids);
        self.numerator_ids.extend(other.numerator_ids);
        self.k1_counts.merge(other.k1_counts);
        self.k2_counts.merge(other.k2_counts);
        self.k3_counts.merge(other.k3_counts);
        self.pair_counts.merge(other.pair_counts);
    }

    /// Percentage of denominator documents that are also in the numerator
    ///
    /// Zero when no document matched K1.
    pub fn overlap_ratio(&self) -> f64 {
        if self.denominator_ids.is_empty() {
            return 0.0;
        }
        self.numerator_ids.len() as f64 * 100.0 / self.denominator_ids.len() as f64
    }

    pub fn ranked_k1(&self) -> Vec<(&String, usize)> {
        self.k1_counts.ranked()
    }

    pub fn ranked_k2(&self) -> Vec<(&String, usize)> {
        self.k2_counts.ranked()
    }

    pub fn ranked_k3(&self) -> Vec<(&String, usize)> {
        self.k3_counts.ranked()
    }

    pub fn ranked_pairs(&self) -> Vec<(&KeywordPair, usize)> {
        self.pair_counts.ranked()
    }
}
