/// Corpus scanning
///
/// For each document, every K1 keyword is tested. Each K1 hit then tests K2
/// and K3 under their aggregation modes. With the default policy K2 stops at
/// its first match and K3 takes every match, repeated for every K1 hit.

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::core::corpus::Document;
use crate::core::keywords::{Keyword, KeywordSet};
use crate::core::matcher::{AggregationMode, CompiledKeywordSet, MatchOptions};
use crate::core::overlap::CorpusStats;
use crate::error::{EngineError, Result};

/// Aggregation policy for the second and third keyword sets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanPolicy {
    pub k2_mode: AggregationMode,
    pub k3_mode: AggregationMode,
}

impl Default for ScanPolicy {
    fn default() -> Self {
        Self {
            k2_mode: AggregationMode::FirstMatch,
            k3_mode: AggregationMode::AllMatches,
        }
    }
}

/// Matches recorded for one K1 keyword of one document
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct K1Hit {
    pub k1: String,
    pub k2: Vec<String>,
    pub k3: Vec<String>,
}

/// Per-document match result: one entry per matching K1 keyword, in K1 order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchOutcome {
    pub doc_id: usize,
    pub hits: Vec<K1Hit>,
}

pub struct CorpusScanner {
    k1: CompiledKeywordSet,
    k2: CompiledKeywordSet,
    k3: CompiledKeywordSet,
    options: MatchOptions,
    policy: ScanPolicy,
}

impl CorpusScanner {
    pub fn new(
        k1: &KeywordSet,
        k2: &KeywordSet,
        k3: &KeywordSet,
        options: &MatchOptions,
        policy: ScanPolicy,
    ) -> Result<Self> {
        Ok(Self {
            k1: CompiledKeywordSet::compile(k1, options)?,
            k2: CompiledKeywordSet::compile(k2, options)?,
            k3: CompiledKeywordSet::compile(k3, options)?,
            options: *options,
            policy,
        })
    }

    /// Match one document against all three keyword sets
    ///
    /// Returns `None` when no K1 keyword matches.
    pub fn match_document(&self, doc_id: usize, text: &str) -> Option<MatchOutcome> {
        let lowered;
        let content = if self.options.case_sensitive {
            text
        } else {
            lowered = text.to_lowercase();
            &lowered
        };

        let k1_hits: Vec<&Keyword> = self.k1.all_matches(content).collect();
        if k1_hits.is_empty() {
            return None;
        }

        // K2 and K3 depend only on the text, so they are matched once and
        // repeated for every K1 hit
        let k2 = self.collect(&self.k2, content, self.policy.k2_mode);
        let k3 = self.collect(&self.k3, content, self.policy.k3_mode);

        let hits = k1_hits
            .into_iter()
            .map(|k1| K1Hit {
                k1: k1.as_str().to_string(),
                k2: k2.clone(),
                k3: k3.clone(),
            })
            .collect();

        Some(MatchOutcome { doc_id, hits })
    }

    fn collect(&self, set: &CompiledKeywordSet, content: &str, mode: AggregationMode) -> Vec<String> {
        set.matching(content, mode)
            .into_iter()
            .map(|keyword| keyword.as_str().to_string())
            .collect()
    }

    /// Scan a range of documents whose first index is `offset`
    fn scan_shard(&self, offset: usize, documents: &[Document]) -> CorpusStats {
        let mut stats = CorpusStats::new();
        for (i, document) in documents.iter().enumerate() {
            if let Some(outcome) = self.match_document(offset + i, &document.text) {
                stats.record(&outcome);
            }
        }
        stats
    }

    /// Sequential scan over the whole corpus
    pub fn scan(&self, documents: &[Document]) -> CorpusStats {
        info!("Scanning {} documents", documents.len());
        let stats = self.scan_shard(0, documents);
        debug!(
            "Scan finished: {} denominator, {} numerator documents",
            stats.denominator_ids.len(),
            stats.numerator_ids.len()
        );
        stats
    }

    /// Scan with documents sharded across `workers` threads
    ///
    /// Shards are contiguous and merged in index order, so the result equals
    /// [`scan`](Self::scan), including the tie order of ranked tables.
    pub fn scan_parallel(&self, documents: &[Document], workers: usize) -> Result<CorpusStats> {
        if workers <= 1 || documents.len() < 2 {
            return Ok(self.scan(documents));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| EngineError::ThreadPool(e.to_string()))?;

        let chunk_size = (documents.len() + workers - 1) / workers;
        info!(
            "Scanning {} documents with {} workers ({} per shard)",
            documents.len(),
            workers,
            chunk_size
        );

        let shards: Vec<CorpusStats> = pool.install(|| {
            documents
                .par_chunks(chunk_size)
                .enumerate()
                .map(|(shard, chunk)| self.scan_shard(shard * chunk_size, chunk))
                .collect()
        });

        let mut stats = CorpusStats::new();
        for shard in shards {
            stats.merge(shard);
        }
        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::overlap::KeywordPair;

    fn scanner(k1: &str, k2: &str, k3: &str, policy: ScanPolicy) -> CorpusScanner {
        CorpusScanner::new(
            &KeywordSet::normalize(k1),
            &KeywordSet::normalize(k2),
            &KeywordSet::normalize(k3),
            &MatchOptions::default(),
            policy,
        )
        .unwrap()
    }

    fn docs(texts: &[&str]) -> Vec<Document> {
        texts.iter().map(|t| Document::from_text(*t)).collect()
    }

    #[test]
    fn test_no_k1_hit_yields_none() {
        let scanner = scanner("cancer", "cure", "", ScanPolicy::default());
        assert!(scanner.match_document(0, "nothing relevant").is_none());
    }

    #[test]
    fn test_text_is_matched_case_insensitively() {
        let scanner = scanner("cancer", "cure", "", ScanPolicy::default());
        let outcome = scanner.match_document(0, "CANCER and a Cure").unwrap();
        assert_eq!(outcome.hits[0].k1, "cancer");
        assert_eq!(outcome.hits[0].k2, vec!["cure".to_string()]);
    }

    #[test]
    fn test_k2_first_match_k3_all_matches() {
        let scanner = scanner("cancer", "cure, therapy", "trial, mouse", ScanPolicy::default());
        let outcome = scanner
            .match_document(0, "cancer therapy cure in a mouse trial")
            .unwrap();

        assert_eq!(outcome.hits.len(), 1);
        assert_eq!(outcome.hits[0].k2, vec!["cure".to_string()]);
        assert_eq!(outcome.hits[0].k3, vec!["trial".to_string(), "mouse".to_string()]);
    }

    #[test]
    fn test_every_k1_hit_carries_the_same_k2_and_k3() {
        let scanner = scanner("cancer, tumor", "cure, therapy", "trial, mouse", ScanPolicy::default());
        let outcome = scanner
            .match_document(0, "tumor and cancer therapy cure in a mouse trial")
            .unwrap();

        assert_eq!(outcome.hits.len(), 2);
        assert_eq!(outcome.hits[0].k1, "cancer");
        assert_eq!(outcome.hits[1].k1, "tumor");
        for hit in &outcome.hits {
            assert_eq!(hit.k2, vec!["cure".to_string()]);
            assert_eq!(hit.k3, vec!["trial".to_string(), "mouse".to_string()]);
        }
    }

    #[test]
    fn test_double_count_across_k1_hits() {
        let scanner = scanner("cancer, tumor", "cure", "", ScanPolicy::default());
        let stats = scanner.scan(&docs(&["a tumor and cancer cure"]));

        assert_eq!(stats.numerator_ids.len(), 1);
        assert_eq!(stats.k2_counts.get(&"cure".to_string()), Some(2));
        assert_eq!(stats.pair_counts.get(&KeywordPair::new("cancer", "cure")), Some(1));
        assert_eq!(stats.pair_counts.get(&KeywordPair::new("tumor", "cure")), Some(1));
    }

    #[test]
    fn test_all_matches_policy_for_k2() {
        let policy = ScanPolicy {
            k2_mode: AggregationMode::AllMatches,
            k3_mode: AggregationMode::FirstMatch,
        };
        let scanner = scanner("cancer", "cure, therapy", "trial, mouse", policy);
        let stats = scanner.scan(&docs(&["cancer therapy cure in a mouse trial"]));

        assert_eq!(stats.k2_counts.get(&"cure".to_string()), Some(1));
        assert_eq!(stats.k2_counts.get(&"therapy".to_string()), Some(1));
        assert_eq!(stats.k3_counts.get(&"trial".to_string()), Some(1));
        assert_eq!(stats.k3_counts.get(&"mouse".to_string()), None);
    }

    #[test]
    fn test_parallel_scan_equals_sequential() {
        let texts: Vec<String> = (0..37)
            .map(|i| match i % 5 {
                0 => format!("doc {} cancer cure", i),
                1 => format!("doc {} tumor therapy trial", i),
                2 => format!("doc {} cancer tumor drug", i),
                3 => format!("doc {} unrelated", i),
                _ => format!("doc {} drug cure tumor", i),
            })
            .collect();
        let documents: Vec<Document> = texts.iter().map(|t| Document::from_text(t.as_str())).collect();
        let scanner = scanner("cancer, tumor", "cure, therapy, drug", "trial, drug", ScanPolicy::default());

        let sequential = scanner.scan(&documents);
        for workers in [2, 3, 8] {
            let parallel = scanner.scan_parallel(&documents, workers).unwrap();
            assert_eq!(parallel, sequential, "workers = {}", workers);
        }
    }

    #[test]
    fn test_empty_keyword_sets() {
        let scanner = scanner("", "cure", "", ScanPolicy::default());
        let stats = scanner.scan(&docs(&["cancer cure"]));
        assert!(stats.denominator_ids.is_empty());
        assert_eq!(stats.overlap_ratio(), 0.0);
    }
}
