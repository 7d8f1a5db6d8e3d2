/// Paper Trends - keyword overlap and trend analysis for document corpora
///
/// This library measures how often topic-defining keyword sets occur and
/// co-occur across a corpus: the share of documents on one topic that also
/// cover a second one, per-keyword and per-pair counts, and a year-bucketed
/// time series of the overlapping documents.

pub mod config;
pub mod core;
pub mod error;
pub mod utils;

pub use crate::config::EngineConfig;
pub use crate::core::corpus::{load_corpus, Document};
pub use crate::core::keywords::KeywordSet;
pub use crate::core::matcher::{AggregationMode, MatchOptions};
pub use crate::core::overlap::{CorpusStats, KeywordPair};
pub use crate::core::scanner::{CorpusScanner, ScanPolicy};
pub use crate::core::temporal::YearBuckets;
pub use crate::error::{EngineError, Result};

use log::info;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Everything computed for one pair of keyword fields
#[derive(Debug, Clone, PartialEq)]
pub struct OverlapAnalysis {
    pub k1: KeywordSet,
    pub k2: KeywordSet,
    pub stats: CorpusStats,
    /// Numerator documents bucketed by creation year
    pub years: YearBuckets,
    /// Percentage of K1 documents that also match K2
    pub ratio: f64,
}

/// Run the overlap analysis for two comma-separated keyword fields
///
/// The scan and the yearly bucketing form one unit: a malformed timestamp in
/// any numerator document fails the whole analysis.
///
/// # Arguments
///
/// * `documents` - The corpus, document `i` at index `i`
/// * `field1` - Keywords of the base topic (K1)
/// * `field2` - Keywords of the second topic (K2)
/// * `config` - Matching policy, K3 keywords, year cutoff and worker count
pub fn analyze_overlap(
    documents: &[Document],
    field1: &str,
    field2: &str,
    config: &EngineConfig,
) -> Result<OverlapAnalysis> {
    let k1 = KeywordSet::normalize(field1);
    let k2 = KeywordSet::normalize(field2);
    let k3 = config.k3();
    info!(
        "Analyzing overlap of {} K1, {} K2 and {} K3 keywords",
        k1.len(),
        k2.len(),
        k3.len()
    );

    let scanner = CorpusScanner::new(&k1, &k2, &k3, &config.match_options(), config.scan_policy())?;
    let stats = scanner.scan_parallel(documents, config.resolved_workers())?;

    let years = crate::core::temporal::bucket_by_year(documents, &stats.numerator_ids, config.year_cutoff)?;
    let ratio = stats.overlap_ratio();

    Ok(OverlapAnalysis {
        k1,
        k2,
        stats,
        years,
        ratio,
    })
}

/// Command-line application functionality
pub mod app {
    use std::path::Path;

    use indicatif::ProgressBar;

    use crate::config::EngineConfig;
    use crate::core::directory::{DirectoryScanReport, DirectoryScanner};
    use crate::core::keywords::KeywordSet;
    use crate::utils::file_utils::{collect_eligible_files, TextExtractor};

    /// Scan every eligible file of `dir` with the configured keyword lists
    ///
    /// The progress bar, if any, is sized to the number of eligible files
    /// before scanning starts.
    pub fn run_directory_scan(
        dir: &Path,
        config: &EngineConfig,
        extractor: &dyn TextExtractor,
        progress: Option<&ProgressBar>,
    ) -> anyhow::Result<DirectoryScanReport> {
        let files = collect_eligible_files(
            dir,
            &config.scan.extensions,
            config.scan.recursive,
            config.scan.max_files,
        )?;

        if let Some(pb) = progress {
            pb.set_length(files.len() as u64);
        }

        let scanner = DirectoryScanner::new(
            &KeywordSet::verbatim(&config.scan.keywords),
            &KeywordSet::verbatim(&config.scan.keywords_case_sensitive),
            config.scan.aggregation,
            config.max_phrase_gap,
        )?;

        let report =
            scanner.scan_files_parallel(&files, extractor, config.resolved_workers(), progress)?;
        Ok(report)
    }
}
