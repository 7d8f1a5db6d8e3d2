/// Keyword occurrence counting over a directory of documents
///
/// Two keyword lists are matched against each extracted text: one
/// case-insensitively, one case-sensitively. A keyword counts at most once per
/// document. Files whose text cannot be extracted are counted and skipped.

use std::path::{Path, PathBuf};

use indicatif::ProgressBar;
use log::{info, warn};
use rayon::prelude::*;
use serde::Serialize;

use crate::core::counts::CountTable;
use crate::core::keywords::KeywordSet;
use crate::core::matcher::{AggregationMode, CompiledKeywordSet, MatchOptions};
use crate::error::{EngineError, Result};
use crate::utils::file_utils::{display_name, TextExtractor};

/// Results of a directory scan
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DirectoryScanReport {
    /// Keyword -> number of documents it matched
    pub keyword_counts: CountTable<String>,
    /// Keyword -> names of the documents it matched, in scan order
    pub files_with_keywords: Vec<(String, Vec<String>)>,
    pub files_processed: usize,
    pub match_count: usize,
    pub extraction_errors: usize,
}

impl DirectoryScanReport {
    fn record(&mut self, keyword: &str, file_name: &str) {
        self.keyword_counts.increment(keyword.to_string());
        self.match_count += 1;
        match self.files_with_keywords.iter_mut().find(|(k, _)| k == keyword) {
            Some((_, files)) => files.push(file_name.to_string()),
            None => self
                .files_with_keywords
                .push((keyword.to_string(), vec![file_name.to_string()])),
        }
    }

    /// Files matched by `keyword`, if any
    pub fn files_for(&self, keyword: &str) -> Option<&[String]> {
        self.files_with_keywords
            .iter()
            .find(|(k, _)| k == keyword)
            .map(|(_, files)| files.as_slice())
    }

    /// Fold in the report of a later shard
    pub fn merge(&mut self, other: DirectoryScanReport) {
        self.keyword_counts.merge(other.keyword_counts);
        for (keyword, files) in other.files_with_keywords {
            match self.files_with_keywords.iter_mut().find(|(k, _)| *k == keyword) {
                Some((_, existing)) => existing.extend(files),
                None => self.files_with_keywords.push((keyword, files)),
            }
        }
        self.files_processed += other.files_processed;
        self.match_count += other.match_count;
        self.extraction_errors += other.extraction_errors;
    }
}

pub struct DirectoryScanner {
    case_insensitive: CompiledKeywordSet,
    case_sensitive: CompiledKeywordSet,
    mode: AggregationMode,
}

impl DirectoryScanner {
    /// Compile both keyword lists
    ///
    /// With [`AggregationMode::AllMatches`] every matching keyword of a list
    /// is counted for a document; with [`AggregationMode::FirstMatch`] only
    /// the first matching keyword of each list is.
    pub fn new(
        case_insensitive: &KeywordSet,
        case_sensitive: &KeywordSet,
        mode: AggregationMode,
        max_phrase_gap: Option<usize>,
    ) -> Result<Self> {
        let insensitive = MatchOptions::case_insensitive().with_max_phrase_gap(max_phrase_gap);
        let sensitive = MatchOptions::case_sensitive().with_max_phrase_gap(max_phrase_gap);

        Ok(Self {
            case_insensitive: CompiledKeywordSet::compile(case_insensitive, &insensitive)?,
            case_sensitive: CompiledKeywordSet::compile(case_sensitive, &sensitive)?,
            mode,
        })
    }

    /// Keywords of one text, as they are reported
    ///
    /// Case-insensitive keywords are reported lowercased, case-sensitive ones
    /// verbatim.
    pub fn match_text(&self, text: &str) -> Vec<String> {
        let insensitive = self
            .case_insensitive
            .matching(text, self.mode)
            .into_iter()
            .map(|keyword| keyword.as_str().to_lowercase());
        let sensitive = self
            .case_sensitive
            .matching(text, self.mode)
            .into_iter()
            .map(|keyword| keyword.as_str().to_string());

        insensitive.chain(sensitive).collect()
    }

    fn scan_shard(
        &self,
        files: &[PathBuf],
        extractor: &dyn TextExtractor,
        progress: Option<&ProgressBar>,
    ) -> DirectoryScanReport {
        let mut report = DirectoryScanReport::default();

        for path in files {
            report.files_processed += 1;
            let file_name = display_name(path);

            match extractor.extract(path) {
                Ok(text) => {
                    info!("Read {}", file_name);
                    for keyword in self.match_text(&text) {
                        report.record(&keyword, &file_name);
                    }
                }
                Err(e) => {
                    warn!("Error reading {}: {}", file_name, e);
                    report.extraction_errors += 1;
                }
            }

            if let Some(pb) = progress {
                pb.inc(1);
            }
        }

        report
    }

    /// Scan `files` in order
    pub fn scan_files(&self, files: &[PathBuf], extractor: &dyn TextExtractor) -> DirectoryScanReport {
        self.scan_shard(files, extractor, None)
    }

    /// Scan `files` with up to `workers` threads, reporting to `progress`
    ///
    /// Shards are merged in file order, so the report matches a sequential scan.
    pub fn scan_files_parallel(
        &self,
        files: &[PathBuf],
        extractor: &dyn TextExtractor,
        workers: usize,
        progress: Option<&ProgressBar>,
    ) -> Result<DirectoryScanReport> {
        if workers <= 1 || files.len() < 2 {
            return Ok(self.scan_shard(files, extractor, progress));
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .build()
            .map_err(|e| EngineError::ThreadPool(e.to_string()))?;

        // Small shards keep the progress bar moving and the load balanced
        let chunk_size = (files.len() / (workers * 4)).max(1);

        let shards: Vec<DirectoryScanReport> = pool.install(|| {
            files
                .par_chunks(chunk_size)
                .map(|chunk| self.scan_shard(chunk, extractor, progress))
                .collect()
        });

        let mut report = DirectoryScanReport::default();
        for shard in shards {
            report.merge(shard);
        }
        Ok(report)
    }
}

/// Convenience wrapper: scan an explicit list of paths sequentially
pub fn scan_paths<P: AsRef<Path>>(
    scanner: &DirectoryScanner,
    paths: &[P],
    extractor: &dyn TextExtractor,
) -> DirectoryScanReport {
    let files: Vec<PathBuf> = paths.iter().map(|p| p.as_ref().to_path_buf()).collect();
    scanner.scan_files(&files, extractor)
}
