/// Engine configuration
///
/// Loaded from an optional JSON file; every field has a default so a partial
/// file only overrides what it names. Command-line flags are applied on top.

use std::path::Path;

use log::info;
use serde::{Deserialize, Serialize};

use crate::core::keywords::KeywordSet;
use crate::core::matcher::{AggregationMode, MatchOptions};
use crate::core::scanner::ScanPolicy;
use crate::core::temporal::YEAR_CUTOFF;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Documents created before this year are left out of the time series
    pub year_cutoff: i32,
    /// Titles listed per year in the report
    pub sample_titles: usize,
    pub case_sensitive: bool,
    /// Maximum intervening words between phrase words (null = unbounded)
    pub max_phrase_gap: Option<usize>,
    pub k2_mode: AggregationMode,
    pub k3_mode: AggregationMode,
    /// Third keyword set, counted for every K1 hit
    pub k3_keywords: Vec<String>,
    /// Worker threads (0 = available parallelism)
    pub workers: usize,
    pub scan: DirectoryScanConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let policy = ScanPolicy::default();
        Self {
            year_cutoff: YEAR_CUTOFF,
            sample_titles: 5,
            case_sensitive: false,
            max_phrase_gap: None,
            k2_mode: policy.k2_mode,
            k3_mode: policy.k3_mode,
            k3_keywords: Vec::new(),
            workers: 0,
            scan: DirectoryScanConfig::default(),
        }
    }
}

impl EngineConfig {
    /// Read a configuration file
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        use anyhow::Context;

        let config_str = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read configuration file {}", path.display()))?;
        let config = serde_json::from_str(&config_str)
            .with_context(|| format!("Invalid JSON in configuration file {}", path.display()))?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn match_options(&self) -> MatchOptions {
        MatchOptions {
            case_sensitive: self.case_sensitive,
            max_phrase_gap: self.max_phrase_gap,
        }
    }

    pub fn scan_policy(&self) -> ScanPolicy {
        ScanPolicy {
            k2_mode: self.k2_mode,
            k3_mode: self.k3_mode,
        }
    }

    /// K3 keywords, normalized like user input
    pub fn k3(&self) -> KeywordSet {
        KeywordSet::normalize(&self.k3_keywords.join(","))
    }

    /// Worker count with `0` resolved to the available parallelism
    pub fn resolved_workers(&self) -> usize {
        if self.workers == 0 {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        } else {
            self.workers
        }
    }
}

/// Settings of the standalone directory scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DirectoryScanConfig {
    /// File extensions eligible for scanning
    pub extensions: Vec<String>,
    pub recursive: bool,
    pub max_files: Option<usize>,
    /// Matched case-insensitively, reported lowercased
    pub keywords: Vec<String>,
    /// Matched and reported verbatim
    pub keywords_case_sensitive: Vec<String>,
    /// Per list, count only the first matching keyword of a document unless
    /// set to `all_matches`
    pub aggregation: AggregationMode,
    pub counts_file: String,
    pub files_file: String,
}

impl Default for DirectoryScanConfig {
    fn default() -> Self {
        Self {
            extensions: vec!["pdf".to_string()],
            recursive: false,
            max_files: None,
            keywords: vec![
                "Black Box".to_string(),
                "Interpretability".to_string(),
                "Feature Importance".to_string(),
                "AI Explainability Techniques".to_string(),
            ],
            keywords_case_sensitive: vec!["LIME".to_string(), "SHAP".to_string()],
            aggregation: AggregationMode::FirstMatch,
            counts_file: "keyword_search_results.txt".to_string(),
            files_file: "keyword_search_results_files.txt".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.year_cutoff, 2007);
        assert_eq!(config.scan_policy(), ScanPolicy::default());
        assert_eq!(config.match_options(), MatchOptions::default());
        assert!(config.k3().is_empty());
        assert!(config.resolved_workers() >= 1);
        assert_eq!(config.scan.aggregation, AggregationMode::FirstMatch);
    }

    #[test]
    fn test_partial_json_overrides() {
        let config: EngineConfig = serde_json::from_str(
            r#"{"year_cutoff": 2010, "k2_mode": "all_matches", "max_phrase_gap": 3,
                "k3_keywords": ["Mouse", "in"], "scan": {"recursive": true}}"#,
        )
        .unwrap();

        assert_eq!(config.year_cutoff, 2010);
        assert_eq!(config.k2_mode, AggregationMode::AllMatches);
        assert_eq!(config.k3_mode, AggregationMode::AllMatches);
        assert_eq!(config.max_phrase_gap, Some(3));
        assert_eq!(config.k3().len(), 1);
        assert!(config.scan.recursive);
        assert_eq!(config.scan.extensions, vec!["pdf".to_string()]);
    }

    #[test]
    fn test_load_rejects_invalid_json() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        assert!(EngineConfig::load(&path).is_err());
        assert!(EngineConfig::load(&dir.path().join("missing.json")).is_err());
    }
}
