/// Keyword and phrase matching
///
/// Every keyword is compiled into one regular expression. Single words must
/// occur as whole tokens; phrases must have all of their words occur as whole
/// tokens in left-to-right order, with any amount of text in between unless a
/// gap bound is configured.

use log::debug;
use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::core::keywords::{Keyword, KeywordSet};
use crate::error::{EngineError, Result};

/// How a keyword is matched, derived from its shape
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Whole-token match of a single word
    Word,
    /// Ordered whole-token match of every word of a phrase
    Phrase,
}

impl MatchMode {
    pub fn of(keyword: &Keyword) -> Self {
        if keyword.is_phrase() {
            MatchMode::Phrase
        } else {
            MatchMode::Word
        }
    }
}

/// Which matches of a keyword set are taken for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AggregationMode {
    /// Stop at the first keyword (in set order) that matches
    #[default]
    FirstMatch,
    /// Take every keyword that matches
    AllMatches,
}

/// Options shared by every matcher in a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MatchOptions {
    pub case_sensitive: bool,
    /// Maximum number of intervening words between consecutive phrase words.
    /// `None` leaves the gap unbounded.
    pub max_phrase_gap: Option<usize>,
}

impl MatchOptions {
    pub fn case_insensitive() -> Self {
        Self::default()
    }

    pub fn case_sensitive() -> Self {
        Self {
            case_sensitive: true,
            ..Self::default()
        }
    }

    pub fn with_max_phrase_gap(mut self, gap: Option<usize>) -> Self {
        self.max_phrase_gap = gap;
        self
    }
}

/// A keyword compiled for matching
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    keyword: Keyword,
    mode: MatchMode,
    /// `None` for an empty keyword, which never matches
    regex: Option<Regex>,
}

impl KeywordMatcher {
    pub fn new(keyword: &Keyword, options: &MatchOptions) -> Result<Self> {
        let mode = MatchMode::of(keyword);

        let regex = if keyword.is_empty() {
            None
        } else {
            let pattern = build_pattern(keyword.words(), options.max_phrase_gap);
            debug!("Compiled {:?} keyword {:?} as {}", mode, keyword.as_str(), pattern);

            let regex = RegexBuilder::new(&pattern)
                .case_insensitive(!options.case_sensitive)
                .dot_matches_new_line(true)
                .build()
                .map_err(|source| EngineError::Pattern {
                    keyword: keyword.as_str().to_string(),
                    source,
                })?;
            Some(regex)
        };

        Ok(Self {
            keyword: keyword.clone(),
            mode,
            regex,
        })
    }

    pub fn keyword(&self) -> &Keyword {
        &self.keyword
    }

    pub fn mode(&self) -> MatchMode {
        self.mode
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().map_or(false, |regex| regex.is_match(text))
    }
}

/// Build the pattern for a keyword's words
///
/// Words are escaped so that regex metacharacters inside keywords match
/// literally.
fn build_pattern(words: &[String], max_gap: Option<usize>) -> String {
    let separator = match max_gap {
        None => r".*?".to_string(),
        Some(gap) => format!(r"\W+(?:\w+\W+){{0,{}}}", gap),
    };

    words
        .iter()
        .map(|word| format!(r"\b{}\b", regex::escape(word)))
        .collect::<Vec<_>>()
        .join(&separator)
}

/// Check a single keyword against a text
///
/// Convenience wrapper that compiles the keyword on every call; use
/// [`CompiledKeywordSet`] when matching many documents.
pub fn keyword_matches(keyword: &str, text: &str, options: &MatchOptions) -> Result<bool> {
    let matcher = KeywordMatcher::new(&Keyword::new(keyword), options)?;
    Ok(matcher.is_match(text))
}

/// A keyword set with every keyword compiled against the same options
#[derive(Debug, Clone, Default)]
pub struct CompiledKeywordSet {
    matchers: Vec<KeywordMatcher>,
}

impl CompiledKeywordSet {
    pub fn compile(keywords: &KeywordSet, options: &MatchOptions) -> Result<Self> {
        let matchers = keywords
            .iter()
            .map(|keyword| KeywordMatcher::new(keyword, options))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { matchers })
    }

    /// The first keyword, in set order, that matches the text
    pub fn first_match(&self, text: &str) -> Option<&Keyword> {
        self.matchers
            .iter()
            .find(|matcher| matcher.is_match(text))
            .map(KeywordMatcher::keyword)
    }

    /// Every keyword that matches the text, in set order
    pub fn all_matches<'s, 't>(&'s self, text: &'t str) -> impl Iterator<Item = &'s Keyword> + 't
    where
        's: 't,
    {
        self.matchers
            .iter()
            .filter(move |matcher| matcher.is_match(text))
            .map(KeywordMatcher::keyword)
    }

    pub fn matching(&self, text: &str, mode: AggregationMode) -> Vec<&Keyword> {
        match mode {
            AggregationMode::FirstMatch => self.first_match(text).into_iter().collect(),
            AggregationMode::AllMatches => self.all_matches(text).collect(),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, KeywordMatcher> {
        self.matchers.iter()
    }

    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }
}
