/// Keyword normalization
///
/// Turns the free-text keyword fields supplied by a caller into ordered,
/// canonical keyword sets. A keyword with internal whitespace is a phrase.

use serde::{Deserialize, Serialize};

/// Keywords shorter than this (after trimming) are discarded
pub const MIN_KEYWORD_LEN: usize = 3;

/// A single normalized keyword or phrase
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Keyword {
    text: String,
    words: Vec<String>,
}

impl Keyword {
    pub fn new(text: &str) -> Self {
        let text = text.trim().to_string();
        let words = text.split_whitespace().map(str::to_string).collect();
        Self { text, words }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The whitespace-separated words of this keyword, in order
    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn is_phrase(&self) -> bool {
        self.words.len() > 1
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl std::fmt::Display for Keyword {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.text)
    }
}

/// Ordered sequence of keywords, read-only once built
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordSet {
    keywords: Vec<Keyword>,
}

impl KeywordSet {
    /// Normalize a comma-separated keyword string
    ///
    /// Entries are trimmed and lowercased; empty entries and entries shorter
    /// than [`MIN_KEYWORD_LEN`] characters are dropped. Never fails: malformed
    /// input only yields a shorter (possibly empty) set.
    pub fn normalize(raw: &str) -> Self {
        let keywords = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| entry.chars().count() >= MIN_KEYWORD_LEN)
            .map(|entry| Keyword::new(&entry.to_lowercase()))
            .collect();

        Self { keywords }
    }

    /// Build a set from configured keywords, keeping their case
    ///
    /// Used for case-sensitive keyword lists, where lowercasing would change
    /// what matches.
    pub fn verbatim<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = entries
            .into_iter()
            .map(|entry| Keyword::new(entry.as_ref()))
            .filter(|keyword| !keyword.is_empty())
            .collect();

        Self { keywords }
    }

    /// Join back into the comma-separated form accepted by [`normalize`](Self::normalize)
    pub fn to_raw(&self) -> String {
        self.keywords
            .iter()
            .map(Keyword::as_str)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Keyword> {
        self.keywords.iter()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

impl<'a> IntoIterator for &'a KeywordSet {
    type Item = &'a Keyword;
    type IntoIter = std::slice::Iter<'a, Keyword>;

    fn into_iter(self) -> Self::IntoIter {
        self.keywords.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(set: &KeywordSet) -> Vec<&str> {
        set.iter().map(Keyword::as_str).collect()
    }

    #[test]
    fn test_normalize_trims_and_lowercases() {
        let set = KeywordSet::normalize("  Cancer , Tumor Growth,ONCOLOGY ");
        assert_eq!(texts(&set), vec!["cancer", "tumor growth", "oncology"]);
    }

    #[test]
    fn test_normalize_drops_short_and_empty() {
        let set = KeywordSet::normalize("ai, , ml,llm,,  x  ,gene");
        assert_eq!(texts(&set), vec!["llm", "gene"]);
    }

    #[test]
    fn test_normalize_empty_input() {
        assert!(KeywordSet::normalize("").is_empty());
        assert!(KeywordSet::normalize(" , ,, ").is_empty());
    }

    #[test]
    fn test_normalize_is_idempotent() {
        let raw = "Black Box,  interpretability, xai , Feature Importance,, ok";
        let once = KeywordSet::normalize(raw);
        let twice = KeywordSet::normalize(&once.to_raw());
        assert_eq!(once, twice);
    }

    #[test]
    fn test_every_token_is_long_enough_and_trimmed() {
        let set = KeywordSet::normalize(" a,bb ,ccc, dddd ,\teeeee\n, f g ");
        for keyword in &set {
            assert!(keyword.as_str().chars().count() >= MIN_KEYWORD_LEN);
            assert_eq!(keyword.as_str(), keyword.as_str().trim());
        }
        // "f g" is three characters long and survives as a phrase
        assert!(set.iter().any(|k| k.as_str() == "f g" && k.is_phrase()));
    }

    #[test]
    fn test_duplicates_are_kept_in_order() {
        let set = KeywordSet::normalize("cure, Cure, therapy");
        assert_eq!(texts(&set), vec!["cure", "cure", "therapy"]);
    }

    #[test]
    fn test_verbatim_keeps_case() {
        let set = KeywordSet::verbatim(["LIME", " SHAP ", ""]);
        assert_eq!(texts(&set), vec!["LIME", "SHAP"]);
    }

    #[test]
    fn test_phrase_words() {
        let keyword = Keyword::new("feature   importance");
        assert!(keyword.is_phrase());
        assert_eq!(keyword.words(), &["feature".to_string(), "importance".to_string()]);
        assert!(!Keyword::new("cancer").is_phrase());
    }
}
