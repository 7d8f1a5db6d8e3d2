/// Error types for the matching and aggregation engine
///
/// Fatal errors abort a whole aggregation pass. Extraction failures are
/// per-file and are counted by the directory scanner instead of propagated.

use std::path::PathBuf;

/// A creation timestamp that does not follow the `Www, DD Mon YYYY ...` layout
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid creation timestamp {raw:?}: {reason}")]
pub struct DateParseError {
    /// The offending timestamp, as found in the record
    pub raw: String,
    pub reason: String,
}

impl DateParseError {
    pub fn new(raw: &str, reason: impl Into<String>) -> Self {
        Self {
            raw: raw.to_string(),
            reason: reason.into(),
        }
    }
}

/// Failure to obtain text from a single document file
#[derive(Debug, thiserror::Error)]
pub enum ExtractionError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to extract text from {}: {message}", path.display())]
    Extract { path: PathBuf, message: String },

    #[error("No extractor available for {}", path.display())]
    Unsupported { path: PathBuf },
}

/// Main error type for engine operations
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A corpus line that is not a valid JSON record
    #[error("Malformed corpus record at document index {line}: {source}")]
    MalformedRecord {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    /// An empty line between corpus records
    #[error("Blank corpus record at document index {line}")]
    BlankRecord { line: usize },

    /// A bucketed document without a creation timestamp
    #[error("Document {doc_id} has no creation timestamp")]
    MissingTimestamp { doc_id: usize },

    /// A document index outside the loaded corpus
    #[error("Document {doc_id} is not part of the corpus ({len} documents)")]
    UnknownDocument { doc_id: usize, len: usize },

    #[error(transparent)]
    DateParse(#[from] DateParseError),

    #[error("Failed to compile pattern for keyword {keyword:?}: {source}")]
    Pattern {
        keyword: String,
        #[source]
        source: regex::Error,
    },

    #[error("Failed to build thread pool: {0}")]
    ThreadPool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias using EngineError
pub type Result<T> = std::result::Result<T, EngineError>;
