/// Corpus records
///
/// A corpus is a JSON Lines file: line `i` is document `i`. Every decoded
/// string value of the record, joined by spaces in record order, is the text
/// that keywords are matched against; the title and the first version's
/// creation timestamp are kept as structured metadata.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};
use serde::Deserialize;
use serde_json::Value;

use crate::error::{EngineError, Result};

/// One document of the corpus
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Document {
    pub text: String,
    pub title: Option<String>,
    /// Creation timestamp of the first version, e.g. `Mon, 2 Apr 2007 19:18:42 GMT`
    pub created: Option<String>,
}

impl Document {
    /// A document with text only, no metadata
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Deserialize)]
struct CorpusRecord {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    versions: Vec<VersionRecord>,
}

#[derive(Debug, Deserialize)]
struct VersionRecord {
    #[serde(default)]
    created: Option<String>,
}

/// Parse one corpus line into a document
///
/// `line_no` is zero-based and only used for error reporting.
pub fn parse_record(line_no: usize, line: &str) -> Result<Document> {
    let malformed = |source| EngineError::MalformedRecord { line: line_no, source };

    let value: Value = serde_json::from_str(line).map_err(malformed)?;
    let record = CorpusRecord::deserialize(&value).map_err(malformed)?;

    let created = record
        .versions
        .into_iter()
        .next()
        .and_then(|version| version.created);

    let mut strings = Vec::new();
    collect_strings(&value, &mut strings);

    Ok(Document {
        text: strings.join(" "),
        title: record.title,
        created,
    })
}

/// Gather the string leaves of a record depth first
fn collect_strings<'a>(value: &'a Value, out: &mut Vec<&'a str>) {
    match value {
        Value::String(s) => out.push(s),
        Value::Array(items) => items.iter().for_each(|item| collect_strings(item, out)),
        Value::Object(fields) => fields.values().for_each(|field| collect_strings(field, out)),
        _ => {}
    }
}

/// Load every document from a JSON Lines corpus file
///
/// Blank lines at the end of the file are ignored. A blank line between
/// records, or any line that is not a JSON record, aborts the load.
pub fn load_corpus(path: &Path) -> Result<Vec<Document>> {
    info!("Loading corpus from {}", path.display());

    let reader = BufReader::new(File::open(path)?);
    let mut documents = Vec::new();
    let mut pending_blank = 0usize;

    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            pending_blank += 1;
            continue;
        }
        if pending_blank > 0 {
            // Skipping it would shift the index of every later document
            return Err(EngineError::BlankRecord {
                line: line_no - pending_blank,
            });
        }
        documents.push(parse_record(line_no, &line)?);
    }

    debug!("Loaded {} documents", documents.len());
    Ok(documents)
}
