/// Year-bucketed time series of matching documents
///
/// Timestamps use the `Www, DD Mon YYYY HH:MM:SS TZ` layout of the corpus
/// version records; the fourth whitespace-separated token is the year.

use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::Serialize;

use crate::core::corpus::Document;
use crate::error::{DateParseError, EngineError, Result};

/// Documents created before this year are left out of the time series
pub const YEAR_CUTOFF: i32 = 2007;

/// Extract the creation year from a corpus timestamp
///
/// The day, month and year tokens must form a valid calendar date; the
/// weekday and time-of-day tokens are not inspected.
pub fn parse_created_year(raw: &str) -> std::result::Result<i32, DateParseError> {
    let tokens: Vec<&str> = raw.split_whitespace().collect();
    if tokens.len() < 4 {
        return Err(DateParseError::new(
            raw,
            format!("expected at least 4 tokens, found {}", tokens.len()),
        ));
    }

    let year = tokens[3];
    if year.len() != 4 || !year.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DateParseError::new(raw, format!("{:?} is not a four-digit year", year)));
    }

    let date = format!("{} {} {}", tokens[1], tokens[2], year);
    let parsed = NaiveDate::parse_from_str(&date, "%d %b %Y")
        .map_err(|e| DateParseError::new(raw, format!("{:?} is not a valid date: {}", date, e)))?;

    Ok(parsed.year())
}

/// Document indices grouped by creation year, years ascending
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct YearBuckets {
    buckets: BTreeMap<i32, Vec<usize>>,
}

impl YearBuckets {
    pub fn get(&self, year: i32) -> Option<&[usize]> {
        self.buckets.get(&year).map(Vec::as_slice)
    }

    /// Buckets in ascending year order
    pub fn iter(&self) -> impl Iterator<Item = (i32, &[usize])> {
        self.buckets.iter().map(|(year, ids)| (*year, ids.as_slice()))
    }

    /// The `(year, document count)` series handed to chart rendering
    pub fn counts(&self) -> Vec<(i32, usize)> {
        self.buckets.iter().map(|(year, ids)| (*year, ids.len())).collect()
    }

    pub fn total(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }
}

/// Bucket documents by the year of their first version
///
/// `ids` is walked in ascending order, so each bucket lists documents in
/// scan order. Any missing or malformed timestamp fails the whole pass.
pub fn bucket_by_year<'a, I>(documents: &[Document], ids: I, cutoff: i32) -> Result<YearBuckets>
where
    I: IntoIterator<Item = &'a usize>,
{
    let mut buckets: BTreeMap<i32, Vec<usize>> = BTreeMap::new();

    for &doc_id in ids {
        let document = documents.get(doc_id).ok_or(EngineError::UnknownDocument {
            doc_id,
            len: documents.len(),
        })?;
        let created = document
            .created
            .as_deref()
            .ok_or(EngineError::MissingTimestamp { doc_id })?;

        let year = parse_created_year(created)?;
        if year < cutoff {
            debug!("Document {} from {} is before {}", doc_id, year, cutoff);
            continue;
        }
        buckets.entry(year).or_default().push(doc_id);
    }

    Ok(YearBuckets { buckets })
}
