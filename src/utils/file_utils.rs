/// File handling utilities
///
/// This module finds the documents of a directory scan and obtains their text
/// through a [`TextExtractor`]. Binary formats are handed to an extraction
/// backend; plain text is read directly.

use std::fs;
use std::path::{Path, PathBuf};

use log::{debug, warn};
use walkdir::WalkDir;

use crate::error::ExtractionError;

/// Source of the text of one document file
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// Reads files as UTF-8 text, replacing invalid sequences
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        let bytes = fs::read(path).map_err(|source| ExtractionError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match String::from_utf8(bytes) {
            Ok(text) => Ok(text),
            Err(e) => {
                warn!("{} is not valid UTF-8, decoding lossily", path.display());
                Ok(String::from_utf8_lossy(e.as_bytes()).into_owned())
            }
        }
    }
}

/// Extracts the text layer of PDF files
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

#[cfg(feature = "pdf")]
impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        use std::panic;

        // pdf-extract can panic on malformed documents
        let path_buf = path.to_path_buf();
        let result = panic::catch_unwind(|| pdf_extract::extract_text(&path_buf));

        match result {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractionError::Extract {
                path: path.to_path_buf(),
                message: e.to_string(),
            }),
            Err(_) => Err(ExtractionError::Extract {
                path: path.to_path_buf(),
                message: "PDF extraction panicked".to_string(),
            }),
        }
    }
}

#[cfg(not(feature = "pdf"))]
impl TextExtractor for PdfExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        Err(ExtractionError::Unsupported {
            path: path.to_path_buf(),
        })
    }
}

/// Picks an extractor from the file extension
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchExtractor {
    pdf: PdfExtractor,
    text: PlainTextExtractor,
}

impl TextExtractor for DispatchExtractor {
    fn extract(&self, path: &Path) -> Result<String, ExtractionError> {
        match extension_of(path).as_deref() {
            Some("pdf") => self.pdf.extract(path),
            Some("txt") | Some("text") | Some("md") => self.text.extract(path),
            _ => Err(ExtractionError::Unsupported {
                path: path.to_path_buf(),
            }),
        }
    }
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
}

/// Check whether a file's extension is one of `extensions` (case-insensitive)
pub fn has_extension(path: &Path, extensions: &[String]) -> bool {
    match extension_of(path) {
        Some(ext) => extensions
            .iter()
            .any(|wanted| wanted.trim_start_matches('.').eq_ignore_ascii_case(&ext)),
        None => false,
    }
}

/// Collect the files of `dir` eligible for a directory scan
///
/// Only the top level is listed unless `recursive` is set. Results are sorted
/// by path so that scans are reproducible, then truncated to `max_files`.
pub fn collect_eligible_files(
    dir: &Path,
    extensions: &[String],
    recursive: bool,
    max_files: Option<usize>,
) -> std::io::Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Directory not found: {}", dir.display()),
        ));
    }

    let max_depth = if recursive { usize::MAX } else { 1 };
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(false)
        .max_depth(max_depth)
        .into_iter()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                None
            }
        })
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| has_extension(path, extensions))
        .collect();

    files.sort();

    if let Some(limit) = max_files {
        if files.len() > limit {
            warn!("Reached maximum file limit ({})", limit);
            files.truncate(limit);
        }
    }

    debug!("Found {} eligible files in {}", files.len(), dir.display());
    Ok(files)
}

/// The name of a file as reported in scan results
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_extension() {
        let exts = vec!["pdf".to_string(), ".TXT".to_string()];
        assert!(has_extension(Path::new("a/paper.PDF"), &exts));
        assert!(has_extension(Path::new("notes.txt"), &exts));
        assert!(!has_extension(Path::new("image.png"), &exts));
        assert!(!has_extension(Path::new("README"), &exts));
    }

    #[test]
    fn test_collect_eligible_files() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(dir.path().join("b.txt"), "b").unwrap();
        fs::write(dir.path().join("a.txt"), "a").unwrap();
        fs::write(dir.path().join("skip.png"), "x").unwrap();
        fs::create_dir(dir.path().join("nested")).unwrap();
        fs::write(dir.path().join("nested").join("c.txt"), "c").unwrap();

        let exts = vec!["txt".to_string()];
        let flat = collect_eligible_files(dir.path(), &exts, false, None).unwrap();
        let names: Vec<String> = flat.iter().map(|p| display_name(p)).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);

        let deep = collect_eligible_files(dir.path(), &exts, true, None).unwrap();
        assert_eq!(deep.len(), 3);

        let limited = collect_eligible_files(dir.path(), &exts, true, Some(1)).unwrap();
        assert_eq!(limited.len(), 1);
    }

    #[test]
    fn test_missing_directory() {
        let result = collect_eligible_files(Path::new("/definitely/not/here"), &[], false, None);
        assert!(result.is_err());
    }

    #[test]
    fn test_dispatch_extractor() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let text_path = dir.path().join("doc.txt");
        fs::write(&text_path, "Black box models").unwrap();

        let extractor = DispatchExtractor::default();
        assert_eq!(extractor.extract(&text_path).unwrap(), "Black box models");
        assert!(matches!(
            extractor.extract(&dir.path().join("doc.docx")),
            Err(ExtractionError::Unsupported { .. })
        ));
        assert!(matches!(
            extractor.extract(&dir.path().join("missing.txt")),
            Err(ExtractionError::Io { .. })
        ));
    }

    #[test]
    fn test_broken_pdf_is_an_extraction_error() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let pdf_path = dir.path().join("broken.pdf");
        fs::write(&pdf_path, "this is not a pdf").unwrap();

        assert!(PdfExtractor.extract(&pdf_path).is_err());
    }
}
