/// Utility modules
///
/// This module contains file discovery and text extraction, and the
/// formatting and export of analysis results.

pub mod file_utils;
pub mod output_formatter;
