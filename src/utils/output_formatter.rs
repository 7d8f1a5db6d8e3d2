/// Output formatter for analysis results
///
/// This module renders overlap analyses and directory scans as markdown
/// reports, console summaries, JSON, CSV and the flat result files of the
/// directory scan.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use handlebars::Handlebars;
use serde::Serialize;
use serde_json::json;

use crate::core::corpus::Document;
use crate::core::directory::DirectoryScanReport;
use crate::core::keywords::Keyword;
use crate::OverlapAnalysis;

const REPORT_TEMPLATE: &str = "# Percentage of {{topic1}} that is {{topic2}}: {{ratio}}%
### Year over year results:
{{#each years}}{{this}}{{/each}}
### Top Keywords1:
{{#each k1}}{{this}}{{/each}}
### Top Keywords2:
{{#each k2}}{{this}}{{/each}}
### Keyword Pairs:
{{#each pairs}}{{this}}{{/each}}";

/// Render the markdown overlap report
///
/// # Arguments
///
/// * `topic1`, `topic2` - Display names of the two keyword sets
/// * `analysis` - Result of the overlap analysis
/// * `documents` - The corpus, for sample titles
/// * `sample_titles` - Titles listed under each year
pub fn format_overlap_report(
    topic1: &str,
    topic2: &str,
    analysis: &OverlapAnalysis,
    documents: &[Document],
    sample_titles: usize,
) -> Result<String> {
    let mut handlebars = Handlebars::new();
    handlebars.register_escape_fn(handlebars::no_escape);
    handlebars
        .register_template_string("report", REPORT_TEMPLATE)
        .context("Failed to register report template")?;

    let years: Vec<String> = analysis
        .years
        .iter()
        .map(|(year, ids)| {
            let mut block = format!("#### Papers in {}: {}\n", year, ids.len());
            for &id in ids.iter().take(sample_titles) {
                let title = documents
                    .get(id)
                    .and_then(|doc| doc.title.as_deref())
                    .unwrap_or("(untitled)");
                block.push_str(title);
                block.push('\n');
            }
            block
        })
        .collect();

    let keyword_lines = |ranked: Vec<(&String, usize)>| -> Vec<String> {
        ranked
            .into_iter()
            .map(|(keyword, count)| format!("- {}: {}\n", keyword, count))
            .collect()
    };

    let pairs: Vec<String> = analysis
        .stats
        .ranked_pairs()
        .into_iter()
        .map(|(pair, count)| format!("- {}: {}\n", pair, count))
        .collect();

    let data = json!({
        "topic1": topic1,
        "topic2": topic2,
        "ratio": format!("{:.2}", analysis.ratio),
        "years": years,
        "k1": keyword_lines(analysis.stats.ranked_k1()),
        "k2": keyword_lines(analysis.stats.ranked_k2()),
        "pairs": pairs,
    });

    handlebars
        .render("report", &data)
        .context("Failed to render overlap report")
}

/// Short colored console summary of an overlap analysis
pub fn format_overlap_summary(topic1: &str, topic2: &str, analysis: &OverlapAnalysis) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", "Overlap Summary".yellow().bold()));
    output.push_str(&format!(
        "{} {}\n",
        format!("Documents matching {}:", topic1).green(),
        analysis.stats.denominator_ids.len()
    ));
    output.push_str(&format!(
        "{} {}\n",
        format!("...also matching {}:", topic2).green(),
        analysis.stats.numerator_ids.len()
    ));
    output.push_str(&format!("{} {:.2}%\n", "Overlap:".green(), analysis.ratio));

    if !analysis.years.is_empty() {
        output.push_str(&format!("\n{}\n", "Year over year".cyan().bold()));
        for (year, count) in analysis.years.counts() {
            output.push_str(&format!("  {}: {}\n", year, count));
        }
    }

    output
}

#[derive(Serialize)]
struct RankedEntry<'a, K: Serialize> {
    keyword: &'a K,
    count: usize,
}

fn ranked_entries<K: Serialize>(ranked: Vec<(&K, usize)>) -> Vec<RankedEntry<'_, K>> {
    ranked
        .into_iter()
        .map(|(keyword, count)| RankedEntry { keyword, count })
        .collect()
}

/// Export an overlap analysis to a JSON file
pub fn export_overlap_json(
    topic1: &str,
    topic2: &str,
    analysis: &OverlapAnalysis,
    output_path: &Path,
) -> Result<()> {
    let years: Vec<_> = analysis
        .years
        .iter()
        .map(|(year, ids)| json!({ "year": year, "documents": ids }))
        .collect();

    let output = json!({
        "topic1": topic1,
        "topic2": topic2,
        "keywords1": analysis.k1.iter().map(Keyword::as_str).collect::<Vec<_>>(),
        "keywords2": analysis.k2.iter().map(Keyword::as_str).collect::<Vec<_>>(),
        "ratio": analysis.ratio,
        "denominator_ids": analysis.stats.denominator_ids,
        "numerator_ids": analysis.stats.numerator_ids,
        "years": years,
        "k1_counts": ranked_entries(analysis.stats.ranked_k1()),
        "k2_counts": ranked_entries(analysis.stats.ranked_k2()),
        "k3_counts": ranked_entries(analysis.stats.ranked_k3()),
        "pair_counts": ranked_entries(analysis.stats.ranked_pairs()),
    });

    let file = File::create(output_path)
        .context(format!("Failed to create JSON output file: {}", output_path.display()))?;

    serde_json::to_writer_pretty(file, &output).context("Failed to write JSON data")?;

    Ok(())
}

/// Write the year-over-year series as `year,count` CSV for chart rendering
pub fn export_timeseries_csv(analysis: &OverlapAnalysis, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create CSV output file: {}", output_path.display()))?;

    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(["year", "count"])
        .context("Failed to write CSV header")?;

    for (year, count) in analysis.years.counts() {
        writer
            .write_record([year.to_string(), count.to_string()])
            .context("Failed to write CSV record")?;
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Write the ranked `keyword: count` file and the `keyword: [files]` file
pub fn write_scan_results(
    report: &DirectoryScanReport,
    counts_path: &Path,
    files_path: &Path,
) -> Result<()> {
    let mut counts = File::create(counts_path)
        .context(format!("Failed to create {}", counts_path.display()))?;
    let mut files = File::create(files_path)
        .context(format!("Failed to create {}", files_path.display()))?;

    for (keyword, count) in report.keyword_counts.ranked() {
        writeln!(counts, "{}: {}", keyword, count)?;

        let names = report
            .files_for(keyword)
            .unwrap_or_default()
            .iter()
            .map(|name| format!("'{}'", name))
            .collect::<Vec<_>>()
            .join(", ");
        writeln!(files, "{}: [{}]\n", keyword, names)?;
    }

    Ok(())
}

/// Export a directory scan as `keyword,count,file` CSV rows
pub fn export_scan_csv(report: &DirectoryScanReport, output_path: &Path) -> Result<()> {
    let file = File::create(output_path)
        .context(format!("Failed to create CSV output file: {}", output_path.display()))?;

    let mut writer = csv::Writer::from_writer(file);
    writer
        .write_record(["keyword", "count", "file"])
        .context("Failed to write CSV header")?;

    for (keyword, count) in report.keyword_counts.ranked() {
        for name in report.files_for(keyword).unwrap_or_default() {
            writer
                .write_record([keyword.as_str(), count.to_string().as_str(), name.as_str()])
                .context("Failed to write CSV record")?;
        }
    }

    writer.flush().context("Failed to flush CSV writer")?;

    Ok(())
}

/// Console summary of a directory scan
pub fn format_scan_summary(report: &DirectoryScanReport, top: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n\n", "Scan Summary".yellow().bold()));
    output.push_str(&format!("{} {}\n", "Total files:".green(), report.files_processed));
    output.push_str(&format!("{} {}\n", "Match count:".green(), report.match_count));

    let errors = format!("{} {}\n", "Files with errors:", report.extraction_errors);
    if report.extraction_errors > 0 {
        output.push_str(&errors.red().to_string());
    } else {
        output.push_str(&errors);
    }

    if !report.keyword_counts.is_empty() {
        output.push_str(&format!("\n{}\n", "Top Keywords".cyan().bold()));
        for (i, (keyword, count)) in report.keyword_counts.ranked().into_iter().take(top).enumerate() {
            output.push_str(&format!("{}. {}: {}\n", i + 1, keyword, count));
        }
    }

    output
}
