/// Simple example demonstrating how to use the Paper Trends library

use anyhow::Result;
use paper_trends::utils::output_formatter::format_overlap_report;
use paper_trends::{analyze_overlap, load_corpus, EngineConfig};

fn main() -> Result<()> {
    // Path to the corpus for analysis
    let corpus_path = std::env::temp_dir().join("paper_trends_sample.jsonl");

    // Create sample corpus, one record per line
    std::fs::write(
        &corpus_path,
        r#"{"title": "Deep learning for tumor detection", "abstract": "A neural network finds tumors.", "versions": [{"created": "Mon, 2 Apr 2018 19:18:42 GMT"}]}
{"title": "Tumor growth models", "abstract": "Classical differential equations.", "versions": [{"created": "Thu, 5 Mar 2015 08:00:00 GMT"}]}
{"title": "Neural nets in oncology", "abstract": "Cancer imaging with a deep network.", "versions": [{"created": "Fri, 6 Mar 2020 08:00:00 GMT"}]}
"#,
    )?;

    let documents = load_corpus(&corpus_path)?;
    println!("Loaded {} documents from {}", documents.len(), corpus_path.display());

    let analysis = analyze_overlap(
        &documents,
        "tumor, cancer, oncology",
        "neural network, deep learning",
        &EngineConfig::default(),
    )?;

    println!(
        "{}",
        format_overlap_report("Oncology", "Deep Learning", &analysis, &documents, 5)?
    );

    Ok(())
}
