/// Paper Trends - keyword overlap and trend analysis for document corpora
///
/// The main entry point. `overlap` analyzes a JSON Lines corpus against two
/// keyword fields; `scan` counts keyword occurrences over a directory of
/// documents.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, LevelFilter};

use paper_trends::app::run_directory_scan;
use paper_trends::config::EngineConfig;
use paper_trends::core::matcher::AggregationMode;
use paper_trends::utils::file_utils::DispatchExtractor;
use paper_trends::utils::output_formatter;
use paper_trends::{analyze_overlap, load_corpus};

/// Command line argument structure
#[derive(Parser, Debug)]
#[command(
    name = "paper_trends",
    version,
    about = "Keyword overlap and year-over-year trend analysis for document corpora",
    long_about = "Measures how often topic keywords occur and co-occur across documents:
- the share of one topic's documents that also cover a second topic
- per-keyword and per-keyword-pair counts
- a year-by-year count of the overlapping documents
- keyword occurrence counts over a directory of PDF or text files"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    global: GlobalArgs,
}

#[derive(Args, Debug)]
struct GlobalArgs {
    /// Path to configuration file (JSON)
    #[arg(long = "config", global = true)]
    config: Option<PathBuf>,

    /// Number of parallel workers (0=auto)
    #[arg(long = "parallel", global = true)]
    parallel: Option<usize>,

    /// Suppress terminal output
    #[arg(long = "quiet", global = true, action = ArgAction::SetTrue)]
    quiet: bool,

    /// Set logging level (default: INFO)
    #[arg(long = "log-level", global = true, default_value = "info")]
    log_level: LevelFilter,

    /// Log file path (default: paper_trends.log)
    #[arg(long = "log-file", global = true, default_value = "paper_trends.log")]
    log_file: String,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Analyze a JSON Lines corpus for the overlap of two keyword sets
    Overlap(OverlapArgs),
    /// Count keyword occurrences over a directory of documents
    Scan(ScanArgs),
}

#[derive(Args, Debug)]
struct OverlapArgs {
    /// JSON Lines corpus, one document record per line
    corpus: PathBuf,

    /// Keywords of the base topic, comma separated
    #[arg(long = "keywords1")]
    keywords1: String,

    /// Keywords of the second topic, comma separated
    #[arg(long = "keywords2")]
    keywords2: String,

    /// Display name of the base topic
    #[arg(long = "topic1", default_value = "Topic1")]
    topic1: String,

    /// Display name of the second topic
    #[arg(long = "topic2", default_value = "Topic2")]
    topic2: String,

    /// Match keywords case-sensitively
    #[arg(long = "case-sensitive", action = ArgAction::SetTrue)]
    case_sensitive: bool,

    /// Maximum number of words allowed between the words of a phrase
    #[arg(long = "max-gap")]
    max_gap: Option<usize>,

    /// Write the markdown report to this file
    #[arg(long = "report")]
    report: Option<PathBuf>,

    /// Export results to JSON file
    #[arg(long = "json")]
    json: Option<PathBuf>,

    /// Export the year-over-year series to CSV file
    #[arg(long = "csv")]
    csv: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct ScanArgs {
    /// Directory containing the documents
    dir: PathBuf,

    /// Case-insensitive keyword (can be used multiple times)
    #[arg(long = "keyword", action = ArgAction::Append)]
    keywords: Vec<String>,

    /// Case-sensitive keyword (can be used multiple times)
    #[arg(long = "keyword-cs", action = ArgAction::Append)]
    keywords_case_sensitive: Vec<String>,

    /// Eligible file extension (can be used multiple times)
    #[arg(long = "ext", action = ArgAction::Append)]
    extensions: Vec<String>,

    /// Descend into subdirectories
    #[arg(long = "recursive", action = ArgAction::SetTrue)]
    recursive: bool,

    /// Maximum number of files to scan
    #[arg(long = "max-files")]
    max_files: Option<usize>,

    /// Count every matching keyword of each list per document
    #[arg(long = "all-matches", action = ArgAction::SetTrue)]
    all_matches: bool,

    /// Directory to store the result files
    #[arg(long = "output-dir")]
    output_dir: Option<PathBuf>,

    /// Also export results to CSV file
    #[arg(long = "csv")]
    csv: Option<PathBuf>,
}

/// Main entry point function
fn main() {
    let cli = Cli::parse();

    // Set up logging
    setup_logging(&cli.global);

    if let Err(e) = run(cli) {
        error!("{:#}", e);
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let mut config = match &cli.global.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };
    if let Some(parallel) = cli.global.parallel {
        config.workers = parallel;
    }

    match cli.command {
        Command::Overlap(args) => run_overlap(args, config, cli.global.quiet),
        Command::Scan(args) => run_scan(args, config, cli.global.quiet),
    }
}

/// Set up logging with file output
fn setup_logging(args: &GlobalArgs) {
    let mut builder = env_logger::Builder::new();

    builder.filter_level(args.log_level);

    builder.format(|buf, record| {
        use chrono::Local;
        use std::io::Write;
        writeln!(
            buf,
            "{} - {} - {} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let Ok(file) = File::create(&args.log_file) {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    builder.init();
}

fn run_overlap(args: OverlapArgs, mut config: EngineConfig, quiet: bool) -> Result<()> {
    let start_time = Instant::now();

    if args.case_sensitive {
        config.case_sensitive = true;
    }
    if args.max_gap.is_some() {
        config.max_phrase_gap = args.max_gap;
    }

    let documents = load_corpus(&args.corpus)
        .with_context(|| format!("Failed to load corpus {}", args.corpus.display()))?;

    let analysis = analyze_overlap(&documents, &args.keywords1, &args.keywords2, &config)
        .context("Overlap analysis failed")?;

    let report = output_formatter::format_overlap_report(
        &args.topic1,
        &args.topic2,
        &analysis,
        &documents,
        config.sample_titles,
    )?;

    if let Some(path) = &args.report {
        std::fs::write(path, &report)
            .with_context(|| format!("Failed to write report {}", path.display()))?;
        info!("Report written to {}", path.display());
    }
    if let Some(path) = &args.json {
        output_formatter::export_overlap_json(&args.topic1, &args.topic2, &analysis, path)?;
    }
    if let Some(path) = &args.csv {
        output_formatter::export_timeseries_csv(&analysis, path)?;
    }

    if !quiet {
        if args.report.is_none() {
            println!("{}", report);
        }
        println!(
            "{}",
            output_formatter::format_overlap_summary(&args.topic1, &args.topic2, &analysis)
        );
        println!(
            "{} {} documents in {:.2} seconds",
            "Analyzed".bold(),
            documents.len(),
            start_time.elapsed().as_secs_f64()
        );
    }

    Ok(())
}

fn run_scan(args: ScanArgs, mut config: EngineConfig, quiet: bool) -> Result<()> {
    if !args.keywords.is_empty() {
        config.scan.keywords = args.keywords;
    }
    if !args.keywords_case_sensitive.is_empty() {
        config.scan.keywords_case_sensitive = args.keywords_case_sensitive;
    }
    if !args.extensions.is_empty() {
        config.scan.extensions = args.extensions;
    }
    if args.recursive {
        config.scan.recursive = true;
    }
    if args.max_files.is_some() {
        config.scan.max_files = args.max_files;
    }
    if args.all_matches {
        config.scan.aggregation = AggregationMode::AllMatches;
    }

    let progress_bar = if !quiet {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({eta})")
                .context("Invalid progress bar template")?
                .progress_chars("#>-"),
        );
        Some(pb)
    } else {
        None
    };

    let extractor = DispatchExtractor::default();
    let report = run_directory_scan(&args.dir, &config, &extractor, progress_bar.as_ref())?;

    if let Some(pb) = progress_bar {
        pb.finish_with_message("Scan complete");
    }

    if let Some(output_dir) = &args.output_dir {
        std::fs::create_dir_all(output_dir)?;
    }
    let counts_path = output_path(args.output_dir.as_deref(), &config.scan.counts_file);
    let files_path = output_path(args.output_dir.as_deref(), &config.scan.files_file);
    output_formatter::write_scan_results(&report, &counts_path, &files_path)?;

    if let Some(path) = &args.csv {
        output_formatter::export_scan_csv(&report, path)?;
    }

    info!(
        "Scanned {} files: {} matches, {} extraction errors",
        report.files_processed, report.match_count, report.extraction_errors
    );

    if !quiet {
        println!("\n{}", output_formatter::format_scan_summary(&report, 10));
        println!("Results written to {}", counts_path.display());
    }

    Ok(())
}

fn output_path(output_dir: Option<&Path>, file_name: &str) -> PathBuf {
    match output_dir {
        Some(dir) => dir.join(file_name),
        None => PathBuf::from(file_name),
    }
}
