use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use tracing::{info, warn};

use url_taxonomy::aggregate::{AnalysisKind, ParseSummary, TrafficAggregator};
use url_taxonomy::classifier::{ClassificationRecord, UrlClassifier};
use url_taxonomy::config::RunConfig;
use url_taxonomy::export::{self, ParsedRow, RecordWriter};
use url_taxonomy::ingest::{self, InputRow, TableReader};
use url_taxonomy::utils::logger::init_logger;

#[derive(Parser)]
#[command(
    name = "url-taxonomy",
    about = "Classify site URLs into a taxonomy and analyze traffic by it"
)]
struct Cli {
    /// Input CSV/TSV file containing URLs
    input_file: PathBuf,

    /// Output directory for results (default: output)
    #[arg(short, long)]
    output_dir: Option<PathBuf>,

    /// Name of the URL column (auto-detected if not given)
    #[arg(short, long)]
    url_column: Option<String>,

    /// Name of the traffic column used for analysis (default: Traffic)
    #[arg(short, long)]
    traffic_column: Option<String>,

    /// Rows classified per chunk (default: 10000)
    #[arg(short, long)]
    batch_size: Option<usize>,

    /// Skip traffic analysis
    #[arg(long)]
    no_analysis: bool,

    /// Process only the first N rows
    #[arg(short, long)]
    sample: Option<usize>,

    /// Configuration file (default: url_taxonomy.toml if present)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Directory for log files (default: logs)
    #[arg(long)]
    log_dir: Option<PathBuf>,
}

impl Cli {
    fn apply_to(&self, config: &mut RunConfig) {
        if let Some(dir) = &self.output_dir {
            config.output_dir = dir.clone();
        }
        if let Some(column) = &self.url_column {
            config.url_column = Some(column.clone());
        }
        if let Some(column) = &self.traffic_column {
            config.traffic_column = column.clone();
        }
        if let Some(size) = self.batch_size {
            config.batch_size = size;
        }
        if self.no_analysis {
            config.analysis = false;
        }
        if let Some(sample) = self.sample {
            config.sample = Some(sample);
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.clone();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = RunConfig::load(cli.config.as_deref())?;
    cli.apply_to(&mut config);
    config.validate()?;

    let log_file = init_logger(&config.log_dir)?;
    println!("Logging to: {}", log_file.display());

    if !cli.input_file.exists() {
        bail!("Input file '{}' not found", cli.input_file.display());
    }

    export::create_output_dir(&config.output_dir)?;
    println!("Output directory: {}", config.output_dir.display());

    let start = Instant::now();
    run(&cli, &config)?;

    println!("\nComplete! Total runtime: {:.1} seconds", start.elapsed().as_secs_f64());
    println!("All results saved in: {}/", config.output_dir.display());
    Ok(())
}

fn run(cli: &Cli, config: &RunConfig) -> Result<()> {
    let start = Instant::now();

    let total_rows = ingest::count_data_rows(&cli.input_file)?;
    println!("\nProcessing file: {}", cli.input_file.display());
    println!("Total rows to process: {}", total_rows);

    let mut reader = TableReader::open(
        &cli.input_file,
        config.url_column.as_deref(),
        &config.traffic_column,
    )?;
    println!("Using URL column: {}", reader.url_column());
    info!(
        "Processing {} in chunks of {} rows (URL column: {})",
        cli.input_file.display(),
        config.batch_size,
        reader.url_column()
    );

    let expected = match config.sample {
        Some(sample) => {
            println!("Processing sample of {} rows", sample);
            total_rows.min(sample as u64)
        }
        None => total_rows,
    };

    let run_analysis = config.analysis && reader.has_traffic();
    let classifier = UrlClassifier::new();
    let mut writer = RecordWriter::create(&config.output_dir)?;
    let mut summary = ParseSummary::new();
    let mut aggregator = TrafficAggregator::new();

    let progress = ProgressBar::new(expected);
    progress.set_style(ProgressStyle::with_template(
        "Progress: |{bar:40}| {percent}% ({pos}/{len}) ETA: {eta}",
    )?);

    let mut remaining = config.sample.unwrap_or(usize::MAX);
    let mut chunk_count = 0usize;
    while remaining > 0 {
        let rows = reader.read_chunk(config.batch_size.min(remaining))?;
        if rows.is_empty() {
            break;
        }
        remaining -= rows.len();
        chunk_count += 1;
        info!("Processing batch {} ({} rows)", chunk_count, rows.len());

        let parsed = classify_chunk(&classifier, rows);
        for row in &parsed {
            summary.add(&row.record);
        }
        if run_analysis {
            aggregator.merge(TrafficAggregator::aggregate_parallel(
                parsed
                    .par_iter()
                    .filter_map(|row| row.traffic.map(|traffic| (&row.record, traffic))),
            ));
        }
        writer.write_rows(&parsed)?;
        progress.inc(parsed.len() as u64);
    }
    progress.finish_and_clear();

    let (records_path, written) = writer.finish()?;
    println!("\nProcessing completed in {:.1} seconds", start.elapsed().as_secs_f64());
    println!("Processed {} URLs", written);
    println!("Parsed data saved to: {}", records_path.display());

    print_summary(&summary);

    if !config.analysis {
        return Ok(());
    }
    if !reader.has_traffic() {
        warn!("Traffic column '{}' not found, skipping analysis", config.traffic_column);
        println!(
            "\nTraffic analysis skipped: Column '{}' not found",
            config.traffic_column
        );
        println!("Available columns: {:?}", reader.header().columns);
        println!("Use --traffic-column to specify the correct column name");
        return Ok(());
    }

    println!("\n=== TRAFFIC ANALYSIS ===");
    println!("Analyzing traffic patterns using column: {}", config.traffic_column);

    let report = aggregator.report(config.top_n);
    for path in export::write_report(&config.output_dir, &report)? {
        println!("Analysis written: {}", path.display());
    }

    if let Some(by_section) = report.get(AnalysisKind::BySection) {
        println!("\nTop Traffic Sections:");
        for row in by_section.rows.iter().take(5) {
            println!(
                "  {}: {:.0} total traffic ({} URLs)",
                row.key, row.total_traffic, row.url_count
            );
        }
    }

    Ok(())
}

/// Classifies a chunk of rows in parallel. Rows without a URL field are
/// replaced by the empty record so one bad row never aborts the chunk.
fn classify_chunk(classifier: &UrlClassifier, rows: Vec<InputRow>) -> Vec<ParsedRow> {
    rows.into_par_iter()
        .map(|row| {
            let record = match row.url.as_deref() {
                Some(url) => classifier.classify(url),
                None => {
                    warn!("Row on line {} has no URL field, using an empty record", row.line);
                    ClassificationRecord::empty("")
                }
            };
            ParsedRow {
                line: row.line,
                traffic: row.traffic,
                columns: row.columns,
                record,
            }
        })
        .collect()
}

fn print_summary(summary: &ParseSummary) {
    println!("\n=== PARSING SUMMARY ===");
    println!("Total URLs processed: {}", summary.total());

    println!("\nBy Section:");
    for (section, count) in summary.sections().into_iter().take(10) {
        println!("  {}: {} ({:.1}%)", section, count, summary.percentage(count));
    }

    println!("\nBy Category:");
    for (category, count) in summary.categories().into_iter().take(10) {
        println!("  {}: {} ({:.1}%)", category, count, summary.percentage(count));
    }
}
