//! dmarcsum - DMARC Aggregate Report Summarizer
//!
//! This tool extracts DMARC aggregate reports from ZIP/GZIP archives or plain
//! XML files, classifies each record's SPF and DKIM outcome, and prints a
//! human-readable summary per report.
//!
//! Given a file path it processes that single report; without arguments it
//! scans the reports directory and summarizes every file in it. Output comes
//! in one of three formats: digest, narrative, or JSON.

use anyhow::{Context, Result};
use clap::Parser;
use colored::*;
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use dmarcsum::classify::classify_all;
use dmarcsum::config::Config;
use dmarcsum::dialog::{DialogNotifier, Notifier};
use dmarcsum::extract::extract_payloads;
use dmarcsum::models::{ParsedReport, RecordEntry, ReportMetadata, Verdict};
use dmarcsum::parser::parse_report;
use dmarcsum::render::{DigestRenderer, NarrativeRenderer, Renderer};

/// CLI arguments for dmarcsum.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Human-readable summaries of DMARC aggregate reports",
    long_about = "dmarcsum extracts, parses, and summarizes DMARC aggregate reports \
                  from .zip, .gz, or .xml files.\n\n\
                  With a FILE argument it summarizes that single report; without one \
                  it scans the reports directory (default ./reports, override with \
                  DMARC_REPORTS_DIR) and summarizes every file found there."
)]
struct Cli {
    /// Path to a single report file; scans the reports directory when omitted
    #[arg(value_parser)]
    file: Option<PathBuf>,

    /// Output format: digest, narrative, json
    #[arg(short, long, default_value = "digest")]
    output: OutputFormat,

    /// Also show each summary in a native dialog window (single-file mode)
    #[arg(short, long)]
    dialog: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Supported output formats.
#[derive(Debug, Clone)]
enum OutputFormat {
    Digest,
    Narrative,
    Json,
}

impl FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "digest" => Ok(OutputFormat::Digest),
            "narrative" => Ok(OutputFormat::Narrative),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Invalid output format: {}", s)),
        }
    }
}

#[derive(Serialize)]
struct JsonSummary<'a> {
    metadata: &'a ReportMetadata,
    records: Vec<JsonRecord<'a>>,
}

#[derive(Serialize)]
struct JsonRecord<'a> {
    #[serde(flatten)]
    record: &'a RecordEntry,
    verdict: Verdict,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity.
    env_logger::Builder::from_env(env_logger::Env::default())
        .filter_level(if cli.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    println!(
        "{}\n{}\n",
        "dmarcsum - DMARC Aggregate Report Summarizer".bold().green(),
        "Extracting, parsing & summarizing DMARC reports".dimmed()
    );

    let config = Config::new().context("Failed to load configuration")?;

    match &cli.file {
        Some(path) => run_single(path, &config, &cli),
        None => run_batch(&config, &cli),
    }
}

/// Summarizes one report file; any error here is fatal for the run.
fn run_single(path: &Path, config: &Config, cli: &Cli) -> Result<()> {
    if !path.exists() {
        anyhow::bail!("File not found: {}", path.display());
    }
    log::info!("Processing file: {}", path.display());

    let payloads = extract_payloads(path, config).context("Failed to extract file")?;
    for xml in &payloads {
        let summary = summarize_payload(xml, &cli.output);
        println!("{}", summary);
        if cli.dialog {
            if let Err(e) = DialogNotifier.notify(&summary) {
                log::warn!("Failed to display dialog: {}", e);
            }
        }
    }

    log::info!("Analysis complete!");
    Ok(())
}

/// Summarizes every file in the reports directory.
fn run_batch(config: &Config, cli: &Cli) -> Result<()> {
    for summary in batch_summaries(config, &cli.output)? {
        println!("{}", summary);
    }
    log::info!("Analysis complete!");
    Ok(())
}

/// Collects one summary per payload across the reports directory. A file
/// that cannot be extracted (unsupported extension included) is skipped
/// with a warning; the batch itself never aborts.
fn batch_summaries(config: &Config, format: &OutputFormat) -> Result<Vec<String>> {
    let mut paths: Vec<PathBuf> = std::fs::read_dir(&config.reports_dir)
        .with_context(|| {
            format!(
                "Failed to read reports directory: {}",
                config.reports_dir.display()
            )
        })?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.is_file())
        .collect();
    paths.sort();

    if paths.is_empty() {
        log::warn!(
            "No report files found in {}",
            config.reports_dir.display()
        );
    }

    let mut summaries = Vec::new();
    for path in paths {
        log::info!("Processing file: {}", path.display());
        let payloads = match extract_payloads(&path, config) {
            Ok(payloads) => payloads,
            Err(e) => {
                log::warn!("Skipping {}: {}", path.display(), e);
                continue;
            }
        };
        for xml in &payloads {
            summaries.push(summarize_payload(xml, format));
        }
    }
    Ok(summaries)
}

/// Parses and renders one XML payload. Parse and render problems become a
/// descriptive string in place of the summary, never a fault.
fn summarize_payload(xml: &str, format: &OutputFormat) -> String {
    let report = match parse_report(xml) {
        Ok(report) => report,
        Err(e) => return format!("Error: failed to parse DMARC XML: {}", e),
    };
    let verdicts = classify_all(&report);
    match format {
        OutputFormat::Digest => DigestRenderer.render(&report, &verdicts),
        OutputFormat::Narrative => NarrativeRenderer.render(&report, &verdicts),
        OutputFormat::Json => render_json(&report, &verdicts)
            .unwrap_or_else(|e| format!("Error: failed to serialize report: {}", e)),
    }
}

fn render_json(report: &ParsedReport, verdicts: &[Verdict]) -> Result<String, serde_json::Error> {
    let summary = JsonSummary {
        metadata: &report.metadata,
        records: report
            .records
            .iter()
            .zip(verdicts)
            .map(|(record, verdict)| JsonRecord {
                record,
                verdict: *verdict,
            })
            .collect(),
    };
    serde_json::to_string_pretty(&summary)
}
