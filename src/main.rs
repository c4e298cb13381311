//! ScoreStats - summary statistics for graph-simulation score logs
//!
//! A CLI tool that summarizes the tab-separated logs written by a graph
//! simulation (centrality scoring and independent-cascade infection spread)
//! into Markdown or JSON reports.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (missing logs dir, config failure, etc.)
//!   2 - More records skipped than --fail-on-skipped allows

mod analysis;
mod cli;
mod config;
mod logfile;
mod models;
mod record;
mod report;
mod scanner;
mod tally;

use anyhow::{Context, Result};
use chrono::{Local, Utc};
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{CategorySummary, Report, ReportMetadata};
use scanner::LogScanner;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        match handle_init_config() {
            Ok(()) => std::process::exit(0),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    // Initialize logging
    init_logging(&args);

    info!("ScoreStats v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    match run(args) {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Run failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .scorestats.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".scorestats.toml");

    if path.exists() {
        eprintln!("⚠️  .scorestats.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .scorestats.toml")?;

    println!("✅ Created .scorestats.toml with default settings.");
    println!("   Edit it to customize log categories, column schemas, and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete workflow. Returns exit code (0 or 2).
fn run(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let log_scanner = LogScanner::new(args.logs_dir.clone());

    if args.dry_run {
        return handle_dry_run(&log_scanner, &config);
    }

    if args.tally {
        return run_tally(&args, &config, &log_scanner);
    }

    run_summary(&args, &config, &log_scanner, start_time)
}

/// Handle --dry-run: discover log files, print what would be processed, exit.
fn handle_dry_run(log_scanner: &LogScanner, config: &Config) -> Result<i32> {
    println!("\n🔍 Dry run: discovering log files (nothing is parsed)...\n");

    let mut total = 0;
    for category in &config.categories {
        let files = log_scanner.latest(&category.prefix, config.scanner.latest)?;
        println!("   {} ({}*):", category.name, category.prefix);
        if files.is_empty() {
            println!("     (none)");
        }
        for file in &files {
            println!("     📄 {}", scanner::file_name(file));
        }
        total += files.len();
    }

    let cascade = log_scanner.discover(&config.tally.prefix)?;
    println!("   cascade results ({}*): {} file(s)", config.tally.prefix, cascade.len());

    println!("\n   Total: {} score log(s)", total);
    println!("\n✅ Dry run complete.");
    Ok(0)
}

/// Summarize every configured category and write the report.
fn run_summary(
    args: &Args,
    config: &Config,
    log_scanner: &LogScanner,
    start_time: Instant,
) -> Result<i32> {
    println!("📂 Scanning logs in: {}", args.logs_dir.display());

    // Discover everything first so the progress bar has a length.
    let mut discovered = Vec::new();
    let mut total_files = 0;
    for category in &config.categories {
        let files = log_scanner.latest(&category.prefix, config.scanner.latest)?;
        total_files += files.len();
        discovered.push((category, files));
    }

    if total_files == 0 {
        warn!("no log files found for any configured category");
    }
    println!("   Found {} log file(s) across {} categories", total_files, discovered.len());

    let progress = make_progress_bar(args, total_files);

    let mut categories = Vec::new();
    for (category, files) in discovered {
        let mut summaries = Vec::new();
        for path in &files {
            if let Some(ref pb) = progress {
                pb.set_message(scanner::file_name(path));
            }
            let summary = analysis::summarize_file(path, category)?;
            debug!(
                "{}: {} rows, {} skipped",
                summary.file,
                summary.rows,
                summary.skipped()
            );
            summaries.push(summary);
            if let Some(ref pb) = progress {
                pb.inc(1);
            }
        }
        categories.push(CategorySummary {
            category: category.name.clone(),
            files: summaries,
        });
    }

    if let Some(pb) = progress {
        pb.finish_and_clear();
    }

    // Build the report
    println!("\n📝 Generating report...");

    let duration = start_time.elapsed().as_secs_f64();
    let mut report = Report {
        metadata: ReportMetadata {
            logs_dir: args.logs_dir.display().to_string(),
            generated_at: Utc::now(),
            files_processed: total_files,
            records_skipped: 0,
            duration_seconds: duration,
        },
        categories,
    };
    let skipped = report.total_skipped();
    report.metadata.records_skipped = skipped;

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report, &config.report),
    };

    let output_path = output_path(&args.output, config.report.timestamp_output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    println!("\n📊 Summary:");
    println!("   Files processed: {}", total_files);
    println!("   Records skipped: {}", skipped);
    println!("   Duration: {:.1}s", duration);
    println!("\n✅ Report saved to: {}", output_path.display());

    check_skip_threshold(args, skipped)
}

/// Tally infected-node counts and write the tally report.
fn run_tally(args: &Args, config: &Config, log_scanner: &LogScanner) -> Result<i32> {
    let year = args.year.context("--tally requires --year")?;
    let seeds = args.seeds.context("--tally requires --seeds")?;

    println!(
        "🦠 Tallying infections for year {} with {} seeds...",
        year, seeds
    );

    let tally_report = tally::tally_infections(log_scanner, &config.tally, year, seeds)?;

    let output = match args.format {
        OutputFormat::Json => report::generate_tally_json(&tally_report)?,
        OutputFormat::Markdown => report::generate_tally_markdown(&tally_report),
    };

    let output_path = output_path(&args.output, config.report.timestamp_output);
    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    let skipped = tally_report.tally.failures.len();
    println!("\n📊 Summary:");
    println!(
        "   Runs merged: {} (from {} log files)",
        tally_report.tally.rows_merged,
        tally_report.files_merged.len()
    );
    println!(
        "   Infections: {} total, {} distinct nodes",
        tally_report.tally.total_infections(),
        tally_report.tally.distinct_nodes()
    );
    println!("   Rows skipped: {}", skipped);
    println!("\n✅ Report saved to: {}", output_path.display());

    check_skip_threshold(args, skipped)
}

/// Apply --fail-on-skipped: exit code 2 when the threshold is exceeded.
fn check_skip_threshold(args: &Args, skipped: usize) -> Result<i32> {
    if let Some(threshold) = args.fail_on_skipped {
        if skipped > threshold {
            eprintln!(
                "\n⛔ {} records skipped, more than the allowed {}. Failing (exit code 2).",
                skipped, threshold
            );
            return Ok(2);
        }
    }
    Ok(0)
}

/// Set up a progress bar over the files to process, unless in quiet mode.
fn make_progress_bar(args: &Args, total: usize) -> Option<ProgressBar> {
    if args.quiet || total == 0 {
        return None;
    }
    let pb = ProgressBar::new(total as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    Some(pb)
}

/// Resolve the output path, appending the simulation's timestamp suffix
/// (`__YYYY_MM_DD_HH_MM_SS`) when configured.
fn output_path(output: &PathBuf, timestamp: bool) -> PathBuf {
    if !timestamp {
        return output.clone();
    }

    let now = Local::now().format("%Y_%m_%d_%H_%M_%S");
    let stem = output
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "stats_scores".to_string());
    let name = match output.extension() {
        Some(ext) => format!("{}__{}.{}", stem, now, ext.to_string_lossy()),
        None => format!("{}__{}", stem, now),
    };
    output.with_file_name(name)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .scorestats.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_path_without_timestamp() {
        let path = PathBuf::from("stats_scores.md");
        assert_eq!(output_path(&path, false), path);
    }

    #[test]
    fn test_output_path_with_timestamp() {
        let path = output_path(&PathBuf::from("stats_scores.md"), true);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("stats_scores__"));
        assert!(name.ends_with(".md"));
        // stem + "__" + 19-char timestamp + ".md"
        assert_eq!(name.len(), "stats_scores".len() + 2 + 19 + 3);
    }

    #[test]
    fn test_output_path_without_extension() {
        let path = output_path(&PathBuf::from("report"), true);
        let name = path.file_name().unwrap().to_string_lossy().to_string();
        assert!(name.starts_with("report__"));
        assert!(!name.contains('.'));
    }
}
