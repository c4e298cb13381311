//! Markdown and JSON report generation.
//!
//! This module renders the structured summaries into the textual reports the
//! tool writes to disk. All numbers are formatted here; the models stay
//! format-agnostic.

use crate::config::ReportConfig;
use crate::models::{CategorySummary, FileSummary, Report, ReportMetadata, TallyReport};
use crate::record::ParseFailure;
use anyhow::Result;

const MAX_RECORD_PREVIEW: usize = 80;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &Report, config: &ReportConfig) -> String {
    let mut output = String::new();

    output.push_str("# Score Statistics Report\n\n");
    output.push_str(&generate_metadata_section(&report.metadata));

    for category in &report.categories {
        output.push_str(&generate_category_section(category, config));
    }

    if report.categories.iter().all(|c| c.files.is_empty()) {
        output.push_str("No log files were found for any configured category.\n");
    }

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **Logs Directory:** `{}`\n", metadata.logs_dir));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!(
        "- **Files Processed:** {}\n",
        metadata.files_processed
    ));
    section.push_str(&format!(
        "- **Records Skipped:** {}\n",
        metadata.records_skipped
    ));
    section.push_str(&format!(
        "- **Duration:** {:.1}s\n",
        metadata.duration_seconds
    ));
    section.push('\n');

    section
}

/// Generate one category section.
fn generate_category_section(category: &CategorySummary, config: &ReportConfig) -> String {
    let mut section = String::new();

    section.push_str(&format!("## {}\n\n", title_case(&category.category)));

    if category.files.is_empty() {
        section.push_str("No log files found.\n\n");
        return section;
    }

    for file in &category.files {
        section.push_str(&generate_file_section(file, config));
    }

    section
}

/// Generate the section for a single log file.
fn generate_file_section(file: &FileSummary, config: &ReportConfig) -> String {
    let mut section = String::new();

    section.push_str(&format!("### `{}`\n\n", file.file));
    section.push_str(&format!(
        "*Rows: {} | Records skipped: {}*\n\n",
        file.rows,
        file.skipped()
    ));

    section.push_str("| Column | Count | Min | Max | Mean | Variance |\n");
    section.push_str("|:---|---:|---:|---:|---:|---:|\n");
    for column in &file.columns {
        match &column.stats {
            Some(stats) => {
                section.push_str(&format!(
                    "| {} | {} | {} | {} | {:.6} | {} |\n",
                    column.column,
                    stats.count,
                    stats.minimum,
                    stats.maximum,
                    stats.mean,
                    stats.variance_display()
                ));
            }
            None => {
                section.push_str(&format!(
                    "| {} | 0 | - | - | - | - |\n",
                    column.column
                ));
            }
        }
    }
    section.push('\n');

    if config.include_failures {
        let failures: Vec<(&str, &ParseFailure)> = file
            .columns
            .iter()
            .flat_map(|c| c.failures.iter().map(move |f| (c.column.as_str(), f)))
            .collect();
        if !failures.is_empty() {
            section.push_str("**Skipped records:**\n\n");
            for &(column, failure) in failures.iter().take(config.max_failure_records) {
                section.push_str(&format!(
                    "- row {}, column `{}`: {} — `{}`\n",
                    failure.index,
                    column,
                    failure.reason,
                    preview(&failure.record)
                ));
            }
            if failures.len() > config.max_failure_records {
                section.push_str(&format!(
                    "- ... and {} more\n",
                    failures.len() - config.max_failure_records
                ));
            }
            section.push('\n');
        }
    }

    section
}

/// Generate a JSON report.
pub fn generate_json_report(report: &Report) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Generate a Markdown infection-tally report.
pub fn generate_tally_markdown(report: &TallyReport) -> String {
    let mut output = String::new();

    output.push_str("# Infection Tally Report\n\n");
    output.push_str("## Metadata\n\n");
    output.push_str(&format!("- **Year:** {}\n", report.year));
    output.push_str(&format!("- **Seeds:** {}\n", report.num_seeds));
    output.push_str(&format!(
        "- **Generated:** {}\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    output.push_str(&format!(
        "- **Runs Merged:** {} (from {} log files)\n",
        report.tally.rows_merged,
        report.files_merged.len()
    ));
    output.push_str(&format!(
        "- **Total Infections:** {} ({} distinct nodes)\n",
        report.tally.total_infections(),
        report.tally.distinct_nodes()
    ));
    if !report.tally.failures.is_empty() {
        output.push_str(&format!(
            "- **Rows Skipped:** {}\n",
            report.tally.failures.len()
        ));
    }
    output.push('\n');

    output.push_str("## Counts by Seed\n\n");
    for (seed, nodes) in &report.tally.counts {
        output.push_str(&format!("### Seed {}\n\n", seed));
        output.push_str("| Node | Infections |\n");
        output.push_str("|---:|---:|\n");

        // Most frequently reached nodes first; ties by node id.
        let mut entries: Vec<(&i64, &usize)> = nodes.iter().collect();
        entries.sort_by(|a, b| b.1.cmp(a.1).then(a.0.cmp(b.0)));
        for (node, count) in entries {
            output.push_str(&format!("| {} | {} |\n", node, count));
        }
        output.push('\n');
    }

    output
}

/// Generate a JSON infection-tally report.
pub fn generate_tally_json(report: &TallyReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

/// Truncate a record for inline display.
fn preview(record: &str) -> String {
    if record.chars().count() <= MAX_RECORD_PREVIEW {
        record.to_string()
    } else {
        let truncated: String = record.chars().take(MAX_RECORD_PREVIEW).collect();
        format!("{}...", truncated)
    }
}

/// Capitalize each word of a category name for a heading.
fn title_case(name: &str) -> String {
    name.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
