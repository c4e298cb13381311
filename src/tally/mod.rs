//! Infected-node tallies across cascade runs.
//!
//! Each independent-cascade run logs one row per (year, seed count) with an
//! `infectedNodes` mapping of seed → infection chain. Because the cascade is
//! stochastic, a single run says little; merging the per-seed chains of the
//! latest N runs into occurrence counters shows which nodes a seed reliably
//! reaches.

use crate::config::TallyConfig;
use crate::logfile::LogTable;
use crate::models::{InfectionTally, TallyReport};
use crate::record::{self, ParseFailure};
use crate::scanner::{self, LogScanner};
use anyhow::{bail, Result};
use chrono::Utc;
use tracing::{debug, info, warn};

/// Merge the latest cascade result logs into per-seed infection counters for
/// one (year, seed count) pair.
pub fn tally_infections(
    log_scanner: &LogScanner,
    config: &TallyConfig,
    year: i32,
    num_seeds: u32,
) -> Result<TallyReport> {
    let [year_col, seeds_col, infected_col] = match config.columns.as_slice() {
        [a, b, c] => [a.clone(), b.clone(), c.clone()],
        other => bail!(
            "tally.columns must name exactly 3 columns (year, seed count, infected nodes), got {}",
            other.len()
        ),
    };

    let files = log_scanner.latest(&config.prefix, Some(config.latest))?;
    if files.is_empty() {
        bail!(
            "no '{}*' logs found in {}",
            config.prefix,
            log_scanner.logs_dir().display()
        );
    }
    info!("merging {} cascade result log(s)", files.len());

    let year_text = year.to_string();
    let seeds_text = num_seeds.to_string();
    let mut tally = InfectionTally::default();

    for path in &files {
        let table = LogTable::read(path, &config.columns)?;
        let (Some(years), Some(seeds), Some(infected)) = (
            table.column(&year_col),
            table.column(&seeds_col),
            table.column(&infected_col),
        ) else {
            continue;
        };

        for row in 0..table.rows() {
            if years[row] != Some(year_text.as_str()) || seeds[row] != Some(seeds_text.as_str()) {
                continue;
            }
            let Some(text) = infected[row] else {
                continue;
            };

            match record::parse_record(text) {
                Ok(mapping) => {
                    merge_row(&mut tally, &mapping);
                    tally.rows_merged += 1;
                }
                Err(error) => {
                    warn!(
                        "row {} of {} skipped: {}",
                        row,
                        path.display(),
                        error
                    );
                    tally.failures.push(ParseFailure {
                        index: row,
                        record: text.to_string(),
                        reason: format!("{} ({})", error, scanner::file_name(path)),
                    });
                }
            }
        }
    }

    debug!(
        "tally: {} rows merged, {} seeds, {} distinct nodes",
        tally.rows_merged,
        tally.counts.len(),
        tally.distinct_nodes()
    );

    Ok(TallyReport {
        year,
        num_seeds,
        files_merged: files.iter().map(|p| scanner::file_name(p)).collect(),
        generated_at: Utc::now(),
        tally,
    })
}

/// Fold one run's seed → chain mapping into the counters.
fn merge_row(tally: &mut InfectionTally, mapping: &record::ParsedMapping) {
    for (seed, value) in mapping {
        let counter = tally.counts.entry(seed.clone()).or_default();
        let mut nodes = Vec::new();
        value.flatten_into(&mut nodes);
        for node in nodes {
            if node.fract() != 0.0 {
                warn!("non-integer node id {} in chain of seed {}", node, seed);
                continue;
            }
            *counter.entry(node as i64).or_insert(0) += 1;
        }
    }
}
