//! Batch summarization of raw score records.
//!
//! `summarize` is the core of the tool: it takes a batch of raw record
//! strings, parses each one as a mapping literal, flattens every numeric
//! value into one sample, and computes descriptive statistics over it.
//! A record that fails to parse contributes nothing and is collected as a
//! failure; it never aborts the batch.

use crate::models::SummaryStatistics;
use crate::record::parser::{self, MappingParseError};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;

/// One record that could not be parsed, with enough context to trace it back
/// to its source row.
#[derive(Debug, Clone, Serialize)]
pub struct ParseFailure {
    /// Zero-based index of the record within the input batch.
    pub index: usize,
    /// The offending text.
    pub record: String,
    /// Why parsing failed.
    pub reason: String,
}

impl ParseFailure {
    fn new(index: usize, record: &str, error: MappingParseError) -> Self {
        Self {
            index,
            record: record.to_string(),
            reason: error.to_string(),
        }
    }
}

/// The result of summarizing a batch: statistics over every numeric value
/// found, plus the records that were skipped.
#[derive(Debug, Clone, Serialize)]
pub struct BatchSummary {
    /// Statistics over the flattened sample.
    pub stats: SummaryStatistics,
    /// Records that failed to parse, in input order.
    pub failures: Vec<ParseFailure>,
}

/// No record in the batch yielded any numeric value.
///
/// Distinct from a zero-count success: statistics over an empty sample are
/// meaningless, so the whole call fails. The collected per-record failures
/// ride along so the caller can still explain *why* the sample is empty.
#[derive(Debug, Clone, Error)]
#[error("no numeric values found across {records} records ({} failed to parse)", .failures.len())]
pub struct EmptySampleError {
    /// Total number of records in the batch.
    pub records: usize,
    /// Records that failed to parse.
    pub failures: Vec<ParseFailure>,
}

/// Summarize a batch of raw records.
///
/// Pure with respect to its input: same batch in, bit-identical statistics
/// out. All I/O (reading log files, writing reports) lives with the caller.
pub fn summarize<S: AsRef<str>>(records: &[S]) -> Result<BatchSummary, EmptySampleError> {
    let mut sample: Vec<f64> = Vec::new();
    let mut failures = Vec::new();

    for (index, record) in records.iter().enumerate() {
        let record = record.as_ref();
        match parser::parse_record(record) {
            Ok(mapping) => {
                for (_, value) in &mapping {
                    value.flatten_into(&mut sample);
                }
            }
            Err(error) => {
                debug!("record {} skipped: {}", index, error);
                failures.push(ParseFailure::new(index, record, error));
            }
        }
    }

    match SummaryStatistics::from_sample(&sample) {
        Some(stats) => Ok(BatchSummary { stats, failures }),
        None => Err(EmptySampleError {
            records: records.len(),
            failures,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_list_record() {
        let summary = summarize(&["{1264=[1, 2, 3]}"]).unwrap();
        assert!(summary.failures.is_empty());
        assert_eq!(summary.stats.count, 3);
        assert_eq!(summary.stats.minimum, 1.0);
        assert_eq!(summary.stats.maximum, 3.0);
        assert_eq!(summary.stats.mean, 2.0);
        assert_eq!(summary.stats.variance, 1.0);
    }

    #[test]
    fn test_scalar_record() {
        let summary = summarize(&["{4077=4077}"]).unwrap();
        assert_eq!(summary.stats.count, 1);
        assert_eq!(summary.stats.minimum, 4077.0);
        assert_eq!(summary.stats.maximum, 4077.0);
        assert_eq!(summary.stats.mean, 4077.0);
        // Sample variance is undefined for n=1; reported as NaN, not an error.
        assert!(summary.stats.variance.is_nan());
    }

    #[test]
    fn test_count_spans_all_records() {
        let summary = summarize(&["{1=[1,2]}", "{2=3}", "{3=[4,5,6]}"]).unwrap();
        assert_eq!(summary.stats.count, 6);
        assert!(summary.failures.is_empty());
        assert!(summary.stats.minimum <= summary.stats.mean);
        assert!(summary.stats.mean <= summary.stats.maximum);
    }

    #[test]
    fn test_malformed_record_is_skipped_not_fatal() {
        let summary = summarize(&["{1=[1,2]}", "{1=[1,2"]).unwrap();
        assert_eq!(summary.stats.count, 2);
        assert_eq!(summary.failures.len(), 1);
        assert_eq!(summary.failures[0].index, 1);
        assert_eq!(summary.failures[0].record, "{1=[1,2");
    }

    #[test]
    fn test_all_failed_batch_is_empty_sample() {
        let err = summarize(&["not a mapping", "{broken"]).unwrap_err();
        assert_eq!(err.records, 2);
        assert_eq!(err.failures.len(), 2);
        assert_eq!(err.failures[0].index, 0);
        assert_eq!(err.failures[1].index, 1);
    }

    #[test]
    fn test_empty_batch_is_empty_sample() {
        let err = summarize::<&str>(&[]).unwrap_err();
        assert_eq!(err.records, 0);
        assert!(err.failures.is_empty());
    }

    #[test]
    fn test_empty_mappings_yield_empty_sample() {
        // Records parse fine but contribute no values.
        let err = summarize(&["{}", "{}"]).unwrap_err();
        assert_eq!(err.records, 2);
        assert!(err.failures.is_empty());
    }

    #[test]
    fn test_mixed_integer_and_fractional_literals() {
        let summary = summarize(&["{a=1, b=[2.5, 3]}"]).unwrap();
        assert_eq!(summary.stats.count, 3);
        assert_eq!(summary.stats.minimum, 1.0);
        assert_eq!(summary.stats.maximum, 3.0);
    }

    #[test]
    fn test_summarize_is_deterministic() {
        let batch = ["{1=[1,2,3]}", "{2=0.5}", "garbage"];
        let a = summarize(&batch).unwrap();
        let b = summarize(&batch).unwrap();
        assert_eq!(a.stats.count, b.stats.count);
        assert_eq!(a.stats.minimum.to_bits(), b.stats.minimum.to_bits());
        assert_eq!(a.stats.maximum.to_bits(), b.stats.maximum.to_bits());
        assert_eq!(a.stats.mean.to_bits(), b.stats.mean.to_bits());
        assert_eq!(a.stats.variance.to_bits(), b.stats.variance.to_bits());
        assert_eq!(a.failures.len(), b.failures.len());
    }
}
