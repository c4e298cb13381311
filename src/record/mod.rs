//! Record parsing and batch summarization.
//!
//! This is the core of the tool: everything else (discovery, TSV framing,
//! reporting) feeds raw record strings in and formats results out.

pub mod aggregator;
pub mod parser;

pub use aggregator::{summarize, BatchSummary, EmptySampleError, ParseFailure};
pub use parser::{parse_record, MappingParseError, MappingValue, ParsedMapping};
