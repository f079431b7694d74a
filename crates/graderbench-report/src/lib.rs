//! graderbench-report — exports for finished evaluation runs.
//!
//! Implements the reporter side of the harness boundary: the engine hands
//! over an [`graderbench_core::report::EvaluationReport`] and this crate
//! turns it into CSV files and markdown summaries.

pub mod csv;
pub mod markdown;

#[cfg(test)]
mod test_support;

pub use crate::csv::{write_detailed_csv, write_responses_csv, write_summary_csv};
pub use crate::markdown::summary_markdown;
