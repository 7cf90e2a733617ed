//! Output module for turning collected rows into files
//!
//! This module handles:
//! - Collecting rows from concurrent workers (`Aggregator`)
//! - Padding them into a rectangular `Table` at the final schema width
//! - Writing the delimited export and the optional URL list files
//! - Crawl statistics

mod aggregator;
mod export;
pub mod stats;

pub use aggregator::{Aggregator, Table};
pub use export::{export_table, write_table, write_url_list, RunStamp};
pub use stats::CrawlStatistics;

use thiserror::Error;

/// Errors that can occur during output operations
#[derive(Debug, Error)]
pub enum OutputError {
    #[error("Failed to format output: {0}")]
    Format(String),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for output operations
pub type OutputResult<T> = Result<T, OutputError>;
