//! Catalog-Sweep: a catalog crawler with a self-growing column schema
//!
//! This crate walks a maker → product list → product detail catalog site,
//! extracts the attribute tables of every detail page and merges them into a
//! single table whose columns are discovered while the crawl runs.

pub mod config;
pub mod crawler;
pub mod filter;
pub mod output;
pub mod schema;
pub mod state;

use thiserror::Error;

/// Main error type for Catalog-Sweep operations
#[derive(Debug, Error)]
pub enum SweepError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Crawl aborted after failure at {url}: {reason}")]
    Aborted { url: String, reason: String },

    #[error("Export error: {0}")]
    Export(#[from] output::OutputError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid filter '{filter}': {reason}")]
    InvalidFilter { filter: String, reason: String },

    #[error("Invalid selector '{selector}'")]
    InvalidSelector { selector: String },
}

/// Result type alias for Catalog-Sweep operations
pub type Result<T> = std::result::Result<T, SweepError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use filter::Filter;
pub use schema::{Row, SchemaRegistry};
pub use state::{PageKind, PageTask, TaskState};
