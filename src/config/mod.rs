//! Configuration module for Catalog-Sweep
//!
//! This module handles loading, parsing, and validating TOML configuration
//! files. Command-line flags are layered on top by the binary, after which
//! `validate` runs once more.
//!
//! # Example
//!
//! ```no_run
//! use catalog_sweep::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("sweep.toml")).unwrap();
//! println!("Separator: {}", config.output.separator);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FilterConfig, OutputConfig, SiteConfig, DEFAULT_TITLE_COLUMN,
    DEFAULT_USER_AGENT,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, load_config, load_config_with_hash, parse_config, read_config_with_hash,
};

// Re-export validation
pub use validation::{compile_filters, makers_url, validate, Filters};
