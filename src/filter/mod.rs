//! Brand and model name filters
//!
//! A filter argument is either plain text, matched as a case-insensitive
//! substring, or a `/pattern/flags` literal compiled to a regular expression.
//! The decision is made once when the filter is parsed.
//!
//! # Example
//!
//! ```
//! use catalog_sweep::filter::Filter;
//!
//! let brand = Filter::parse("/^Samsung$/i").unwrap();
//! assert!(brand.matches("samsung"));
//! assert!(!brand.matches("Samsung Galaxy"));
//!
//! let model = Filter::parse("galaxy").unwrap();
//! assert!(model.matches("Samsung Galaxy S24"));
//! ```

use crate::ConfigError;
use regex::{Regex, RegexBuilder};

/// A parsed name filter
#[derive(Debug, Clone, Default)]
pub enum Filter {
    /// Empty filter argument, matches every name
    #[default]
    Any,

    /// Case-insensitive substring match (stored lowercased)
    Literal(String),

    /// Regular expression given as `/pattern/flags`
    Pattern(Regex),
}

impl Filter {
    /// Parses a filter argument
    ///
    /// # Returns
    ///
    /// * `Ok(Filter)` - The tagged filter value
    /// * `Err(ConfigError::InvalidFilter)` - Bad regex or unsupported flag
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        if raw.is_empty() {
            return Ok(Self::Any);
        }

        match split_pattern_literal(raw) {
            Some((pattern, flags)) => compile_pattern(raw, pattern, flags).map(Self::Pattern),
            None => Ok(Self::Literal(raw.to_lowercase())),
        }
    }

    /// Returns true if `name` passes the filter
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Any => true,
            Self::Literal(needle) => name.to_lowercase().contains(needle.as_str()),
            Self::Pattern(re) => re.is_match(name),
        }
    }

    /// Returns true if the filter lets everything through
    pub fn is_any(&self) -> bool {
        matches!(self, Self::Any)
    }
}

/// Splits `/pattern/flags` into its parts
///
/// The pattern must be non-empty and the flags, if any, word characters only.
/// Anything else is treated as a literal.
fn split_pattern_literal(raw: &str) -> Option<(&str, &str)> {
    let body = raw.strip_prefix('/')?;
    let close = body.rfind('/')?;
    let (pattern, flags) = (&body[..close], &body[close + 1..]);

    if pattern.is_empty() {
        return None;
    }
    if !flags.chars().all(|c| c.is_alphanumeric() || c == '_') {
        return None;
    }

    Some((pattern, flags))
}

fn compile_pattern(raw: &str, pattern: &str, flags: &str) -> Result<Regex, ConfigError> {
    let mut builder = RegexBuilder::new(pattern);

    for flag in flags.chars() {
        match flag {
            'i' => {
                builder.case_insensitive(true);
            }
            'm' => {
                builder.multi_line(true);
            }
            's' => {
                builder.dot_matches_new_line(true);
            }
            'x' => {
                builder.ignore_whitespace(true);
            }
            'u' => {
                builder.unicode(true);
            }
            // global/sticky have no meaning for a single test
            'g' | 'y' => {}
            other => {
                return Err(ConfigError::InvalidFilter {
                    filter: raw.to_string(),
                    reason: format!("unsupported flag '{}'", other),
                });
            }
        }
    }

    builder.build().map_err(|e| ConfigError::InvalidFilter {
        filter: raw.to_string(),
        reason: e.to_string(),
    })
}
