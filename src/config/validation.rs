use crate::config::types::{Config, CrawlerConfig, FilterConfig, OutputConfig, SiteConfig};
use crate::crawler::PageSelectors;
use crate::filter::Filter;
use crate::ConfigError;
use url::Url;

/// Brand and model filters compiled from `FilterConfig`
#[derive(Debug, Clone, Default)]
pub struct Filters {
    pub brand: Filter,
    pub model: Filter,
}

/// Validates the entire configuration
///
/// Runs before any network activity; every error here is fatal.
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    compile_filters(&config.filter)?;
    validate_output_config(&config.output)?;
    validate_site_config(&config.site)?;
    Ok(())
}

/// Compiles the brand and model filter arguments
pub fn compile_filters(config: &FilterConfig) -> Result<Filters, ConfigError> {
    Ok(Filters {
        brand: Filter::parse(&config.brand)?,
        model: Filter::parse(&config.model)?,
    })
}

/// Resolves the maker list URL from the site configuration
pub fn makers_url(config: &SiteConfig) -> Result<Url, ConfigError> {
    let base = Url::parse(&config.base_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid base_url: {}", e)))?;

    if base.scheme() != "http" && base.scheme() != "https" {
        return Err(ConfigError::InvalidUrl(format!(
            "base_url '{}' must use http or https",
            config.base_url
        )));
    }

    base.join(&config.makers_path)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid makers_path: {}", e)))
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_connections < 1 || config.max_connections > 64 {
        return Err(ConfigError::Validation(format!(
            "max_connections must be between 1 and 64, got {}",
            config.max_connections
        )));
    }

    if config.max_attempts < 1 {
        return Err(ConfigError::Validation(format!(
            "max_attempts must be >= 1, got {}",
            config.max_attempts
        )));
    }

    if config.timeout_ms == 0 {
        return Err(ConfigError::Validation(
            "timeout_ms must be greater than 0".to_string(),
        ));
    }

    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "user_agent cannot be empty".to_string(),
        ));
    }

    if let (Some(min), Some(max)) = (config.min_maker, config.max_maker) {
        if min > max {
            return Err(ConfigError::Validation(format!(
                "min_maker ({}) cannot be greater than max_maker ({})",
                min, max
            )));
        }
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    let mut chars = config.separator.chars();
    let separator = match (chars.next(), chars.next()) {
        (Some(c), None) => c,
        _ => {
            return Err(ConfigError::Validation(format!(
                "separator must be a single character, got '{}'",
                config.separator
            )));
        }
    };

    if !separator.is_ascii() || matches!(separator, '"' | '\n' | '\r') {
        return Err(ConfigError::Validation(format!(
            "separator must be an ASCII character other than a quote or line break, got {:?}",
            separator
        )));
    }

    if config.prefix.is_empty() {
        return Err(ConfigError::Validation("prefix cannot be empty".to_string()));
    }

    if config.title_column.is_empty() {
        return Err(ConfigError::Validation(
            "title_column cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates the site layout: base URL and every selector
fn validate_site_config(config: &SiteConfig) -> Result<(), ConfigError> {
    makers_url(config)?;
    PageSelectors::from_config(config)?;
    Ok(())
}
