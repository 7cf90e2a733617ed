use serde::Deserialize;
use std::path::PathBuf;

/// Default user agent, a desktop Firefox string
pub const DEFAULT_USER_AGENT: &str =
    "Mozilla/5.0 (X11; Ubuntu; Linux x86_64; rv:15.0) Gecko/20100101 Firefox/15.0.1";

/// Name of the synthetic first column holding each product's title
pub const DEFAULT_TITLE_COLUMN: &str = "Brand and Model";

/// Main configuration structure for Catalog-Sweep
///
/// Every section and field has a default, so an empty TOML file (or no file
/// at all) yields a usable configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub crawler: CrawlerConfig,
    pub filter: FilterConfig,
    pub output: OutputConfig,
    pub site: SiteConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Maximum number of fetches in flight at once
    pub max_connections: u32,

    /// Per-request timeout (milliseconds)
    pub timeout_ms: u64,

    /// Total attempts per URL before the fetch is treated as failed
    pub max_attempts: u32,

    /// Fixed delay between attempts (milliseconds)
    pub retry_delay_ms: u64,

    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Abort the whole run on the first failed page
    pub fail_fast: bool,

    /// First maker position (0-based, inclusive) to expand
    pub min_maker: Option<usize>,

    /// Last maker position (0-based, inclusive) to expand
    pub max_maker: Option<usize>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_connections: 2,
            timeout_ms: 60_000,
            max_attempts: 10,
            retry_delay_ms: 60_000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            fail_fast: false,
            min_maker: None,
            max_maker: None,
        }
    }
}

/// Brand and model filter arguments, compiled by `validation::compile_filters`
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Filter on maker names; plain text or `/pattern/flags`
    pub brand: String,

    /// Filter on product names; plain text or `/pattern/flags`
    pub model: String,
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct OutputConfig {
    /// Field separator, a single ASCII character
    pub separator: String,

    /// Directory the export (and list files) are written to
    pub directory: PathBuf,

    /// File name prefix of the export
    pub prefix: String,

    /// Header of the title column
    pub title_column: String,

    /// Also write the discovered maker and product URLs to text files
    pub dump_lists: bool,

    /// Drop rows where every field is blank
    pub skip_empty_rows: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            separator: ",".to_string(),
            directory: PathBuf::from("."),
            prefix: "catalog".to_string(),
            title_column: DEFAULT_TITLE_COLUMN.to_string(),
            dump_lists: false,
            skip_empty_rows: true,
        }
    }
}

impl OutputConfig {
    /// The separator as the byte the CSV writer expects
    ///
    /// Only meaningful after validation; falls back to a comma otherwise.
    pub fn separator_byte(&self) -> u8 {
        match self.separator.as_bytes() {
            [b] => *b,
            _ => b',',
        }
    }
}

/// Catalog site layout: where to start and how to find things on each page
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SiteConfig {
    /// Site root, relative links resolve against the page they appear on
    pub base_url: String,

    /// Path of the maker list, relative to `base_url`
    pub makers_path: String,

    /// Anchors to maker listings on the maker list page
    pub maker_selector: String,

    /// Pagination anchors on a product list page
    pub pagination_selector: String,

    /// Anchors to product pages on a product list page
    pub product_selector: String,

    /// Element inside a product anchor holding the product name
    pub product_name_selector: String,

    /// Product title on a detail page
    pub title_selector: String,

    /// Attribute tables on a detail page
    pub table_selector: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.gsmarena.com/".to_string(),
            makers_path: "makers.php3".to_string(),
            maker_selector: "div.st-text td > a".to_string(),
            pagination_selector: "div.nav-pages a".to_string(),
            product_selector: "div.makers a".to_string(),
            product_name_selector: "span".to_string(),
            title_selector: "h1.specs-phone-name-title".to_string(),
            table_selector: "#specs-list table".to_string(),
        }
    }
}
