//! HTML parser for catalog listing pages
//!
//! This module handles parsing listing pages to extract:
//! - Maker links (name + URL) from the maker list
//! - Pagination links and product links (name + URL) from product lists
//!
//! Selectors are compiled once per crawl into `PageSelectors`.

use crate::config::SiteConfig;
use crate::ConfigError;
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Compiled selectors for every page kind
#[derive(Debug, Clone)]
pub struct PageSelectors {
    pub maker: Selector,
    pub pagination: Selector,
    pub product: Selector,
    pub product_name: Selector,
    pub title: Selector,
    pub table: Selector,
    pub row: Selector,
    pub header_cell: Selector,
    pub data_cell: Selector,
}

impl PageSelectors {
    /// Compiles the selectors of a site configuration
    ///
    /// # Returns
    ///
    /// * `Ok(PageSelectors)` - All selectors compiled
    /// * `Err(ConfigError::InvalidSelector)` - The first selector that failed
    pub fn from_config(config: &SiteConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            maker: compile(&config.maker_selector)?,
            pagination: compile(&config.pagination_selector)?,
            product: compile(&config.product_selector)?,
            product_name: compile(&config.product_name_selector)?,
            title: compile(&config.title_selector)?,
            table: compile(&config.table_selector)?,
            row: compile("tr")?,
            header_cell: compile("th")?,
            data_cell: compile("td")?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, ConfigError> {
    Selector::parse(selector).map_err(|_| ConfigError::InvalidSelector {
        selector: selector.to_string(),
    })
}

/// A named link found on a listing page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub name: String,
    pub url: Url,
}

/// Links found on one product list page
#[derive(Debug, Clone, Default)]
pub struct ProductListing {
    /// Other pages of the same listing, deduplicated, current page excluded
    pub pages: Vec<Url>,

    /// Product detail links in page order
    pub products: Vec<Link>,
}

/// A maker link with its position on the maker list
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MakerLink {
    /// 0-based index among every anchor the maker selector matched,
    /// including anchors whose href could not be resolved
    pub position: usize,

    pub link: Link,
}

/// Extracts maker links from the maker list page
///
/// The maker name is the first non-blank text node of the anchor; product
/// counts and other trailing markup inside the anchor are ignored. Anchors
/// without a usable href are dropped but still take up a position.
pub fn parse_maker_list(html: &str, page_url: &Url, selectors: &PageSelectors) -> Vec<MakerLink> {
    let document = Html::parse_document(html);

    document
        .select(&selectors.maker)
        .enumerate()
        .filter_map(|(position, anchor)| {
            let url = anchor_url(&anchor, page_url)?;
            let name = anchor
                .text()
                .map(str::trim)
                .find(|t| !t.is_empty())
                .unwrap_or_default()
                .to_string();
            Some(MakerLink {
                position,
                link: Link { name, url },
            })
        })
        .collect()
}

/// Extracts pagination and product links from a product list page
pub fn parse_product_list(
    html: &str,
    page_url: &Url,
    selectors: &PageSelectors,
) -> ProductListing {
    let document = Html::parse_document(html);

    let mut pages: Vec<Url> = Vec::new();
    for anchor in document.select(&selectors.pagination) {
        if let Some(url) = anchor_url(&anchor, page_url) {
            if url != *page_url && !pages.contains(&url) {
                pages.push(url);
            }
        }
    }

    let products = document
        .select(&selectors.product)
        .filter_map(|anchor| {
            let url = anchor_url(&anchor, page_url)?;
            let name = anchor
                .select(&selectors.product_name)
                .next()
                .map(|el| element_text(&el))
                .unwrap_or_else(|| element_text(&anchor));
            Some(Link { name, url })
        })
        .collect();

    ProductListing { pages, products }
}

/// Trimmed text content of an element
pub fn element_text(element: &ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn anchor_url(anchor: &ElementRef<'_>, page_url: &Url) -> Option<Url> {
    anchor
        .value()
        .attr("href")
        .and_then(|href| resolve_link(href, page_url))
}

/// Resolves a link href to an absolute URL and validates it
///
/// Returns None if the link should be excluded:
/// - javascript:, mailto:, tel: schemes
/// - data: URIs
/// - Fragment-only links
/// - Invalid URLs
/// - Non-HTTP(S) URLs after resolution
fn resolve_link(href: &str, base_url: &Url) -> Option<Url> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() == "http" || absolute_url.scheme() == "https" {
        Some(absolute_url)
    } else {
        None
    }
}
