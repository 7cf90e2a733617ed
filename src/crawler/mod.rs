//! Crawler module for catalog traversal and extraction
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching with a global connection ceiling and retry logic
//! - Listing page parsing (makers, pagination, products)
//! - Attribute table extraction from detail pages
//! - Task scheduling and overall traversal

mod extractor;
mod fetcher;
mod parser;
mod scheduler;
mod traverser;

pub use extractor::{attribute_name, extract, AttributeMap, Extraction, NAME_SEPARATOR};
pub use fetcher::{build_http_client, FetchConfig, FetchError, Fetcher};
pub use parser::{
    element_text, parse_maker_list, parse_product_list, Link, MakerLink, PageSelectors,
    ProductListing,
};
pub use scheduler::Scheduler;
pub use traverser::{CrawlReport, Traverser};

use crate::config::Config;
use crate::output::{export_table, write_url_list, CrawlStatistics, RunStamp};
use crate::SweepError;
use std::path::PathBuf;

/// Files and counts produced by a completed run
#[derive(Debug)]
pub struct RunSummary {
    /// The delimited export
    pub export_path: PathBuf,

    /// Rows written, header excluded
    pub rows: usize,

    /// Columns written, title column included
    pub columns: usize,

    /// Maker URL list, when list dumping is on
    pub maker_list_path: Option<PathBuf>,

    /// Product URL list, when list dumping is on
    pub product_list_path: Option<PathBuf>,

    pub stats: CrawlStatistics,
}

/// Runs a complete crawl operation
///
/// This is the main entry point for starting a crawl. It will:
/// 1. Validate the configuration and build the traverser
/// 2. Traverse the catalog until every task has been joined
/// 3. Write the export file
/// 4. Write the URL list files if requested
///
/// A fail-fast abort returns before step 3, so no file is written.
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(RunSummary)` - Crawl completed and the export was written
/// * `Err(SweepError)` - Configuration error, fail-fast abort, or write failure
pub async fn run_crawl(config: Config) -> Result<RunSummary, SweepError> {
    let traverser = Traverser::new(&config)?;
    let report = traverser.run().await?;

    let stamp = RunStamp::now();
    let output = &config.output;

    let export_path = export_table(&report.table, output, &stamp)?;
    tracing::info!(
        "Wrote {} rows to {}",
        report.table.len(),
        export_path.display()
    );

    let (maker_list_path, product_list_path) = if output.dump_lists {
        let makers = write_url_list(&output.directory, "makers", &report.maker_urls, &stamp)?;
        let products =
            write_url_list(&output.directory, "products", &report.product_urls, &stamp)?;
        tracing::info!(
            "Wrote URL lists {} and {}",
            makers.display(),
            products.display()
        );
        (Some(makers), Some(products))
    } else {
        (None, None)
    };

    Ok(RunSummary {
        export_path,
        rows: report.table.len(),
        columns: report.table.width(),
        maker_list_path,
        product_list_path,
        stats: report.stats,
    })
}
