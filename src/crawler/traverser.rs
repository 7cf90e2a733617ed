//! Catalog traversal
//!
//! This module drives the whole crawl:
//! - Seeding the run with the maker list task
//! - Expanding maker lists into product lists and product lists into detail
//!   pages, applying the maker window and the brand/model filters
//! - Turning detail pages into rows for the aggregator
//! - Failure handling (best-effort pruning or fail-fast abort)
//!
//! Page tasks run concurrently on a `Scheduler`; only the driver loop in
//! `Traverser::run` touches the visited set and the discovered URL lists.

use crate::config::{compile_filters, makers_url, validate, Config, Filters};
use crate::crawler::extractor::extract;
use crate::crawler::fetcher::{FetchConfig, FetchError, Fetcher};
use crate::crawler::parser::{
    parse_maker_list, parse_product_list, MakerLink, PageSelectors, ProductListing,
};
use crate::crawler::scheduler::Scheduler;
use crate::output::{Aggregator, CrawlStatistics, Table};
use crate::schema::{build_row, SchemaRegistry};
use crate::state::{PageKind, PageTask, TaskState};
use crate::SweepError;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Everything a finished traversal hands back
#[derive(Debug)]
pub struct CrawlReport {
    /// Collected rows padded to the final schema width
    pub table: Table,

    /// Product list URLs of the selected makers, in discovery order
    pub maker_urls: Vec<Url>,

    /// Detail page URLs of the selected products, in discovery order
    pub product_urls: Vec<Url>,

    /// Run counters
    pub stats: CrawlStatistics,
}

/// State shared by every page task
struct TaskContext {
    fetcher: Fetcher,
    selectors: PageSelectors,
    filters: Filters,
    registry: SchemaRegistry,
    aggregator: Aggregator,
    min_maker: usize,
    max_maker: Option<usize>,
}

/// Result of one page task, consumed by the driver loop
struct CompletedTask {
    task: PageTask,
    children: Vec<PageTask>,
    makers_found: usize,
    error: Option<FetchError>,
}

/// Main traversal structure
pub struct Traverser {
    root: Url,
    context: Arc<TaskContext>,
    cancel: CancellationToken,
    fail_fast: bool,
    skip_empty_rows: bool,
}

impl Traverser {
    /// Creates a traverser from a configuration
    ///
    /// Validation, filter compilation and selector compilation all happen
    /// here, so every configuration error surfaces before the first request.
    ///
    /// # Returns
    ///
    /// * `Ok(Traverser)` - Ready to run
    /// * `Err(SweepError)` - Invalid configuration or HTTP client setup failure
    pub fn new(config: &Config) -> Result<Self, SweepError> {
        validate(config)?;

        let root = makers_url(&config.site)?;
        let filters = compile_filters(&config.filter)?;
        let selectors = PageSelectors::from_config(&config.site)?;

        let cancel = CancellationToken::new();
        let fetcher = Fetcher::new(FetchConfig::from(&config.crawler), cancel.clone())?;

        let context = TaskContext {
            fetcher,
            selectors,
            filters,
            registry: SchemaRegistry::new(config.output.title_column.clone()),
            aggregator: Aggregator::new(),
            min_maker: config.crawler.min_maker.unwrap_or(0),
            max_maker: config.crawler.max_maker,
        };

        Ok(Self {
            root,
            context: Arc::new(context),
            cancel,
            fail_fast: config.crawler.fail_fast,
            skip_empty_rows: config.output.skip_empty_rows,
        })
    }

    /// The maker list URL the traversal starts from
    pub fn root(&self) -> &Url {
        &self.root
    }

    /// Runs the traversal to completion
    ///
    /// Returns once every spawned task has been joined. In best-effort mode
    /// failed pages are logged and pruned. With fail-fast, the first failure
    /// cancels the crawl: no new fetch starts, running tasks drain, and the
    /// failure is returned instead of a report.
    pub async fn run(self) -> Result<CrawlReport, SweepError> {
        let start = Instant::now();
        tracing::info!("Starting traversal at {}", self.root);

        let mut driver = Driver::new(self.cancel.clone());
        driver.enqueue(PageTask::maker_list(self.root.clone()), &self.context);

        while let Some(joined) = driver.scheduler.join_next().await {
            let completed = match joined {
                Ok(completed) => completed,
                Err(e) => {
                    tracing::error!("Page task did not complete: {}", e);
                    driver.stats.failed += 1;
                    if self.fail_fast {
                        driver.abort("<task>".to_string(), e.to_string());
                    }
                    continue;
                }
            };

            let CompletedTask {
                task,
                children,
                makers_found,
                error,
            } = completed;

            driver.stats.record(task.kind, task.state);

            if let Some(error) = error {
                if error.is_cancelled() {
                    driver.stats.record_cancelled();
                    tracing::debug!("Skipped {} {} after cancellation", task.kind, task.url);
                    continue;
                }

                tracing::warn!("Pruning {} {}: {}", task.kind, task.url, error);
                if self.fail_fast {
                    driver.abort(task.url.to_string(), error.to_string());
                }
                continue;
            }

            if task.kind == PageKind::MakerList {
                driver.stats.makers_found += makers_found as u64;
                tracing::info!(
                    "Maker list: {} makers found, {} selected",
                    makers_found,
                    children.len()
                );
            } else {
                tracing::debug!(
                    "{} {} done, {} new task(s)",
                    task.kind,
                    task.url,
                    children.len()
                );
            }

            for child in children {
                driver.enqueue(child, &self.context);
            }

            let completed = driver.scheduler.completed();
            if completed % 50 == 0 {
                tracing::info!(
                    "Progress: {} pages done, {} in flight, {} rows",
                    completed,
                    driver.scheduler.outstanding(),
                    self.context.aggregator.len()
                );
            }
        }

        driver.stats.elapsed = start.elapsed();

        if let Some((url, reason)) = driver.first_failure {
            tracing::error!("Crawl aborted after failure at {}", url);
            return Err(SweepError::Aborted { url, reason });
        }

        let table = self
            .context
            .aggregator
            .finish(&self.context.registry, self.skip_empty_rows);

        tracing::info!(
            "Traversal finished: {} rows, {} columns in {:?}",
            table.len(),
            table.width(),
            driver.stats.elapsed
        );

        Ok(CrawlReport {
            table,
            maker_urls: driver.maker_urls,
            product_urls: driver.product_urls,
            stats: driver.stats,
        })
    }
}

/// Bookkeeping owned by the driver loop
struct Driver {
    scheduler: Scheduler<CompletedTask>,
    seen: HashSet<Url>,
    maker_urls: Vec<Url>,
    product_urls: Vec<Url>,
    stats: CrawlStatistics,
    first_failure: Option<(String, String)>,
}

impl Driver {
    fn new(cancel: CancellationToken) -> Self {
        Self {
            scheduler: Scheduler::new(cancel),
            seen: HashSet::new(),
            maker_urls: Vec::new(),
            product_urls: Vec::new(),
            stats: CrawlStatistics::default(),
            first_failure: None,
        }
    }

    /// Spawns a task for a page not visited before
    fn enqueue(&mut self, task: PageTask, context: &Arc<TaskContext>) {
        if self.scheduler.is_cancelled() {
            return;
        }

        if !self.seen.insert(task.url.clone()) {
            tracing::trace!("Already queued: {}", task.url);
            return;
        }

        match task.kind {
            PageKind::ProductList if task.follow_pagination => {
                self.stats.makers_selected += 1;
                self.maker_urls.push(task.url.clone());
            }
            PageKind::ProductDetail => {
                self.stats.products_selected += 1;
                self.product_urls.push(task.url.clone());
            }
            _ => {}
        }

        tracing::trace!("Queueing {} {}", task.kind, task.url);
        self.scheduler.submit(process_task(task, Arc::clone(context)));
    }

    /// Records the first failure and cancels the crawl
    fn abort(&mut self, url: String, reason: String) {
        if self.first_failure.is_none() {
            tracing::error!("Failure at {} with fail-fast set, cancelling crawl", url);
            self.first_failure = Some((url, reason));
            self.scheduler.cancel();
        }
    }
}

/// Fetches one page and handles it according to its kind
async fn process_task(mut task: PageTask, context: Arc<TaskContext>) -> CompletedTask {
    task.advance(TaskState::Fetching);

    let body = match context.fetcher.fetch(&task.url).await {
        Ok(body) => body,
        Err(error) => {
            task.advance(TaskState::Failed);
            return CompletedTask {
                task,
                children: Vec::new(),
                makers_found: 0,
                error: Some(error),
            };
        }
    };

    let mut makers_found = 0;
    let children = match task.kind {
        PageKind::MakerList => {
            let makers = parse_maker_list(&body, &task.url, &context.selectors);
            makers_found = makers.len();
            task.advance(TaskState::Listed);
            context.expand_makers(makers)
        }
        PageKind::ProductList => {
            let listing = parse_product_list(&body, &task.url, &context.selectors);
            task.advance(TaskState::Listed);
            context.expand_products(&task, listing)
        }
        PageKind::ProductDetail => {
            context.record_product(&task, &body);
            task.advance(TaskState::Extracted);
            Vec::new()
        }
    };

    CompletedTask {
        task,
        children,
        makers_found,
        error: None,
    }
}

impl TaskContext {
    /// Product list tasks for makers inside the window that pass the brand filter
    fn expand_makers(&self, makers: Vec<MakerLink>) -> Vec<PageTask> {
        makers
            .into_iter()
            .filter(|maker| self.in_maker_window(maker.position))
            .map(|maker| maker.link)
            .filter(|link| {
                let keep = self.filters.brand.matches(&link.name);
                if !keep {
                    tracing::trace!("Brand filter skips {:?}", link.name);
                }
                keep
            })
            .map(|link| PageTask::product_list(link.url, link.name))
            .collect()
    }

    fn in_maker_window(&self, position: usize) -> bool {
        position >= self.min_maker && self.max_maker.map_or(true, |max| position <= max)
    }

    /// Pagination tasks (first listing page only) plus detail tasks passing
    /// the model filter
    fn expand_products(&self, task: &PageTask, listing: ProductListing) -> Vec<PageTask> {
        let mut children = Vec::new();

        if task.follow_pagination {
            children.extend(
                listing
                    .pages
                    .into_iter()
                    .map(|page| PageTask::product_list_page(page, task.label.clone())),
            );
        }

        children.extend(
            listing
                .products
                .into_iter()
                .filter(|link| self.filters.model.matches(&link.name))
                .map(|link| PageTask::product_detail(link.url, link.name)),
        );

        children
    }

    /// Extracts a detail page and hands its row to the aggregator
    ///
    /// A page without a title falls back to the product name from the listing.
    fn record_product(&self, task: &PageTask, body: &str) {
        let mut extraction = extract(body, &self.selectors);
        if extraction.title.is_empty() {
            extraction.title = task.label.clone().unwrap_or_default();
        }

        let row = build_row(&extraction, &self.registry);
        tracing::trace!(
            "Row for {:?}: {} attribute(s), {} slot(s)",
            extraction.title,
            extraction.attributes.len(),
            row.len()
        );
        self.aggregator.push(row);
    }
}
