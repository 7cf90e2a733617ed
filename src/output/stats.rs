//! Crawl statistics
//!
//! Counters kept by the traversal driver while tasks complete, logged and
//! printed at the end of a run.

use crate::state::{PageKind, TaskState};
use std::fmt;
use std::time::Duration;

/// Counters for one crawl run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Maker links found on the maker list
    pub makers_found: u64,

    /// Maker list pages fetched and expanded
    pub maker_lists_fetched: u64,

    /// Makers passing the window and brand filter
    pub makers_selected: u64,

    /// Product list pages fetched and expanded
    pub listings_fetched: u64,

    /// Product links passing the model filter
    pub products_selected: u64,

    /// Detail pages turned into rows
    pub rows_extracted: u64,

    /// Tasks whose fetch failed (cancelled ones excluded)
    pub failed: u64,

    /// Tasks stopped by fail-fast cancellation
    pub cancelled: u64,

    /// Wall time of the traversal
    pub elapsed: Duration,
}

impl CrawlStatistics {
    /// Records a completed task by kind and final state
    pub fn record(&mut self, kind: PageKind, state: TaskState) {
        match (kind, state) {
            (PageKind::MakerList, TaskState::Listed) => self.maker_lists_fetched += 1,
            (PageKind::ProductList, TaskState::Listed) => self.listings_fetched += 1,
            (PageKind::ProductDetail, TaskState::Extracted) => self.rows_extracted += 1,
            (_, TaskState::Failed) => self.failed += 1,
            _ => {}
        }
    }

    /// Moves one failure over to the cancelled count
    pub fn record_cancelled(&mut self) {
        self.failed = self.failed.saturating_sub(1);
        self.cancelled += 1;
    }

    /// Share of fetched pages that failed, as a percentage
    pub fn failure_rate(&self) -> f64 {
        let attempted =
            self.maker_lists_fetched + self.listings_fetched + self.rows_extracted + self.failed;
        if attempted == 0 {
            return 0.0;
        }
        (self.failed as f64 / attempted as f64) * 100.0
    }
}

impl fmt::Display for CrawlStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "=== Crawl Statistics ===")?;
        writeln!(
            f,
            "Makers:      {} found, {} selected",
            self.makers_found, self.makers_selected
        )?;
        writeln!(f, "Listings:    {} fetched", self.listings_fetched)?;
        writeln!(
            f,
            "Products:    {} selected, {} extracted",
            self.products_selected, self.rows_extracted
        )?;
        writeln!(
            f,
            "Failures:    {} ({:.2}%), {} cancelled",
            self.failed,
            self.failure_rate(),
            self.cancelled
        )?;
        write!(f, "Elapsed:     {:.1}s", self.elapsed.as_secs_f64())
    }
}
