//! Collection of finished rows and assembly of the final table

use crate::schema::{Row, SchemaRegistry};
use std::sync::{Mutex, PoisonError};

/// Final export table: header plus rows of equal width
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Table {
    /// Column names in registry order, title column first
    pub header: Vec<String>,

    /// One entry per product, each exactly `header.len()` wide
    pub rows: Vec<Vec<String>>,
}

impl Table {
    /// Number of columns
    pub fn width(&self) -> usize {
        self.header.len()
    }

    /// Number of rows, header excluded
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by name
    pub fn column(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }
}

/// Append-only row collection shared by all workers
#[derive(Debug, Default)]
pub struct Aggregator {
    rows: Mutex<Vec<Row>>,
}

impl Aggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a finished row; safe to call from many tasks at once
    pub fn push(&self, row: Row) {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(row);
    }

    /// Number of rows collected so far
    pub fn len(&self) -> usize {
        self.rows
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drains the collected rows into a table at the registry's final width
    ///
    /// Called once all tasks have completed, so the registry no longer
    /// grows. Rows emitted before later columns appeared are padded with
    /// empty fields. With `skip_empty_rows`, rows whose every value is blank
    /// are dropped.
    pub fn finish(&self, registry: &SchemaRegistry, skip_empty_rows: bool) -> Table {
        let header = registry.columns();
        let width = header.len();

        let rows = std::mem::take(&mut *self.rows.lock().unwrap_or_else(PoisonError::into_inner));
        let collected = rows.len();

        let rows: Vec<Vec<String>> = rows
            .into_iter()
            .filter(|row| !(skip_empty_rows && row.is_blank()))
            .map(|row| row.padded(width))
            .collect();

        if rows.len() < collected {
            tracing::debug!("Dropped {} blank row(s)", collected - rows.len());
        }

        Table { header, rows }
    }
}
