//! Process-wide registry of attribute columns
//!
//! Column 0 is the title column. Every other column is appended the first
//! time any page reports it and keeps its index for the rest of the run.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Index of the title column
pub const TITLE_INDEX: usize = 0;

#[derive(Debug)]
struct Columns {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

/// Append-only, first-seen-wins ordered set of column names
///
/// Lookups of known names take a shared lock; registering a new name takes
/// the exclusive lock and re-checks, so racing registrations of the same name
/// end up with one index.
#[derive(Debug)]
pub struct SchemaRegistry {
    columns: RwLock<Columns>,
}

impl SchemaRegistry {
    /// Creates a registry holding only the title column
    pub fn new(title_column: impl Into<String>) -> Self {
        let title = title_column.into();
        let mut index = HashMap::new();
        index.insert(title.clone(), TITLE_INDEX);

        Self {
            columns: RwLock::new(Columns {
                names: vec![title],
                index,
            }),
        }
    }

    /// Returns the column index for `name`, assigning the next one if unseen
    pub fn get_or_assign_index(&self, name: &str) -> usize {
        if let Some(index) = self.index_of(name) {
            return index;
        }

        let mut columns = self
            .columns
            .write()
            .unwrap_or_else(PoisonError::into_inner);

        // another worker may have registered it between the two locks
        if let Some(&index) = columns.index.get(name) {
            return index;
        }

        let index = columns.names.len();
        columns.names.push(name.to_string());
        columns.index.insert(name.to_string(), index);
        tracing::trace!("New column {} at index {}", name, index);
        index
    }

    /// Returns the index of an already registered column
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .index
            .get(name)
            .copied()
    }

    /// Number of columns, title column included
    pub fn len(&self) -> usize {
        self.columns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names
            .len()
    }

    /// Always false; the title column is present from the start
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Snapshot of the column names in index order
    pub fn columns(&self) -> Vec<String> {
        self.columns
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .names
            .clone()
    }
}
