//! Positional rows aligned to the schema registry

use crate::crawler::Extraction;
use crate::schema::registry::{SchemaRegistry, TITLE_INDEX};

/// Values of one product page, indexed by registry column
///
/// A row only reaches as far as the highest column it uses; columns the
/// registry gained later are filled in by `padded`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Row {
    values: Vec<Option<String>>,
}

impl Row {
    /// Number of slots, never more than the registry width at emission
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Value at `index`, `None` when absent or beyond the row
    pub fn get(&self, index: usize) -> Option<&str> {
        self.values.get(index).and_then(|v| v.as_deref())
    }

    /// The title column value
    pub fn title(&self) -> Option<&str> {
        self.get(TITLE_INDEX)
    }

    /// True when every present value is blank
    pub fn is_blank(&self) -> bool {
        self.values
            .iter()
            .flatten()
            .all(|value| value.trim().is_empty())
    }

    /// Renders the row at `width` fields, absent values as empty strings
    ///
    /// `width` is the final registry length; a row is never wider than it.
    pub fn padded(&self, width: usize) -> Vec<String> {
        let mut fields: Vec<String> = self
            .values
            .iter()
            .take(width)
            .map(|v| v.clone().unwrap_or_default())
            .collect();
        fields.resize(width, String::new());
        fields
    }

    fn set(&mut self, index: usize, value: String) {
        if index >= self.values.len() {
            self.values.resize(index + 1, None);
        }
        self.values[index] = Some(value);
    }
}

/// Builds a row from one extraction, registering unseen attribute names
///
/// This is where the schema grows: every attribute name goes through
/// `get_or_assign_index` before its value is placed.
pub fn build_row(extraction: &Extraction, registry: &SchemaRegistry) -> Row {
    let mut row = Row::default();
    row.set(TITLE_INDEX, extraction.title.clone());

    for (name, value) in extraction.attributes.iter() {
        let index = registry.get_or_assign_index(name);
        row.set(index, value.to_string());
    }

    row
}
