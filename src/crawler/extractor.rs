//! Attribute table extraction from product detail pages
//!
//! A detail page holds zero or more attribute tables. The first row of each
//! table carries the section header in its first `th`; every row carries a
//! sub-label in its first `td` and the value in its second. Rows without a
//! sub-label are filed under the bare section header.

use crate::crawler::parser::{element_text, PageSelectors};
use scraper::Html;
use std::collections::HashMap;

/// Separator between section header and sub-label in an attribute name
pub const NAME_SEPARATOR: &str = " - ";

/// Insertion-ordered attribute name → value mapping
///
/// Assigning a name again replaces its value and keeps its first position.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeMap {
    entries: Vec<(String, String)>,
    positions: HashMap<String, usize>,
}

impl AttributeMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value, returning the replaced one
    pub fn insert(&mut self, name: String, value: String) -> Option<String> {
        match self.positions.get(&name) {
            Some(&pos) => Some(std::mem::replace(&mut self.entries[pos].1, value)),
            None => {
                self.positions.insert(name.clone(), self.entries.len());
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.positions
            .get(name)
            .map(|&pos| self.entries[pos].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in first-assignment order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v.as_str()))
    }

    /// Names in first-assignment order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }
}

/// Everything taken from one detail page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    /// Product title, empty when the page has none
    pub title: String,

    /// Attribute values by derived name
    pub attributes: AttributeMap,
}

/// Extracts the title and attribute tables of a detail page
///
/// Never fails: a page without the expected structure yields its title (if
/// any) and no attributes. The result depends on the document text only.
pub fn extract(html: &str, selectors: &PageSelectors) -> Extraction {
    let document = Html::parse_document(html);

    let title = document
        .select(&selectors.title)
        .next()
        .map(|el| element_text(&el))
        .unwrap_or_default();

    let mut attributes = AttributeMap::new();

    for table in document.select(&selectors.table) {
        let mut section = String::new();

        for (i, row) in table.select(&selectors.row).enumerate() {
            if i == 0 {
                section = row
                    .select(&selectors.header_cell)
                    .next()
                    .map(|el| element_text(&el))
                    .unwrap_or_default();
            }

            let mut cells = row.select(&selectors.data_cell);
            let sub_label = cells.next().map(|el| element_text(&el)).unwrap_or_default();
            let value = cells.next().map(|el| element_text(&el)).unwrap_or_default();

            let name = attribute_name(&section, &sub_label);
            if name.is_empty() {
                continue;
            }

            if let Some(previous) = attributes.insert(name, value) {
                tracing::trace!("Attribute overwritten on {:?}, was {:?}", title, previous);
            }
        }
    }

    Extraction { title, attributes }
}

/// Derives an attribute name from a section header and an optional sub-label
///
/// Both parts are expected trimmed. An empty sub-label means the bare
/// section header is the name, so two label-less rows of equally named
/// sections collide.
pub fn attribute_name(section: &str, sub_label: &str) -> String {
    if sub_label.is_empty() {
        section.to_string()
    } else {
        format!("{}{}{}", section, NAME_SEPARATOR, sub_label)
    }
}
