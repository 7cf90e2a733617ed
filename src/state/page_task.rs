//! Units of traversal work

use crate::state::TaskState;
use std::fmt;
use url::Url;

/// What kind of catalog page a task points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PageKind {
    /// The single page listing every maker
    MakerList,

    /// One (possibly paginated) listing of a maker's products
    ProductList,

    /// A product page carrying the attribute tables
    ProductDetail,
}

impl fmt::Display for PageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::MakerList => "maker-list",
            Self::ProductList => "product-list",
            Self::ProductDetail => "product-detail",
        };
        write!(f, "{}", label)
    }
}

/// A page to fetch and handle
///
/// `follow_pagination` is only meaningful for product lists: the first page of
/// a maker's listing expands its pagination links, the pages found that way
/// do not expand theirs again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageTask {
    /// The page URL
    pub url: Url,

    /// The page kind, deciding how the fetched body is handled
    pub kind: PageKind,

    /// Whether pagination links on this page spawn further list tasks
    pub follow_pagination: bool,

    /// Maker or model name the task was discovered under
    pub label: Option<String>,

    /// Current lifecycle state
    pub state: TaskState,
}

impl PageTask {
    /// The root task: the maker list
    pub fn maker_list(url: Url) -> Self {
        Self::new(url, PageKind::MakerList, false, None)
    }

    /// The first page of a maker's product listing
    pub fn product_list(url: Url, maker: impl Into<String>) -> Self {
        Self::new(url, PageKind::ProductList, true, Some(maker.into()))
    }

    /// A page reached through a listing's pagination links
    pub fn product_list_page(url: Url, maker: Option<String>) -> Self {
        Self::new(url, PageKind::ProductList, false, maker)
    }

    /// A product detail page
    pub fn product_detail(url: Url, model: impl Into<String>) -> Self {
        Self::new(url, PageKind::ProductDetail, false, Some(model.into()))
    }

    fn new(url: Url, kind: PageKind, follow_pagination: bool, label: Option<String>) -> Self {
        Self {
            url,
            kind,
            follow_pagination,
            label,
            state: TaskState::Pending,
        }
    }

    /// Moves the task to `next`, ignoring transitions outside the lifecycle
    pub fn advance(&mut self, next: TaskState) {
        if self.state.can_transition_to(next) {
            self.state = next;
        } else {
            tracing::trace!(
                "Ignoring {} -> {} for {}",
                self.state,
                next,
                self.url
            );
        }
    }
}
