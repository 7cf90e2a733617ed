//! Column schema shared by every worker of a crawl
//!
//! - `SchemaRegistry`: append-only ordered column set, the only shared mutable crawl state
//! - `Row` / `build_row`: turns one page's attributes into registry-aligned values

mod registry;
mod row;

pub use registry::{SchemaRegistry, TITLE_INDEX};
pub use row::{build_row, Row};
