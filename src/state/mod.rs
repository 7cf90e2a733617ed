//! State module for tracking traversal progress
//!
//! # Components
//!
//! - `TaskState`: lifecycle of a single page task (pending, fetching, extracted, listed, failed)
//! - `PageTask`: a URL plus the kind of page behind it and its pagination guard

mod page_task;
mod task_state;

// Re-export main types
pub use page_task::{PageKind, PageTask};
pub use task_state::TaskState;
