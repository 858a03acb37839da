//! Task text search.
//!
//! # Responsibility
//! - Case-insensitive substring search over task title and details.
//! - Register the SQL helper used by the search query on every connection.
//!
//! Matching runs inside SQLite through `task_text_contains`, so the search
//! sees exactly the rows visible to the context it runs on.

mod matcher;

pub use matcher::{fold_for_search, register_search_functions, search_tasks, SearchQuery};
