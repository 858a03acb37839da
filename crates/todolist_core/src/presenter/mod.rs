//! Presentation logic behind the list and detail screens.
//!
//! # Responsibility
//! - Turn repository state into render-ready rows and labels.
//! - Route user intents to repository use cases.
//! - Decide when the detail editor actually has something to save.
//!
//! Widget code stays in the host shell; nothing here draws.

mod detail;
mod format;
mod list;

pub use detail::TaskDetailPresenter;
pub use format::{detail_date_label, list_date_label, local_offset};
pub use list::{ListIntent, TaskListPresenter, TaskRow};
