//! Task repository: the state the list UI renders and every task use case.
//!
//! # Responsibility
//! - Own the foreground copy of `tasks`/`filtered_tasks`.
//! - Route create/update/delete/toggle through the store main context.
//! - Run search and network seeding on worker threads and apply their
//!   results on the foreground thread.
//!
//! # Invariants
//! - Listeners are only invoked on the thread that owns the repository.
//! - A failed read never overwrites the previously loaded list.

pub mod task_repo;
