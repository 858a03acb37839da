//! Core domain logic for the offline-first to-do list.
//! This crate is the single source of truth for task invariants.

pub mod config;
pub mod db;
pub mod foreground;
pub mod logging;
pub mod model;
pub mod presenter;
pub mod remote;
pub mod repo;
pub mod search;
pub mod store;
pub mod sync;

pub use config::{
    bootstrap, bootstrap_or_abort, bootstrap_with_remote, BootstrapError, CoreConfig,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingConfig, LoggingError};
pub use model::remote_item::RemoteTodoItem;
pub use model::task::{Task, TaskId, TaskValidationError};
pub use presenter::{ListIntent, TaskDetailPresenter, TaskListPresenter, TaskRow};
pub use remote::{
    HttpTodoSource, RemoteConfig, RemoteError, RemoteResult, RemoteTodoSource,
    DEFAULT_TODOS_ENDPOINT,
};
pub use repo::task_repo::TaskRepository;
pub use search::SearchQuery;
pub use store::{
    ContextKind, MainContext, StoreContext, StoreError, StoreLocation, StoreResult, TaskStore,
};
pub use sync::{MergeError, MergeReport};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
