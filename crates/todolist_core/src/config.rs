//! Core configuration and service wiring.
//!
//! # Responsibility
//! - Describe where the store lives, which endpoint seeds it and where logs go.
//! - Build a ready-to-use repository from that description.
//!
//! There is no global state here: hosts construct the services once at
//! startup and own them for the session.

use crate::logging::{init_logging, LoggingConfig, LoggingError};
use crate::remote::{HttpTodoSource, RemoteConfig, RemoteTodoSource};
use crate::repo::task_repo::TaskRepository;
use crate::store::{StoreError, StoreLocation, TaskStore};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Startup configuration for the to-do core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    pub store: StoreLocation,
    pub remote: RemoteConfig,
    /// File logging; `None` leaves the `log` facade to the host.
    pub logging: Option<LoggingConfig>,
}

impl CoreConfig {
    /// File-backed store with default endpoint and no file logging.
    pub fn for_database(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            store: StoreLocation::File(path.into()),
            remote: RemoteConfig::default(),
            logging: None,
        }
    }
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            store: StoreLocation::unique_in_memory(),
            remote: RemoteConfig::default(),
            logging: None,
        }
    }
}

/// Startup failure.
#[derive(Debug)]
pub enum BootstrapError {
    Logging(LoggingError),
    Store(StoreError),
}

impl Display for BootstrapError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logging(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BootstrapError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<LoggingError> for BootstrapError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<StoreError> for BootstrapError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Initializes logging, opens the store and wires the HTTP todo source.
pub fn bootstrap(config: &CoreConfig) -> Result<TaskRepository, BootstrapError> {
    let remote: Arc<dyn RemoteTodoSource> = Arc::new(HttpTodoSource::new(config.remote.clone()));
    bootstrap_with_remote(config, remote)
}

/// Same as [`bootstrap`] with a caller-provided remote source.
pub fn bootstrap_with_remote(
    config: &CoreConfig,
    remote: Arc<dyn RemoteTodoSource>,
) -> Result<TaskRepository, BootstrapError> {
    if let Some(logging) = &config.logging {
        init_logging(logging)?;
    }
    let store = TaskStore::open(config.store.clone())?;
    Ok(TaskRepository::new(Arc::new(store), remote))
}

/// Like [`bootstrap_with_remote`], but a store that cannot be opened
/// terminates the process through [`TaskStore::open_or_abort`].
pub fn bootstrap_or_abort(
    config: &CoreConfig,
    remote: Arc<dyn RemoteTodoSource>,
) -> Result<TaskRepository, LoggingError> {
    if let Some(logging) = &config.logging {
        init_logging(logging)?;
    }
    let store = TaskStore::open_or_abort(config.store.clone());
    Ok(TaskRepository::new(Arc::new(store), remote))
}

#[cfg(test)]
mod tests {
    use super::{bootstrap_or_abort, bootstrap_with_remote, BootstrapError, CoreConfig};
    use crate::model::remote_item::RemoteTodoItem;
    use crate::remote::{RemoteResult, RemoteTodoSource, DEFAULT_TODOS_ENDPOINT};
    use crate::store::{StoreError, StoreLocation};
    use std::sync::Arc;

    struct EmptyRemote;

    impl RemoteTodoSource for EmptyRemote {
        fn fetch_todos(&self) -> RemoteResult<Vec<RemoteTodoItem>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn for_database_uses_file_store_and_default_endpoint() {
        let config = CoreConfig::for_database("/tmp/tasks.sqlite3");
        assert_eq!(config.store, StoreLocation::File("/tmp/tasks.sqlite3".into()));
        assert_eq!(config.remote.endpoint, DEFAULT_TODOS_ENDPOINT);
        assert!(config.logging.is_none());
    }

    #[test]
    fn default_config_bootstraps_usable_repository() {
        let mut repo = bootstrap_with_remote(&CoreConfig::default(), Arc::new(EmptyRemote)).unwrap();
        assert!(repo.create_task("from bootstrap", None).is_some());
        assert_eq!(repo.tasks().len(), 1);
    }

    #[test]
    fn file_store_bootstraps_and_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::for_database(dir.path().join("tasks.sqlite3"));

        let mut first = bootstrap_or_abort(&config, Arc::new(EmptyRemote)).unwrap();
        first.create_task("persisted", None).unwrap();
        drop(first);

        let mut second = bootstrap_with_remote(&config, Arc::new(EmptyRemote)).unwrap();
        second.load_tasks();
        assert_eq!(second.tasks()[0].title, "persisted");
    }

    #[test]
    fn unreachable_database_path_is_a_store_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = CoreConfig::for_database(dir.path().join("missing").join("tasks.sqlite3"));

        let err = bootstrap_with_remote(&config, Arc::new(EmptyRemote)).err().unwrap();
        assert!(matches!(err, BootstrapError::Store(StoreError::Open(_))));
    }
}
