//! Task store façade over SQLite.
//!
//! # Responsibility
//! - Own the single main context every foreground read/write goes through.
//! - Hand out independent background contexts for off-thread batch work.
//! - Commit pending work on `save` and report failures without crashing.
//!
//! # Invariants
//! - The main context is only reachable through [`MainContext::perform`],
//!   which serializes access across threads.
//! - Background contexts open their own connection to the same database, so
//!   whatever they commit is what the main context reads next.
//! - A failed save does not roll back the context's pending mutations.

use crate::db::{open_db, open_db_shared_memory, DbError};
use crate::model::task::TaskValidationError;
use log::{error, info, warn};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};
use std::time::Instant;
use uuid::Uuid;

mod context;
pub(crate) mod row;

pub use context::{ContextKind, StoreContext};

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by store contexts.
#[derive(Debug)]
pub enum StoreError {
    /// The store could not be opened or migrated.
    Open(DbError),
    /// A query or write failed.
    Db(DbError),
    /// A write was rejected before reaching SQL.
    Validation(TaskValidationError),
    /// A persisted row violates task invariants.
    InvalidData(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Open(err) => write!(f, "failed to open task store: {err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Validation(err) => write!(f, "{err}"),
            Self::InvalidData(message) => write!(f, "invalid persisted task data: {message}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Open(err) | Self::Db(err) => Some(err),
            Self::Validation(err) => Some(err),
            Self::InvalidData(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<TaskValidationError> for StoreError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Where the store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite database file.
    File(PathBuf),
    /// Named shared-cache in-memory database, gone once the store closes.
    InMemory { name: String },
}

impl StoreLocation {
    /// Fresh in-memory location with a process-unique name.
    pub fn unique_in_memory() -> Self {
        Self::InMemory {
            name: format!("todolist-{}", Uuid::new_v4().simple()),
        }
    }

    fn mode(&self) -> &'static str {
        match self {
            Self::File(_) => "file",
            Self::InMemory { .. } => "memory",
        }
    }

    fn connect(&self) -> Result<Connection, DbError> {
        match self {
            Self::File(path) => open_db(path),
            Self::InMemory { name } => open_db_shared_memory(name),
        }
    }
}

/// The main context, serialized behind a mutex.
pub struct MainContext {
    inner: Mutex<StoreContext>,
}

impl MainContext {
    /// Runs `work` with exclusive access to the main context.
    ///
    /// Safe to call from any thread; calls are executed one at a time.
    pub fn perform<T>(&self, work: impl FnOnce(&StoreContext) -> T) -> T {
        let guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        work(&guard)
    }
}

/// Explicitly constructed task store.
pub struct TaskStore {
    location: StoreLocation,
    main: MainContext,
}

impl TaskStore {
    /// Opens the store and its main context.
    ///
    /// # Errors
    /// Returns [`StoreError::Open`] when the database cannot be opened or
    /// migrated.
    pub fn open(location: StoreLocation) -> StoreResult<Self> {
        let started_at = Instant::now();
        let conn = location.connect().map_err(|err| {
            error!(
                "event=store_open module=store status=error mode={} duration_ms={} error={}",
                location.mode(),
                started_at.elapsed().as_millis(),
                err
            );
            StoreError::Open(err)
        })?;

        info!(
            "event=store_open module=store status=ok mode={} duration_ms={}",
            location.mode(),
            started_at.elapsed().as_millis()
        );

        Ok(Self {
            location,
            main: MainContext {
                inner: Mutex::new(StoreContext::new(conn, ContextKind::Main)),
            },
        })
    }

    /// Opens a private in-memory store; used by tests and previews.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::open(StoreLocation::unique_in_memory())
    }

    /// Opens the store or terminates the process.
    ///
    /// There is no degraded mode without storage, so hosts call this at
    /// startup instead of [`TaskStore::open`].
    pub fn open_or_abort(location: StoreLocation) -> Self {
        match Self::open(location) {
            Ok(store) => store,
            Err(err) => {
                error!("event=store_open module=store status=fatal error={err}");
                log::logger().flush();
                std::process::exit(1);
            }
        }
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    /// The single shared context; every call returns the same one.
    pub fn main_context(&self) -> &MainContext {
        &self.main
    }

    /// Opens an independent context on the same database.
    pub fn new_background_context(&self) -> StoreResult<StoreContext> {
        let conn = self.location.connect()?;
        Ok(StoreContext::new(conn, ContextKind::Background))
    }

    /// Commits pending changes in `context`, if there are any.
    ///
    /// Returns whether anything was committed. Failures are logged and
    /// returned; pending mutations stay in the context.
    pub fn save(&self, context: &StoreContext) -> StoreResult<bool> {
        match context.commit() {
            Ok(committed) => {
                if committed {
                    info!(
                        "event=store_save module=store status=ok context={}",
                        context.kind().label()
                    );
                }
                Ok(committed)
            }
            Err(err) => {
                error!(
                    "event=store_save module=store status=error context={} error={}",
                    context.kind().label(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Drops pending changes in `context`.
    pub fn discard(&self, context: &StoreContext) {
        match context.rollback() {
            Ok(true) => warn!(
                "event=store_discard module=store status=ok context={}",
                context.kind().label()
            ),
            Ok(false) => {}
            Err(err) => error!(
                "event=store_discard module=store status=error context={} error={}",
                context.kind().label(),
                err
            ),
        }
    }

    /// Saves pending main-context work and closes the main connection.
    pub fn shutdown(self) -> StoreResult<()> {
        let context = self
            .main
            .inner
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner);
        if context.has_changes() {
            context.commit()?;
        }
        context
            .into_connection()
            .close()
            .map_err(|(_, err)| StoreError::from(err))?;
        info!(
            "event=store_close module=store status=ok mode={}",
            self.location.mode()
        );
        Ok(())
    }
}
