//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose task list use cases to Dart via FRB sync calls.
//! - Keep one list session per UI thread and hand back plain data envelopes.
//!
//! # Invariants
//! - Exported functions must not panic across the FFI boundary.
//! - Session state lives in a thread-local, so every call for a session
//!   must come from the same (UI) thread; background results are applied
//!   there by `tasks_poll`.
//! - Store open failure terminates the process; nothing works without it.

use log::info;
use std::cell::RefCell;
use std::path::PathBuf;
use std::sync::Arc;
use todolist_core::{
    bootstrap_or_abort, core_version as core_version_inner, default_log_level,
    init_logging as init_logging_inner, ping as ping_inner, CoreConfig, HttpTodoSource,
    ListIntent, LoggingConfig, RemoteTodoSource, TaskId, TaskListPresenter, TaskRow,
};

const DB_FILE_NAME: &str = "todolist.sqlite3";
const DB_PATH_ENV: &str = "TODOLIST_DB_PATH";

thread_local! {
    static SESSION: RefCell<Option<TaskListPresenter>> = const { RefCell::new(None) };
}

/// Minimal health-check API for FRB smoke integration.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// A blank `level` uses the build default. Returns an empty string on
/// success and an error message otherwise.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    let level = match level.trim() {
        "" => default_log_level(),
        other => other,
    };
    match LoggingConfig::new(level, log_dir.trim()).and_then(|config| init_logging_inner(&config)) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Task row as rendered by the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskItem {
    pub id: String,
    pub title: String,
    pub details: Option<String>,
    pub is_completed: bool,
    /// `dd/MM/yy` in device local time.
    pub created_label: String,
}

/// Result envelope for task commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskActionResponse {
    pub ok: bool,
    pub message: String,
}

impl TaskActionResponse {
    fn success(message: impl Into<String>) -> Self {
        Self {
            ok: true,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            message: message.into(),
        }
    }
}

/// What changed since the previous poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskPollResponse {
    /// The list should be re-rendered.
    pub changed: bool,
    /// User-facing error messages, oldest first.
    pub errors: Vec<String>,
    /// Background work is still running.
    pub pending: bool,
}

/// Opens the task session for the calling thread and loads tasks.
///
/// `db_path` falls back to `TODOLIST_DB_PATH`, then to the temp directory.
/// The first open of a session also starts network seeding.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_open(db_path: Option<String>) -> TaskActionResponse {
    let config = CoreConfig::for_database(resolve_db_path(db_path));
    let remote = Arc::new(HttpTodoSource::new(config.remote.clone()));
    open_session(&config, remote)
}

fn open_session(config: &CoreConfig, remote: Arc<dyn RemoteTodoSource>) -> TaskActionResponse {
    let repository = match bootstrap_or_abort(config, remote) {
        Ok(repository) => repository,
        Err(err) => return TaskActionResponse::failure(err.to_string()),
    };
    let mut presenter = TaskListPresenter::new(repository);
    presenter.handle(ListIntent::Appear);
    info!(
        "event=ffi_session_open module=ffi status=ok store={:?}",
        config.store
    );

    SESSION.with(|session| *session.borrow_mut() = Some(presenter));
    TaskActionResponse::success("Task session opened.")
}

/// Rows of the active list (search results while searching).
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_list() -> Vec<TaskItem> {
    with_session(|presenter| presenter.rows().into_iter().map(to_task_item).collect())
        .unwrap_or_default()
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_create(title: String, details: Option<String>) -> TaskActionResponse {
    let outcome = with_session(|presenter| {
        let created = presenter
            .repository_mut()
            .create_task(&title, details.as_deref());
        (created, presenter.take_errors())
    });
    match outcome {
        Some((Some(_), errors)) if errors.is_empty() => TaskActionResponse::success("Task created."),
        Some((_, errors)) if !errors.is_empty() => TaskActionResponse::failure(errors.join("\n")),
        Some((_, _)) => TaskActionResponse::failure("Task title is empty."),
        None => no_session(),
    }
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_update(id: String, title: String, details: Option<String>) -> TaskActionResponse {
    run_task_intent(&id, TaskLookup::MustExist, "Task updated.", |id| ListIntent::Edit {
        id,
        title,
        details,
    })
}

#[flutter_rust_bridge::frb(sync)]
pub fn tasks_toggle(id: String) -> TaskActionResponse {
    run_task_intent(&id, TaskLookup::MustExist, "Task toggled.", ListIntent::Toggle)
}

/// Deleting a task that is already gone succeeds.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_delete(id: String) -> TaskActionResponse {
    run_task_intent(&id, TaskLookup::MayBeMissing, "Task deleted.", ListIntent::Delete)
}

/// Starts (or clears) a search; results arrive through `tasks_poll`.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_search(query: String) -> TaskActionResponse {
    match with_session(|presenter| presenter.handle(ListIntent::Search(query))) {
        Some(_) => TaskActionResponse::success("Search started."),
        None => no_session(),
    }
}

/// Starts another network seeding run.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_sync_from_network() -> TaskActionResponse {
    match with_session(|presenter| presenter.repository_mut().load_and_save_todos_from_network()) {
        Some(()) => TaskActionResponse::success("Sync started."),
        None => no_session(),
    }
}

/// Applies finished background work and drains notifications.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_poll() -> TaskPollResponse {
    with_session(|presenter| {
        presenter.pump();
        TaskPollResponse {
            changed: presenter.take_needs_render(),
            errors: presenter.take_errors(),
            pending: presenter.repository().has_pending_work(),
        }
    })
    .unwrap_or(TaskPollResponse {
        changed: false,
        errors: vec!["Task session is not open.".to_string()],
        pending: false,
    })
}

/// Text handed to the platform share sheet.
#[flutter_rust_bridge::frb(sync)]
pub fn tasks_share_text(id: String) -> Option<String> {
    let id = parse_task_id(&id).ok()?;
    with_session(|presenter| presenter.handle(ListIntent::Share(id))).flatten()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum TaskLookup {
    MustExist,
    MayBeMissing,
}

fn run_task_intent(
    raw_id: &str,
    lookup: TaskLookup,
    success_message: &str,
    intent: impl FnOnce(TaskId) -> ListIntent,
) -> TaskActionResponse {
    let id = match parse_task_id(raw_id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let outcome = with_session(|presenter| {
        if lookup == TaskLookup::MustExist && presenter.repository().get_task(id).is_none() {
            return Err(TaskActionResponse::failure(format!("Task `{id}` not found.")));
        }
        presenter.handle(intent(id));
        Ok(presenter.take_errors())
    });
    match outcome {
        Some(Ok(errors)) if errors.is_empty() => TaskActionResponse::success(success_message),
        Some(Ok(errors)) => TaskActionResponse::failure(errors.join("\n")),
        Some(Err(response)) => response,
        None => no_session(),
    }
}

fn parse_task_id(raw: &str) -> Result<TaskId, TaskActionResponse> {
    uuid::Uuid::parse_str(raw.trim())
        .map_err(|_| TaskActionResponse::failure(format!("Invalid task id `{raw}`.")))
}

fn with_session<T>(f: impl FnOnce(&mut TaskListPresenter) -> T) -> Option<T> {
    SESSION.with(|session| session.borrow_mut().as_mut().map(f))
}

fn no_session() -> TaskActionResponse {
    TaskActionResponse::failure("Task session is not open.")
}

fn resolve_db_path(explicit: Option<String>) -> PathBuf {
    let from_env = std::env::var(DB_PATH_ENV).ok();
    [explicit, from_env]
        .into_iter()
        .flatten()
        .map(|raw| raw.trim().to_string())
        .find(|raw| !raw.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| std::env::temp_dir().join(DB_FILE_NAME))
}

fn to_task_item(row: TaskRow) -> TaskItem {
    TaskItem {
        id: row.id.to_string(),
        title: row.title,
        details: row.details,
        is_completed: row.is_completed,
        created_label: row.created_label,
    }
}
