//! Store contexts: one connection plus its pending unit of work.
//!
//! # Invariants
//! - The first mutation opens a write transaction; the context "has changes"
//!   exactly while that transaction is open.
//! - Reads see committed rows plus this context's own pending writes.
//! - A context is never shared between threads without going through
//!   [`super::MainContext::perform`].

use super::row::{bool_to_int, parse_task_row, TASK_ORDER_SQL, TASK_SELECT_SQL};
use super::StoreResult;
use crate::model::task::{Task, TaskId};
use crate::search::{search_tasks, SearchQuery};
use rusqlite::{params, Connection};

/// Which role a context plays for the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextKind {
    /// The shared context backing everything the UI renders.
    Main,
    /// A work-scoped context used off the foreground thread.
    Background,
}

impl ContextKind {
    pub(crate) fn label(self) -> &'static str {
        match self {
            Self::Main => "main",
            Self::Background => "background",
        }
    }
}

/// One store connection with lazily opened write transaction.
pub struct StoreContext {
    conn: Connection,
    kind: ContextKind,
}

impl StoreContext {
    pub(crate) fn new(conn: Connection, kind: ContextKind) -> Self {
        Self { conn, kind }
    }

    pub fn kind(&self) -> ContextKind {
        self.kind
    }

    /// Whether there are uncommitted mutations in this context.
    pub fn has_changes(&self) -> bool {
        !self.conn.is_autocommit()
    }

    /// All tasks, newest first.
    pub fn fetch_all(&self) -> StoreResult<Vec<Task>> {
        let mut stmt = self.conn.prepare(&format!("{TASK_SELECT_SQL} {TASK_ORDER_SQL}"))?;
        let mut rows = stmt.query([])?;
        let mut tasks = Vec::new();

        while let Some(row) = rows.next()? {
            tasks.push(parse_task_row(row)?);
        }

        Ok(tasks)
    }

    pub fn get(&self, id: TaskId) -> StoreResult<Option<Task>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{TASK_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    /// First task whose title equals `title` exactly (case-sensitive).
    pub fn find_by_title(&self, title: &str) -> StoreResult<Option<Task>> {
        let mut stmt = self.conn.prepare(&format!(
            "{TASK_SELECT_SQL} WHERE title = ?1 {TASK_ORDER_SQL} LIMIT 1;"
        ))?;
        let mut rows = stmt.query([title])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_task_row(row)?));
        }

        Ok(None)
    }

    pub fn count(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM tasks;", [], |row| row.get(0))?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    /// Case-insensitive search over title OR details.
    pub fn search(&self, query: &SearchQuery) -> StoreResult<Vec<Task>> {
        search_tasks(&self.conn, query)
    }

    pub fn insert(&self, task: &Task) -> StoreResult<()> {
        task.validate()?;
        self.begin_write()?;

        self.conn.execute(
            "INSERT INTO tasks (
                uuid,
                title,
                details,
                created_at,
                is_completed
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                task.id.to_string(),
                task.title.as_str(),
                task.details.as_deref(),
                task.created_at,
                bool_to_int(task.is_completed),
            ],
        )?;

        Ok(())
    }

    /// Writes title, details and completion. `created_at` is never rewritten.
    ///
    /// Returns `false` when no row has the task's id.
    pub fn update(&self, task: &Task) -> StoreResult<bool> {
        task.validate()?;
        self.begin_write()?;

        let changed = self.conn.execute(
            "UPDATE tasks
             SET
                title = ?1,
                details = ?2,
                is_completed = ?3
             WHERE uuid = ?4;",
            params![
                task.title.as_str(),
                task.details.as_deref(),
                bool_to_int(task.is_completed),
                task.id.to_string(),
            ],
        )?;

        Ok(changed > 0)
    }

    /// Returns `false` when the task was already gone.
    pub fn delete(&self, id: TaskId) -> StoreResult<bool> {
        self.begin_write()?;
        let changed = self
            .conn
            .execute("DELETE FROM tasks WHERE uuid = ?1;", [id.to_string()])?;
        Ok(changed > 0)
    }

    pub(crate) fn commit(&self) -> StoreResult<bool> {
        if !self.has_changes() {
            return Ok(false);
        }
        self.conn.execute_batch("COMMIT;")?;
        Ok(true)
    }

    pub(crate) fn rollback(&self) -> StoreResult<bool> {
        if !self.has_changes() {
            return Ok(false);
        }
        self.conn.execute_batch("ROLLBACK;")?;
        Ok(true)
    }

    pub(crate) fn into_connection(self) -> Connection {
        self.conn
    }

    /// Opens the write transaction now instead of at the first mutation.
    pub(crate) fn begin_write(&self) -> StoreResult<()> {
        if self.conn.is_autocommit() {
            self.conn.execute_batch("BEGIN IMMEDIATE;")?;
        }
        Ok(())
    }
}
