//! Row mapping between the `tasks` table and [`Task`].
//!
//! Read paths reject rows that break task invariants instead of masking them.

use super::{StoreError, StoreResult};
use crate::model::task::Task;
use rusqlite::Row;
use uuid::Uuid;

pub(crate) const TASK_SELECT_SQL: &str = "SELECT
    uuid,
    title,
    details,
    created_at,
    is_completed
FROM tasks";

/// Newest first; rowid breaks ties so the latest insert wins.
pub(crate) const TASK_ORDER_SQL: &str = "ORDER BY created_at DESC, rowid DESC";

pub(crate) fn parse_task_row(row: &Row<'_>) -> StoreResult<Task> {
    let uuid_text: String = row.get("uuid")?;
    let id = Uuid::parse_str(&uuid_text).map_err(|_| {
        StoreError::InvalidData(format!("invalid uuid value `{uuid_text}` in tasks.uuid"))
    })?;

    let title = row
        .get::<_, Option<String>>("title")?
        .ok_or_else(|| StoreError::InvalidData(format!("task {id} has no title")))?;

    let created_at = row
        .get::<_, Option<i64>>("created_at")?
        .ok_or_else(|| StoreError::InvalidData(format!("task {id} has no created_at")))?;

    let is_completed = match row.get::<_, i64>("is_completed")? {
        0 => false,
        1 => true,
        other => {
            return Err(StoreError::InvalidData(format!(
                "invalid is_completed value `{other}` in tasks.is_completed"
            )));
        }
    };

    let task = Task {
        id,
        title,
        details: row.get("details")?,
        created_at,
        is_completed,
    };
    task.validate()?;
    Ok(task)
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
