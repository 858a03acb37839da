//! Schema history of the task database.
//!
//! Step N brings a database from `user_version` N-1 to N. Step 1 creates
//! `tasks` with its `created_at` and `title` indexes. New steps are appended;
//! shipped steps never change.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;
use std::cmp::Ordering;

const TASK_SCHEMA_STEPS: &[&str] = &[include_str!("0001_tasks.sql")];

/// Schema version this build writes.
pub fn latest_version() -> u32 {
    u32::try_from(TASK_SCHEMA_STEPS.len()).unwrap_or(u32::MAX)
}

/// Brings the database up to [`latest_version`].
///
/// All pending steps share one transaction, so a failing step leaves the
/// database at the version it had before.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let from = schema_version(conn)?;
    let to = latest_version();

    match from.cmp(&to) {
        Ordering::Greater => Err(DbError::UnsupportedSchemaVersion {
            db_version: from,
            latest_supported: to,
        }),
        Ordering::Equal => Ok(()),
        Ordering::Less => {
            let tx = conn.transaction()?;
            for (version, sql) in (1..=to).zip(TASK_SCHEMA_STEPS) {
                if version <= from {
                    continue;
                }
                tx.execute_batch(sql)
                    .and_then(|()| tx.pragma_update(None, "user_version", version))
                    .map_err(|source| DbError::Migration { version, source })?;
            }
            tx.commit()?;
            info!("event=db_migrate module=db status=ok from={from} to={to}");
            Ok(())
        }
    }
}

fn schema_version(conn: &Connection) -> DbResult<u32> {
    Ok(conn.pragma_query_value(None, "user_version", |row| row.get::<_, u32>(0))?)
}
