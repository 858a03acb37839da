//! Substring matcher and search query execution.
//!
//! # Invariants
//! - Blank queries never reach SQL and return no hits.
//! - Folding (canonical decomposition, combining marks dropped, Unicode
//!   lowercase) is applied to both sides of the comparison.
//! - Result ordering matches the task list (`created_at DESC`).

use crate::store::row::{parse_task_row, TASK_ORDER_SQL, TASK_SELECT_SQL};
use crate::store::StoreResult;
use crate::model::task::Task;
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, Result as SqliteResult};
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

const CONTAINS_FN_NAME: &str = "task_text_contains";

/// Search request over title OR details.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
}

impl SearchQuery {
    /// Creates a query from raw user input.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Whether the query would match nothing because it is blank.
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    /// Folded needle sent to SQL, `None` for blank input.
    pub fn needle(&self) -> Option<String> {
        let trimmed = self.text.trim();
        if trimmed.is_empty() {
            return None;
        }
        Some(fold_for_search(trimmed))
    }
}

/// Folds text for case- and diacritic-insensitive comparison.
///
/// `ё` folds to `е` and `é` to `e`.
pub fn fold_for_search(value: &str) -> String {
    value
        .nfd()
        .filter(|ch| !is_combining_mark(*ch))
        .collect::<String>()
        .to_lowercase()
}

/// Registers `task_text_contains(haystack, needle)` on a connection.
///
/// `haystack` may be NULL (missing details) and never matches in that case.
/// `needle` must already be folded with [`fold_for_search`].
pub fn register_search_functions(conn: &Connection) -> SqliteResult<()> {
    conn.create_scalar_function(
        CONTAINS_FN_NAME,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let haystack = ctx.get::<Option<String>>(0)?;
            let needle = ctx.get::<String>(1)?;
            Ok(haystack
                .map(|value| fold_for_search(&value).contains(needle.as_str()))
                .unwrap_or(false))
        },
    )
}

/// Runs a search against one connection.
pub fn search_tasks(conn: &Connection, query: &SearchQuery) -> StoreResult<Vec<Task>> {
    let Some(needle) = query.needle() else {
        return Ok(Vec::new());
    };

    let sql = format!(
        "{TASK_SELECT_SQL}
         WHERE {CONTAINS_FN_NAME}(title, ?1) OR {CONTAINS_FN_NAME}(details, ?1)
         {TASK_ORDER_SQL}"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut rows = stmt.query([needle.as_str()])?;
    let mut tasks = Vec::new();

    while let Some(row) = rows.next()? {
        tasks.push(parse_task_row(row)?);
    }

    Ok(tasks)
}

#[cfg(test)]
mod tests {
    use super::{fold_for_search, SearchQuery};

    #[test]
    fn blank_query_has_no_needle() {
        assert!(SearchQuery::new("   ").is_blank());
        assert_eq!(SearchQuery::new(" \n").needle(), None);
    }

    #[test]
    fn needle_is_trimmed_and_folded() {
        assert_eq!(SearchQuery::new("  MiLk ").needle(), Some("milk".to_string()));
    }

    #[test]
    fn folding_handles_non_ascii_letters() {
        assert_eq!(fold_for_search("МОЛОКО"), "молоко");
    }

    #[test]
    fn folding_drops_diacritics() {
        assert_eq!(fold_for_search("Купить ЁЛКУ"), "купить елку");
        assert_eq!(fold_for_search("Café"), "cafe");
        assert_eq!(fold_for_search("e\u{301}"), "e");
    }
}
