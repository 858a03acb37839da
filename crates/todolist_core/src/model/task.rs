//! Task domain model.
//!
//! # Responsibility
//! - Define the persisted task record and its validation rules.
//! - Normalize user-entered title/details text in one place.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `title` is non-empty after trimming for every persisted task.
//! - `created_at` is set once at construction and never mutated.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier assigned to a task when it is constructed.
pub type TaskId = Uuid;

/// Validation errors for task write paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    /// Title is empty or whitespace only.
    EmptyTitle,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "task title must not be empty"),
        }
    }
}

impl Error for TaskValidationError {}

/// Persisted to-do item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub details: Option<String>,
    /// Unix epoch milliseconds.
    pub created_at: i64,
    pub is_completed: bool,
}

impl Task {
    /// Creates a new, not yet completed task stamped with the current time.
    ///
    /// The caller is expected to pass already normalized text; see
    /// [`normalize_title`] and [`normalize_details`].
    pub fn new(title: impl Into<String>, details: Option<String>) -> Self {
        Self::with_id(Uuid::new_v4(), title, details, now_epoch_ms())
    }

    /// Creates a task with caller-provided identity and creation time.
    pub fn with_id(
        id: TaskId,
        title: impl Into<String>,
        details: Option<String>,
        created_at: i64,
    ) -> Self {
        Self {
            id,
            title: title.into(),
            details,
            created_at,
            is_completed: false,
        }
    }

    /// Checks write-path invariants.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.title.trim().is_empty() {
            return Err(TaskValidationError::EmptyTitle);
        }
        Ok(())
    }

    /// Flips the completion flag and returns the new value.
    pub fn toggle_completed(&mut self) -> bool {
        self.is_completed = !self.is_completed;
        self.is_completed
    }

    /// Plain-text payload handed to the platform share sheet.
    pub fn share_text(&self) -> String {
        format!(
            "{}\n\n{}",
            self.title,
            self.details.as_deref().unwrap_or_default()
        )
    }
}

/// Trims a user-entered title; returns `None` when nothing is left.
pub fn normalize_title(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Trims user-entered details; blank details are stored as `None`.
pub fn normalize_details(raw: Option<&str>) -> Option<String> {
    raw.and_then(normalize_title)
}

/// Current wall-clock time as Unix epoch milliseconds.
pub fn now_epoch_ms() -> i64 {
    Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::{normalize_details, normalize_title, Task, TaskValidationError};

    #[test]
    fn new_task_starts_incomplete() {
        let task = Task::new("Buy milk", None);
        assert!(!task.is_completed);
        assert!(task.created_at > 0);
    }

    #[test]
    fn validate_rejects_blank_title() {
        let task = Task::new("   ", None);
        assert_eq!(task.validate(), Err(TaskValidationError::EmptyTitle));
    }

    #[test]
    fn toggle_twice_restores_original_value() {
        let mut task = Task::new("Walk dog", None);
        assert!(task.toggle_completed());
        assert!(!task.toggle_completed());
    }

    #[test]
    fn share_text_joins_title_and_details() {
        let task = Task::new("Title", Some("Body".to_string()));
        assert_eq!(task.share_text(), "Title\n\nBody");

        let bare = Task::new("Title", None);
        assert_eq!(bare.share_text(), "Title\n\n");
    }

    #[test]
    fn normalize_helpers_trim_and_drop_blank_values() {
        assert_eq!(normalize_title("  hi \n"), Some("hi".to_string()));
        assert_eq!(normalize_title(" \t"), None);
        assert_eq!(normalize_details(Some("   ")), None);
        assert_eq!(normalize_details(None), None);
        assert_eq!(normalize_details(Some(" a ")), Some("a".to_string()));
    }
}
