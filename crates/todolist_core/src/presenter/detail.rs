//! Single-task editor state with dirty tracking.

use super::format::detail_date_label;
use crate::model::task::{normalize_details, normalize_title, now_epoch_ms, Task, TaskId};
use crate::repo::task_repo::TaskRepository;
use chrono::FixedOffset;

/// Editor for one task, or for a task that does not exist yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskDetailPresenter {
    task_id: Option<TaskId>,
    original_title: String,
    original_details: String,
    created_at: i64,
    pub title: String,
    pub details: String,
}

impl TaskDetailPresenter {
    /// Loads the editor from `task`; `None` starts a new task.
    pub fn new(task: Option<&Task>) -> Self {
        let title = task.map(|task| task.title.clone()).unwrap_or_default();
        let details = task
            .and_then(|task| task.details.clone())
            .unwrap_or_default();
        Self {
            task_id: task.map(|task| task.id),
            original_title: title.clone(),
            original_details: details.clone(),
            created_at: task.map_or_else(now_epoch_ms, |task| task.created_at),
            title,
            details,
        }
    }

    pub fn is_new_task(&self) -> bool {
        self.task_id.is_none()
    }

    pub fn created_label(&self, offset: &FixedOffset) -> String {
        detail_date_label(self.created_at, offset)
    }

    /// Trimmed `(title, details)` to save, or `None` when nothing changed
    /// or the title is blank.
    pub fn pending_change(&self) -> Option<(String, Option<String>)> {
        let title = normalize_title(&self.title)?;
        let details = normalize_details(Some(self.details.as_str()));

        let title_changed = title != self.original_title.trim();
        let details_changed =
            details.as_deref().unwrap_or_default() != self.original_details.trim();
        if !title_changed && !details_changed {
            return None;
        }
        Some((title, details))
    }

    /// Writes pending edits through the repository.
    ///
    /// Returns the id of the saved task, `None` when there was nothing to
    /// save. After a successful commit the current text becomes the new
    /// baseline.
    pub fn commit(&mut self, repository: &mut TaskRepository) -> Option<TaskId> {
        let (title, details) = self.pending_change()?;

        let saved = match self.task_id {
            Some(id) => repository
                .update_task(id, &title, details.as_deref())
                .then_some(id),
            None => repository.create_task(&title, details.as_deref()),
        }?;

        self.task_id = Some(saved);
        self.original_title = title.clone();
        self.original_details = details.clone().unwrap_or_default();
        self.title = title;
        self.details = details.unwrap_or_default();
        if let Some(task) = repository.get_task(saved) {
            self.created_at = task.created_at;
        }
        Some(saved)
    }
}

#[cfg(test)]
mod tests {
    use super::TaskDetailPresenter;
    use crate::model::task::Task;
    use chrono::FixedOffset;
    use uuid::Uuid;

    #[test]
    fn existing_task_loads_fields() {
        let task = Task::with_id(Uuid::new_v4(), "Existing Task", Some("Details".into()), 0);
        let editor = TaskDetailPresenter::new(Some(&task));

        assert!(!editor.is_new_task());
        assert_eq!(editor.title, "Existing Task");
        assert_eq!(editor.details, "Details");
        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(editor.created_label(&utc), "01 January 1970, 00:00");
    }

    #[test]
    fn new_editor_starts_blank() {
        let editor = TaskDetailPresenter::new(None);
        assert!(editor.is_new_task());
        assert!(editor.title.is_empty());
        assert!(editor.details.is_empty());
        assert_eq!(editor.pending_change(), None);
    }

    #[test]
    fn whitespace_only_edits_are_not_changes() {
        let task = Task::with_id(Uuid::new_v4(), "Title", None, 0);
        let mut editor = TaskDetailPresenter::new(Some(&task));
        editor.title = "  Title \n".to_string();
        editor.details = "   ".to_string();
        assert_eq!(editor.pending_change(), None);
    }

    #[test]
    fn blank_title_is_never_pending() {
        let task = Task::with_id(Uuid::new_v4(), "Title", None, 0);
        let mut editor = TaskDetailPresenter::new(Some(&task));
        editor.title = "   ".to_string();
        editor.details = "new details".to_string();
        assert_eq!(editor.pending_change(), None);
    }

    #[test]
    fn real_edit_is_trimmed() {
        let task = Task::with_id(Uuid::new_v4(), "Title", Some("old".into()), 0);
        let mut editor = TaskDetailPresenter::new(Some(&task));
        editor.details = " new ".to_string();
        assert_eq!(
            editor.pending_change(),
            Some(("Title".to_string(), Some("new".to_string())))
        );
    }
}
