//! List screen state: rows, intents and pending notifications.

use super::format::{list_date_label, local_offset};
use crate::model::task::{Task, TaskId};
use crate::repo::task_repo::TaskRepository;
use chrono::FixedOffset;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

/// Render-ready list row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskRow {
    pub id: TaskId,
    pub title: String,
    pub details: Option<String>,
    pub is_completed: bool,
    pub created_label: String,
}

/// User gestures on the list screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListIntent {
    /// Screen became visible; loads tasks and seeds once per session.
    Appear,
    Add {
        title: String,
        details: Option<String>,
    },
    Edit {
        id: TaskId,
        title: String,
        details: Option<String>,
    },
    Delete(TaskId),
    Toggle(TaskId),
    Search(String),
    /// Asks for share text; answered through [`TaskListPresenter::handle`].
    Share(TaskId),
}

/// Owns the repository for the list screen and buffers its notifications.
pub struct TaskListPresenter {
    repository: TaskRepository,
    offset: FixedOffset,
    needs_render: Rc<Cell<bool>>,
    errors: Rc<RefCell<Vec<String>>>,
    seeded: bool,
}

impl TaskListPresenter {
    pub fn new(repository: TaskRepository) -> Self {
        Self::with_offset(repository, local_offset())
    }

    /// Uses a fixed UTC offset for date labels.
    pub fn with_offset(mut repository: TaskRepository, offset: FixedOffset) -> Self {
        let needs_render = Rc::new(Cell::new(false));
        let errors = Rc::new(RefCell::new(Vec::new()));

        let render_flag = Rc::clone(&needs_render);
        repository.set_on_tasks_updated(move || render_flag.set(true));
        let error_sink = Rc::clone(&errors);
        repository.set_on_error(move |message| error_sink.borrow_mut().push(message.to_string()));

        Self {
            repository,
            offset,
            needs_render,
            errors,
            seeded: false,
        }
    }

    pub fn repository(&self) -> &TaskRepository {
        &self.repository
    }

    pub fn repository_mut(&mut self) -> &mut TaskRepository {
        &mut self.repository
    }

    /// Applies one intent. Only [`ListIntent::Share`] produces a value.
    pub fn handle(&mut self, intent: ListIntent) -> Option<String> {
        match intent {
            ListIntent::Appear => {
                self.repository.load_tasks();
                if !self.seeded {
                    self.seeded = true;
                    self.repository.load_and_save_todos_from_network();
                }
            }
            ListIntent::Add { title, details } => {
                self.repository.create_task(&title, details.as_deref());
            }
            ListIntent::Edit { id, title, details } => {
                self.repository.update_task(id, &title, details.as_deref());
            }
            ListIntent::Delete(id) => {
                self.repository.delete_task(id);
            }
            ListIntent::Toggle(id) => {
                self.repository.toggle_completed(id);
            }
            ListIntent::Search(query) => self.repository.update_search_results(&query),
            ListIntent::Share(id) => {
                return self.repository.get_task(id).map(Task::share_text);
            }
        }
        None
    }

    /// Applies finished background work; call from the UI loop.
    pub fn pump(&mut self) -> usize {
        self.repository.pump()
    }

    /// Returns and clears the "data changed" flag.
    pub fn take_needs_render(&self) -> bool {
        self.needs_render.replace(false)
    }

    /// Returns and clears error messages raised since the last call.
    pub fn take_errors(&self) -> Vec<String> {
        std::mem::take(&mut *self.errors.borrow_mut())
    }

    pub fn rows(&self) -> Vec<TaskRow> {
        self.repository
            .active_tasks()
            .iter()
            .map(|task| self.row(task))
            .collect()
    }

    pub fn row_at(&self, index: usize) -> Option<TaskRow> {
        self.repository.task_at(index).map(|task| self.row(task))
    }

    fn row(&self, task: &Task) -> TaskRow {
        TaskRow {
            id: task.id,
            title: task.title.clone(),
            details: task.details.clone(),
            is_completed: task.is_completed,
            created_label: list_date_label(task.created_at, &self.offset),
        }
    }
}
