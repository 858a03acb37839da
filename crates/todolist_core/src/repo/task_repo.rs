//! Foreground task repository.

use crate::foreground::{ForegroundHandle, ForegroundQueue};
use crate::model::task::{normalize_details, normalize_title, Task, TaskId};
use crate::remote::RemoteTodoSource;
use crate::search::SearchQuery;
use crate::store::{StoreResult, TaskStore};
use crate::sync::{seed_from_remote, MergeError, MergeReport};
use log::{debug, error, info};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Completion posted by a worker job.
enum RepositoryMessage {
    SearchFinished {
        generation: u64,
        result: StoreResult<Vec<Task>>,
    },
    SeedFinished(Result<MergeReport, MergeError>),
}

type TasksUpdatedListener = Box<dyn FnMut()>;
type ErrorListener = Box<dyn FnMut(&str)>;

/// Task list state plus all task use cases.
///
/// Listeners are plain (non-`Send`) closures, which pins the repository to
/// the thread that created it.
pub struct TaskRepository {
    store: Arc<TaskStore>,
    remote: Arc<dyn RemoteTodoSource>,
    queue: ForegroundQueue<RepositoryMessage>,
    tasks: Vec<Task>,
    filtered_tasks: Vec<Task>,
    is_searching: bool,
    active_query: Option<SearchQuery>,
    search_generation: u64,
    pending_jobs: usize,
    on_tasks_updated: Option<TasksUpdatedListener>,
    on_error: Option<ErrorListener>,
}

impl TaskRepository {
    pub fn new(store: Arc<TaskStore>, remote: Arc<dyn RemoteTodoSource>) -> Self {
        Self {
            store,
            remote,
            queue: ForegroundQueue::new(),
            tasks: Vec::new(),
            filtered_tasks: Vec::new(),
            is_searching: false,
            active_query: None,
            search_generation: 0,
            pending_jobs: 0,
            on_tasks_updated: None,
            on_error: None,
        }
    }

    /// Registers the "data changed" listener.
    pub fn set_on_tasks_updated(&mut self, listener: impl FnMut() + 'static) {
        self.on_tasks_updated = Some(Box::new(listener));
    }

    /// Registers the "error occurred" listener; receives user-facing text.
    pub fn set_on_error(&mut self, listener: impl FnMut(&str) + 'static) {
        self.on_error = Some(Box::new(listener));
    }

    /// All tasks, newest first, as of the last successful load.
    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    /// Tasks matching the active search query.
    pub fn filtered_tasks(&self) -> &[Task] {
        &self.filtered_tasks
    }

    pub fn is_searching(&self) -> bool {
        self.is_searching
    }

    /// The list the UI should render right now.
    pub fn active_tasks(&self) -> &[Task] {
        if self.is_searching {
            &self.filtered_tasks
        } else {
            &self.tasks
        }
    }

    pub fn task_count(&self) -> usize {
        self.active_tasks().len()
    }

    /// Bounds-checked row accessor into the active list.
    pub fn task_at(&self, index: usize) -> Option<&Task> {
        self.active_tasks().get(index)
    }

    pub fn get_task(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    /// Reloads `tasks` from the main context.
    pub fn load_tasks(&mut self) {
        match self.store.main_context().perform(|ctx| ctx.fetch_all()) {
            Ok(tasks) => {
                debug!("event=tasks_load module=repo status=ok count={}", tasks.len());
                self.tasks = tasks;
                self.notify_updated();
            }
            Err(err) => {
                error!("event=tasks_load module=repo status=error error={err}");
                self.notify_error(&format!("Failed to load tasks: {err}"));
            }
        }
    }

    /// Creates a task; blank titles are silently ignored.
    ///
    /// Returns the new task id when the task was written.
    pub fn create_task(&mut self, title: &str, details: Option<&str>) -> Option<TaskId> {
        let Some(title) = normalize_title(title) else {
            debug!("event=task_create module=repo status=rejected reason=empty_title");
            return None;
        };

        let task = Task::new(title, normalize_details(details));
        let store = Arc::clone(&self.store);
        let result = store.main_context().perform(|ctx| -> StoreResult<bool> {
            ctx.insert(&task)?;
            store.save(ctx)
        });

        let created = match result {
            Ok(_) => {
                info!("event=task_create module=repo status=ok task_id={}", task.id);
                Some(task.id)
            }
            Err(err) => {
                self.notify_error(&format!("Failed to save task: {err}"));
                None
            }
        };
        self.reload_after_write();
        created
    }

    /// Replaces title and details of an existing task.
    ///
    /// Blank titles and unknown ids are ignored. Returns whether the task
    /// was changed.
    pub fn update_task(&mut self, id: TaskId, title: &str, details: Option<&str>) -> bool {
        let Some(title) = normalize_title(title) else {
            debug!("event=task_update module=repo status=rejected reason=empty_title");
            return false;
        };
        let details = normalize_details(details);

        let store = Arc::clone(&self.store);
        let result = store.main_context().perform(|ctx| -> StoreResult<bool> {
            let Some(mut task) = ctx.get(id)? else {
                return Ok(false);
            };
            if task.title == title && task.details == details {
                return Ok(false);
            }
            task.title = title;
            task.details = details;
            ctx.update(&task)?;
            store.save(ctx)?;
            Ok(true)
        });

        self.finish_write("task_update", id, result, "Failed to update task")
    }

    /// Deletes a task; deleting a missing task is a no-op.
    pub fn delete_task(&mut self, id: TaskId) -> bool {
        let store = Arc::clone(&self.store);
        let result = store.main_context().perform(|ctx| -> StoreResult<bool> {
            if ctx.get(id)?.is_none() {
                return Ok(false);
            }
            ctx.delete(id)?;
            store.save(ctx)?;
            Ok(true)
        });

        self.finish_write("task_delete", id, result, "Failed to delete task")
    }

    /// Flips completion; returns the new value, `None` for unknown ids.
    pub fn toggle_completed(&mut self, id: TaskId) -> Option<bool> {
        let store = Arc::clone(&self.store);
        let result = store.main_context().perform(|ctx| -> StoreResult<Option<bool>> {
            let Some(mut task) = ctx.get(id)? else {
                return Ok(None);
            };
            let completed = task.toggle_completed();
            ctx.update(&task)?;
            store.save(ctx)?;
            Ok(Some(completed))
        });

        let toggled = match result {
            Ok(value) => value,
            Err(err) => {
                error!("event=task_toggle module=repo status=error task_id={id} error={err}");
                self.notify_error(&format!("Failed to update task: {err}"));
                None
            }
        };
        self.reload_after_write();
        toggled
    }

    /// Updates `filtered_tasks` for `query`.
    ///
    /// A blank query clears the search synchronously. Otherwise the search
    /// runs on a worker thread and only the newest request is applied.
    pub fn update_search_results(&mut self, query: &str) {
        self.search_generation += 1;
        let query = SearchQuery::new(query);

        if query.is_blank() {
            self.filtered_tasks.clear();
            self.is_searching = false;
            self.active_query = None;
            self.notify_updated();
            return;
        }

        self.is_searching = true;
        self.active_query = Some(query.clone());
        self.spawn_search(query);
    }

    /// Seeds local tasks from the remote source on a worker thread.
    pub fn load_and_save_todos_from_network(&mut self) {
        let store = Arc::clone(&self.store);
        let remote = Arc::clone(&self.remote);
        let handle = self.queue.handle();

        self.spawn_job("todolist-seed", move || {
            let outcome = seed_from_remote(&store, remote.as_ref());
            handle.post(RepositoryMessage::SeedFinished(outcome));
        });
    }

    /// Whether worker jobs have not reported back yet.
    pub fn has_pending_work(&self) -> bool {
        self.pending_jobs > 0
    }

    /// Applies every completion that already arrived; never blocks.
    ///
    /// Returns the number of completions applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Some(message) = self.queue.try_next() {
            self.apply(message);
            applied += 1;
        }
        applied
    }

    /// Blocks until all worker jobs reported back or `timeout` elapses.
    ///
    /// Returns `true` when nothing is pending anymore.
    pub fn wait_for_pending(&mut self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        self.pump();
        while self.pending_jobs > 0 {
            let Some(remaining) = deadline.checked_duration_since(Instant::now()) else {
                return false;
            };
            match self.queue.next_timeout(remaining) {
                Some(message) => self.apply(message),
                None => return self.pending_jobs == 0,
            }
        }
        true
    }

    fn apply(&mut self, message: RepositoryMessage) {
        self.pending_jobs = self.pending_jobs.saturating_sub(1);
        match message {
            RepositoryMessage::SearchFinished { generation, result } => {
                self.apply_search(generation, result);
            }
            RepositoryMessage::SeedFinished(outcome) => self.apply_seed(outcome),
        }
    }

    fn apply_search(&mut self, generation: u64, result: StoreResult<Vec<Task>>) {
        if generation != self.search_generation {
            debug!(
                "event=task_search module=repo status=stale generation={} current={}",
                generation, self.search_generation
            );
            return;
        }

        match result {
            Ok(tasks) => {
                debug!(
                    "event=task_search module=repo status=ok generation={} hits={}",
                    generation,
                    tasks.len()
                );
                self.filtered_tasks = tasks;
                self.notify_updated();
            }
            Err(err) => {
                error!("event=task_search module=repo status=error error={err}");
                self.notify_error(&format!("Failed to search tasks: {err}"));
            }
        }
    }

    fn apply_seed(&mut self, outcome: Result<MergeReport, MergeError>) {
        match outcome {
            Ok(report) => {
                info!(
                    "event=tasks_seed module=repo status=ok inserted={} matched={}",
                    report.inserted, report.matched
                );
                self.reload_after_write();
            }
            Err(MergeError::Remote(err)) => {
                self.notify_error(&format!("Failed to load tasks from network: {err}"));
            }
            Err(MergeError::Store(err)) => {
                self.notify_error(&format!("Failed to save tasks: {err}"));
            }
        }
    }

    fn finish_write(
        &mut self,
        event: &str,
        id: TaskId,
        result: StoreResult<bool>,
        message: &str,
    ) -> bool {
        let changed = match result {
            Ok(changed) => {
                debug!("event={event} module=repo status=ok task_id={id} changed={changed}");
                changed
            }
            Err(err) => {
                error!("event={event} module=repo status=error task_id={id} error={err}");
                self.notify_error(&format!("{message}: {err}"));
                false
            }
        };
        self.reload_after_write();
        changed
    }

    fn reload_after_write(&mut self) {
        self.load_tasks();
        if let Some(query) = self.active_query.clone() {
            self.search_generation += 1;
            self.spawn_search(query);
        }
    }

    fn spawn_search(&mut self, query: SearchQuery) {
        let generation = self.search_generation;
        let store = Arc::clone(&self.store);
        let handle: ForegroundHandle<RepositoryMessage> = self.queue.handle();

        self.spawn_job("todolist-search", move || {
            let result = store.main_context().perform(|ctx| ctx.search(&query));
            handle.post(RepositoryMessage::SearchFinished { generation, result });
        });
    }

    fn spawn_job(&mut self, name: &str, job: impl FnOnce() + Send + 'static) {
        match std::thread::Builder::new().name(name.to_string()).spawn(job) {
            Ok(_) => self.pending_jobs += 1,
            Err(err) => {
                error!("event=job_spawn module=repo status=error job={name} error={err}");
                self.notify_error(&format!("Failed to start background work: {err}"));
            }
        }
    }

    fn notify_updated(&mut self) {
        if let Some(listener) = self.on_tasks_updated.as_mut() {
            listener();
        }
    }

    fn notify_error(&mut self, message: &str) {
        if let Some(listener) = self.on_error.as_mut() {
            listener(message);
        }
    }
}
