//! Title-keyed merge of remote todos into a background store context.

use crate::model::remote_item::RemoteTodoItem;
use crate::model::task::Task;
use crate::remote::{RemoteError, RemoteTodoSource};
use crate::store::{StoreContext, StoreError, StoreResult, TaskStore};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Outcome counters of one merge batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeReport {
    /// Remote items received.
    pub fetched: usize,
    /// New local tasks created.
    pub inserted: usize,
    /// Items whose title already existed locally.
    pub matched: usize,
    /// Items without usable text.
    pub skipped: usize,
}

/// Failure of a seeding run.
#[derive(Debug)]
pub enum MergeError {
    Remote(RemoteError),
    Store(StoreError),
}

impl Display for MergeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Remote(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for MergeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Remote(err) => Some(err),
            Self::Store(err) => Some(err),
        }
    }
}

impl From<RemoteError> for MergeError {
    fn from(value: RemoteError) -> Self {
        Self::Remote(value)
    }
}

impl From<StoreError> for MergeError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

/// Fetches remote todos and merges them; blocking, run off the UI thread.
pub fn seed_from_remote(
    store: &TaskStore,
    source: &dyn RemoteTodoSource,
) -> Result<MergeReport, MergeError> {
    let items = source.fetch_todos()?;
    Ok(merge_remote_todos(store, &items)?)
}

/// Merges `items` in one background-context transaction.
///
/// Existing titles are left as they are. On any failure the pending batch
/// is discarded and the error returned.
pub fn merge_remote_todos(store: &TaskStore, items: &[RemoteTodoItem]) -> StoreResult<MergeReport> {
    let started_at = Instant::now();
    let context = store.new_background_context()?;

    let outcome = apply_items(&context, items).and_then(|report| {
        store.save(&context)?;
        Ok(report)
    });

    match outcome {
        Ok(report) => {
            info!(
                "event=remote_merge module=sync status=ok duration_ms={} fetched={} inserted={} matched={} skipped={}",
                started_at.elapsed().as_millis(),
                report.fetched,
                report.inserted,
                report.matched,
                report.skipped
            );
            Ok(report)
        }
        Err(err) => {
            store.discard(&context);
            error!(
                "event=remote_merge module=sync status=error duration_ms={} error={}",
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn apply_items(context: &StoreContext, items: &[RemoteTodoItem]) -> StoreResult<MergeReport> {
    let mut report = MergeReport {
        fetched: items.len(),
        ..MergeReport::default()
    };
    // Lookups and inserts share one write transaction.
    context.begin_write()?;

    for item in items {
        if item.text.trim().is_empty() {
            report.skipped += 1;
            continue;
        }

        if context.find_by_title(&item.text)?.is_some() {
            report.matched += 1;
            continue;
        }

        let mut task = Task::new(item.text.clone(), None);
        task.is_completed = item.completed;
        context.insert(&task)?;
        report.inserted += 1;
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::{apply_items, merge_remote_todos, seed_from_remote, MergeError};
    use crate::model::remote_item::RemoteTodoItem;
    use crate::model::task::Task;
    use crate::remote::{RemoteError, RemoteResult, RemoteTodoSource};
    use crate::store::TaskStore;

    fn item(id: i64, text: &str, completed: bool) -> RemoteTodoItem {
        RemoteTodoItem {
            external_id: id,
            text: text.to_string(),
            completed,
            owner_id: 1,
        }
    }

    struct FailingSource;

    impl RemoteTodoSource for FailingSource {
        fn fetch_todos(&self) -> RemoteResult<Vec<RemoteTodoItem>> {
            Err(RemoteError::EmptyResponse)
        }
    }

    #[test]
    fn existing_title_is_not_duplicated_or_modified() {
        let store = TaskStore::open_in_memory().unwrap();
        let mut local = Task::new("Walk the dog", Some("evening".to_string()));
        local.is_completed = false;
        store.main_context().perform(|ctx| {
            ctx.insert(&local).unwrap();
            store.save(ctx).unwrap();
        });

        let report = merge_remote_todos(&store, &[item(1, "Walk the dog", true)]).unwrap();
        assert_eq!(report.matched, 1);
        assert_eq!(report.inserted, 0);

        let tasks = store.main_context().perform(|ctx| ctx.fetch_all()).unwrap();
        assert_eq!(tasks, vec![local]);
    }

    #[test]
    fn new_title_is_inserted_with_remote_completion() {
        let store = TaskStore::open_in_memory().unwrap();

        let report = merge_remote_todos(&store, &[item(7, "Read a book", true)]).unwrap();
        assert_eq!(report.inserted, 1);

        let tasks = store.main_context().perform(|ctx| ctx.fetch_all()).unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Read a book");
        assert!(tasks[0].is_completed);
        assert_eq!(tasks[0].details, None);
    }

    #[test]
    fn duplicate_titles_in_one_batch_collapse_and_rerun_is_stable() {
        let store = TaskStore::open_in_memory().unwrap();
        let batch = [item(1, "Same", false), item(2, "Same", true), item(3, " ", false)];

        let first = merge_remote_todos(&store, &batch).unwrap();
        assert_eq!((first.inserted, first.matched, first.skipped), (1, 1, 1));

        let second = merge_remote_todos(&store, &batch).unwrap();
        assert_eq!((second.inserted, second.matched), (0, 2));

        let count = store.main_context().perform(|ctx| ctx.count()).unwrap();
        assert_eq!(count, 1);
    }

    #[test]
    fn title_lookups_run_inside_the_write_transaction() {
        let store = TaskStore::open_in_memory().unwrap();
        store.main_context().perform(|ctx| {
            ctx.insert(&Task::new("Known", None)).unwrap();
            store.save(ctx).unwrap();
        });

        let context = store.new_background_context().unwrap();
        let report = apply_items(&context, &[item(1, "Known", false)]).unwrap();
        assert_eq!(report.matched, 1);
        assert!(context.has_changes());
        store.discard(&context);
        assert!(!context.has_changes());
    }

    #[test]
    fn remote_failure_is_reported_without_touching_store() {
        let store = TaskStore::open_in_memory().unwrap();
        let err = seed_from_remote(&store, &FailingSource).unwrap_err();
        assert!(matches!(err, MergeError::Remote(RemoteError::EmptyResponse)));
        assert_eq!(store.main_context().perform(|ctx| ctx.count()).unwrap(), 0);
    }
}
