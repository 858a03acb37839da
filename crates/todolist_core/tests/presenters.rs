use chrono::FixedOffset;
use std::sync::Arc;
use std::time::Duration;
use todolist_core::{
    ListIntent, RemoteResult, RemoteTodoItem, RemoteTodoSource, TaskDetailPresenter,
    TaskListPresenter, TaskRepository, TaskStore,
};

const WAIT: Duration = Duration::from_secs(5);

struct CountingRemote {
    calls: std::sync::atomic::AtomicUsize,
}

impl RemoteTodoSource for CountingRemote {
    fn fetch_todos(&self) -> RemoteResult<Vec<RemoteTodoItem>> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(vec![RemoteTodoItem {
            external_id: 1,
            text: "Seeded todo".to_string(),
            completed: false,
            owner_id: 1,
        }])
    }
}

fn utc() -> FixedOffset {
    FixedOffset::east_opt(0).unwrap()
}

fn presenter_with(remote: Arc<CountingRemote>) -> TaskListPresenter {
    let store = Arc::new(TaskStore::open_in_memory().unwrap());
    TaskListPresenter::with_offset(TaskRepository::new(store, remote), utc())
}

fn empty_remote() -> Arc<CountingRemote> {
    Arc::new(CountingRemote {
        calls: std::sync::atomic::AtomicUsize::new(0),
    })
}

#[test]
fn appear_seeds_only_once_per_session() {
    let remote = empty_remote();
    let mut presenter = presenter_with(Arc::clone(&remote));

    presenter.handle(ListIntent::Appear);
    assert!(presenter.repository_mut().wait_for_pending(WAIT));
    presenter.handle(ListIntent::Appear);
    assert!(presenter.repository_mut().wait_for_pending(WAIT));

    assert_eq!(remote.calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    let rows = presenter.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "Seeded todo");
    assert!(presenter.take_needs_render());
    assert!(!presenter.take_needs_render());
}

#[test]
fn add_edit_toggle_delete_flow() {
    let mut presenter = presenter_with(empty_remote());

    presenter.handle(ListIntent::Add {
        title: "Write report".to_string(),
        details: Some("quarterly".to_string()),
    });
    presenter.handle(ListIntent::Add {
        title: "   ".to_string(),
        details: None,
    });
    let row = presenter.row_at(0).unwrap();
    assert_eq!(presenter.rows().len(), 1);
    assert_eq!(row.details.as_deref(), Some("quarterly"));
    assert_eq!(row.created_label.len(), "dd/mm/yy".len());

    presenter.handle(ListIntent::Edit {
        id: row.id,
        title: "Write final report".to_string(),
        details: None,
    });
    presenter.handle(ListIntent::Toggle(row.id));
    let edited = presenter.row_at(0).unwrap();
    assert_eq!(edited.title, "Write final report");
    assert_eq!(edited.details, None);
    assert!(edited.is_completed);

    let shared = presenter.handle(ListIntent::Share(row.id));
    assert_eq!(shared.as_deref(), Some("Write final report\n\n"));

    presenter.handle(ListIntent::Delete(row.id));
    assert!(presenter.rows().is_empty());
    assert!(presenter.row_at(0).is_none());
    assert!(presenter.take_errors().is_empty());
}

#[test]
fn search_intent_switches_rows_to_filtered_list() {
    let mut presenter = presenter_with(empty_remote());
    for title in ["Buy milk", "Walk dog"] {
        presenter.handle(ListIntent::Add {
            title: title.to_string(),
            details: None,
        });
    }

    presenter.handle(ListIntent::Search("milk".to_string()));
    assert!(presenter.repository_mut().wait_for_pending(WAIT));
    let rows = presenter.rows();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].title, "Buy milk");

    presenter.handle(ListIntent::Search(String::new()));
    assert_eq!(presenter.rows().len(), 2);
}

#[test]
fn detail_editor_creates_then_updates_only_on_real_changes() {
    let mut presenter = presenter_with(empty_remote());
    let repository = presenter.repository_mut();

    let mut editor = TaskDetailPresenter::new(None);
    editor.title = "  New Task ".to_string();
    editor.details = "Some details".to_string();
    let id = editor.commit(repository).unwrap();
    assert!(!editor.is_new_task());
    assert_eq!(editor.title, "New Task");

    assert_eq!(editor.commit(repository), None);

    editor.details = "Updated Details".to_string();
    assert_eq!(editor.commit(repository), Some(id));

    editor.title = String::new();
    assert_eq!(editor.commit(repository), None);

    let task = repository.get_task(id).unwrap();
    assert_eq!(task.title, "New Task");
    assert_eq!(task.details.as_deref(), Some("Updated Details"));
    assert_eq!(repository.tasks().len(), 1);
}
