//! CLI smoke entry point.
//!
//! # Responsibility
//! - Verify `todolist_core` linkage without the Flutter shell.
//! - Drive one create/search/pump cycle against an in-memory store.
//!
//! Network seeding is not triggered, so output stays deterministic.

use std::process::ExitCode;
use std::time::Duration;
use todolist_core::{bootstrap, CoreConfig, ListIntent, TaskListPresenter};

const SEARCH_TIMEOUT: Duration = Duration::from_secs(5);

fn main() -> ExitCode {
    println!("todolist_core ping={}", todolist_core::ping());
    println!("todolist_core version={}", todolist_core::core_version());

    let repository = match bootstrap(&CoreConfig::default()) {
        Ok(repository) => repository,
        Err(err) => {
            eprintln!("bootstrap failed: {err}");
            return ExitCode::FAILURE;
        }
    };
    let mut presenter = TaskListPresenter::new(repository);

    for (title, details) in [
        ("Buy milk", Some("two litres")),
        ("Water plants", None),
        ("Call the bank", Some("ask about the card")),
    ] {
        presenter.handle(ListIntent::Add {
            title: title.to_string(),
            details: details.map(str::to_string),
        });
    }
    println!("tasks={}", presenter.rows().len());

    presenter.handle(ListIntent::Search("MILK".to_string()));
    if !presenter.repository_mut().wait_for_pending(SEARCH_TIMEOUT) {
        eprintln!("search did not finish in time");
        return ExitCode::FAILURE;
    }
    for row in presenter.rows() {
        println!("hit title={} created={}", row.title, row.created_label);
    }

    let errors = presenter.take_errors();
    for message in &errors {
        eprintln!("error: {message}");
    }
    if errors.is_empty() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
