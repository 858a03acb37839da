//! One-way seeding of local tasks from the remote todo source.
//!
//! # Responsibility
//! - Merge remote items into the store keyed by exact title match.
//!
//! # Invariants
//! - Matching by title means first write wins: an existing task is never
//!   modified by a remote item with the same title.
//! - A batch either commits entirely or leaves the store untouched.

mod merge;

pub use merge::{merge_remote_todos, seed_from_remote, MergeError, MergeReport};
