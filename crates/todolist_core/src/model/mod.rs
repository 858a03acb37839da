//! Domain model for the to-do list.
//!
//! # Responsibility
//! - Define the canonical task record shared by store, repository and
//!   presenters.
//! - Define the transient remote todo shape used as merge input.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is a hard delete; there are no tombstones.

pub mod remote_item;
pub mod task;
