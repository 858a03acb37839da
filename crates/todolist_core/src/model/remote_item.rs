//! Remote todo payload shape.
//!
//! Items are merge input only and are never persisted as-is.

use serde::Deserialize;

/// One todo as served by the seeding endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RemoteTodoItem {
    #[serde(rename = "id")]
    pub external_id: i64,
    #[serde(rename = "todo")]
    pub text: String,
    pub completed: bool,
    #[serde(rename = "userId")]
    pub owner_id: i64,
}

/// Top-level response envelope; paging fields are ignored.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct RemoteTodoEnvelope {
    pub todos: Vec<RemoteTodoItem>,
}
