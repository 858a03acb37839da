//! Remote todo source used for one-time seeding.
//!
//! # Responsibility
//! - Define the fetch contract the repository depends on.
//! - Classify failures into endpoint, empty body, decode and transport.
//!
//! # Invariants
//! - One request, one response, one decode pass; no retry or caching.
//! - Implementations block the calling thread; callers run them off the
//!   foreground thread.

mod http;

pub use http::{decode_todos, HttpTodoSource};

use crate::model::remote_item::RemoteTodoItem;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Duration;

/// Endpoint serving the seed list.
pub const DEFAULT_TODOS_ENDPOINT: &str = "https://dummyjson.com/todos";

pub type RemoteResult<T> = Result<T, RemoteError>;

/// Failure while fetching remote todos.
#[derive(Debug)]
pub enum RemoteError {
    /// The endpoint address could not be parsed.
    InvalidEndpoint(String),
    /// The response carried no usable payload.
    EmptyResponse,
    /// The payload does not match the expected shape.
    DecodeFailure(serde_json::Error),
    /// Network-level failure: DNS, connect, timeout, non-success status.
    TransportFailure(Box<dyn Error + Send + Sync>),
}

impl Display for RemoteError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidEndpoint(endpoint) => write!(f, "invalid todos endpoint `{endpoint}`"),
            Self::EmptyResponse => write!(f, "todos endpoint returned no data"),
            Self::DecodeFailure(err) => write!(f, "failed to decode todos: {err}"),
            Self::TransportFailure(err) => write!(f, "network request failed: {err}"),
        }
    }
}

impl Error for RemoteError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::DecodeFailure(err) => Some(err),
            Self::TransportFailure(err) => Some(err.as_ref()),
            Self::InvalidEndpoint(_) | Self::EmptyResponse => None,
        }
    }
}

/// Settings for [`HttpTodoSource`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteConfig {
    pub endpoint: String,
    /// Whole-request timeout; `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_TODOS_ENDPOINT.to_string(),
            timeout: None,
        }
    }
}

/// Source of remote todo items.
pub trait RemoteTodoSource: Send + Sync {
    fn fetch_todos(&self) -> RemoteResult<Vec<RemoteTodoItem>>;
}
