use std::fmt;

use shared::error::ValidationError;
use thiserror::Error;

/// Remote store exchange that failed. Display names match the store contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StoreOperation {
    Fetch,
    Create,
    Update,
    Delete,
    Reorder,
}

impl StoreOperation {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreOperation::Fetch => "fetch",
            StoreOperation::Create => "create",
            StoreOperation::Update => "update",
            StoreOperation::Delete => "delete",
            StoreOperation::Reorder => "reorder",
        }
    }
}

impl fmt::Display for StoreOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to {operation} todos: server responded with status {status}")]
    Status {
        operation: StoreOperation,
        status: u16,
    },
    #[error("failed to {operation} todos: {source}")]
    Transport {
        operation: StoreOperation,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to {operation} todos: malformed response body: {source}")]
    Decode {
        operation: StoreOperation,
        #[source]
        source: reqwest::Error,
    },
}

impl StoreError {
    pub fn operation(&self) -> StoreOperation {
        match self {
            StoreError::Status { operation, .. }
            | StoreError::Transport { operation, .. }
            | StoreError::Decode { operation, .. } => *operation,
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreUrlError {
    #[error("invalid store url '{url}': {source}")]
    Parse {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("store url '{0}' cannot be used as a base for /todos")]
    NotABase(String),
}

#[derive(Debug, Error)]
pub enum ListError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("index {index} is outside the visible list of {len} tasks")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{failed} of {total} deletions failed; no tasks were cleared")]
    ClearCompleted { failed: usize, total: usize },
}
