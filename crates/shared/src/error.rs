use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("task text must not be empty")]
    EmptyText,
    #[error("unknown filter '{0}' (expected all, active or completed)")]
    UnknownFilter(String),
}
