use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Body of `POST /todos`. The store assigns the id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskDraft {
    pub text: String,
    pub completed: bool,
    pub order: i64,
}

impl TaskDraft {
    /// Builds a draft for a new, incomplete task. Whitespace-only text is
    /// rejected; accepted text is sent as typed.
    pub fn new(text: impl Into<String>, order: i64) -> Result<Self, ValidationError> {
        let text = text.into();
        ensure_text(&text)?;
        Ok(Self {
            text,
            completed: false,
            order,
        })
    }
}

/// Body of `PATCH /todos/{id}`. Absent fields are left untouched by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl TaskPatch {
    pub fn completed(completed: bool) -> Self {
        Self {
            completed: Some(completed),
            ..Self::default()
        }
    }

    pub fn text(text: impl Into<String>) -> Result<Self, ValidationError> {
        let text = text.into();
        ensure_text(&text)?;
        Ok(Self {
            text: Some(text),
            ..Self::default()
        })
    }
}

fn ensure_text(text: &str) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    Ok(())
}
