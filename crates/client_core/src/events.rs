//! Events published by the list controller for presentation.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListAction {
    Load,
    LoadDetail,
    Add,
    Toggle,
    Edit,
    Delete,
    ClearCompleted,
    Reorder,
}

impl ListAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ListAction::Load => "load",
            ListAction::LoadDetail => "load_detail",
            ListAction::Add => "add",
            ListAction::Toggle => "toggle",
            ListAction::Edit => "edit",
            ListAction::Delete => "delete",
            ListAction::ClearCompleted => "clear_completed",
            ListAction::Reorder => "reorder",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            ListAction::Load => "Failed to load todos",
            ListAction::LoadDetail => "Failed to load todo",
            ListAction::Add => "Failed to add todo",
            ListAction::Toggle | ListAction::Edit => "Failed to update todo",
            ListAction::Delete => "Failed to delete todo",
            ListAction::ClearCompleted => "Failed to clear completed todos",
            ListAction::Reorder => "Failed to reorder todos",
        }
    }
}

impl fmt::Display for ListAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Transient message for presentation. Not part of the held state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub action: ListAction,
    pub message: String,
}

impl Notice {
    pub fn success(action: ListAction, message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            action,
            message: message.into(),
        }
    }

    pub fn failure(action: ListAction) -> Self {
        Self {
            level: NoticeLevel::Error,
            action,
            message: action.failure_message().to_string(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListEvent {
    /// The held sequence, filter, pending input or overlay changed.
    Changed,
    Notice(Notice),
}
