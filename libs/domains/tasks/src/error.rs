use thiserror::Error;

use crate::models::TaskId;

/// Failures reported by the remote task service and by input parsing
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("Task not found: {0}")]
    NotFound(TaskId),

    #[error("Invalid input: {0}")]
    Validation(String),

    #[error("Not authenticated")]
    Unauthorized,

    #[error("Task API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Invalid response: {0}")]
    Decode(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

pub type TaskResult<T> = Result<T, TaskError>;

impl From<reqwest::Error> for TaskError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            TaskError::Decode(err.to_string())
        } else {
            TaskError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for TaskError {
    fn from(err: serde_json::Error) -> Self {
        TaskError::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for TaskError {
    fn from(err: validator::ValidationErrors) -> Self {
        TaskError::Validation(err.to_string())
    }
}

/// Value held in the task store's error slot.
///
/// Each variant maps to one user-visible message; the remote failure detail is kept
/// for logs and optional display but never parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("Failed to fetch tasks. Make sure the task service is reachable.")]
    Fetch { detail: String },

    #[error("Failed to add task. Please try again.")]
    Create { detail: String },

    #[error("Failed to update task. Please try again.")]
    Update { detail: String },

    #[error("Failed to delete task. Please try again.")]
    Delete { detail: String },
}

impl StoreError {
    pub fn fetch(err: &TaskError) -> Self {
        StoreError::Fetch {
            detail: err.to_string(),
        }
    }

    pub fn create(err: &TaskError) -> Self {
        StoreError::Create {
            detail: err.to_string(),
        }
    }

    pub fn update(err: &TaskError) -> Self {
        StoreError::Update {
            detail: err.to_string(),
        }
    }

    pub fn delete(err: &TaskError) -> Self {
        StoreError::Delete {
            detail: err.to_string(),
        }
    }

    /// Underlying failure detail from the remote call
    pub fn detail(&self) -> &str {
        match self {
            StoreError::Fetch { detail }
            | StoreError::Create { detail }
            | StoreError::Update { detail }
            | StoreError::Delete { detail } => detail,
        }
    }
}
