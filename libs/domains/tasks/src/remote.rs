use async_trait::async_trait;

use crate::error::TaskResult;
use crate::models::{CreateTask, Task, TaskId, UpdateTask};

/// Remote source of truth for the signed-in user's tasks.
///
/// Implementations attach credentials themselves; callers only see task records
/// or a [`TaskError`](crate::TaskError).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TaskRemote: Send + Sync {
    /// Fetch every task, in the order the server returns them
    async fn fetch_all(&self) -> TaskResult<Vec<Task>>;

    /// Fetch a single task
    async fn fetch_one(&self, id: &TaskId) -> TaskResult<Task>;

    /// Create a task; the returned record carries the server-assigned id
    async fn create(&self, input: CreateTask) -> TaskResult<Task>;

    /// Apply a partial update; the returned record reflects all current fields
    async fn update(&self, id: &TaskId, input: UpdateTask) -> TaskResult<Task>;

    /// Delete a task
    async fn delete(&self, id: &TaskId) -> TaskResult<()>;
}
