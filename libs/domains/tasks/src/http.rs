use async_trait::async_trait;
use core_config::ApiConfig;
use domain_users::SessionHandle;
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::error::{TaskError, TaskResult};
use crate::models::{CreateTask, Task, TaskId, UpdateTask};
use crate::remote::TaskRemote;

// Task API request/response structures

#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct ApiFailure {
    message: Option<String>,
}

/// [`TaskRemote`] over the REST task API.
///
/// Every request carries the bearer token of the shared [`SessionHandle`]; without an
/// active session calls fail with [`TaskError::Unauthorized`] before any I/O.
pub struct HttpTaskRemote {
    client: Client,
    config: ApiConfig,
    session: SessionHandle,
}

impl HttpTaskRemote {
    pub fn new(config: ApiConfig, session: SessionHandle) -> TaskResult<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            client,
            config,
            session,
        })
    }

    /// Attach credentials, send, and turn non-2xx statuses into errors
    async fn execute(&self, request: RequestBuilder, id: Option<&TaskId>) -> TaskResult<Response> {
        let bearer = self.session.bearer().ok_or(TaskError::Unauthorized)?;
        let response = request.header(AUTHORIZATION, bearer).send().await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        debug!(status = %status, "Task API rejected request");
        Err(failure(status, &body, id))
    }

    async fn execute_json<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        id: Option<&TaskId>,
    ) -> TaskResult<T> {
        let response = self.execute(request, id).await?;
        let envelope: ApiEnvelope<T> = response.json().await?;
        Ok(envelope.data)
    }
}

fn failure(status: StatusCode, body: &str, id: Option<&TaskId>) -> TaskError {
    if status == StatusCode::UNAUTHORIZED {
        return TaskError::Unauthorized;
    }
    if let (StatusCode::NOT_FOUND, Some(id)) = (status, id) {
        return TaskError::NotFound(id.clone());
    }

    let message = serde_json::from_str::<ApiFailure>(body)
        .ok()
        .and_then(|failure| failure.message)
        .unwrap_or_else(|| {
            if body.trim().is_empty() {
                status.canonical_reason().unwrap_or("unknown error").to_string()
            } else {
                body.to_string()
            }
        });

    TaskError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl TaskRemote for HttpTaskRemote {
    #[instrument(skip(self))]
    async fn fetch_all(&self) -> TaskResult<Vec<Task>> {
        let request = self.client.get(&self.config.tasks_url);
        let tasks: Vec<Task> = self.execute_json(request, None).await?;

        debug!(count = tasks.len(), "Fetched tasks");
        Ok(tasks)
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn fetch_one(&self, id: &TaskId) -> TaskResult<Task> {
        let request = self.client.get(self.config.task_url(id.as_str()));
        self.execute_json(request, Some(id)).await
    }

    #[instrument(skip(self, input), fields(task_title = %input.title))]
    async fn create(&self, input: CreateTask) -> TaskResult<Task> {
        let request = self.client.post(&self.config.tasks_url).json(&input);
        let task: Task = self.execute_json(request, None).await?;

        info!(task_id = %task.id, "Created task");
        Ok(task)
    }

    #[instrument(skip(self, input), fields(task_id = %id))]
    async fn update(&self, id: &TaskId, input: UpdateTask) -> TaskResult<Task> {
        let request = self
            .client
            .put(self.config.task_url(id.as_str()))
            .json(&input);
        let task: Task = self.execute_json(request, Some(id)).await?;

        info!(task_id = %id, "Updated task");
        Ok(task)
    }

    #[instrument(skip(self), fields(task_id = %id))]
    async fn delete(&self, id: &TaskId) -> TaskResult<()> {
        let request = self.client.delete(self.config.task_url(id.as_str()));
        self.execute(request, Some(id)).await?;

        info!(task_id = %id, "Deleted task");
        Ok(())
    }
}
