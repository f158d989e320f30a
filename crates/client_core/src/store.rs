//! Request layer for the remote `/todos` collection.

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use shared::{
    domain::{Task, TaskId},
    protocol::{TaskDraft, TaskPatch},
};
use tracing::{debug, warn};
use url::Url;

use crate::error::{StoreError, StoreOperation, StoreUrlError};

pub const DEFAULT_STORE_URL: &str = "http://localhost:3001";

/// One request/response exchange per call. Implementations hold no task state.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Task>, StoreError>;
    async fn create(&self, draft: &TaskDraft) -> Result<Task, StoreError>;
    async fn patch(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, StoreError>;
    async fn delete(&self, id: &TaskId) -> Result<(), StoreError>;
    async fn replace_order(&self, tasks: &[Task]) -> Result<Vec<Task>, StoreError>;
}

pub struct HttpTaskStore {
    http: Client,
    base_url: Url,
}

impl HttpTaskStore {
    pub fn new(base_url: &str) -> Result<Self, StoreUrlError> {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(http: Client, base_url: &str) -> Result<Self, StoreUrlError> {
        let base_url = Url::parse(base_url.trim()).map_err(|source| StoreUrlError::Parse {
            url: base_url.to_string(),
            source,
        })?;
        if base_url.cannot_be_a_base() {
            return Err(StoreUrlError::NotABase(base_url.to_string()));
        }
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn todos_url(&self, id: Option<&TaskId>) -> Url {
        let mut url = self.base_url.clone();
        // Checked in the constructor.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push("todos");
            if let Some(id) = id {
                segments.push(id.as_str());
            }
        }
        url
    }

    async fn send(
        &self,
        operation: StoreOperation,
        request: RequestBuilder,
    ) -> Result<Response, StoreError> {
        let response = request.send().await.map_err(|source| {
            warn!(%operation, error = %source, "store request failed to complete");
            StoreError::Transport { operation, source }
        })?;

        let status = response.status();
        if !status.is_success() {
            warn!(%operation, status = status.as_u16(), "store rejected request");
            return Err(StoreError::Status {
                operation,
                status: status.as_u16(),
            });
        }

        debug!(%operation, status = status.as_u16(), "store request succeeded");
        Ok(response)
    }

    async fn decode<T: DeserializeOwned>(
        operation: StoreOperation,
        response: Response,
    ) -> Result<T, StoreError> {
        response.json::<T>().await.map_err(|source| {
            warn!(%operation, error = %source, "store response body did not decode");
            StoreError::Decode { operation, source }
        })
    }
}

#[async_trait]
impl TaskStore for HttpTaskStore {
    async fn list(&self) -> Result<Vec<Task>, StoreError> {
        let operation = StoreOperation::Fetch;
        let response = self
            .send(operation, self.http.get(self.todos_url(None)))
            .await?;
        Self::decode(operation, response).await
    }

    async fn create(&self, draft: &TaskDraft) -> Result<Task, StoreError> {
        let operation = StoreOperation::Create;
        let response = self
            .send(operation, self.http.post(self.todos_url(None)).json(draft))
            .await?;
        Self::decode(operation, response).await
    }

    async fn patch(&self, id: &TaskId, patch: &TaskPatch) -> Result<Task, StoreError> {
        let operation = StoreOperation::Update;
        let response = self
            .send(operation, self.http.patch(self.todos_url(Some(id))).json(patch))
            .await?;
        Self::decode(operation, response).await
    }

    async fn delete(&self, id: &TaskId) -> Result<(), StoreError> {
        self.send(StoreOperation::Delete, self.http.delete(self.todos_url(Some(id))))
            .await?;
        Ok(())
    }

    async fn replace_order(&self, tasks: &[Task]) -> Result<Vec<Task>, StoreError> {
        let operation = StoreOperation::Reorder;
        let response = self
            .send(operation, self.http.put(self.todos_url(None)).json(tasks))
            .await?;
        Self::decode(operation, response).await
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
