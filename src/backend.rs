//! Sources of truth a board can talk to.

use async_trait::async_trait;
use log::debug;

use crate::client::ApiClient;
use crate::error::AppError;
use crate::models::{Task, TaskPatch};
use crate::session::Session;
use crate::store::{Persistence, StoragePersistence};

/// The operations a board awaits before touching its store.
///
/// A call that returns `Err` must not have changed anything the board relies on.
#[async_trait]
pub trait TaskBackend: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<Task>, AppError>;
    async fn create(&self, title: &str) -> Result<Task, AppError>;
    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<(), AppError>;
    async fn delete(&self, id: &str) -> Result<(), AppError>;
}

/// Tasks kept only on this machine.
///
/// Ids are generated here; the store's own snapshot writes do the persisting.
pub struct LocalBackend {
    snapshot: StoragePersistence,
}

impl LocalBackend {
    pub fn new(snapshot: StoragePersistence) -> Self {
        Self { snapshot }
    }
}

#[async_trait]
impl TaskBackend for LocalBackend {
    async fn fetch_all(&self) -> Result<Vec<Task>, AppError> {
        self.snapshot.load()
    }

    async fn create(&self, title: &str) -> Result<Task, AppError> {
        Ok(Task::new(title))
    }

    async fn update(&self, _id: &str, _patch: &TaskPatch) -> Result<(), AppError> {
        Ok(())
    }

    async fn delete(&self, _id: &str) -> Result<(), AppError> {
        Ok(())
    }
}

/// Tasks kept by the REST backend, scoped to the stored session.
pub struct RemoteBackend {
    client: ApiClient,
    session: Session,
}

impl RemoteBackend {
    pub fn new(client: ApiClient, session: Session) -> Self {
        Self { client, session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }
}

#[async_trait]
impl TaskBackend for RemoteBackend {
    async fn fetch_all(&self) -> Result<Vec<Task>, AppError> {
        let token = self.session.require_token()?;
        let tasks = self.client.list_tasks(&token).await?;
        debug!("Fetched {} tasks", tasks.len());
        Ok(tasks)
    }

    async fn create(&self, title: &str) -> Result<Task, AppError> {
        let token = self.session.require_token()?;
        self.client.create_task(&token, title).await
    }

    async fn update(&self, id: &str, patch: &TaskPatch) -> Result<(), AppError> {
        let token = self.session.require_token()?;
        self.client.update_task(&token, id, patch).await
    }

    async fn delete(&self, id: &str) -> Result<(), AppError> {
        let token = self.session.require_token()?;
        self.client.delete_task(&token, id).await
    }
}
