//! Persistence contract for users and tasks.
//!
//! Every component receives an `Arc<dyn Store>` at construction. Task mutations go
//! through [`TaskFilter`], which always pairs the task id with the owner's email so
//! that the match and the write happen in one atomic backend operation.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

use crate::models::{Task, TaskUpdate, User};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Failures reported by a storage backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A uniqueness constraint (user email) was violated.
    DuplicateKey,
    /// Any other backend failure.
    Backend(String),
}

impl fmt::Display for StoreError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            StoreError::DuplicateKey => write!(f, "duplicate key"),
            StoreError::Backend(msg) => write!(f, "storage backend error: {}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

/// Matches a single task only if it belongs to `owner_email`.
#[derive(Debug, Clone, Copy)]
pub struct TaskFilter<'a> {
    pub id: Uuid,
    pub owner_email: &'a str,
}

impl<'a> TaskFilter<'a> {
    pub fn new(id: Uuid, owner_email: &'a str) -> Self {
        Self { id, owner_email }
    }

    pub fn matches(&self, task: &Task) -> bool {
        task.id == self.id && task.owner_email == self.owner_email
    }
}

#[async_trait]
pub trait Store: Send + Sync {
    /// Short backend label reported by the health endpoint.
    fn backend(&self) -> &'static str;

    /// Inserts a user, failing with [`StoreError::DuplicateKey`] if the email is taken.
    async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Uuid, StoreError>;

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError>;

    async fn insert_task(&self, task: &Task) -> Result<Uuid, StoreError>;

    async fn find_tasks_by_owner(&self, owner_email: &str) -> Result<Vec<Task>, StoreError>;

    async fn find_one_matching(&self, filter: TaskFilter<'_>) -> Result<Option<Task>, StoreError>;

    /// Applies `update` to the task matched by `filter` and returns the matched count.
    /// Must be atomic with respect to other writers.
    async fn update_one_matching(
        &self,
        filter: TaskFilter<'_>,
        update: &TaskUpdate,
    ) -> Result<u64, StoreError>;

    /// Deletes the task matched by `filter` and returns the deleted count.
    async fn delete_one_matching(&self, filter: TaskFilter<'_>) -> Result<u64, StoreError>;
}
