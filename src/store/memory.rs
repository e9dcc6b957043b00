use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{Store, StoreError, TaskFilter};
use crate::models::{Task, TaskUpdate, User};

/// Process-local store used in tests and when no `DATABASE_URL` is configured.
///
/// Users are keyed by email, which gives uniqueness for free. Filtered writes hold
/// the write lock for both the match and the mutation.
#[derive(Debug, Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, User>>,
    tasks: RwLock<HashMap<Uuid, Task>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    fn backend(&self) -> &'static str {
        "memory"
    }

    async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Uuid, StoreError> {
        let mut users = self.users.write().await;
        if users.contains_key(email) {
            return Err(StoreError::DuplicateKey);
        }
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at,
        };
        let id = user.id;
        users.insert(user.email.clone(), user);
        Ok(id)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.read().await.get(email).cloned())
    }

    async fn insert_task(&self, task: &Task) -> Result<Uuid, StoreError> {
        let mut tasks = self.tasks.write().await;
        if tasks.contains_key(&task.id) {
            return Err(StoreError::DuplicateKey);
        }
        tasks.insert(task.id, task.clone());
        Ok(task.id)
    }

    async fn find_tasks_by_owner(&self, owner_email: &str) -> Result<Vec<Task>, StoreError> {
        Ok(self
            .tasks
            .read()
            .await
            .values()
            .filter(|task| task.owner_email == owner_email)
            .cloned()
            .collect())
    }

    async fn find_one_matching(&self, filter: TaskFilter<'_>) -> Result<Option<Task>, StoreError> {
        Ok(self
            .tasks
            .read()
            .await
            .get(&filter.id)
            .filter(|task| filter.matches(task))
            .cloned())
    }

    async fn update_one_matching(
        &self,
        filter: TaskFilter<'_>,
        update: &TaskUpdate,
    ) -> Result<u64, StoreError> {
        let mut tasks = self.tasks.write().await;
        match tasks.get_mut(&filter.id) {
            Some(task) if filter.matches(task) => {
                update.apply_to(task);
                Ok(1)
            }
            _ => Ok(0),
        }
    }

    async fn delete_one_matching(&self, filter: TaskFilter<'_>) -> Result<u64, StoreError> {
        let mut tasks = self.tasks.write().await;
        let owned = tasks.get(&filter.id).is_some_and(|task| filter.matches(task));
        if owned {
            tasks.remove(&filter.id);
            Ok(1)
        } else {
            Ok(0)
        }
    }
}
