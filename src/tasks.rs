//! Ownership-scoped access to tasks.
//!
//! Every read and write carries the caller's email into the storage query itself.
//! A task that does not exist and a task that belongs to someone else produce the
//! same `NotFound` error, so callers cannot probe for other users' ids.

use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::error::AppError;
use crate::models::{NewTask, Task, TaskUpdate, User};
use crate::store::{Store, TaskFilter};

#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Creates a task owned by `owner` and returns its id.
    pub async fn create(&self, owner: &User, input: NewTask) -> Result<Uuid, AppError> {
        input.validate()?;
        let task = Task::new(input, &owner.email);
        let id = self.store.insert_task(&task).await?;
        log::debug!("Created task {}", id);
        Ok(id)
    }

    /// All tasks owned by `owner`, in storage order.
    pub async fn list_owned(&self, owner: &User) -> Result<Vec<Task>, AppError> {
        Ok(self.store.find_tasks_by_owner(&owner.email).await?)
    }

    pub async fn get_owned(&self, owner: &User, id: Uuid) -> Result<Task, AppError> {
        self.store
            .find_one_matching(TaskFilter::new(id, &owner.email))
            .await?
            .ok_or_else(AppError::task_not_found)
    }

    /// Overwrites the supplied fields of an owned task.
    pub async fn update(&self, owner: &User, id: Uuid, update: TaskUpdate) -> Result<(), AppError> {
        if update.is_empty() {
            return Err(AppError::ValidationError(
                "No data provided to update".into(),
            ));
        }
        update.validate()?;

        let matched = self
            .store
            .update_one_matching(TaskFilter::new(id, &owner.email), &update)
            .await?;
        if matched == 0 {
            return Err(AppError::task_not_found());
        }
        Ok(())
    }

    pub async fn delete(&self, owner: &User, id: Uuid) -> Result<(), AppError> {
        let deleted = self
            .store
            .delete_one_matching(TaskFilter::new(id, &owner.email))
            .await?;
        if deleted == 0 {
            return Err(AppError::task_not_found());
        }
        Ok(())
    }
}
