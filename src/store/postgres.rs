use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions};
use uuid::Uuid;

use super::{Store, StoreError, TaskFilter};
use crate::models::{Task, TaskUpdate, User};

const TASK_COLUMNS: &str = "id, title, description, completed, owner_email, created_at";

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;
        Ok(Self::new(pool))
    }

    /// Applies pending migrations from `migrations/`.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(format!("migration failed: {}", e)))
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(error: sqlx::Error) -> StoreError {
        match &error {
            sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::DuplicateKey,
            _ => StoreError::Backend(error.to_string()),
        }
    }
}

#[async_trait]
impl Store for PgStore {
    fn backend(&self) -> &'static str {
        "postgres"
    }

    async fn insert_user(
        &self,
        email: &str,
        password_hash: &str,
        created_at: DateTime<Utc>,
    ) -> Result<Uuid, StoreError> {
        let (id,) = sqlx::query_as::<_, (Uuid,)>(
            "INSERT INTO users (id, email, password_hash, created_at)
             VALUES ($1, $2, $3, $4)
             RETURNING id",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(password_hash)
        .bind(created_at)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn find_user_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let user = sqlx::query_as::<_, User>(
            "SELECT id, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    async fn insert_task(&self, task: &Task) -> Result<Uuid, StoreError> {
        sqlx::query(
            "INSERT INTO tasks (id, title, description, completed, owner_email, created_at)
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(task.id)
        .bind(&task.title)
        .bind(&task.description)
        .bind(task.completed)
        .bind(&task.owner_email)
        .bind(task.created_at)
        .execute(&self.pool)
        .await?;
        Ok(task.id)
    }

    async fn find_tasks_by_owner(&self, owner_email: &str) -> Result<Vec<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE owner_email = $1 ORDER BY created_at DESC",
            TASK_COLUMNS
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(owner_email)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    async fn find_one_matching(&self, filter: TaskFilter<'_>) -> Result<Option<Task>, StoreError> {
        let sql = format!(
            "SELECT {} FROM tasks WHERE id = $1 AND owner_email = $2",
            TASK_COLUMNS
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(filter.id)
            .bind(filter.owner_email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(task)
    }

    async fn update_one_matching(
        &self,
        filter: TaskFilter<'_>,
        update: &TaskUpdate,
    ) -> Result<u64, StoreError> {
        // One statement: the ownership predicate and the write cannot be separated.
        let result = sqlx::query(
            "UPDATE tasks
             SET title = COALESCE($3, title),
                 description = COALESCE($4, description),
                 completed = COALESCE($5, completed)
             WHERE id = $1 AND owner_email = $2",
        )
        .bind(filter.id)
        .bind(filter.owner_email)
        .bind(&update.title)
        .bind(&update.description)
        .bind(update.completed)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected())
    }

    async fn delete_one_matching(&self, filter: TaskFilter<'_>) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_email = $2")
            .bind(filter.id)
            .bind(filter.owner_email)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }
}
