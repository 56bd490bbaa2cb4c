use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::repo_types::UserId;
use crate::tasks::repo_types::{CompanyStat, DateRange, Task, TaskDraft, TaskPatch};

/// Persistence seam for tasks. Every method is scoped by owner.
#[async_trait]
pub trait TaskStore: Send + Sync {
    async fn insert(&self, owner: UserId, draft: &TaskDraft) -> anyhow::Result<Task>;

    /// Date ascending, ties by creation time.
    async fn list(&self, owner: UserId, range: Option<DateRange>) -> anyhow::Result<Vec<Task>>;

    /// `None` when no task with that id belongs to `owner`.
    async fn update(&self, owner: UserId, id: Uuid, patch: &TaskPatch) -> anyhow::Result<Option<Task>>;

    /// `false` when no task with that id belongs to `owner`.
    async fn delete(&self, owner: UserId, id: Uuid) -> anyhow::Result<bool>;

    /// Case-insensitive substring match on company name, newest first.
    async fn search_company(&self, owner: UserId, needle: &str, limit: i64) -> anyhow::Result<Vec<Task>>;

    /// Grouped by exact company name, ordered byte-wise by name.
    async fn company_summary(&self, owner: UserId) -> anyhow::Result<Vec<CompanyStat>>;

    /// Exact company name match, newest first.
    async fn by_company(&self, owner: UserId, company_name: &str) -> anyhow::Result<Vec<Task>>;
}

const TASK_COLUMNS: &str =
    "id, user_id, date, company_name, description, is_completed, created_at, updated_at";

#[derive(Clone)]
pub struct PgTaskStore {
    db: PgPool,
}

impl PgTaskStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TaskStore for PgTaskStore {
    async fn insert(&self, owner: UserId, draft: &TaskDraft) -> anyhow::Result<Task> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            INSERT INTO tasks (user_id, date, company_name, description, is_completed)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(owner)
        .bind(draft.date)
        .bind(&draft.company_name)
        .bind(&draft.description)
        .bind(draft.is_completed)
        .fetch_one(&self.db)
        .await
        .context("insert task")?;
        Ok(task)
    }

    async fn list(&self, owner: UserId, range: Option<DateRange>) -> anyhow::Result<Vec<Task>> {
        let rows = match range {
            Some(range) => sqlx::query_as::<_, Task>(&format!(
                r#"
                SELECT {TASK_COLUMNS}
                FROM tasks
                WHERE user_id = $1 AND date BETWEEN $2 AND $3
                ORDER BY date ASC, created_at ASC
                "#
            ))
            .bind(owner)
            .bind(range.first)
            .bind(range.last)
            .fetch_all(&self.db)
            .await,
            None => sqlx::query_as::<_, Task>(&format!(
                r#"
                SELECT {TASK_COLUMNS}
                FROM tasks
                WHERE user_id = $1
                ORDER BY date ASC, created_at ASC
                "#
            ))
            .bind(owner)
            .fetch_all(&self.db)
            .await,
        }
        .context("list tasks")?;
        Ok(rows)
    }

    async fn update(&self, owner: UserId, id: Uuid, patch: &TaskPatch) -> anyhow::Result<Option<Task>> {
        let task = sqlx::query_as::<_, Task>(&format!(
            r#"
            UPDATE tasks
            SET date = COALESCE($3, date),
                company_name = COALESCE($4, company_name),
                description = COALESCE($5, description),
                is_completed = COALESCE($6, is_completed),
                updated_at = now()
            WHERE id = $1 AND user_id = $2
            RETURNING {TASK_COLUMNS}
            "#
        ))
        .bind(id)
        .bind(owner)
        .bind(patch.date)
        .bind(patch.company_name.as_deref())
        .bind(patch.description.as_deref())
        .bind(patch.is_completed)
        .fetch_optional(&self.db)
        .await
        .context("update task")?;
        Ok(task)
    }

    async fn delete(&self, owner: UserId, id: Uuid) -> anyhow::Result<bool> {
        let result = sqlx::query(
            r#"
            DELETE FROM tasks
            WHERE id = $1 AND user_id = $2
            "#,
        )
        .bind(id)
        .bind(owner)
        .execute(&self.db)
        .await
        .context("delete task")?;
        Ok(result.rows_affected() > 0)
    }

    async fn search_company(&self, owner: UserId, needle: &str, limit: i64) -> anyhow::Result<Vec<Task>> {
        // strpos keeps LIKE wildcards in the needle literal
        let rows = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_id = $1 AND strpos(lower(company_name), lower($2)) > 0
            ORDER BY date DESC, created_at DESC
            LIMIT $3
            "#
        ))
        .bind(owner)
        .bind(needle)
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .context("search tasks by company")?;
        Ok(rows)
    }

    async fn company_summary(&self, owner: UserId) -> anyhow::Result<Vec<CompanyStat>> {
        let rows = sqlx::query_as::<_, CompanyStat>(
            r#"
            SELECT company_name, COUNT(*) AS visit_count, MAX(date) AS last_visit
            FROM tasks
            WHERE user_id = $1
            GROUP BY company_name
            ORDER BY company_name COLLATE "C" ASC
            "#,
        )
        .bind(owner)
        .fetch_all(&self.db)
        .await
        .context("aggregate company visits")?;
        Ok(rows)
    }

    async fn by_company(&self, owner: UserId, company_name: &str) -> anyhow::Result<Vec<Task>> {
        let rows = sqlx::query_as::<_, Task>(&format!(
            r#"
            SELECT {TASK_COLUMNS}
            FROM tasks
            WHERE user_id = $1 AND company_name = $2
            ORDER BY date DESC, created_at DESC
            "#
        ))
        .bind(owner)
        .bind(company_name)
        .fetch_all(&self.db)
        .await
        .context("list visits for company")?;
        Ok(rows)
    }
}
