use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::task_dto::{CreateTaskPayload, TaskListQuery, TaskStats, UpdateTaskPayload};
use crate::error::{Error, Result};
use crate::models::task::{Task, TASK_PRIORITIES, TASK_STATUSES};

const TASK_COLUMNS: &str =
    "id, user_id, title, description, status, priority, tags, due_date, created_at, updated_at";

fn validate_status(status: &str) -> Result<()> {
    if TASK_STATUSES.contains(&status) {
        Ok(())
    } else {
        Err(Error::BadRequest(format!(
            "invalid status '{}', expected one of {:?}",
            status, TASK_STATUSES
        )))
    }
}

fn validate_priority(priority: &str) -> Result<()> {
    if TASK_PRIORITIES.contains(&priority) {
        Ok(())
    } else {
        Err(Error::BadRequest(format!(
            "invalid priority '{}', expected one of {:?}",
            priority, TASK_PRIORITIES
        )))
    }
}

#[derive(Clone)]
pub struct TaskService {
    pool: PgPool,
}

impl TaskService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_tasks(&self, user_id: Uuid, query: &TaskListQuery) -> Result<Vec<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks \
             WHERE user_id = $1 \
               AND ($2::text IS NULL OR status = $2) \
               AND ($3::text IS NULL OR priority = $3) \
               AND ($4::text IS NULL OR title ILIKE '%' || $4 || '%' \
                    OR description ILIKE '%' || $4 || '%') \
             ORDER BY created_at DESC"
        );
        let tasks = sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .bind(&query.status)
            .bind(&query.priority)
            .bind(&query.search)
            .fetch_all(&self.pool)
            .await?;
        Ok(tasks)
    }

    pub async fn get_task(&self, user_id: Uuid, task_id: Uuid) -> Result<Task> {
        let sql = format!("SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND user_id = $2");
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    pub async fn create_task(&self, user_id: Uuid, payload: &CreateTaskPayload) -> Result<Task> {
        let status = payload.status.as_deref().unwrap_or("todo");
        validate_status(status)?;
        let priority = payload.priority.as_deref().unwrap_or("medium");
        validate_priority(priority)?;

        let sql = format!(
            "INSERT INTO tasks (user_id, title, description, status, priority, tags, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(user_id)
            .bind(payload.title.trim())
            .bind(&payload.description)
            .bind(status)
            .bind(priority)
            .bind(payload.tags.clone().unwrap_or_default())
            .bind(payload.due_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    pub async fn update_task(
        &self,
        user_id: Uuid,
        task_id: Uuid,
        payload: &UpdateTaskPayload,
    ) -> Result<Task> {
        if let Some(status) = &payload.status {
            validate_status(status)?;
        }
        if let Some(priority) = &payload.priority {
            validate_priority(priority)?;
        }

        let sql = format!(
            "UPDATE tasks SET \
                 title = COALESCE($3, title), \
                 description = COALESCE($4, description), \
                 status = COALESCE($5, status), \
                 priority = COALESCE($6, priority), \
                 tags = COALESCE($7, tags), \
                 due_date = COALESCE($8, due_date), \
                 updated_at = NOW() \
             WHERE id = $1 AND user_id = $2 \
             RETURNING {TASK_COLUMNS}"
        );
        let task = sqlx::query_as::<_, Task>(&sql)
            .bind(task_id)
            .bind(user_id)
            .bind(&payload.title)
            .bind(&payload.description)
            .bind(&payload.status)
            .bind(&payload.priority)
            .bind(&payload.tags)
            .bind(payload.due_date)
            .fetch_one(&self.pool)
            .await?;
        Ok(task)
    }

    pub async fn delete_task(&self, user_id: Uuid, task_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND user_id = $2")
            .bind(task_id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(Error::NotFound("task not found".into()));
        }
        Ok(())
    }

    pub async fn task_stats(&self, user_id: Uuid) -> Result<TaskStats> {
        let row: (i64, i64, i64, i64) = sqlx::query_as(
            "SELECT \
                 COUNT(*) FILTER (WHERE status = 'todo'), \
                 COUNT(*) FILTER (WHERE status = 'in_progress'), \
                 COUNT(*) FILTER (WHERE status = 'done'), \
                 COUNT(*) \
             FROM tasks WHERE user_id = $1",
        )
        .bind(user_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(TaskStats {
            todo: row.0,
            in_progress: row.1,
            done: row.2,
            total: row.3,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_validation() {
        assert!(validate_status("todo").is_ok());
        assert!(validate_status("in_progress").is_ok());
        assert!(validate_status("done").is_ok());
        assert!(validate_status("archived").is_err());
    }

    #[test]
    fn priority_validation() {
        assert!(validate_priority("low").is_ok());
        assert!(validate_priority("urgent").is_err());
    }
}
