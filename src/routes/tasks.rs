use crate::{
    auth::CurrentUser,
    error::AppError,
    models::{NewTask, Task, TaskPriority, TaskUpdate},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use sqlx::PgPool;
use uuid::Uuid;
use validator::Validate;

const TASK_COLUMNS: &str =
    "id, title, description, priority, due_date, completed, owner_id, created_at";

// Same body for "absent" and "not owned by the caller"; the two cases must be
// indistinguishable to the client.
const TASK_NOT_FOUND: &str = "Task not found";

/// Lists the authenticated user's tasks, newest-created first.
///
/// The secondary sort on id makes ordering deterministic among tasks created
/// within the same timestamp.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<PgPool>,
    user: CurrentUser,
) -> Result<impl Responder, AppError> {
    let tasks = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE owner_id = $1 ORDER BY created_at DESC, id DESC"
    ))
    .bind(user.id)
    .fetch_all(&**pool)
    .await?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "task": tasks
    })))
}

/// Creates a task owned by the authenticated user.
///
/// `priority` defaults to `Low`; `completed` has already been normalized to a
/// strict boolean during deserialization.
#[post("")]
pub async fn create_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    payload: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    let data = payload.into_inner();
    data.validate()?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "INSERT INTO tasks (id, title, description, priority, due_date, completed, owner_id)
         VALUES ($1, $2, $3, $4, $5, $6, $7)
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(Uuid::new_v4())
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.priority.unwrap_or(TaskPriority::Low))
    .bind(data.due_date)
    .bind(data.completed)
    .bind(user.id)
    .fetch_one(&**pool)
    .await?;

    Ok(HttpResponse::Created().json(json!({
        "success": true,
        "task": task
    })))
}

/// Fetches a single task. The query filters by `(id, owner_id)` atomically: a
/// task owned by someone else produces the same 404 as a missing one.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let task = sqlx::query_as::<_, Task>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id = $1 AND owner_id = $2"
    ))
    .bind(task_id.into_inner())
    .bind(user.id)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "task": task
    })))
}

/// Partially updates a task under the same `(id, owner_id)` filter.
///
/// Absent fields keep their stored values via COALESCE, which also makes the
/// operation idempotent: applying the same payload twice leaves the same row.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
    payload: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    let data = payload.into_inner();
    data.validate()?;

    let task = sqlx::query_as::<_, Task>(&format!(
        "UPDATE tasks
         SET title = COALESCE($3, title),
             description = COALESCE($4, description),
             priority = COALESCE($5, priority),
             due_date = COALESCE($6, due_date),
             completed = COALESCE($7, completed)
         WHERE id = $1 AND owner_id = $2
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(task_id.into_inner())
    .bind(user.id)
    .bind(&data.title)
    .bind(&data.description)
    .bind(data.priority)
    .bind(data.due_date)
    .bind(data.completed)
    .fetch_optional(&**pool)
    .await?
    .ok_or_else(|| AppError::NotFound(TASK_NOT_FOUND.into()))?;

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "task": task
    })))
}

/// Deletes a task under the same `(id, owner_id)` filter.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<PgPool>,
    user: CurrentUser,
    task_id: web::Path<Uuid>,
) -> Result<impl Responder, AppError> {
    let result = sqlx::query("DELETE FROM tasks WHERE id = $1 AND owner_id = $2")
        .bind(task_id.into_inner())
        .bind(user.id)
        .execute(&**pool)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound(TASK_NOT_FOUND.into()));
    }

    Ok(HttpResponse::Ok().json(json!({
        "success": true,
        "message": "Task deleted successfully"
    })))
}
