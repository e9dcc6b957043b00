use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{NewTask, TaskUpdate},
    state::AppState,
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use uuid::Uuid;

/// Ids that do not parse cannot match any task, so they get the same 404.
fn parse_task_id(raw: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(raw).map_err(|_| AppError::task_not_found())
}

/// Retrieves the tasks owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: JSON array of `Task` objects, in no particular order.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn list_tasks(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let tasks = state.tasks.list_owned(&user.0).await?;
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task for the authenticated user.
///
/// ## Request Body:
/// - `title`: required, non-blank, at most 200 characters.
/// - `description` (optional): at most 1000 characters.
/// - `completed` (optional): defaults to `false`.
///
/// ## Responses:
/// - `201 Created`: `{ "id": ..., "message": "Task created" }`.
/// - `400 Bad Request`: invalid body.
/// - `401 Unauthorized`: missing or invalid token.
#[post("")]
pub async fn create_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_data: web::Json<NewTask>,
) -> Result<impl Responder, AppError> {
    let id = state.tasks.create(&user.0, task_data.into_inner()).await?;
    Ok(HttpResponse::Created().json(json!({ "id": id, "message": "Task created" })))
}

/// Retrieves one task owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `404 Not Found`: no such task, or it belongs to someone else.
#[get("/{id}")]
pub async fn get_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&task_id)?;
    let task = state.tasks.get_owned(&user.0, id).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Partially updates a task owned by the authenticated user.
///
/// Only fields present and non-null in the body are changed.
///
/// ## Responses:
/// - `200 OK`: `{ "message": "Task updated successfully" }`.
/// - `400 Bad Request`: no fields supplied, or a supplied field is invalid.
/// - `404 Not Found`: no such task, or it belongs to someone else.
#[put("/{id}")]
pub async fn update_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
    task_data: web::Json<TaskUpdate>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&task_id)?;
    state
        .tasks
        .update(&user.0, id, task_data.into_inner())
        .await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Task updated successfully" })))
}

/// Deletes a task owned by the authenticated user.
///
/// ## Responses:
/// - `200 OK`: `{ "message": "Task deleted successfully" }`.
/// - `404 Not Found`: no such task, or it belongs to someone else.
#[delete("/{id}")]
pub async fn delete_task(
    state: web::Data<AppState>,
    user: AuthenticatedUser,
    task_id: web::Path<String>,
) -> Result<impl Responder, AppError> {
    let id = parse_task_id(&task_id)?;
    state.tasks.delete(&user.0, id).await?;
    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted successfully" })))
}
