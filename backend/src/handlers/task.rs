//! Task HTTP handlers

use axum::{extract::State, http::StatusCode, Json};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::handlers::queue_email;
use crate::middleware::CurrentUser;
use crate::services::task::{CreateTaskInput, TaskChange};
use crate::services::TaskService;
use crate::AppState;
use shared::models::{EmailJob, Task};

/// Task as returned by the API
#[derive(Debug, Serialize)]
pub struct TaskResponse {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    /// Team id
    pub team: i64,
    /// Username of the assignee
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl From<Task> for TaskResponse {
    fn from(task: Task) -> Self {
        Self {
            id: task.id,
            title: task.title,
            description: task.description,
            completed: task.completed,
            team: task.team_id,
            assigned_to: task.assigned_to_username,
            due_date: task.due_date,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub completed: bool,
}

#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub username: String,
}

/// Queue the assignment email for a task that just got a new assignee
async fn notify_assignee(state: &AppState, change: &TaskChange) {
    if let Some(assignee) = &change.new_assignee {
        let job = EmailJob::task_assigned(
            &assignee.username,
            &assignee.email,
            &change.task.title,
            &change.team.name,
        );
        queue_email(&state.queue, job).await;
    }
}

/// Create a task in one of the caller's teams
pub async fn create_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<CreateTaskInput>,
) -> Result<(StatusCode, Json<TaskResponse>), AppError> {
    let service = TaskService::new(state.db.clone());
    let change = service.create_task(&user, input).await?;

    notify_assignee(&state, &change).await;

    Ok((StatusCode::CREATED, Json(TaskResponse::from(change.task))))
}

/// Tasks assigned to the caller
pub async fn my_tasks(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<TaskResponse>>, AppError> {
    let service = TaskService::new(state.db.clone());
    let tasks = service.list_tasks_for_user(user.user_id).await?;

    Ok(Json(tasks.into_iter().map(TaskResponse::from).collect()))
}

/// Mark one of the caller's tasks complete or incomplete
pub async fn update_task_status(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(task_id): ApiPath<i64>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    let service = TaskService::new(state.db.clone());
    let task = service.update_status(&user, task_id, body.completed).await?;

    Ok(Json(TaskResponse::from(task)))
}

pub async fn task_details(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(task_id): ApiPath<i64>,
) -> Result<Json<TaskResponse>, AppError> {
    let service = TaskService::new(state.db.clone());
    let task = service.task_details(&user, task_id).await?;

    Ok(Json(TaskResponse::from(task)))
}

/// Reassign a task (team creator only)
pub async fn assign_task(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(task_id): ApiPath<i64>,
    ApiJson(body): ApiJson<AssignRequest>,
) -> Result<Json<TaskResponse>, AppError> {
    let service = TaskService::new(state.db.clone());
    let change = service.assign(&user, task_id, &body.username).await?;

    notify_assignee(&state, &change).await;

    Ok(Json(TaskResponse::from(change.task)))
}
