//! Task service: creation, assignment and status updates

use chrono::NaiveDate;
use serde::Deserialize;
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::{TeamService, UserService};
use shared::models::{Task, Team, UserSummary};
use shared::permissions::{
    can_be_assigned, is_assigned_to_task, is_team_creator, is_team_member_or_creator,
};
use shared::validation::validate_task_title;

/// Task service
#[derive(Clone)]
pub struct TaskService {
    db: PgPool,
}

/// Input for creating a task
#[derive(Debug, Deserialize)]
pub struct CreateTaskInput {
    pub title: String,
    pub description: Option<String>,
    /// Team id
    pub team: i64,
    /// Username of the assignee
    pub assigned_to: Option<String>,
    pub due_date: Option<NaiveDate>,
}

/// Result of an operation that may have produced a new assignment
#[derive(Debug)]
pub struct TaskChange {
    pub task: Task,
    pub team: Team,
    /// Set when the task was assigned to someone by this operation
    pub new_assignee: Option<UserSummary>,
}

#[derive(Debug, sqlx::FromRow)]
struct TaskRow {
    id: i64,
    title: String,
    description: Option<String>,
    completed: bool,
    team_id: i64,
    assigned_to: Option<i64>,
    assigned_to_username: Option<String>,
    due_date: Option<NaiveDate>,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            title: row.title,
            description: row.description,
            completed: row.completed,
            team_id: row.team_id,
            assigned_to: row.assigned_to,
            assigned_to_username: row.assigned_to_username,
            due_date: row.due_date,
        }
    }
}

const TASK_SELECT: &str = r#"
    SELECT t.id, t.title, t.description, t.completed, t.team_id,
           t.assigned_to, u.username AS assigned_to_username, t.due_date
    FROM tasks t
    LEFT JOIN users u ON u.id = t.assigned_to
"#;

impl TaskService {
    /// Create a new TaskService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a task in a team the caller belongs to
    pub async fn create_task(&self, user: &AuthUser, input: CreateTaskInput) -> AppResult<TaskChange> {
        validate_task_title(&input.title).map_err(|m| AppError::validation("title", m))?;

        let team = TeamService::new(self.db.clone()).get_team(input.team).await?;
        if !is_team_member_or_creator(&team, user.user_id, &user.username) {
            return Err(AppError::InsufficientPermissions);
        }

        let assignee = match input.assigned_to.as_deref() {
            Some(username) => Some(self.resolve_assignee(&team, username).await?),
            None => None,
        };

        let task_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO tasks (title, description, team_id, assigned_to, due_date)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(input.title.trim())
        .bind(&input.description)
        .bind(team.id)
        .bind(assignee.as_ref().map(|a| a.id))
        .bind(input.due_date)
        .fetch_one(&self.db)
        .await?;

        tracing::info!(task_id, team_id = team.id, "Task created by {}", user.username);

        let task = self.get_task(task_id).await?;
        Ok(TaskChange {
            task,
            team,
            new_assignee: assignee,
        })
    }

    /// Tasks assigned to the user, by due date with undated tasks last
    pub async fn list_tasks_for_user(&self, user_id: i64) -> AppResult<Vec<Task>> {
        let rows = sqlx::query_as::<_, TaskRow>(&format!(
            "{TASK_SELECT} WHERE t.assigned_to = $1 ORDER BY t.due_date ASC NULLS LAST, t.id ASC"
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        Ok(rows.into_iter().map(Task::from).collect())
    }

    /// Load a task
    pub async fn get_task(&self, task_id: i64) -> AppResult<Task> {
        sqlx::query_as::<_, TaskRow>(&format!("{TASK_SELECT} WHERE t.id = $1"))
            .bind(task_id)
            .fetch_optional(&self.db)
            .await?
            .map(Task::from)
            .ok_or_else(|| AppError::NotFound("Task".to_string()))
    }

    /// Task status, visible to members and the creator of the task's team
    pub async fn task_details(&self, user: &AuthUser, task_id: i64) -> AppResult<Task> {
        let task = self.get_task(task_id).await?;
        let team = TeamService::new(self.db.clone()).get_team(task.team_id).await?;
        if !is_team_member_or_creator(&team, user.user_id, &user.username) {
            return Err(AppError::InsufficientPermissions);
        }
        Ok(task)
    }

    /// Mark a task complete or incomplete (assignee only)
    pub async fn update_status(&self, user: &AuthUser, task_id: i64, completed: bool) -> AppResult<Task> {
        let task = self.get_task(task_id).await?;
        if !is_assigned_to_task(&task, user.user_id) {
            return Err(AppError::InsufficientPermissions);
        }

        sqlx::query("UPDATE tasks SET completed = $1 WHERE id = $2")
            .bind(completed)
            .bind(task_id)
            .execute(&self.db)
            .await?;

        tracing::info!(task_id, completed, "Task status updated by {}", user.username);
        self.get_task(task_id).await
    }

    /// Assign a task to a team member (team creator only)
    pub async fn assign(&self, user: &AuthUser, task_id: i64, username: &str) -> AppResult<TaskChange> {
        let task = self.get_task(task_id).await?;
        let team = TeamService::new(self.db.clone()).get_team(task.team_id).await?;
        if !is_team_creator(&team, user.user_id) {
            return Err(AppError::InsufficientPermissions);
        }

        let assignee = self.resolve_assignee(&team, username).await?;
        let changed = task.assigned_to != Some(assignee.id);

        if changed {
            sqlx::query("UPDATE tasks SET assigned_to = $1 WHERE id = $2")
                .bind(assignee.id)
                .bind(task_id)
                .execute(&self.db)
                .await?;
            tracing::info!(task_id, "Task assigned to {}", assignee.username);
        }

        let task = self.get_task(task_id).await?;
        Ok(TaskChange {
            task,
            team,
            new_assignee: changed.then_some(assignee),
        })
    }

    async fn resolve_assignee(&self, team: &Team, username: &str) -> AppResult<UserSummary> {
        let assignee = UserService::new(self.db.clone()).get_by_username(username).await?;
        if !can_be_assigned(team, assignee.id, &assignee.username) {
            return Err(AppError::validation(
                "assigned_to",
                format!("{} is not a member of team {}", assignee.username, team.name),
            ));
        }
        Ok(assignee)
    }
}
