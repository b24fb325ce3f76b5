//! Team service: creation, listing and membership management

use chrono::{DateTime, Utc};
use serde::Deserialize;
use sqlx::PgPool;
use std::collections::HashMap;

use crate::error::{AppError, AppResult};
use crate::middleware::AuthUser;
use crate::services::UserService;
use shared::models::{resolve_team_slug, Team};
use shared::permissions::{is_team_creator, is_team_member_or_creator};
use shared::validation::validate_team_name;

/// Team service
#[derive(Clone)]
pub struct TeamService {
    db: PgPool,
}

/// Input for creating a team
#[derive(Debug, Deserialize)]
pub struct CreateTeamInput {
    pub name: String,
    pub description: Option<String>,
    pub slug: Option<String>,
    #[serde(default)]
    pub members: Vec<String>,
}

#[derive(Debug, sqlx::FromRow)]
struct TeamRow {
    id: i64,
    name: String,
    description: Option<String>,
    slug: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    created_by: i64,
    created_by_username: String,
}

impl TeamRow {
    fn into_team(self, members: Vec<String>) -> Team {
        Team {
            id: self.id,
            name: self.name,
            description: self.description,
            slug: self.slug,
            created_at: self.created_at,
            updated_at: self.updated_at,
            created_by: self.created_by,
            created_by_username: self.created_by_username,
            members,
        }
    }
}

const TEAM_COLUMNS: &str = r#"
    t.id, t.name, t.description, t.slug, t.created_at, t.updated_at,
    t.created_by, u.username AS created_by_username
"#;

impl TeamService {
    /// Create a new TeamService instance
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Create a team owned by `creator` with the given members
    pub async fn create_team(&self, creator: &AuthUser, input: CreateTeamInput) -> AppResult<Team> {
        validate_team_name(&input.name).map_err(|m| AppError::validation("name", m))?;

        let members = UserService::new(self.db.clone())
            .resolve_usernames(&input.members)
            .await?;

        let slug = resolve_team_slug(&input.name, input.slug.as_deref());

        let mut tx = self.db.begin().await?;

        let team_id = sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO teams (name, description, slug, created_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(input.name.trim())
        .bind(&input.description)
        .bind(&slug)
        .bind(creator.user_id)
        .fetch_one(&mut *tx)
        .await?;

        for member in &members {
            sqlx::query("INSERT INTO team_members (team_id, user_id) VALUES ($1, $2)")
                .bind(team_id)
                .bind(member.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        tracing::info!(team_id, slug = %slug, "Team created by {}", creator.username);
        self.get_team(team_id).await
    }

    /// Teams the user belongs to or created, newest first
    pub async fn list_teams_for_user(&self, user_id: i64) -> AppResult<Vec<Team>> {
        let rows = sqlx::query_as::<_, TeamRow>(&format!(
            r#"
            SELECT {TEAM_COLUMNS}
            FROM teams t
            JOIN users u ON u.id = t.created_by
            WHERE t.created_by = $1
               OR EXISTS (
                   SELECT 1 FROM team_members tm
                   WHERE tm.team_id = t.id AND tm.user_id = $1
               )
            ORDER BY t.created_at DESC, t.id DESC
            "#
        ))
        .bind(user_id)
        .fetch_all(&self.db)
        .await?;

        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
        let mut members = self.members_for(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let team_members = members.remove(&row.id).unwrap_or_default();
                row.into_team(team_members)
            })
            .collect())
    }

    /// Load a team with its members
    pub async fn get_team(&self, team_id: i64) -> AppResult<Team> {
        let row = sqlx::query_as::<_, TeamRow>(&format!(
            r#"
            SELECT {TEAM_COLUMNS}
            FROM teams t
            JOIN users u ON u.id = t.created_by
            WHERE t.id = $1
            "#
        ))
        .bind(team_id)
        .fetch_optional(&self.db)
        .await?
        .ok_or_else(|| AppError::NotFound("Team".to_string()))?;

        let members = self.members_for(&[team_id]).await?.remove(&team_id).unwrap_or_default();
        Ok(row.into_team(members))
    }

    /// Team details, visible to members and the creator
    pub async fn team_detail(&self, user: &AuthUser, team_id: i64) -> AppResult<Team> {
        let team = self.get_team(team_id).await?;
        if !is_team_member_or_creator(&team, user.user_id, &user.username) {
            return Err(AppError::InsufficientPermissions);
        }
        Ok(team)
    }

    /// Add a user to the team (creator only)
    pub async fn add_member(&self, user: &AuthUser, team_id: i64, username: &str) -> AppResult<Team> {
        let team = self.get_team(team_id).await?;
        if !is_team_creator(&team, user.user_id) {
            return Err(AppError::InsufficientPermissions);
        }

        let member = UserService::new(self.db.clone()).get_by_username(username).await?;
        if team.has_member(&member.username) {
            return Err(AppError::validation(
                "username",
                format!("{} is already a member of this team", member.username),
            ));
        }

        let mut tx = self.db.begin().await?;
        sqlx::query(
            "INSERT INTO team_members (team_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
        )
        .bind(team_id)
        .bind(member.id)
        .execute(&mut *tx)
        .await?;
        sqlx::query("UPDATE teams SET updated_at = NOW() WHERE id = $1")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(team_id, "Added {} to team", member.username);
        self.get_team(team_id).await
    }

    /// Remove a user from the team (creator only)
    pub async fn remove_member(
        &self,
        user: &AuthUser,
        team_id: i64,
        username: &str,
    ) -> AppResult<Team> {
        let team = self.get_team(team_id).await?;
        if !is_team_creator(&team, user.user_id) {
            return Err(AppError::InsufficientPermissions);
        }

        let member = UserService::new(self.db.clone()).get_by_username(username).await?;
        if !team.has_member(&member.username) {
            return Err(AppError::validation(
                "username",
                format!("{} is not a member of this team", member.username),
            ));
        }

        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM team_members WHERE team_id = $1 AND user_id = $2")
            .bind(team_id)
            .bind(member.id)
            .execute(&mut *tx)
            .await?;
        sqlx::query("UPDATE teams SET updated_at = NOW() WHERE id = $1")
            .bind(team_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::info!(team_id, "Removed {} from team", member.username);
        self.get_team(team_id).await
    }

    /// Member usernames for each of the given teams
    async fn members_for(&self, team_ids: &[i64]) -> AppResult<HashMap<i64, Vec<String>>> {
        if team_ids.is_empty() {
            return Ok(HashMap::new());
        }

        let rows = sqlx::query_as::<_, (i64, String)>(
            r#"
            SELECT tm.team_id, u.username
            FROM team_members tm
            JOIN users u ON u.id = tm.user_id
            WHERE tm.team_id = ANY($1)
            ORDER BY u.username
            "#,
        )
        .bind(team_ids)
        .fetch_all(&self.db)
        .await?;

        let mut members: HashMap<i64, Vec<String>> = HashMap::new();
        for (team_id, username) in rows {
            members.entry(team_id).or_default().push(username);
        }
        Ok(members)
    }
}
