//! Team HTTP handlers

use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::extract::{ApiJson, ApiPath};
use crate::middleware::CurrentUser;
use crate::services::team::CreateTeamInput;
use crate::services::TeamService;
use crate::AppState;
use shared::models::Team;

/// Team as returned by the API. Creator and members are reported by username.
#[derive(Debug, Serialize)]
pub struct TeamResponse {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub created_by: String,
    pub members: Vec<String>,
}

impl From<Team> for TeamResponse {
    fn from(team: Team) -> Self {
        Self {
            id: team.id,
            name: team.name,
            description: team.description,
            slug: team.slug,
            created_at: team.created_at,
            created_by: team.created_by_username,
            members: team.members,
        }
    }
}

/// Body of add-member and remove-member requests
#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    pub username: String,
}

/// Create a team owned by the caller
pub async fn create_team(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiJson(input): ApiJson<CreateTeamInput>,
) -> Result<(StatusCode, Json<TeamResponse>), AppError> {
    let service = TeamService::new(state.db.clone());
    let team = service.create_team(&user, input).await?;

    Ok((StatusCode::CREATED, Json(TeamResponse::from(team))))
}

/// Teams the caller created or belongs to
pub async fn my_teams(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<TeamResponse>>, AppError> {
    let service = TeamService::new(state.db.clone());
    let teams = service.list_teams_for_user(user.user_id).await?;

    Ok(Json(teams.into_iter().map(TeamResponse::from).collect()))
}

/// Team details
pub async fn team_detail(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(team_id): ApiPath<i64>,
) -> Result<Json<TeamResponse>, AppError> {
    let service = TeamService::new(state.db.clone());
    let team = service.team_detail(&user, team_id).await?;

    Ok(Json(TeamResponse::from(team)))
}

pub async fn add_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(team_id): ApiPath<i64>,
    ApiJson(body): ApiJson<MemberRequest>,
) -> Result<Json<TeamResponse>, AppError> {
    let service = TeamService::new(state.db.clone());
    let team = service.add_member(&user, team_id, &body.username).await?;

    Ok(Json(TeamResponse::from(team)))
}

pub async fn remove_member(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ApiPath(team_id): ApiPath<i64>,
    ApiJson(body): ApiJson<MemberRequest>,
) -> Result<Json<TeamResponse>, AppError> {
    let service = TeamService::new(state.db.clone());
    let team = service.remove_member(&user, team_id, &body.username).await?;

    Ok(Json(TeamResponse::from(team)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_team_response_reports_creator_username() {
        let team = Team {
            id: 7,
            name: "Platform".to_string(),
            description: None,
            slug: Some("platform".to_string()),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            created_by: 1,
            created_by_username: "alice".to_string(),
            members: vec!["bob".to_string()],
        };

        let json = serde_json::to_value(TeamResponse::from(team)).unwrap();
        assert_eq!(json["created_by"], "alice");
        assert_eq!(json["members"][0], "bob");
        assert_eq!(json["slug"], "platform");
        assert!(json.get("updated_at").is_none());
    }
}
