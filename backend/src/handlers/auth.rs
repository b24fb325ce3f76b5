//! Account handlers: register, login, logout, token refresh

use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::error::AppError;
use crate::extract::ApiJson;
use crate::handlers::queue_email;
use crate::services::auth::{AuthSession, RegisterInput};
use crate::services::AuthService;
use crate::AppState;
use shared::models::EmailJob;

#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(custom = "check_username")]
    pub username: String,
    #[validate(custom = "check_email")]
    pub email: String,
    #[validate(custom = "check_password")]
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Body of logout and refresh requests
#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub refresh: String,
}

#[derive(Serialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub token_type: String,
    pub expires_in: i64,
}

#[derive(Serialize)]
pub struct EmptyResponse {}

fn with_message(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(message.into());
    error
}

fn check_username(username: &str) -> Result<(), ValidationError> {
    shared::validation::validate_username(username).map_err(|m| with_message("username", m))
}

fn check_email(email: &str) -> Result<(), ValidationError> {
    shared::validation::validate_email(email).map_err(|m| with_message("email", m))
}

fn check_password(password: &str) -> Result<(), ValidationError> {
    shared::validation::validate_password(password).map_err(|m| with_message("password", m))
}

/// Register endpoint handler
pub async fn register(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthSession>), AppError> {
    body.validate()?;

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let session = auth_service
        .register(RegisterInput {
            username: body.username,
            email: body.email,
            password: body.password,
        })
        .await?;

    queue_email(
        &state.queue,
        EmailJob::welcome(&session.user.username, &session.user.email),
    )
    .await;

    Ok((StatusCode::CREATED, Json(session)))
}

/// Login endpoint handler
pub async fn login(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<LoginRequest>,
) -> Result<Json<AuthSession>, AppError> {
    if body.username.is_empty() || body.password.is_empty() {
        return Err(AppError::InvalidCredentials);
    }

    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let session = auth_service.login(&body.username, &body.password).await?;

    Ok(Json(session))
}

/// Logout endpoint handler
pub async fn logout(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> Result<Json<EmptyResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    auth_service.logout(&body.refresh).await?;

    Ok(Json(EmptyResponse {}))
}

/// Refresh token endpoint handler
pub async fn refresh(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RefreshRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let auth_service = AuthService::new(state.db.clone(), &state.config);
    let tokens = auth_service.refresh_token(&body.refresh).await?;

    Ok(Json(TokenResponse {
        access: tokens.access,
        refresh: tokens.refresh,
        token_type: tokens.token_type,
        expires_in: tokens.expires_in,
    }))
}
