//! User lookups shared by the team and task services

use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use shared::models::UserSummary;

#[derive(Clone)]
pub struct UserService {
    db: PgPool,
}

impl UserService {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    /// Find an active user by username
    pub async fn find_by_username(&self, username: &str) -> AppResult<Option<UserSummary>> {
        let user = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, username, email FROM users WHERE username = $1 AND is_active = true",
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?;

        Ok(user.map(|(id, username, email)| UserSummary { id, username, email }))
    }

    /// Find a user by username or fail with 404
    pub async fn get_by_username(&self, username: &str) -> AppResult<UserSummary> {
        self.find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User '{}'", username)))
    }

    /// Resolve a list of usernames to users, failing on the first unknown one
    pub async fn resolve_usernames(&self, usernames: &[String]) -> AppResult<Vec<UserSummary>> {
        let found = sqlx::query_as::<_, (i64, String, String)>(
            "SELECT id, username, email FROM users WHERE username = ANY($1) AND is_active = true",
        )
        .bind(usernames)
        .fetch_all(&self.db)
        .await?;

        let mut users = Vec::with_capacity(usernames.len());
        for username in usernames {
            let user = found
                .iter()
                .find(|(_, name, _)| name == username)
                .map(|(id, name, email)| UserSummary {
                    id: *id,
                    username: name.clone(),
                    email: email.clone(),
                })
                .ok_or_else(|| {
                    AppError::validation(
                        "members",
                        format!("Object with username={} does not exist.", username),
                    )
                })?;
            if !users.iter().any(|u: &UserSummary| u.id == user.id) {
                users.push(user);
            }
        }

        Ok(users)
    }
}
