//! Authentication service for user registration, login, logout and token management

use bcrypt::{hash, verify, DEFAULT_COST};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, errors::ErrorKind, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sqlx::{PgExecutor, PgPool};
use uuid::Uuid;

use crate::config::Config;
use crate::error::{map_unique_violation, AppError, AppResult};
use shared::models::UserSummary;

/// Authentication service
#[derive(Clone)]
pub struct AuthService {
    db: PgPool,
    jwt_secret: String,
    access_token_expiry: i64,
    refresh_token_expiry: i64,
}

/// Input for registering a new account
#[derive(Debug, Deserialize)]
pub struct RegisterInput {
    pub username: String,
    pub email: String,
    pub password: String,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // User ID
    pub username: String,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn user_id(&self) -> AppResult<i64> {
        self.sub.parse().map_err(|_| AppError::InvalidToken)
    }
}

/// Authentication tokens
#[derive(Debug, Serialize)]
pub struct AuthTokens {
    pub access: String,
    pub refresh: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// A logged-in user together with their tokens
#[derive(Debug, Serialize)]
pub struct AuthSession {
    pub user: UserSummary,
    #[serde(flatten)]
    pub tokens: AuthTokens,
}

/// User info from database
#[derive(Debug, sqlx::FromRow)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub is_active: bool,
}

impl From<&UserRow> for UserSummary {
    fn from(row: &UserRow) -> Self {
        UserSummary {
            id: row.id,
            username: row.username.clone(),
            email: row.email.clone(),
        }
    }
}

impl AuthService {
    /// Create a new AuthService instance
    pub fn new(db: PgPool, config: &Config) -> Self {
        Self {
            db,
            jwt_secret: config.jwt.secret.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
        }
    }

    /// Create an account and log it in
    pub async fn register(&self, input: RegisterInput) -> AppResult<AuthSession> {
        // Check if username already exists
        let existing = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM users WHERE username = $1",
        )
        .bind(&input.username)
        .fetch_one(&self.db)
        .await?;

        if existing > 0 {
            return Err(AppError::DuplicateEntry("username".to_string()));
        }

        // Hash password
        let password_hash = hash(&input.password, DEFAULT_COST)
            .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?;

        let user = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (username, email, password_hash, last_login)
            VALUES ($1, $2, $3, NOW())
            RETURNING id, username, email, password_hash, is_active
            "#,
        )
        .bind(&input.username)
        .bind(&input.email)
        .bind(&password_hash)
        .fetch_one(&self.db)
        .await
        .map_err(|e| map_unique_violation(e, "username"))?;

        tracing::info!(user_id = user.id, "Registered user {}", user.username);

        let tokens = self.generate_tokens(user.id, &user.username)?;
        self.store_refresh_token(&self.db, user.id, &tokens.refresh).await?;

        Ok(AuthSession {
            user: UserSummary::from(&user),
            tokens,
        })
    }

    /// Authenticate user with username and password
    pub async fn login(&self, username: &str, password: &str) -> AppResult<AuthSession> {
        let user = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT id, username, email, password_hash, is_active
            FROM users
            WHERE username = $1
            "#,
        )
        .bind(username)
        .fetch_optional(&self.db)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

        // Inactive accounts get the same answer as a wrong password
        if !user.is_active {
            return Err(AppError::InvalidCredentials);
        }

        let valid = verify(password, &user.password_hash)
            .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))?;

        if !valid {
            return Err(AppError::InvalidCredentials);
        }

        sqlx::query("UPDATE users SET last_login = NOW() WHERE id = $1")
            .bind(user.id)
            .execute(&self.db)
            .await?;

        let tokens = self.generate_tokens(user.id, &user.username)?;
        self.store_refresh_token(&self.db, user.id, &tokens.refresh).await?;

        Ok(AuthSession {
            user: UserSummary::from(&user),
            tokens,
        })
    }

    /// Revoke a refresh token. Unknown or already revoked tokens are ignored.
    pub async fn logout(&self, refresh_token: &str) -> AppResult<()> {
        let token_hash = hash_token(refresh_token);

        let result = sqlx::query(
            "UPDATE refresh_tokens SET revoked_at = NOW() WHERE token_hash = $1 AND revoked_at IS NULL",
        )
        .bind(&token_hash)
        .execute(&self.db)
        .await?;

        tracing::debug!(revoked = result.rows_affected(), "Logout");
        Ok(())
    }

    /// Exchange a refresh token for a new token pair. The old token is revoked
    /// by the same statement that checks it, so it can be spent only once.
    pub async fn refresh_token(&self, refresh_token: &str) -> AppResult<AuthTokens> {
        let token_hash = hash_token(refresh_token);
        let mut tx = self.db.begin().await?;

        let (user_id, username) = sqlx::query_as::<_, (i64, String)>(
            r#"
            UPDATE refresh_tokens rt
            SET revoked_at = NOW()
            FROM users u
            WHERE rt.token_hash = $1
              AND rt.revoked_at IS NULL
              AND rt.expires_at > NOW()
              AND u.id = rt.user_id
              AND u.is_active = true
            RETURNING rt.user_id, u.username
            "#,
        )
        .bind(&token_hash)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid or expired refresh token".to_string()))?;

        let tokens = self.generate_tokens(user_id, &username)?;
        self.store_refresh_token(&mut *tx, user_id, &tokens.refresh).await?;
        tx.commit().await?;

        Ok(tokens)
    }

    /// Generate access and refresh tokens
    fn generate_tokens(&self, user_id: i64, username: &str) -> AppResult<AuthTokens> {
        let access = encode_access_token(
            user_id,
            username,
            &self.jwt_secret,
            self.access_token_expiry,
        )?;

        // Refresh token (simple random token)
        let refresh = Uuid::new_v4().to_string();

        Ok(AuthTokens {
            access,
            refresh,
            token_type: "Bearer".to_string(),
            expires_in: self.access_token_expiry,
        })
    }

    /// Store refresh token in database
    async fn store_refresh_token<'e, E>(&self, executor: E, user_id: i64, token: &str) -> AppResult<()>
    where
        E: PgExecutor<'e>,
    {
        let token_hash = hash_token(token);
        let expires_at = Utc::now() + Duration::seconds(self.refresh_token_expiry);

        sqlx::query(
            r#"
            INSERT INTO refresh_tokens (user_id, token_hash, expires_at)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(user_id)
        .bind(&token_hash)
        .bind(expires_at)
        .execute(executor)
        .await?;

        Ok(())
    }
}

/// Sign an access token for the user
pub fn encode_access_token(
    user_id: i64,
    username: &str,
    secret: &str,
    expiry_secs: i64,
) -> AppResult<String> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        exp: (now + Duration::seconds(expiry_secs)).timestamp(),
        iat: now.timestamp(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Verify signature and expiry of an access token
pub fn decode_access_token(token: &str, secret: &str) -> AppResult<Claims> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| match e.kind() {
        ErrorKind::ExpiredSignature => AppError::TokenExpired,
        _ => AppError::InvalidToken,
    })
}

/// SHA-256 hex digest of a refresh token, as stored in the database
fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}
