//! Configuration management for the Team Management System
//!
//! Supports hierarchical configuration loading:
//! 1. Default values in code
//! 2. Configuration files (config/development.toml, config/production.toml)
//! 3. Environment variable overrides with TMS__ prefix
//! 4. The compose environment file (POSTGRES_USER, POSTGRES_PASSWORD, POSTGRES_DB)

use config::{ConfigError, Environment, File};
use serde::Deserialize;
use sqlx::postgres::PgConnectOptions;
use std::str::FromStr;

const DEVELOPMENT_JWT_SECRET: &str = "development-secret-key";

/// Main application configuration
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Current environment (development, production)
    pub environment: String,

    /// Server configuration
    pub server: ServerConfig,

    /// Database configuration
    pub database: DatabaseConfig,

    /// Redis (cache and task broker) configuration
    pub redis: RedisConfig,

    /// JWT authentication configuration
    pub jwt: JwtConfig,

    /// Outgoing email configuration
    pub email: EmailConfig,

    /// Task worker configuration
    pub worker: WorkerConfig,

    /// Log output configuration
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    /// Server port
    pub port: u16,

    /// Server host
    pub host: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    /// Full PostgreSQL connection URL; assembled from the parts below when absent
    pub url: Option<String>,

    pub host: String,
    pub port: u16,
    pub user: Option<String>,
    pub password: Option<String>,
    pub name: Option<String>,

    /// Maximum number of connections in the pool
    pub max_connections: u32,

    /// Minimum number of connections in the pool
    pub min_connections: u32,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JwtConfig {
    /// Secret key for signing JWT tokens
    pub secret: String,

    /// Access token expiration in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiration in seconds
    pub refresh_token_expiry: i64,
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum EmailTransportKind {
    Smtp,
    File,
}

#[derive(Debug, Deserialize, Clone)]
pub struct EmailConfig {
    /// Default sender address
    pub from_email: String,

    pub transport: EmailTransportKind,

    pub smtp_host: String,
    pub smtp_port: u16,
    pub smtp_username: Option<String>,
    pub smtp_password: Option<String>,
    pub smtp_starttls: bool,

    /// Output directory for the file transport
    pub file_dir: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WorkerConfig {
    /// Redis list the email jobs are pushed to
    pub queue_name: String,

    /// Delivery attempts before a job is dead-lettered
    pub max_retries: u32,

    /// Seconds a single BRPOP waits for a job
    pub poll_timeout_secs: u64,

    /// Linear backoff step between attempts
    pub retry_backoff_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingConfig {
    /// Emit JSON log lines instead of human-readable ones
    pub json: bool,
}

impl Config {
    /// Load configuration from files and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        let environment = std::env::var("TMS_ENVIRONMENT")
            .or_else(|_| std::env::var("TMS__ENVIRONMENT"))
            .unwrap_or_else(|_| "development".into());

        let mut builder = config::Config::builder()
            // Start with default values
            .set_default("environment", environment.clone())?
            .set_default("server.port", 8000)?
            .set_default("server.host", "0.0.0.0")?
            .set_default("database.host", "localhost")?
            .set_default("database.port", 5432)?
            .set_default("database.max_connections", 10)?
            .set_default("database.min_connections", 2)?
            .set_default("redis.url", "redis://127.0.0.1:6379")?
            .set_default("jwt.access_token_expiry", 3600)?
            .set_default("jwt.refresh_token_expiry", 604800)?
            .set_default("email.from_email", "noreply@localhost")?
            .set_default("email.transport", "file")?
            .set_default("email.smtp_host", "localhost")?
            .set_default("email.smtp_port", 587)?
            .set_default("email.smtp_starttls", true)?
            .set_default("email.file_dir", "mail")?
            .set_default("worker.queue_name", "tms:email")?
            .set_default("worker.max_retries", 3)?
            .set_default("worker.poll_timeout_secs", 5)?
            .set_default("worker.retry_backoff_secs", 2)?
            .set_default("logging.json", false)?;

        if environment != "production" {
            builder = builder.set_default("jwt.secret", DEVELOPMENT_JWT_SECRET)?;
        }

        // Values from the compose environment file
        for (var, key) in [
            ("POSTGRES_USER", "database.user"),
            ("POSTGRES_PASSWORD", "database.password"),
            ("POSTGRES_DB", "database.name"),
        ] {
            if let Ok(value) = std::env::var(var) {
                builder = builder.set_default(key, value)?;
            }
        }

        let config = builder
            // Load environment-specific config file
            .add_source(File::with_name(&format!("config/{}", environment)).required(false))
            // Override with environment variables (TMS__ prefix)
            .add_source(
                Environment::with_prefix("TMS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.environment == "production" && self.jwt.secret == DEVELOPMENT_JWT_SECRET {
            return Err(ConfigError::Message(
                "jwt.secret must be set in production".to_string(),
            ));
        }
        if self.jwt.secret.is_empty() {
            return Err(ConfigError::Message("jwt.secret must not be empty".to_string()));
        }
        if self.worker.max_retries == 0 {
            return Err(ConfigError::Message(
                "worker.max_retries must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Address the HTTP server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

impl DatabaseConfig {
    /// PostgreSQL connect options. Credentials from the parts are passed as-is,
    /// so reserved URL characters in a password need no escaping.
    pub fn connect_options(&self) -> Result<PgConnectOptions, ConfigError> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.is_empty()) {
            return PgConnectOptions::from_str(url)
                .map_err(|e| ConfigError::Message(format!("invalid database.url: {}", e)));
        }

        let (Some(user), Some(name)) = (self.user.as_deref(), self.name.as_deref()) else {
            return Err(ConfigError::Message(
                "database.url or POSTGRES_USER and POSTGRES_DB must be set".to_string(),
            ));
        };

        let options = PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .username(user)
            .database(name);

        Ok(match self.password.as_deref() {
            Some(password) if !password.is_empty() => options.password(password),
            _ => options,
        })
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: 8000,
            host: "0.0.0.0".to_string(),
        }
    }
}

impl Default for Config {
    /// Development defaults, matching `Config::load` with an empty environment
    fn default() -> Self {
        Self {
            environment: "development".to_string(),
            server: ServerConfig::default(),
            database: DatabaseConfig {
                url: None,
                host: "localhost".to_string(),
                port: 5432,
                user: None,
                password: None,
                name: None,
                max_connections: 10,
                min_connections: 2,
            },
            redis: RedisConfig {
                url: "redis://127.0.0.1:6379".to_string(),
            },
            jwt: JwtConfig {
                secret: DEVELOPMENT_JWT_SECRET.to_string(),
                access_token_expiry: 3600,
                refresh_token_expiry: 604800,
            },
            email: EmailConfig {
                from_email: "noreply@localhost".to_string(),
                transport: EmailTransportKind::File,
                smtp_host: "localhost".to_string(),
                smtp_port: 587,
                smtp_username: None,
                smtp_password: None,
                smtp_starttls: true,
                file_dir: "mail".to_string(),
            },
            worker: WorkerConfig {
                queue_name: "tms:email".to_string(),
                max_retries: 3,
                poll_timeout_secs: 5,
                retry_backoff_secs: 2,
            },
            logging: LoggingConfig { json: false },
        }
    }
}
