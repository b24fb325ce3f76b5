//! HTTP middleware

pub mod auth;
pub mod request_log;

pub use auth::{auth_middleware, AuthUser, CurrentUser};
pub use request_log::request_logging;
