//! Shared types and rules for the Team Management System
//!
//! This crate contains the domain types, slug generation, object-level
//! permission rules and input validation used by the web server, the task
//! worker and the management commands.

pub mod models;
pub mod permissions;
pub mod slug;
pub mod validation;

pub use models::*;
pub use permissions::*;
pub use slug::*;
pub use validation::*;
