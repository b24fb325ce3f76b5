//! Validation utilities for the Team Management System

use crate::models::{TASK_TITLE_MAX_LEN, TEAM_NAME_MAX_LEN};

/// Maximum username length
pub const USERNAME_MAX_LEN: usize = 150;

/// Minimum password length
pub const PASSWORD_MIN_LEN: usize = 8;

// ============================================================================
// Account Validations
// ============================================================================

/// Validate a username: 1-150 characters, letters, digits and `@ . + - _`
pub fn validate_username(username: &str) -> Result<(), &'static str> {
    if username.is_empty() {
        return Err("Username is required");
    }
    if username.chars().count() > USERNAME_MAX_LEN {
        return Err("Username must be at most 150 characters");
    }
    if !username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'))
    {
        return Err("Username may contain only letters, digits and @/./+/-/_");
    }
    Ok(())
}

/// Validate email format (basic check)
pub fn validate_email(email: &str) -> Result<(), &'static str> {
    let Some((local, domain)) = email.split_once('@') else {
        return Err("Invalid email format");
    };
    if local.is_empty()
        || domain.contains('@')
        || !domain.contains('.')
        || domain.starts_with('.')
        || domain.ends_with('.')
        || email.chars().any(char::is_whitespace)
    {
        return Err("Invalid email format");
    }
    Ok(())
}

/// Validate password strength
pub fn validate_password(password: &str) -> Result<(), &'static str> {
    if password.chars().count() < PASSWORD_MIN_LEN {
        return Err("Password must be at least 8 characters");
    }
    Ok(())
}

// ============================================================================
// Team and Task Validations
// ============================================================================

pub fn validate_team_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Team name is required");
    }
    if name.chars().count() > TEAM_NAME_MAX_LEN {
        return Err("Team name must be at most 100 characters");
    }
    Ok(())
}

pub fn validate_task_title(title: &str) -> Result<(), &'static str> {
    if title.trim().is_empty() {
        return Err("Task title is required");
    }
    if title.chars().count() > TASK_TITLE_MAX_LEN {
        return Err("Task title must be at most 255 characters");
    }
    Ok(())
}
