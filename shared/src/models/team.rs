//! Team models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::slug::slugify;

/// Maximum length of a team name
pub const TEAM_NAME_MAX_LEN: usize = 100;

/// Maximum length of a team slug
pub const TEAM_SLUG_MAX_LEN: usize = 255;

/// A team of users
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub slug: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// User id of the creator
    pub created_by: i64,
    pub created_by_username: String,
    /// Usernames of the members
    pub members: Vec<String>,
}

impl Team {
    /// Whether the given username is in the member set
    pub fn has_member(&self, username: &str) -> bool {
        self.members.iter().any(|m| m == username)
    }
}

impl std::fmt::Display for Team {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} by {}", self.name, self.created_by_username)
    }
}

/// Resolve the slug a team is saved with.
///
/// An explicit, non-blank slug is kept as given; otherwise the slug is
/// derived from the team name.
pub fn resolve_team_slug(name: &str, slug: Option<&str>) -> String {
    match slug.map(str::trim) {
        Some(s) if !s.is_empty() => s.chars().take(TEAM_SLUG_MAX_LEN).collect(),
        _ => slugify(name).chars().take(TEAM_SLUG_MAX_LEN).collect(),
    }
}
