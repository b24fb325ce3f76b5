//! Task models

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Maximum length of a task title
pub const TASK_TITLE_MAX_LEN: usize = 255;

/// A unit of work inside a team.
///
/// Tasks are listed by due date ascending, undated tasks last.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub completed: bool,
    pub team_id: i64,
    /// User id of the assignee; cleared when the user is deleted
    pub assigned_to: Option<i64>,
    pub assigned_to_username: Option<String>,
    pub due_date: Option<NaiveDate>,
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.title)
    }
}
