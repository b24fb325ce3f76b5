//! Object-level access rules for teams and tasks

use crate::models::{Task, Team};

/// Only the creator of a team may modify it (membership, task assignment).
pub fn is_team_creator(team: &Team, user_id: i64) -> bool {
    team.created_by == user_id
}

/// Members and the creator may view a team and work with its tasks.
pub fn is_team_member_or_creator(team: &Team, user_id: i64, username: &str) -> bool {
    is_team_creator(team, user_id) || team.has_member(username)
}

/// Only the assignee may change a task's completion status.
pub fn is_assigned_to_task(task: &Task, user_id: i64) -> bool {
    task.assigned_to == Some(user_id)
}

/// Whether a user can be given tasks in the team.
pub fn can_be_assigned(team: &Team, user_id: i64, username: &str) -> bool {
    is_team_member_or_creator(team, user_id, username)
}
