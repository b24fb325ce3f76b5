//! Background email job payload

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// An email to be delivered by the task worker.
///
/// Jobs travel through the broker as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmailJob {
    pub id: Uuid,
    pub subject: String,
    pub message: String,
    /// Sender address; the configured default is used when absent
    pub from_email: Option<String>,
    pub recipient_list: Vec<String>,
    #[serde(default)]
    pub attempts: u32,
    pub enqueued_at: DateTime<Utc>,
}

impl EmailJob {
    pub fn new(
        subject: impl Into<String>,
        message: impl Into<String>,
        from_email: Option<String>,
        recipient_list: Vec<String>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            message: message.into(),
            from_email,
            recipient_list,
            attempts: 0,
            enqueued_at: Utc::now(),
        }
    }

    /// Welcome email sent after registration
    pub fn welcome(username: &str, email: &str) -> Self {
        Self::new(
            "Welcome to Team Management",
            format!(
                "Hi {},\n\nYour account has been created. You can now create teams and manage tasks.",
                username
            ),
            None,
            vec![email.to_string()],
        )
    }

    /// Notice sent to a user when a task is assigned to them
    pub fn task_assigned(username: &str, email: &str, task_title: &str, team_name: &str) -> Self {
        Self::new(
            format!("New task assigned: {}", task_title),
            format!(
                "Hi {},\n\nYou have been assigned the task \"{}\" in team \"{}\".",
                username, task_title, team_name
            ),
            None,
            vec![email.to_string()],
        )
    }

    /// Copy of this job for the next delivery attempt
    pub fn next_attempt(&self) -> Self {
        Self {
            attempts: self.attempts + 1,
            ..self.clone()
        }
    }

    pub fn to_payload(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_payload(payload: &str) -> serde_json::Result<Self> {
        serde_json::from_str(payload)
    }
}
