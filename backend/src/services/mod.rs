//! Business logic services for the Team Management System

pub mod auth;
pub mod mailer;
pub mod task;
pub mod task_queue;
pub mod team;
pub mod user;

pub use auth::AuthService;
pub use mailer::Mailer;
pub use task::TaskService;
pub use task_queue::TaskQueue;
pub use team::TeamService;
pub use user::UserService;
