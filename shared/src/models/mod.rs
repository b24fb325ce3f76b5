//! Domain models for the Team Management System

mod email;
mod task;
mod team;
mod user;

pub use email::*;
pub use task::*;
pub use team::*;
pub use user::*;
