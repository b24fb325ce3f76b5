//! Route definitions for the Team Management System

use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{handlers, middleware::auth_middleware, AppState};

/// Create API routes
pub fn api_routes(state: AppState) -> Router<AppState> {
    Router::new()
        // Account routes (public)
        .nest("/api", account_routes())
        // Protected routes - teams and tasks
        .nest("/teams", team_routes(state))
}

/// Account routes (public)
fn account_routes() -> Router<AppState> {
    Router::new()
        .route("/register/", post(handlers::register))
        .route("/login/", post(handlers::login))
        .route("/logout/", post(handlers::logout))
        .route("/token/refresh/", post(handlers::refresh))
}

/// Team and task routes (protected)
fn team_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/create/", post(handlers::create_team))
        .route("/my-teams/", get(handlers::my_teams))
        .route("/:pk/team-detail/", get(handlers::team_detail))
        .route("/:pk/add-member/", post(handlers::add_member))
        .route("/:pk/remove-member/", post(handlers::remove_member))
        .route("/create-tasks/", post(handlers::create_task))
        .route("/my-tasks/", get(handlers::my_tasks))
        .route(
            "/my-tasks/:pk/update/",
            put(handlers::update_task_status).patch(handlers::update_task_status),
        )
        .route("/tasks/:pk/details/", get(handlers::task_details))
        .route(
            "/tasks/:pk/assign/",
            put(handlers::assign_task).patch(handlers::assign_task),
        )
        .route_layer(middleware::from_fn_with_state(state, auth_middleware))
}
