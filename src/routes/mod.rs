pub mod activities;
pub mod admin;
pub mod dashboard;
pub mod leads;
pub mod users;

use axum::routing::{get, post};
use axum::Router;

use crate::state::SharedState;

pub fn api_routes() -> Router<SharedState> {
    Router::new()
        // Users
        .route("/api/v1/users/register", post(users::register))
        .route("/api/v1/users/login", post(users::login))
        .route("/api/v1/users/me", get(users::me))
        // Leads
        .route("/api/v1/leads", get(leads::list).post(leads::create))
        .route("/api/v1/leads/export", get(leads::export))
        .route(
            "/api/v1/leads/{id}",
            get(leads::get).put(leads::update).delete(leads::delete),
        )
        // Activities
        .route(
            "/api/v1/leads/{id}/activities",
            get(activities::list).post(activities::create),
        )
        // Dashboard
        .route("/api/v1/dashboard", get(dashboard::dashboard))
        // Admin
        .route("/api/v1/admin/audit", get(admin::list_audit_events))
}
