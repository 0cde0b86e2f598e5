//! Router assembly.
//!
//! SYSTEM CONTEXT
//! ==============
//! This module binds the JSON API under `/api` plus a `/healthz` probe into a
//! single Axum router. Account entry points (signup, login, password reset,
//! logout) are open; every other `/api` route requires the `session_token`
//! cookie via the `AuthUser` extractor.

pub mod auth;
pub mod boards;
pub mod notes;

#[cfg(test)]
#[path = "mod_test.rs"]
mod mod_test;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

/// Build the application router.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/auth/signup", post(auth::signup))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/reset-password", post(auth::reset_password))
        .route("/api/auth/logout", post(auth::logout))
        .route("/api/auth/me", get(auth::me).patch(auth::update_me))
        .route("/api/boards", get(boards::list_boards).post(boards::create_board))
        .route("/api/boards/reorder", post(boards::reorder_boards))
        .route("/api/boards/{id}", patch(boards::update_board).delete(boards::delete_board))
        .route(
            "/api/boards/{id}/notes",
            get(notes::list_notes)
                .post(notes::create_note)
                .put(notes::update_notes),
        )
        .route("/api/notes/{id}", delete(notes::delete_note))
        .route("/healthz", get(healthz))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}
